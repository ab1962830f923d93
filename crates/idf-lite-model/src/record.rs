// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record instances and typed field access
//!
//! A [`RecordInstance`] stores every field as raw text, blank meaning absent.
//! Typed getters coerce on read in one of two modes: the raw value or
//! nothing, or the raw value falling back to the schema default. Setters
//! store text without checking required or choice constraints; that is the
//! job of [`crate::validate_record`].

use crate::{
    format_double, units, FieldSpec, FieldValueType, Handle, IdfError, NumericValue,
    RecordTypeSpec, Result, UnitSystem, AUTOCALCULATE, AUTOSIZE,
};
use std::sync::Arc;

/// Characters that end a field in IDF text and so cannot appear inside one
pub const FIELD_BREAKS: [char; 5] = [',', ';', '!', '\n', '\r'];

/// Whether `value` survives being written as one IDF field
pub fn is_writable_text(value: &str) -> bool {
    !value.contains(FIELD_BREAKS)
}

/// One record of a collection
#[derive(Clone, Debug)]
pub struct RecordInstance {
    handle: Handle,
    spec: Arc<RecordTypeSpec>,
    /// Fixed fields followed by extensible groups
    values: Vec<String>,
    /// Per-field comments, same length as `values`
    field_comments: Vec<Option<String>>,
    comment: Option<String>,
}

impl RecordInstance {
    /// Create an empty record of the given type with a fresh handle
    pub fn new(spec: Arc<RecordTypeSpec>) -> Self {
        Self::with_handle(Handle::new(), spec)
    }

    /// Create an empty record with a known handle
    pub fn with_handle(handle: Handle, spec: Arc<RecordTypeSpec>) -> Self {
        Self {
            handle,
            spec,
            values: Vec::new(),
            field_comments: Vec::new(),
            comment: None,
        }
    }

    /// Create a record from raw field values
    pub fn from_values(spec: Arc<RecordTypeSpec>, values: Vec<String>) -> Self {
        let field_comments = vec![None; values.len()];
        Self {
            handle: Handle::new(),
            spec,
            values,
            field_comments,
            comment: None,
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn spec(&self) -> &Arc<RecordTypeSpec> {
        &self.spec
    }

    pub fn type_name(&self) -> &str {
        &self.spec.name
    }

    /// Number of stored fields, blanks included
    pub fn num_fields(&self) -> usize {
        self.values.len()
    }

    /// All stored field values
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Record-level comment (printed above the type line)
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// Comment attached to a stored field
    pub fn field_comment(&self, position: usize) -> Option<&str> {
        self.field_comments.get(position).and_then(|c| c.as_deref())
    }

    pub fn set_field_comment(&mut self, position: usize, comment: Option<String>) {
        self.ensure_len(position + 1);
        self.field_comments[position] = comment;
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// Raw text at a flat position; `None` past the stored fields
    pub fn raw(&self, position: usize) -> Option<&str> {
        self.values.get(position).map(String::as_str)
    }

    /// Store raw text at a flat position, padding with blanks
    pub fn set_raw(&mut self, position: usize, value: impl Into<String>) {
        self.ensure_len(position + 1);
        self.values[position] = value.into();
    }

    /// Append a raw field value with an optional comment
    pub fn push_raw(&mut self, value: impl Into<String>, comment: Option<String>) {
        self.values.push(value.into());
        self.field_comments.push(comment);
    }

    /// Reject text that would split the field when written
    fn check_writable(&self, position: usize, value: &str) -> Result<()> {
        if is_writable_text(value) {
            return Ok(());
        }
        let field = self
            .spec
            .spec_at(position)
            .map(|spec| spec.name.clone())
            .unwrap_or_else(|| format!("field {}", position + 1));
        Err(IdfError::UnwritableValue {
            record_type: self.spec.name.clone(),
            field,
            value: value.to_string(),
        })
    }

    fn ensure_len(&mut self, len: usize) {
        if self.values.len() < len {
            self.values.resize(len, String::new());
            self.field_comments.resize(len, None);
        }
    }

    /// Non-blank raw text of a named fixed field
    pub fn raw_field(&self, field: &str) -> Result<Option<&str>> {
        let index = self.spec.field_index(field)?;
        Ok(self.present(index))
    }

    fn present(&self, position: usize) -> Option<&str> {
        self.raw(position)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn field_spec(&self, field: &str) -> Result<(usize, &FieldSpec)> {
        let index = self.spec.field_index(field)?;
        Ok((index, &self.spec.fields[index]))
    }

    /// Effective raw text: stored value, else schema default
    fn effective(&self, field: &str) -> Result<Option<&str>> {
        let (index, spec) = self.field_spec(field)?;
        Ok(self
            .present(index)
            .or_else(|| spec.default_value.as_deref().filter(|d| !d.trim().is_empty())))
    }

    /// Check if a field has no stored value
    pub fn is_field_defaulted(&self, field: &str) -> Result<bool> {
        Ok(self.raw_field(field)?.is_none())
    }

    /// Blank a field so that its default applies again
    pub fn reset(&mut self, field: &str) -> Result<()> {
        let index = self.spec.field_index(field)?;
        if index < self.values.len() {
            self.values[index].clear();
        }
        Ok(())
    }

    // ========================================================================
    // Name
    // ========================================================================

    /// Record name, if the type has a name field and it is set
    pub fn name(&self) -> Option<&str> {
        self.spec.name_field()?;
        self.present(0)
    }

    /// Set the record name
    ///
    /// Prefer `RecordCollection::set_name`, which keeps names unique.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        if self.spec.name_field().is_none() {
            return Err(IdfError::unknown_field(&self.spec.name, "Name"));
        }
        let name = name.into();
        self.check_writable(0, &name)?;
        self.set_raw(0, name);
        Ok(())
    }

    /// Name if set, handle text otherwise; what a reference field stores
    pub fn reference_text(&self) -> String {
        self.name()
            .map(str::to_string)
            .unwrap_or_else(|| self.handle.to_string())
    }

    // ========================================================================
    // Strings and choices
    // ========================================================================

    pub fn get_string(&self, field: &str) -> Result<Option<String>> {
        Ok(self.raw_field(field)?.map(str::to_string))
    }

    pub fn get_string_or_default(&self, field: &str) -> Result<Option<String>> {
        Ok(self.effective(field)?.map(str::to_string))
    }

    /// Store text; values containing `,` `;` `!` or a line break are rejected
    pub fn set_string(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        let index = self.spec.field_index(field)?;
        let value = value.into();
        self.check_writable(index, &value)?;
        self.set_raw(index, value);
        Ok(())
    }

    /// Choice value in its canonical key spelling
    ///
    /// Values outside the key list come back as stored; validation flags them.
    pub fn get_choice(&self, field: &str) -> Result<Option<String>> {
        let (index, spec) = self.field_spec(field)?;
        Ok(self.present(index).map(|raw| canonical(spec, raw)))
    }

    pub fn get_choice_or_default(&self, field: &str) -> Result<Option<String>> {
        let (_, spec) = self.field_spec(field)?;
        Ok(self.effective(field)?.map(|raw| canonical(spec, raw)))
    }

    pub fn set_choice(&mut self, field: &str, value: &str) -> Result<()> {
        self.set_string(field, value)
    }

    // ========================================================================
    // Numbers
    // ========================================================================

    /// Tri-state numeric content of a field
    pub fn get_numeric(&self, field: &str) -> Result<NumericValue> {
        let (index, spec) = self.field_spec(field)?;
        match self.present(index) {
            Some(raw) => parse_numeric(&self.spec.name, spec, raw),
            None => Ok(NumericValue::Blank),
        }
    }

    pub fn get_numeric_or_default(&self, field: &str) -> Result<NumericValue> {
        let (_, spec) = self.field_spec(field)?;
        match self.effective(field)? {
            Some(raw) => parse_numeric(&self.spec.name, spec, raw),
            None => Ok(NumericValue::Blank),
        }
    }

    /// Numeric value; `None` when blank, autosized or autocalculated
    pub fn get_double(&self, field: &str) -> Result<Option<f64>> {
        Ok(self.get_numeric(field)?.value())
    }

    pub fn get_double_or_default(&self, field: &str) -> Result<Option<f64>> {
        Ok(self.get_numeric_or_default(field)?.value())
    }

    pub fn set_double(&mut self, field: &str, value: f64) -> Result<()> {
        self.set_string(field, format_double(value))
    }

    /// Store any numeric tri-state; `Blank` resets the field
    pub fn set_numeric(&mut self, field: &str, value: NumericValue) -> Result<()> {
        match value {
            NumericValue::Blank => self.reset(field),
            NumericValue::Autosize => self.set_autosize(field),
            NumericValue::Autocalculate => self.set_autocalculate(field),
            NumericValue::Value(v) => self.set_double(field, v),
        }
    }

    pub fn is_autosized(&self, field: &str) -> Result<bool> {
        Ok(self.get_numeric(field)?.is_autosized())
    }

    pub fn is_autocalculated(&self, field: &str) -> Result<bool> {
        Ok(self.get_numeric(field)?.is_autocalculated())
    }

    pub fn set_autosize(&mut self, field: &str) -> Result<()> {
        self.set_string(field, AUTOSIZE)
    }

    pub fn set_autocalculate(&mut self, field: &str) -> Result<()> {
        self.set_string(field, AUTOCALCULATE)
    }

    /// Integer value; reals are truncated toward zero
    pub fn get_int(&self, field: &str) -> Result<Option<i64>> {
        Ok(self.get_double(field)?.map(|v| v as i64))
    }

    pub fn get_int_or_default(&self, field: &str) -> Result<Option<i64>> {
        Ok(self.get_double_or_default(field)?.map(|v| v as i64))
    }

    pub fn set_int(&mut self, field: &str, value: i64) -> Result<()> {
        self.set_string(field, value.to_string())
    }

    /// Numeric value converted to the requested unit system
    pub fn get_quantity(&self, field: &str, system: UnitSystem) -> Result<Option<f64>> {
        let (_, spec) = self.field_spec(field)?;
        let value = match self.get_double(field)? {
            Some(v) => v,
            None => return Ok(None),
        };
        match system {
            UnitSystem::SI => Ok(Some(value)),
            UnitSystem::IP => convert_to_ip(&self.spec.name, spec, value).map(Some),
        }
    }

    /// Store a numeric value given in the requested unit system
    pub fn set_quantity(&mut self, field: &str, value: f64, system: UnitSystem) -> Result<()> {
        let si_value = match system {
            UnitSystem::SI => value,
            UnitSystem::IP => {
                let (_, spec) = self.field_spec(field)?;
                let (si, ip) = unit_pair(&self.spec.name, spec)?;
                units::convert(value, ip, si).ok_or_else(|| no_conversion(&self.spec.name, spec))?
            }
        };
        self.set_double(field, si_value)
    }

    // ========================================================================
    // Extensible groups
    // ========================================================================

    /// Number of (possibly partial) extensible groups stored
    pub fn num_extensible_groups(&self) -> usize {
        let size = self.spec.group_size();
        let fixed = self.spec.num_fixed_fields();
        if size == 0 || self.values.len() <= fixed {
            return 0;
        }
        (self.values.len() - fixed).div_ceil(size)
    }

    /// Raw values of one extensible group
    pub fn extensible_group(&self, group: usize) -> Option<&[String]> {
        let size = self.spec.group_size();
        if size == 0 {
            return None;
        }
        let start = self.spec.num_fixed_fields() + group * size;
        if start >= self.values.len() {
            return None;
        }
        let end = (start + size).min(self.values.len());
        Some(&self.values[start..end])
    }

    /// Append a group of values, returning its group index
    pub fn push_extensible_group(&mut self, values: Vec<String>) -> Result<usize> {
        let size = self.spec.group_size();
        if size == 0 {
            return Err(IdfError::other(format!(
                "record type '{}' has no extensible group",
                self.spec.name
            )));
        }
        if values.len() > size {
            return Err(IdfError::other(format!(
                "extensible group of '{}' holds {} fields, got {}",
                self.spec.name,
                size,
                values.len()
            )));
        }
        // Fixed part is padded so the group lands at its proper position.
        let group = self.num_extensible_groups();
        let start = self.spec.num_fixed_fields() + group * size;
        for (offset, value) in values.iter().enumerate() {
            self.check_writable(start + offset, value)?;
        }
        self.ensure_len(start);
        for value in values {
            self.push_raw(value, None);
        }
        self.ensure_len(start + size);
        Ok(group)
    }

    /// Drop all extensible groups
    pub fn clear_extensible_groups(&mut self) {
        let fixed = self.spec.num_fixed_fields();
        self.values.truncate(fixed);
        self.field_comments.truncate(fixed);
    }

    fn group_position(&self, group: usize, field: &str) -> Result<usize> {
        let within = self.spec.group_field_index(field)?;
        Ok(self.spec.num_fixed_fields() + group * self.spec.group_size() + within)
    }

    /// Non-blank value of a named field within a group
    pub fn extensible_value(&self, group: usize, field: &str) -> Result<Option<&str>> {
        let position = self.group_position(group, field)?;
        Ok(self.present(position))
    }

    pub fn set_extensible_value(
        &mut self,
        group: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let position = self.group_position(group, field)?;
        let value = value.into();
        self.check_writable(position, &value)?;
        self.set_raw(position, value);
        Ok(())
    }
}

fn canonical(spec: &FieldSpec, raw: &str) -> String {
    spec.canonical_choice(raw).unwrap_or(raw).to_string()
}

/// Parse raw numeric text, honoring the autosize/autocalculate sentinels
pub(crate) fn parse_numeric(
    record_type: &str,
    spec: &FieldSpec,
    raw: &str,
) -> Result<NumericValue> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case(AUTOSIZE) {
        return Ok(NumericValue::Autosize);
    }
    if raw.eq_ignore_ascii_case(AUTOCALCULATE) {
        return Ok(NumericValue::Autocalculate);
    }
    lexical_core::parse::<f64>(raw.as_bytes())
        .map(NumericValue::Value)
        .map_err(|_| IdfError::TypeCoercion {
            record_type: record_type.to_string(),
            field: spec.name.clone(),
            value: raw.to_string(),
            expected: if spec.value_type.is_numeric() {
                spec.value_type
            } else {
                FieldValueType::Double
            },
        })
}

fn unit_pair<'s>(record_type: &str, spec: &'s FieldSpec) -> Result<(&'s str, &'s str)> {
    let si = spec
        .si_unit
        .as_deref()
        .ok_or_else(|| no_conversion(record_type, spec))?;
    let ip = spec
        .ip_unit
        .as_deref()
        .or_else(|| units::default_ip_unit(si))
        .ok_or_else(|| no_conversion(record_type, spec))?;
    Ok((si, ip))
}

fn convert_to_ip(record_type: &str, spec: &FieldSpec, value: f64) -> Result<f64> {
    let (si, ip) = unit_pair(record_type, spec)?;
    units::convert(value, si, ip).ok_or_else(|| no_conversion(record_type, spec))
}

fn no_conversion(record_type: &str, spec: &FieldSpec) -> IdfError {
    IdfError::other(format!(
        "no IP conversion for field '{}' of '{}' ({})",
        spec.name,
        record_type,
        spec.si_unit.as_deref().unwrap_or("unitless")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExtensibleGroup, FieldSpec};

    fn district_cooling() -> Arc<RecordTypeSpec> {
        Arc::new(
            RecordTypeSpec::new(
                "DistrictCooling",
                vec![
                    FieldSpec::new("Name", 0, FieldValueType::String)
                        .required()
                        .with_reference("PlantEquipmentNames"),
                    FieldSpec::new(
                        "Chilled Water Inlet Node Name",
                        1,
                        FieldValueType::AlphaNumeric,
                    ),
                    FieldSpec::new(
                        "Chilled Water Outlet Node Name",
                        2,
                        FieldValueType::AlphaNumeric,
                    ),
                    FieldSpec::new("Nominal Capacity", 3, FieldValueType::Double)
                        .autosizable()
                        .with_units("W"),
                    FieldSpec::new("Fraction", 4, FieldValueType::Double).with_default("0.5"),
                    FieldSpec::new("Mode", 5, FieldValueType::Choice)
                        .with_choices(["Continuous", "Discrete"])
                        .with_default("continuous"),
                    FieldSpec::new("Multiplier", 6, FieldValueType::Integer).with_default("1"),
                ],
                None,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_blank_is_absent() {
        let record = RecordInstance::new(district_cooling());
        assert_eq!(record.get_double("Nominal Capacity").unwrap(), None);
        assert_eq!(record.get_string("Name").unwrap(), None);
        assert!(record.is_field_defaulted("Fraction").unwrap());
        assert_eq!(record.name(), None);
    }

    #[test]
    fn test_defaulting_precedence() {
        let mut record = RecordInstance::new(district_cooling());
        assert_eq!(record.get_double("Fraction").unwrap(), None);
        assert_eq!(record.get_double_or_default("Fraction").unwrap(), Some(0.5));

        record.set_double("Fraction", 0.75).unwrap();
        assert_eq!(record.get_double_or_default("Fraction").unwrap(), Some(0.75));
        assert!(!record.is_field_defaulted("Fraction").unwrap());

        record.reset("Fraction").unwrap();
        assert!(record.is_field_defaulted("Fraction").unwrap());
        assert_eq!(record.get_double_or_default("Fraction").unwrap(), Some(0.5));
    }

    #[test]
    fn test_autosize_tri_state() {
        let mut record = RecordInstance::new(district_cooling());
        record.set_autosize("Nominal Capacity").unwrap();
        assert_eq!(record.get_double("Nominal Capacity").unwrap(), None);
        assert!(record.is_autosized("Nominal Capacity").unwrap());
        assert_eq!(record.raw(3), Some("Autosize"));

        record.set_raw(3, "AUTOSIZE");
        assert_eq!(
            record.get_numeric("Nominal Capacity").unwrap(),
            NumericValue::Autosize
        );

        record.set_double("Nominal Capacity", 5000.0).unwrap();
        assert!(!record.is_autosized("Nominal Capacity").unwrap());
        assert_eq!(record.raw(3), Some("5000.0"));
    }

    #[test]
    fn test_non_numeric_is_coercion_error() {
        let mut record = RecordInstance::new(district_cooling());
        record.set_string("Nominal Capacity", "lots").unwrap();
        assert!(matches!(
            record.get_double("Nominal Capacity"),
            Err(IdfError::TypeCoercion { .. })
        ));
    }

    #[test]
    fn test_field_breaking_text_rejected() {
        let mut record = RecordInstance::new(district_cooling());
        for bad in ["Inlet; Loop 1", "A, B", "main ! note", "two\nlines", "cr\r"] {
            match record.set_string("Chilled Water Inlet Node Name", bad) {
                Err(IdfError::UnwritableValue { field, value, .. }) => {
                    assert_eq!(field, "Chilled Water Inlet Node Name");
                    assert_eq!(value, bad);
                }
                other => panic!("expected UnwritableValue, got {:?}", other),
            }
            assert!(record.set_name(bad).is_err());
        }
        assert_eq!(record.num_fields(), 0);

        record.set_string("Chilled Water Inlet Node Name", "Inlet-Loop 1 (main)").unwrap();
        assert_eq!(record.raw(1), Some("Inlet-Loop 1 (main)"));
        assert!(is_writable_text("Supply Side {W}"));
    }

    #[test]
    fn test_unknown_field_is_error() {
        let record = RecordInstance::new(district_cooling());
        assert!(matches!(
            record.get_double("Nominal Efficiency"),
            Err(IdfError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_choice_canonical_spelling() {
        let mut record = RecordInstance::new(district_cooling());
        assert_eq!(
            record.get_choice_or_default("Mode").unwrap(),
            Some("Continuous".to_string())
        );
        record.set_choice("Mode", "DISCRETE").unwrap();
        assert_eq!(record.get_choice("Mode").unwrap(), Some("Discrete".to_string()));
        record.set_choice("Mode", "Sometimes").unwrap();
        assert_eq!(record.get_choice("Mode").unwrap(), Some("Sometimes".to_string()));
    }

    #[test]
    fn test_integer_fields() {
        let mut record = RecordInstance::new(district_cooling());
        assert_eq!(record.get_int_or_default("Multiplier").unwrap(), Some(1));
        record.set_int("Multiplier", 3).unwrap();
        assert_eq!(record.raw(6), Some("3"));
        assert_eq!(record.get_int("Multiplier").unwrap(), Some(3));
    }

    #[test]
    fn test_set_pads_with_blanks() {
        let mut record = RecordInstance::new(district_cooling());
        record.set_double("Nominal Capacity", 10.0).unwrap();
        assert_eq!(record.num_fields(), 4);
        assert_eq!(record.raw(1), Some(""));
    }

    #[test]
    fn test_quantity_in_ip() {
        let mut record = RecordInstance::new(district_cooling());
        record.set_double("Nominal Capacity", 1000.0).unwrap();
        let btu = record
            .get_quantity("Nominal Capacity", UnitSystem::IP)
            .unwrap()
            .unwrap();
        assert!((btu - 3412.141633).abs() < 1e-6);

        record
            .set_quantity("Nominal Capacity", 3412.141633, UnitSystem::IP)
            .unwrap();
        let si = record.get_double("Nominal Capacity").unwrap().unwrap();
        assert!((si - 1000.0).abs() < 1e-6);

        record.set_double("Fraction", 0.2).unwrap();
        assert!(record.get_quantity("Fraction", UnitSystem::IP).is_err());
    }

    #[test]
    fn test_extensible_groups() {
        let spec = Arc::new(
            RecordTypeSpec::new(
                "NodeList",
                vec![FieldSpec::new("Name", 0, FieldValueType::String)],
                Some(ExtensibleGroup {
                    fields: vec![FieldSpec::new("Node Name", 0, FieldValueType::AlphaNumeric)],
                    min_repeats: 1,
                    max_repeats: None,
                }),
            )
            .unwrap(),
        );
        let mut record = RecordInstance::new(spec);
        assert_eq!(record.num_extensible_groups(), 0);
        assert_eq!(record.push_extensible_group(vec!["N1".into()]).unwrap(), 0);
        assert_eq!(record.push_extensible_group(vec!["N2".into()]).unwrap(), 1);
        assert_eq!(record.num_fields(), 3);
        assert_eq!(record.raw(0), Some(""));
        assert_eq!(record.extensible_value(1, "Node Name").unwrap(), Some("N2"));

        record.set_extensible_value(0, "Node Name", "N0").unwrap();
        assert_eq!(record.extensible_group(0).unwrap(), ["N0".to_string()]);

        record.clear_extensible_groups();
        assert_eq!(record.num_extensible_groups(), 0);
    }
}
