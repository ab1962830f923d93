// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schema registry: record types and their field specifications
//!
//! A [`SchemaRegistry`] is loaded once (usually from IDD text) and shared
//! read-only through `Arc` by every record built against it.

use crate::{FieldValueType, IdfError, NumericValue, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Normalize a field name for lookup
///
/// Case and punctuation are ignored, so `"Nominal Capacity"`,
/// `"nominal_capacity"` and `"NominalCapacity"` are the same field.
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Numeric limit from `\minimum` / `\maximum`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericBound {
    pub value: f64,
    /// `\minimum>` / `\maximum<`
    pub exclusive: bool,
}

impl NumericBound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: false,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: true,
        }
    }

    /// Check a value against this bound used as a minimum
    pub fn admits_above(&self, x: f64) -> bool {
        if self.exclusive {
            x > self.value
        } else {
            x >= self.value
        }
    }

    /// Check a value against this bound used as a maximum
    pub fn admits_below(&self, x: f64) -> bool {
        if self.exclusive {
            x < self.value
        } else {
            x <= self.value
        }
    }
}

/// Specification of one field of a record type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Position within the owning record type (or extensible group)
    pub index: usize,
    pub value_type: FieldValueType,
    pub required: bool,
    /// Default as raw field text, coerced on read
    pub default_value: Option<String>,
    /// Accepted keys for choice fields
    pub choices: Vec<String>,
    /// Reference classes this field may point at
    pub object_lists: Vec<String>,
    /// Reference classes this (name) field provides
    pub references: Vec<String>,
    /// Record types resolved from `object_lists`
    pub referenced_types: Vec<String>,
    pub si_unit: Option<String>,
    pub ip_unit: Option<String>,
    pub autosizable: bool,
    pub autocalculatable: bool,
    pub minimum: Option<NumericBound>,
    pub maximum: Option<NumericBound>,
    pub note: Option<String>,
}

impl FieldSpec {
    /// Create a field with no constraints
    pub fn new(name: impl Into<String>, index: usize, value_type: FieldValueType) -> Self {
        Self {
            name: name.into(),
            index,
            value_type,
            required: false,
            default_value: None,
            choices: Vec::new(),
            object_lists: Vec::new(),
            references: Vec::new(),
            referenced_types: Vec::new(),
            si_unit: None,
            ip_unit: None,
            autosizable: false,
            autocalculatable: false,
            minimum: None,
            maximum: None,
            note: None,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the accepted choice keys
    pub fn with_choices<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Add a reference class this field may point at
    pub fn with_object_list(mut self, class: impl Into<String>) -> Self {
        self.object_lists.push(class.into());
        self
    }

    /// Add a reference class this field provides
    pub fn with_reference(mut self, class: impl Into<String>) -> Self {
        self.references.push(class.into());
        self
    }

    /// Set the SI storage unit
    pub fn with_units(mut self, unit: impl Into<String>) -> Self {
        self.si_unit = Some(unit.into());
        self
    }

    pub fn autosizable(mut self) -> Self {
        self.autosizable = true;
        self
    }

    pub fn autocalculatable(mut self) -> Self {
        self.autocalculatable = true;
        self
    }

    pub fn with_minimum(mut self, bound: NumericBound) -> Self {
        self.minimum = Some(bound);
        self
    }

    pub fn with_maximum(mut self, bound: NumericBound) -> Self {
        self.maximum = Some(bound);
        self
    }

    /// Check if the field points at other records
    pub fn is_reference(&self) -> bool {
        self.value_type == FieldValueType::ObjectList || !self.object_lists.is_empty()
    }

    /// Find the canonical spelling of a choice key (case-insensitive)
    pub fn canonical_choice(&self, value: &str) -> Option<&str> {
        let value = value.trim();
        self.choices
            .iter()
            .find(|key| key.eq_ignore_ascii_case(value))
            .map(String::as_str)
    }

    /// Check if a sentinel numeric value is permitted by this field's flags
    pub fn accepts_sentinel(&self, value: NumericValue) -> bool {
        match value {
            NumericValue::Autosize => self.autosizable,
            NumericValue::Autocalculate => self.autocalculatable,
            _ => true,
        }
    }
}

/// Repeating tail of a record type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtensibleGroup {
    /// Fields of one repeat, indexed from zero
    pub fields: Vec<FieldSpec>,
    pub min_repeats: usize,
    pub max_repeats: Option<usize>,
}

impl ExtensibleGroup {
    pub fn size(&self) -> usize {
        self.fields.len()
    }
}

/// Specification of one record type
#[derive(Clone, Debug, Serialize)]
pub struct RecordTypeSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub extensible: Option<ExtensibleGroup>,
    /// At most one instance per collection
    pub unique: bool,
    /// At least one instance per collection
    pub required: bool,
    pub min_fields: usize,
    pub memo: Option<String>,
    #[serde(skip)]
    field_index: FxHashMap<String, usize>,
    #[serde(skip)]
    group_index: FxHashMap<String, usize>,
}

impl RecordTypeSpec {
    /// Create a record type, building its field-name index
    ///
    /// Field indices must equal their positions, both in the fixed part and
    /// within the extensible group.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldSpec>,
        extensible: Option<ExtensibleGroup>,
    ) -> Result<Self> {
        let name = name.into();
        let field_index = build_index(&name, &fields)?;
        let group_index = match &extensible {
            Some(group) => {
                if group.fields.is_empty() {
                    return Err(IdfError::schema_parse(
                        0,
                        format!("{}: extensible group has no fields", name),
                    ));
                }
                if let Some(max) = group.max_repeats {
                    if group.min_repeats > max {
                        return Err(IdfError::schema_parse(
                            0,
                            format!(
                                "{}: extensible group needs {} repeats but allows {}",
                                name, group.min_repeats, max
                            ),
                        ));
                    }
                }
                build_index(&name, &group.fields)?
            }
            None => FxHashMap::default(),
        };

        Ok(Self {
            name,
            fields,
            extensible,
            unique: false,
            required: false,
            min_fields: 0,
            memo: None,
            field_index,
            group_index,
        })
    }

    /// Number of fields before the extensible tail
    pub fn num_fixed_fields(&self) -> usize {
        self.fields.len()
    }

    /// Number of fields per extensible group (0 if not extensible)
    pub fn group_size(&self) -> usize {
        self.extensible.as_ref().map(ExtensibleGroup::size).unwrap_or(0)
    }

    /// Maximum number of stored fields, if bounded
    pub fn max_fields(&self) -> Option<usize> {
        match &self.extensible {
            None => Some(self.fields.len()),
            Some(group) => group
                .max_repeats
                .map(|repeats| self.fields.len() + repeats * group.size()),
        }
    }

    /// Index of a fixed field by name
    pub fn field_index(&self, name: &str) -> Result<usize> {
        self.field_index
            .get(&normalize_field_name(name))
            .copied()
            .ok_or_else(|| IdfError::unknown_field(&self.name, name))
    }

    /// Index of a field within the extensible group by name
    pub fn group_field_index(&self, name: &str) -> Result<usize> {
        self.group_index
            .get(&normalize_field_name(name))
            .copied()
            .ok_or_else(|| IdfError::unknown_field(&self.name, name))
    }

    /// Fixed field by index
    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    /// Fixed field by name
    pub fn field_named(&self, name: &str) -> Result<&FieldSpec> {
        let index = self.field_index(name)?;
        Ok(&self.fields[index])
    }

    /// Field specification at a flat position (fixed or extensible)
    pub fn spec_at(&self, position: usize) -> Option<&FieldSpec> {
        if position < self.fields.len() {
            return self.fields.get(position);
        }
        let group = self.extensible.as_ref()?;
        group.fields.get((position - self.fields.len()) % group.size())
    }

    /// The field holding the record's name, if the type has one
    pub fn name_field(&self) -> Option<&FieldSpec> {
        let first = self.fields.first()?;
        let textual = matches!(
            first.value_type,
            FieldValueType::String | FieldValueType::AlphaNumeric
        );
        let named = normalize_field_name(&first.name).ends_with("name");
        if textual && (!first.references.is_empty() || named) {
            Some(first)
        } else {
            None
        }
    }

    /// Reference classes provided by this type's name field
    pub fn reference_classes(&self) -> &[String] {
        self.name_field()
            .map(|field| field.references.as_slice())
            .unwrap_or(&[])
    }
}

fn build_index(owner: &str, fields: &[FieldSpec]) -> Result<FxHashMap<String, usize>> {
    let mut index = FxHashMap::default();
    for (position, field) in fields.iter().enumerate() {
        if field.index != position {
            return Err(IdfError::schema_parse(
                0,
                format!(
                    "{}: field '{}' declared at index {} but found at position {}",
                    owner, field.name, field.index, position
                ),
            ));
        }
        // First spelling wins; later duplicates stay reachable by index.
        index.entry(normalize_field_name(&field.name)).or_insert(position);
    }
    Ok(index)
}

/// Registry of all record types of a schema
#[derive(Clone, Debug, Default, Serialize)]
pub struct SchemaRegistry {
    version: Option<String>,
    types: Vec<Arc<RecordTypeSpec>>,
    #[serde(skip)]
    by_name: FxHashMap<String, usize>,
    #[serde(skip)]
    reference_classes: FxHashMap<String, Vec<String>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from record types, resolving object-list classes
    pub fn from_types(version: Option<String>, mut types: Vec<RecordTypeSpec>) -> Result<Self> {
        let mut reference_classes: FxHashMap<String, Vec<String>> = FxHashMap::default();
        for spec in &types {
            for class in spec.reference_classes() {
                reference_classes
                    .entry(class.to_ascii_lowercase())
                    .or_default()
                    .push(spec.name.clone());
            }
        }

        for spec in &mut types {
            let group_fields = spec
                .extensible
                .as_mut()
                .map(|group| group.fields.iter_mut())
                .into_iter()
                .flatten();
            for field in spec.fields.iter_mut().chain(group_fields) {
                for class in &field.object_lists {
                    match reference_classes.get(&class.to_ascii_lowercase()) {
                        Some(names) => {
                            for name in names {
                                if !field.referenced_types.contains(name) {
                                    field.referenced_types.push(name.clone());
                                }
                            }
                        }
                        None => log::debug!(
                            "Reference class '{}' of {}.{} has no providers",
                            class,
                            spec.name,
                            field.name
                        ),
                    }
                }
            }
        }

        let mut registry = SchemaRegistry {
            version,
            types: Vec::with_capacity(types.len()),
            by_name: FxHashMap::default(),
            reference_classes,
        };
        for spec in types {
            let key = spec.name.to_ascii_uppercase();
            if registry.by_name.contains_key(&key) {
                return Err(IdfError::schema_parse(
                    0,
                    format!("duplicate record type '{}'", spec.name),
                ));
            }
            registry.by_name.insert(key, registry.types.len());
            registry.types.push(Arc::new(spec));
        }
        Ok(registry)
    }

    /// IDD version this schema was loaded from
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Look up a record type (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Arc<RecordTypeSpec>> {
        self.by_name
            .get(&name.trim().to_ascii_uppercase())
            .map(|&i| &self.types[i])
    }

    /// Look up a record type, failing with `UnknownType`
    pub fn record_type(&self, name: &str) -> Result<Arc<RecordTypeSpec>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| IdfError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Index of a field within a record type
    pub fn field_index(&self, type_name: &str, field_name: &str) -> Result<usize> {
        self.record_type(type_name)?.field_index(field_name)
    }

    /// Record types providing a reference class
    pub fn types_for_class(&self, class: &str) -> &[String] {
        self.reference_classes
            .get(&class.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All record types in load order
    pub fn types(&self) -> impl Iterator<Item = &Arc<RecordTypeSpec>> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
