// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Strictness-level validation of records and collections
//!
//! Validation is a query: it never changes the data it inspects. Each level
//! adds checks to the previous one:
//!
//! - `Minimal`: field count, extensible group shape and field text that
//!   would break the IDF layout
//! - `Draft`: numeric and choice coercion, name conflicts
//! - `Final`: required fields, reference resolution, numeric bounds,
//!   required and unique record types
//!
//! Below `Final` every finding is a warning.

use crate::record::{is_writable_text, parse_numeric};
use crate::{
    collection::same_family, FieldSpec, FieldValueType, Handle, IdfError, NumericValue,
    RecordCollection, RecordInstance, RecordResolver, Strictness,
};
use serde::Serialize;
use std::fmt;

/// Category of a validation finding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    FieldCount,
    ExtensibleGroup,
    UnwritableValue,
    TypeCoercion,
    InvalidChoice,
    NameConflict,
    RequiredField,
    DanglingReference,
    OutOfRange,
    RequiredObjectMissing,
    DuplicateUniqueObject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// One validation finding
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub record: Option<Handle>,
    pub record_type: String,
    pub field: Option<String>,
    /// Offending raw value, when there is one
    pub value: Option<String>,
    pub message: String,
}

impl Violation {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Convert to the matching error type
    pub fn to_error(&self) -> IdfError {
        let field = self.field.clone().unwrap_or_default();
        match self.kind {
            ViolationKind::RequiredField => IdfError::RequiredField {
                record_type: self.record_type.clone(),
                field,
            },
            ViolationKind::DanglingReference => IdfError::DanglingReference {
                record_type: self.record_type.clone(),
                field,
                target: self.value.clone().unwrap_or_default(),
            },
            ViolationKind::UnwritableValue => IdfError::UnwritableValue {
                record_type: self.record_type.clone(),
                field,
                value: self.value.clone().unwrap_or_default(),
            },
            ViolationKind::DuplicateUniqueObject => {
                IdfError::DuplicateUniqueObject(self.record_type.clone())
            }
            _ => IdfError::other(self.to_string()),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in {}", self.kind, self.record_type)?;
        if let Some(field) = &self.field {
            write!(f, ".{}", field)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Collected findings of one validation pass
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// No findings of error severity
    pub fn is_valid(&self) -> bool {
        !self.violations.iter().any(Violation::is_error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_error())
    }

    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

fn severity(kind: ViolationKind, strictness: Strictness, field_required: bool) -> Severity {
    if strictness < Strictness::Final {
        return Severity::Warning;
    }
    match kind {
        ViolationKind::DanglingReference if !field_required => Severity::Warning,
        ViolationKind::NameConflict
        | ViolationKind::FieldCount
        | ViolationKind::ExtensibleGroup => Severity::Warning,
        _ => Severity::Error,
    }
}

struct Findings<'a> {
    record: &'a RecordInstance,
    strictness: Strictness,
    report: ValidationReport,
}

impl<'a> Findings<'a> {
    fn add(
        &mut self,
        kind: ViolationKind,
        field: Option<&FieldSpec>,
        value: Option<&str>,
        message: String,
    ) {
        let required = field.is_some_and(|f| f.required);
        self.report.push(Violation {
            kind,
            severity: severity(kind, self.strictness, required),
            record: Some(self.record.handle()),
            record_type: self.record.type_name().to_string(),
            field: field.map(|f| f.name.clone()),
            value: value.map(str::to_string),
            message,
        });
    }
}

/// Validate one record against its type
pub fn validate_record(
    record: &RecordInstance,
    resolver: &dyn RecordResolver,
    strictness: Strictness,
) -> ValidationReport {
    let mut findings = Findings {
        record,
        strictness,
        report: ValidationReport::new(),
    };
    if strictness == Strictness::None {
        return findings.report;
    }

    check_shape(&mut findings);
    if strictness >= Strictness::Draft {
        check_values(&mut findings);
    }
    if strictness >= Strictness::Final {
        check_required(&mut findings);
        check_references(&mut findings, resolver);
    }
    findings.report
}

fn check_shape(findings: &mut Findings<'_>) {
    let record = findings.record;
    let spec = record.spec();
    let count = record.num_fields();
    if let Some(max) = spec.max_fields() {
        if count > max {
            findings.add(
                ViolationKind::FieldCount,
                None,
                None,
                format!("{} fields stored, at most {} allowed", count, max),
            );
        }
    }
    if let Some(group) = &spec.extensible {
        let tail = count.saturating_sub(spec.num_fixed_fields());
        if tail % group.size() != 0 {
            findings.add(
                ViolationKind::ExtensibleGroup,
                None,
                None,
                format!(
                    "last extensible group is incomplete ({} of {} fields)",
                    tail % group.size(),
                    group.size()
                ),
            );
        }
        let groups = record.num_extensible_groups();
        if groups < group.min_repeats {
            findings.add(
                ViolationKind::ExtensibleGroup,
                None,
                None,
                format!("{} extensible groups, at least {} required", groups, group.min_repeats),
            );
        }
    }
    for (position, raw) in record.values().iter().enumerate() {
        if !is_writable_text(raw) {
            findings.add(
                ViolationKind::UnwritableValue,
                spec.spec_at(position),
                Some(raw),
                format!("field {} holds a separator, comment marker or line break", position + 1),
            );
        }
    }
}

fn check_values(findings: &mut Findings<'_>) {
    let record = findings.record;
    let spec = record.spec();
    for (position, raw) in record.values().iter().enumerate() {
        let raw = raw.trim();
        let Some(field) = spec.spec_at(position) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        match field.value_type {
            FieldValueType::Double | FieldValueType::Integer => {
                check_numeric(findings, field, raw);
            }
            FieldValueType::Choice => {
                if !field.choices.is_empty() && field.canonical_choice(raw).is_none() {
                    findings.add(
                        ViolationKind::InvalidChoice,
                        Some(field),
                        Some(raw),
                        format!("'{}' is not one of {}", raw, field.choices.join(", ")),
                    );
                }
            }
            _ => {}
        }
    }
}

fn check_numeric(findings: &mut Findings<'_>, field: &FieldSpec, raw: &str) {
    let record_type = findings.record.type_name().to_string();
    let value = match parse_numeric(&record_type, field, raw) {
        Ok(value) => value,
        Err(e) => {
            findings.add(ViolationKind::TypeCoercion, Some(field), Some(raw), e.to_string());
            return;
        }
    };
    if !field.accepts_sentinel(value) {
        findings.add(
            ViolationKind::TypeCoercion,
            Some(field),
            Some(raw),
            format!("'{}' is not allowed for this field", raw),
        );
        return;
    }
    let NumericValue::Value(x) = value else {
        return;
    };
    if field.value_type == FieldValueType::Integer && x.fract() != 0.0 {
        findings.add(
            ViolationKind::TypeCoercion,
            Some(field),
            Some(raw),
            format!("'{}' is not an integer", raw),
        );
    }
    if findings.strictness < Strictness::Final {
        return;
    }
    let below = field.minimum.is_some_and(|min| !min.admits_above(x));
    let above = field.maximum.is_some_and(|max| !max.admits_below(x));
    if below || above {
        findings.add(
            ViolationKind::OutOfRange,
            Some(field),
            Some(raw),
            format!("{} is outside the allowed range", x),
        );
    }
}

fn check_required(findings: &mut Findings<'_>) {
    let record = findings.record;
    let spec = record.spec();
    for field in spec.fields.iter().filter(|f| f.required) {
        let present = record
            .raw(field.index)
            .is_some_and(|raw| !raw.trim().is_empty());
        let defaulted = field
            .default_value
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());
        if !present && !defaulted {
            findings.add(
                ViolationKind::RequiredField,
                Some(field),
                None,
                "no value and no default".to_string(),
            );
        }
    }
    if let Some(group) = &spec.extensible {
        for g in 0..record.num_extensible_groups() {
            let Some(values) = record.extensible_group(g) else {
                continue;
            };
            for field in group.fields.iter().filter(|f| f.required) {
                let present = values
                    .get(field.index)
                    .is_some_and(|raw| !raw.trim().is_empty());
                if !present && field.default_value.is_none() {
                    findings.add(
                        ViolationKind::RequiredField,
                        Some(field),
                        None,
                        format!("no value in extensible group {}", g + 1),
                    );
                }
            }
        }
    }
}

fn check_references(findings: &mut Findings<'_>, resolver: &dyn RecordResolver) {
    let record = findings.record;
    let spec = record.spec();
    for (position, raw) in record.values().iter().enumerate() {
        let raw = raw.trim();
        let Some(field) = spec.spec_at(position) else {
            continue;
        };
        if raw.is_empty() || !field.is_reference() {
            continue;
        }
        if resolver.resolve_text(field, raw).is_none() {
            findings.add(
                ViolationKind::DanglingReference,
                Some(field),
                Some(raw),
                format!("'{}' does not name an existing object", raw),
            );
        }
    }
}

/// Validate a whole collection
pub fn validate_collection(
    collection: &RecordCollection,
    strictness: Strictness,
) -> ValidationReport {
    let mut report = ValidationReport::new();
    if strictness == Strictness::None {
        return report;
    }

    let records: Vec<&RecordInstance> = collection.iter().collect();
    for record in &records {
        report.extend(validate_record(record, collection, strictness));
    }

    if strictness >= Strictness::Draft {
        for (i, record) in records.iter().enumerate() {
            let Some(name) = record.name() else {
                continue;
            };
            let clash = records[..i].iter().find(|earlier| {
                same_family(earlier.spec(), record.spec())
                    && earlier.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
            });
            if let Some(earlier) = clash {
                report.push(Violation {
                    kind: ViolationKind::NameConflict,
                    severity: severity(ViolationKind::NameConflict, strictness, false),
                    record: Some(record.handle()),
                    record_type: record.type_name().to_string(),
                    field: record.spec().name_field().map(|f| f.name.clone()),
                    value: Some(name.to_string()),
                    message: format!(
                        "name already used by {} {}",
                        earlier.type_name(),
                        earlier.handle()
                    ),
                });
            }
        }
    }

    if strictness >= Strictness::Final {
        for spec in collection.schema().types() {
            let count = collection.records_of_type(&spec.name).len();
            let kind = if spec.required && count == 0 {
                ViolationKind::RequiredObjectMissing
            } else if spec.unique && count > 1 {
                ViolationKind::DuplicateUniqueObject
            } else {
                continue;
            };
            report.push(Violation {
                kind,
                severity: severity(kind, strictness, false),
                record: None,
                record_type: spec.name.clone(),
                field: None,
                value: None,
                message: format!("{} instances present", count),
            });
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExtensibleGroup, NumericBound, RecordTypeSpec, SchemaRegistry};
    use std::sync::Arc;

    fn schema() -> Arc<SchemaRegistry> {
        let zone = RecordTypeSpec::new(
            "Zone",
            vec![
                FieldSpec::new("Name", 0, FieldValueType::String)
                    .required()
                    .with_reference("ZoneNames"),
                FieldSpec::new("Multiplier", 1, FieldValueType::Integer)
                    .with_default("1")
                    .with_minimum(NumericBound::inclusive(1.0)),
                FieldSpec::new("Ceiling Height", 2, FieldValueType::Double).autocalculatable(),
                FieldSpec::new("Type", 3, FieldValueType::Choice)
                    .with_choices(["Office", "Retail"]),
            ],
            None,
        )
        .unwrap();
        let load = RecordTypeSpec::new(
            "Load",
            vec![
                FieldSpec::new("Name", 0, FieldValueType::String),
                FieldSpec::new("Zone Name", 1, FieldValueType::ObjectList)
                    .required()
                    .with_object_list("ZoneNames"),
                FieldSpec::new("Design Level", 2, FieldValueType::Double).required(),
            ],
            None,
        )
        .unwrap();
        let list = RecordTypeSpec::new(
            "ZoneList",
            vec![FieldSpec::new("Name", 0, FieldValueType::String)],
            Some(ExtensibleGroup {
                fields: vec![
                    FieldSpec::new("Zone Name", 0, FieldValueType::ObjectList)
                        .with_object_list("ZoneNames"),
                    FieldSpec::new("Weight", 1, FieldValueType::Double),
                ],
                min_repeats: 1,
                max_repeats: Some(2),
            }),
        )
        .unwrap();
        let mut building = RecordTypeSpec::new(
            "Building",
            vec![FieldSpec::new("Name", 0, FieldValueType::String)],
            None,
        )
        .unwrap();
        building.required = true;
        building.unique = true;
        Arc::new(SchemaRegistry::from_types(None, vec![zone, load, list, building]).unwrap())
    }

    fn record(collection: &RecordCollection, type_name: &str, values: &[&str]) -> RecordInstance {
        let spec = collection.schema().record_type(type_name).unwrap();
        RecordInstance::from_values(spec, values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_none_reports_nothing() {
        let collection = RecordCollection::new(schema());
        let zone = record(&collection, "Zone", &["Z", "x", "y", "z", "w"]);
        assert!(validate_record(&zone, &collection, Strictness::None).is_empty());
    }

    #[test]
    fn test_minimal_checks_shape_only() {
        let collection = RecordCollection::new(schema());
        let zone = record(&collection, "Zone", &["Z", "abc", "", "", "extra"]);
        let report = validate_record(&zone, &collection, Strictness::Minimal);
        assert_eq!(report.len(), 1);
        assert_eq!(report.iter().next().unwrap().kind, ViolationKind::FieldCount);
    }

    #[test]
    fn test_minimal_flags_field_breaking_text() {
        let collection = RecordCollection::new(schema());
        let zone = record(&collection, "Zone", &["Core; East", "1"]);

        let report = validate_record(&zone, &collection, Strictness::Minimal);
        let found: Vec<_> = report.of_kind(ViolationKind::UnwritableValue).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field.as_deref(), Some("Name"));
        assert!(!found[0].is_error());

        let report = validate_record(&zone, &collection, Strictness::Final);
        let found: Vec<_> = report.of_kind(ViolationKind::UnwritableValue).collect();
        assert!(found[0].is_error());
        assert!(matches!(
            found[0].to_error(),
            IdfError::UnwritableValue { ref value, .. } if value == "Core; East"
        ));
    }

    #[test]
    fn test_extensible_shape() {
        let collection = RecordCollection::new(schema());
        let empty = record(&collection, "ZoneList", &["L"]);
        let partial = record(&collection, "ZoneList", &["L", "Z1", "1.0", "Z2"]);
        let too_many = record(&collection, "ZoneList", &["L", "A", "1", "B", "1", "C", "1"]);
        for (list, kind) in [
            (&empty, ViolationKind::ExtensibleGroup),
            (&partial, ViolationKind::ExtensibleGroup),
            (&too_many, ViolationKind::FieldCount),
        ] {
            let report = validate_record(list, &collection, Strictness::Minimal);
            assert_eq!(report.of_kind(kind).count(), 1, "{:?}", report);
        }
    }

    #[test]
    fn test_draft_checks_coercion_and_choices() {
        let collection = RecordCollection::new(schema());
        let zone = record(&collection, "Zone", &["Z", "2.5", "Autosize", "Warehouse"]);
        let report = validate_record(&zone, &collection, Strictness::Draft);
        assert_eq!(report.of_kind(ViolationKind::TypeCoercion).count(), 2);
        assert_eq!(report.of_kind(ViolationKind::InvalidChoice).count(), 1);
        assert!(report.is_valid());

        let ok = record(&collection, "Zone", &["Z", "2", "autocalculate", "office"]);
        assert!(validate_record(&ok, &collection, Strictness::Draft).is_empty());
    }

    #[test]
    fn test_final_required_and_references() {
        let mut collection = RecordCollection::new(schema());
        let load = record(&collection, "Load", &["L", "Nowhere"]);
        let report = validate_record(&load, &collection, Strictness::Final);
        let required: Vec<_> = report.of_kind(ViolationKind::RequiredField).collect();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].field.as_deref(), Some("Design Level"));
        assert!(required[0].is_error());

        let dangling: Vec<_> = report.of_kind(ViolationKind::DanglingReference).collect();
        assert_eq!(dangling.len(), 1);
        assert!(dangling[0].is_error());
        assert!(matches!(
            dangling[0].to_error(),
            IdfError::DanglingReference { .. }
        ));

        collection
            .insert(record(&collection, "Zone", &["Nowhere"]))
            .unwrap();
        let report = validate_record(&load, &collection, Strictness::Final);
        assert_eq!(report.of_kind(ViolationKind::DanglingReference).count(), 0);

        let report = validate_record(&load, &collection, Strictness::Draft);
        assert!(report.is_empty());
    }

    #[test]
    fn test_final_numeric_bounds() {
        let collection = RecordCollection::new(schema());
        let zone = record(&collection, "Zone", &["Z", "0"]);
        assert_eq!(
            validate_record(&zone, &collection, Strictness::Draft).len(),
            0
        );
        let report = validate_record(&zone, &collection, Strictness::Final);
        assert_eq!(report.of_kind(ViolationKind::OutOfRange).count(), 1);
    }

    #[test]
    fn test_collection_level_checks() {
        let mut collection = RecordCollection::new(schema());
        collection
            .insert(record(&collection, "Zone", &["Core"]))
            .unwrap();
        collection
            .insert(record(&collection, "Zone", &["core"]))
            .unwrap();

        let draft = collection.validate(Strictness::Draft);
        assert_eq!(draft.of_kind(ViolationKind::NameConflict).count(), 1);
        assert_eq!(draft.of_kind(ViolationKind::RequiredObjectMissing).count(), 0);

        let report = collection.validate(Strictness::Final);
        assert_eq!(report.of_kind(ViolationKind::RequiredObjectMissing).count(), 1);
        assert!(!report.is_valid());

        collection
            .insert(record(&collection, "Building", &["HQ"]))
            .unwrap();
        let report = collection.validate(Strictness::Final);
        assert!(report.is_valid(), "{:?}", report);
    }
}
