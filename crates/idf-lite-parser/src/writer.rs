// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDF text writer
//!
//! Output layout:
//!
//! ```text
//! ! record comment
//! DistrictCooling,
//!   DC1,                                   !- Name
//!   5000.0;                                !- Nominal Capacity {W}
//! ```
//!
//! Records are separated by a blank line. Field comments start after the
//! value padded to a fixed column.

use idf_lite_model::{RecordCollection, RecordInstance, RecordWriter};

/// Width reserved for `value,` before a field comment
const PRINTED_FIELD_SPACE: usize = 38;

/// Which field comments to print
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FieldComments {
    /// Comments stored on the record (from parsing or set explicitly)
    #[default]
    Stored,
    /// Field name and SI unit from the schema, e.g. `!- Nominal Capacity {W}`
    Generated,
    /// No field comments
    Omit,
}

/// Serializes records as IDF text
#[derive(Clone, Debug, Default)]
pub struct IdfWriter {
    field_comments: FieldComments,
}

impl IdfWriter {
    /// Create a writer printing stored comments
    pub fn new() -> Self {
        Self::default()
    }

    /// Set which field comments to print
    pub fn with_field_comments(mut self, mode: FieldComments) -> Self {
        self.field_comments = mode;
        self
    }

    fn comment_for(&self, record: &RecordInstance, position: usize) -> Option<String> {
        match self.field_comments {
            FieldComments::Omit => None,
            FieldComments::Stored => record.field_comment(position).map(str::to_string),
            FieldComments::Generated => record.spec().spec_at(position).map(|spec| {
                match &spec.si_unit {
                    Some(unit) => format!("{} {{{}}}", spec.name, unit),
                    None => spec.name.clone(),
                }
            }),
        }
    }

    /// Append one record to `out`
    pub fn write_record(&self, record: &RecordInstance, out: &mut String) {
        if let Some(comment) = record.comment() {
            for line in comment.lines() {
                if line.trim_start().starts_with('!') {
                    out.push_str(line);
                } else {
                    out.push_str("! ");
                    out.push_str(line);
                }
                out.push('\n');
            }
        }

        let values = record.values();
        out.push_str(record.type_name());
        if values.is_empty() {
            out.push_str(";\n");
            return;
        }
        out.push_str(",\n");

        for (position, value) in values.iter().enumerate() {
            let terminator = if position + 1 == values.len() { ';' } else { ',' };
            out.push_str(&format!("  {}{}", value, terminator));
            if let Some(comment) = self.comment_for(record, position) {
                let used = value.chars().count();
                let padding = PRINTED_FIELD_SPACE.saturating_sub(used);
                out.push_str(&format!("{:width$} !- {}", "", comment, width = padding));
            }
            out.push('\n');
        }
    }

    /// Render a single record
    pub fn record_to_string(&self, record: &RecordInstance) -> String {
        let mut out = String::new();
        self.write_record(record, &mut out);
        out
    }

    /// Render a collection, records in insertion order
    pub fn write_collection(&self, collection: &RecordCollection) -> String {
        let mut out = String::new();
        for record in collection.iter() {
            self.write_record(record, &mut out);
            out.push('\n');
        }
        out
    }
}

impl RecordWriter for IdfWriter {
    fn write(&self, collection: &RecordCollection) -> String {
        self.write_collection(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idf_lite_model::{FieldSpec, FieldValueType, RecordTypeSpec, SchemaRegistry};
    use std::sync::Arc;

    fn district_cooling() -> Arc<RecordTypeSpec> {
        let schema = SchemaRegistry::from_types(
            None,
            vec![RecordTypeSpec::new(
                "DistrictCooling",
                vec![
                    FieldSpec::new("Name", 0, FieldValueType::String),
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
                ],
                None,
            )
            .unwrap()],
        )
        .unwrap();
        schema.record_type("DistrictCooling").unwrap()
    }

    fn record() -> RecordInstance {
        let mut record = RecordInstance::new(district_cooling());
        record.set_name("DC1").unwrap();
        record.set_string("Chilled Water Inlet Node Name", "N1").unwrap();
        record.set_string("Chilled Water Outlet Node Name", "N2").unwrap();
        record.set_double("Nominal Capacity", 5000.0).unwrap();
        record
    }

    #[test]
    fn test_plain_layout() {
        let text = IdfWriter::new().record_to_string(&record());
        assert_eq!(text, "DistrictCooling,\n  DC1,\n  N1,\n  N2,\n  5000.0;\n");
    }

    #[test]
    fn test_generated_comments_are_padded() {
        let text = IdfWriter::new()
            .with_field_comments(FieldComments::Generated)
            .record_to_string(&record());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], format!("  DC1,{} !- Name", " ".repeat(35)));
        assert!(lines[4].starts_with("  5000.0;"));
        assert!(lines[4].ends_with(" !- Nominal Capacity {W}"));
        assert_eq!(lines[4].find('!'), Some(42));
    }

    #[test]
    fn test_record_comment_and_empty_record() {
        let mut rec = record();
        rec.set_comment(Some("Plant loop supply\n! second".to_string()));
        let text = IdfWriter::new().record_to_string(&rec);
        assert!(text.starts_with("! Plant loop supply\n! second\nDistrictCooling,\n"));

        let empty = RecordInstance::new(district_cooling());
        assert_eq!(IdfWriter::new().record_to_string(&empty), "DistrictCooling;\n");
    }
}
