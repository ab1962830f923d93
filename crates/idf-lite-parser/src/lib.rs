// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDF-Lite Parser - IDD schema loader and IDF reader/writer
//!
//! This crate reads input data dictionaries into a [`SchemaRegistry`] and
//! reads and writes IDF text against that schema. The airflow zones of a
//! collection can also be written as a CONTAM project ([`PrjWriter`]). It
//! implements the `RecordReader` and `RecordWriter` traits defined in
//! `idf-lite-model`.
//!
//! # Features
//!
//! - **SIMD-accelerated record scanning** using `memchr`
//! - **Field tokenization** using `nom` combinators
//! - **Comment preservation** for record and field comments
//! - **Bundled schema** covering the record types the translators use
//! - **Progress reporting** for large files
//! - **CONTAM PRJ output** for airflow zones and envelope paths
//!
//! # Example
//!
//! ```ignore
//! use idf_lite_parser::{bundled_schema, IdfParser, IdfWriter};
//! use idf_lite_model::RecordReader;
//!
//! let parser = IdfParser::new(bundled_schema()?);
//! let collection = parser.read(idf_content)?;
//! println!("Read {} records", collection.len());
//!
//! let text = IdfWriter::new().write_collection(&collection);
//! ```

mod idd;
mod prj;
mod scanner;
mod tokenizer;
mod writer;

pub use idd::parse_idd;
pub use prj::{PrjLevel, PrjNetwork, PrjPath, PrjWriter, PrjZone};
pub use scanner::{RawRecord, RecordScanner};
pub use tokenizer::{parse_record, ParsedRecord, RawField};
pub use writer::{FieldComments, IdfWriter};

use idf_lite_model::{
    IdfError, ProgressCallback, RecordCollection, RecordInstance, RecordReader, Result,
    SchemaRegistry,
};
use std::path::Path;
use std::sync::Arc;

/// Dictionary shipped with the crate
const BUNDLED_IDD: &str = include_str!("../resources/energyplus_subset.idd");

/// Load the bundled dictionary
pub fn bundled_schema() -> Result<Arc<SchemaRegistry>> {
    parse_idd(BUNDLED_IDD).map(Arc::new)
}

/// Load a dictionary from disk
pub fn load_schema_file(path: impl AsRef<Path>) -> Result<Arc<SchemaRegistry>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_idd(&content).map(Arc::new)
}

/// Render a schema as pretty-printed JSON
pub fn schema_to_json(schema: &SchemaRegistry) -> Result<String> {
    serde_json::to_string_pretty(schema).map_err(|e| IdfError::other(e.to_string()))
}

/// IDF reader bound to one schema
///
/// Unknown record types and a second instance of a unique type abort the
/// read. Field values are kept as written; typed checks are left to
/// validation.
#[derive(Clone, Debug)]
pub struct IdfParser {
    schema: Arc<SchemaRegistry>,
}

impl IdfParser {
    /// Create a parser for `schema`
    pub fn new(schema: Arc<SchemaRegistry>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<SchemaRegistry> {
        &self.schema
    }

    fn parse_records(
        &self,
        content: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<RecordCollection> {
        let mut collection = RecordCollection::new(Arc::clone(&self.schema));
        let total = content.len().max(1) as f32;
        let mut last_reported = 0.0f32;

        for raw in RecordScanner::new(content) {
            let parsed = parse_record(raw.text, raw.line)?;
            let spec = self.schema.record_type(parsed.type_name).map_err(|_| {
                IdfError::syntax(
                    parsed.line,
                    format!("unknown record type '{}'", parsed.type_name),
                )
            })?;

            let mut record = RecordInstance::new(spec);
            record.set_comment(parsed.comment());
            for field in &parsed.fields {
                record.push_raw(field.value, field.comment.map(str::to_string));
            }
            collection.insert(record)?;

            if let Some(callback) = on_progress {
                let percent = raw.end as f32 / total * 100.0;
                if percent - last_reported >= 5.0 {
                    callback("Parsing records", percent);
                    last_reported = percent;
                }
            }
        }

        log::debug!("Parsed {} records", collection.len());
        Ok(collection)
    }
}

impl RecordReader for IdfParser {
    fn read(&self, content: &str) -> Result<RecordCollection> {
        self.parse_records(content, None)
    }

    fn read_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<RecordCollection> {
        on_progress("Scanning", 0.0);
        let collection = self.parse_records(content, Some(&on_progress))?;
        on_progress("Done", 100.0);
        Ok(collection)
    }
}

/// Quick parse function for simple use cases
pub fn parse(content: &str, schema: Arc<SchemaRegistry>) -> Result<RecordCollection> {
    IdfParser::new(schema).read(content)
}

/// Parse with progress reporting
pub fn parse_with_progress(
    content: &str,
    schema: Arc<SchemaRegistry>,
    on_progress: impl Fn(&str, f32) + Send + 'static,
) -> Result<RecordCollection> {
    IdfParser::new(schema).read_with_progress(content, Box::new(on_progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use idf_lite_model::{RecordWriter, Strictness, ViolationKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEST_IDF: &str = r#"! Plant supply side
Version,9.6;

Node,
  Chilled Water Inlet,     !- Name
  ;                        !- Setpoint Manager Name

Node,
  Chilled Water Outlet;    !- Name

DistrictCooling,
  Purchased Cooling,       !- Name
  Chilled Water Inlet,     !- Chilled Water Inlet Node Name
  Chilled Water Outlet,    !- Chilled Water Outlet Node Name
  Autosize;                !- Nominal Capacity {W}
"#;

    fn parser() -> IdfParser {
        IdfParser::new(bundled_schema().unwrap())
    }

    #[test]
    fn test_bundled_schema_loads() {
        let schema = bundled_schema().unwrap();
        assert_eq!(schema.version(), Some("9.6.0"));
        for name in [
            "Version",
            "ScheduleTypeLimits",
            "Schedule:Constant",
            "Zone",
            "SteamEquipment",
            "HotWaterEquipment",
            "Node",
            "NodeList",
            "SetpointManager:Scheduled",
            "DistrictCooling",
            "DistrictHeating",
        ] {
            assert!(schema.contains(name), "missing {}", name);
        }
        assert_eq!(schema.types_for_class("NodeNames"), &["Node".to_string()]);
        let zone = schema.record_type("Zone").unwrap();
        assert_eq!(zone.field_named("Floor Area").unwrap().si_unit.as_deref(), Some("m2"));
    }

    #[test]
    fn test_read_records() {
        let collection = parser().read(TEST_IDF).unwrap();
        assert_eq!(collection.len(), 4);

        let version = collection.iter().next().unwrap();
        assert_eq!(version.type_name(), "Version");
        assert_eq!(version.comment(), Some("! Plant supply side"));

        let plant = collection
            .find_by_name("DistrictCooling", "Purchased Cooling")
            .unwrap();
        assert!(plant.is_autosized("Nominal Capacity").unwrap());
        assert_eq!(plant.field_comment(3), Some("Nominal Capacity {W}"));

        let inlet = collection
            .resolve_reference(plant, "Chilled Water Inlet Node Name", Strictness::Final)
            .unwrap()
            .unwrap();
        assert_eq!(inlet.name(), Some("Chilled Water Inlet"));
    }

    #[test]
    fn test_stored_comments_survive_write() {
        let collection = parser().read(TEST_IDF).unwrap();
        let text = IdfWriter::new().write(&collection);
        let again = parser().read(&text).unwrap();
        assert_eq!(again.len(), collection.len());
        assert!(text.contains("!- Chilled Water Outlet Node Name"));
        assert!(text.starts_with("! Plant supply side\nVersion,\n  9.6;"));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let err = parser().read("Version,9.6;\nZoneHVAC:Imaginary,\n  A;\n").unwrap_err();
        assert!(matches!(err, IdfError::IdfSyntax { line: 2, .. }), "{}", err);
    }

    #[test]
    fn test_duplicate_unique_is_fatal() {
        let err = parser().read("Version,9.6;\nVersion,9.5;\n").unwrap_err();
        assert!(matches!(err, IdfError::DuplicateUniqueObject(_)));
    }

    #[test]
    fn test_bad_values_are_kept_for_validation() {
        let collection = parser()
            .read("Zone,\n  Core,\n  north;\n")
            .unwrap();
        let report = collection.validate(Strictness::Draft);
        assert_eq!(report.of_kind(ViolationKind::TypeCoercion).count(), 1);
    }

    #[test]
    fn test_progress_reported() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let collection = parse_with_progress(TEST_IDF, bundled_schema().unwrap(), move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(collection.len(), 4);
        assert!(calls.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_schema_json() {
        let schema = bundled_schema().unwrap();
        let json = schema_to_json(&schema).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "9.6.0");
        assert!(value["types"].as_array().unwrap().len() >= 11);
    }
}
