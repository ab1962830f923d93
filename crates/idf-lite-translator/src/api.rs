// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text and file entry points
//!
//! Thin wrappers joining the drivers to the IDF reader and the IDF and PRJ
//! writers, with the default registry and `Draft` strictness.

use crate::domain::Model;
use crate::driver::{ForwardTranslator, ReverseTranslator};
use crate::outcome::TranslationResult;
use idf_lite_model::{IdfError, RecordReader, SchemaRegistry};
use idf_lite_parser::{IdfParser, IdfWriter, PrjWriter};
use std::path::Path;
use std::sync::Arc;

/// Translate a model and render it as IDF text
pub fn forward_translate(model: &Model, schema: Arc<SchemaRegistry>) -> TranslationResult<String> {
    ForwardTranslator::new(schema)
        .translate_model(model)
        .map(|collection| IdfWriter::new().write_collection(&collection))
}

/// Translate a model and render its airflow zones as a CONTAM project
pub fn forward_translate_prj(
    model: &Model,
    schema: Arc<SchemaRegistry>,
) -> TranslationResult<String> {
    ForwardTranslator::new(schema)
        .translate_model(model)
        .map(|collection| PrjWriter::new().write_collection(&collection))
}

/// Parse IDF text and translate it into a model
///
/// A syntax error or an unknown record type fails the run.
pub fn reverse_translate(content: &str, schema: Arc<SchemaRegistry>) -> TranslationResult<Model> {
    match IdfParser::new(schema).read(content) {
        Ok(collection) => ReverseTranslator::new().translate_workspace(&collection),
        Err(error) => TranslationResult::failure(error, Vec::new()),
    }
}

/// Translate a model and write the IDF text to `path`
pub fn forward_translate_to_path(
    model: &Model,
    schema: Arc<SchemaRegistry>,
    path: impl AsRef<Path>,
) -> TranslationResult<()> {
    let result = forward_translate(model, schema);
    let TranslationResult {
        outcome,
        output,
        warnings,
        error,
    } = result;
    match (output, error) {
        (Some(text), None) => match std::fs::write(path.as_ref(), text) {
            Ok(()) => TranslationResult {
                outcome,
                output: Some(()),
                warnings,
                error: None,
            },
            Err(e) => TranslationResult::failure(IdfError::Io(e), warnings),
        },
        (_, error) => TranslationResult::failure(
            error.unwrap_or_else(|| IdfError::other("translation produced no output")),
            warnings,
        ),
    }
}

/// Read IDF text from `path` and translate it into a model
pub fn reverse_translate_path(
    path: impl AsRef<Path>,
    schema: Arc<SchemaRegistry>,
) -> TranslationResult<Model> {
    match std::fs::read_to_string(path.as_ref()) {
        Ok(content) => reverse_translate(&content, schema),
        Err(e) => TranslationResult::failure(IdfError::Io(e), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Node, NodeList, ThermalZone};
    use crate::outcome::Outcome;
    use idf_lite_parser::bundled_schema;

    #[test]
    fn test_node_list_round_trip() {
        let mut model = Model::new();
        let a = model.add(Node::new("Supply Inlet"));
        let b = model.add(Node::new("Supply Outlet"));
        let mut list = NodeList::new("Supply Nodes");
        list.add_node(a);
        list.add_node(b);
        model.add(list);

        let schema = bundled_schema().unwrap();
        let text = forward_translate(&model, Arc::clone(&schema)).output.unwrap();
        assert!(text.contains("NodeList,"));

        let back = reverse_translate(&text, schema);
        assert_eq!(back.outcome, Outcome::Success);
        let back = back.output.unwrap();
        let list = back.objects_of::<NodeList>();
        assert_eq!(list.len(), 1);
        let names: Vec<&str> = list[0]
            .nodes()
            .iter()
            .filter_map(|h| back.get(*h).and_then(|o| o.name()))
            .collect();
        assert_eq!(names, vec!["Supply Inlet", "Supply Outlet"]);
    }

    #[test]
    fn test_prj_lists_thermal_zones() {
        let mut model = Model::new();
        let mut core = ThermalZone::new("Core");
        core.set_volume(240.0);
        core.set_floor_area(80.0);
        model.add(core);
        model.add(ThermalZone::new("Perimeter North"));
        model.add(Node::new("Supply Inlet"));

        let result = forward_translate_prj(&model, bundled_schema().unwrap());
        assert_eq!(result.outcome, Outcome::Success);
        let text = result.output.unwrap();
        assert!(text.contains("2 ! zones:\n"));
        assert!(text.contains(" 240.0 293.15 0.0 Core -1 "));
        assert!(text.contains(" Perimeter_North -1 "));
        assert!(text.contains("2 ! flow paths:\n"));
        assert!(text.ends_with("* end project file.\n"));
    }

    #[test]
    fn test_reverse_syntax_error_fails() {
        let result = reverse_translate("Bogus:Type,A;\n", bundled_schema().unwrap());
        assert_eq!(result.outcome, Outcome::Failure);
        assert!(matches!(result.error, Some(IdfError::IdfSyntax { line: 1, .. })));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = reverse_translate_path("/nonexistent/input.idf", bundled_schema().unwrap());
        assert!(matches!(result.error, Some(IdfError::Io(_))));
    }
}
