// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDD schema loader
//!
//! Reads EnergyPlus-style input data dictionaries:
//!
//! ```text
//! DistrictCooling,
//!        \min-fields 4
//!   A1 , \field Name
//!        \required-field
//!        \reference PlantEquipmentNames
//!   N1 ; \field Nominal Capacity
//!        \units W
//!        \autosizable
//! ```
//!
//! Each line is split into a code part (object header or field codes) and an
//! annotation part starting at the first backslash. Annotations before the
//! first field describe the record type; later ones describe the most recent
//! field.

use idf_lite_model::{
    ExtensibleGroup, FieldSpec, FieldValueType, IdfError, NumericBound, RecordTypeSpec, Result,
    SchemaRegistry,
};
use nom::{
    bytes::complete::{take_till1, take_while1},
    character::complete::{char, digit1, one_of, space0},
    combinator::map_res,
    IResult, Parser,
};
use rustc_hash::FxHashSet;

const VERSION_PREFIX: &str = "!IDD_Version";

// ============================================================================
// Line Primitives
// ============================================================================

/// Field code such as `A1 ,` or `N12;`
fn field_code(input: &str) -> IResult<&str, (char, u32, char)> {
    let (input, _) = space0(input)?;
    let (input, kind) = one_of("AaNn")(input)?;
    let (input, number) = map_res(digit1, str::parse::<u32>).parse(input)?;
    let (input, _) = space0(input)?;
    let (input, terminator) = one_of(",;")(input)?;
    Ok((input, (kind.to_ascii_uppercase(), number, terminator)))
}

/// Object header such as `Schedule:Constant,`
fn object_header(input: &str) -> IResult<&str, (&str, char)> {
    let (input, _) = space0(input)?;
    let (input, name) = take_till1(|c: char| c == ',' || c == ';')(input)?;
    let (input, terminator) = one_of(",;")(input)?;
    Ok((input, (name.trim(), terminator)))
}

/// Annotation such as `\units W`; the value is the rest of the line
fn annotation(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = space0(input)?;
    let (input, _) = char('\\')(input)?;
    let (input, key) = take_while1(|c: char| !c.is_whitespace())(input)?;
    Ok(("", (key, input.trim())))
}

/// Split `minimum>0` style keys into (`minimum>`, `0`)
fn split_bound_key<'a>(key: &'a str, value: &'a str) -> (&'a str, String) {
    let letters = key
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(key.len());
    let mut split = letters;
    if key[split..].starts_with('>') || key[split..].starts_with('<') {
        split += 1;
    }
    let rest = key[split..].trim();
    if rest.is_empty() {
        (&key[..split], value.to_string())
    } else {
        (&key[..split], format!("{}{}", rest, value))
    }
}

/// Drop numbering words from extensible field names: `Node 1 Name` -> `Node Name`
fn group_field_name(name: &str) -> String {
    name.split_whitespace()
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Pending State
// ============================================================================

#[derive(Default)]
struct PendingField {
    kind: char,
    number: u32,
    line: usize,
    name: Option<String>,
    value_type: Option<FieldValueType>,
    required: bool,
    default_value: Option<String>,
    keys: Vec<String>,
    object_lists: Vec<String>,
    references: Vec<String>,
    si_unit: Option<String>,
    ip_unit: Option<String>,
    autosizable: bool,
    autocalculatable: bool,
    minimum: Option<NumericBound>,
    maximum: Option<NumericBound>,
    begin_extensible: bool,
    note: Option<String>,
}

impl PendingField {
    fn code(&self) -> String {
        format!("{}{}", self.kind, self.number)
    }

    fn into_spec(self, index: usize) -> FieldSpec {
        let value_type = self.value_type.unwrap_or_else(|| {
            if !self.keys.is_empty() {
                FieldValueType::Choice
            } else if !self.object_lists.is_empty() {
                FieldValueType::ObjectList
            } else if self.kind == 'N' {
                FieldValueType::Double
            } else {
                FieldValueType::String
            }
        });
        let name = self
            .name
            .unwrap_or_else(|| format!("Field {}", index + 1));
        let mut spec = FieldSpec::new(name, index, value_type);
        spec.required = self.required;
        spec.default_value = self.default_value;
        spec.choices = self.keys;
        spec.object_lists = self.object_lists;
        spec.references = self.references;
        spec.si_unit = self.si_unit;
        spec.ip_unit = self.ip_unit;
        spec.autosizable = self.autosizable;
        spec.autocalculatable = self.autocalculatable;
        spec.minimum = self.minimum;
        spec.maximum = self.maximum;
        spec.note = self.note;
        spec
    }
}

struct PendingType {
    name: String,
    line: usize,
    fields: Vec<PendingField>,
    closed: bool,
    unique: bool,
    required: bool,
    min_fields: usize,
    max_fields: Option<usize>,
    extensible_size: Option<usize>,
    memo: Option<String>,
}

impl PendingType {
    fn new(name: &str, line: usize, closed: bool) -> Self {
        Self {
            name: name.to_string(),
            line,
            fields: Vec::new(),
            closed,
            unique: false,
            required: false,
            min_fields: 0,
            max_fields: None,
            extensible_size: None,
            memo: None,
        }
    }

    fn finish(self) -> Result<RecordTypeSpec> {
        let line = self.line;
        let mut seen = FxHashSet::default();
        for field in &self.fields {
            if !seen.insert((field.kind, field.number)) {
                return Err(IdfError::schema_parse(
                    field.line,
                    format!("duplicate field code {} in '{}'", field.code(), self.name),
                ));
            }
        }

        let begin = self.fields.iter().position(|f| f.begin_extensible);
        let specs: Vec<FieldSpec> = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(i, f)| f.into_spec(i))
            .collect();

        let (fixed, extensible) = match (self.extensible_size, begin) {
            (None, None) => (specs, None),
            (None, Some(_)) => {
                return Err(IdfError::schema_parse(
                    line,
                    format!("'{}' has \\begin-extensible but no \\extensible:<n>", self.name),
                ))
            }
            (Some(_), None) => {
                return Err(IdfError::schema_parse(
                    line,
                    format!("'{}' is extensible but has no \\begin-extensible field", self.name),
                ))
            }
            (Some(size), Some(start)) => {
                let listed = specs.len() - start;
                if size == 0 || listed < size || listed % size != 0 {
                    return Err(IdfError::schema_parse(
                        line,
                        format!(
                            "'{}' lists {} extensible fields for a group of {}",
                            self.name, listed, size
                        ),
                    ));
                }
                let min_repeats = self.min_fields.saturating_sub(start).div_ceil(size);
                let max_repeats = match self.max_fields {
                    Some(max) if max < start => {
                        return Err(IdfError::schema_parse(
                            line,
                            format!(
                                "'{}' allows {} fields but has {} fixed fields",
                                self.name, max, start
                            ),
                        ))
                    }
                    Some(max) => Some((max - start) / size),
                    None => None,
                };
                if max_repeats.is_some_and(|max| min_repeats > max) {
                    return Err(IdfError::schema_parse(
                        line,
                        format!(
                            "'{}' has inconsistent extensible bounds \
                             (min-fields {}, max-fields {:?})",
                            self.name, self.min_fields, self.max_fields
                        ),
                    ));
                }

                let mut specs = specs;
                let group_fields: Vec<FieldSpec> = specs
                    .drain(start..start + size)
                    .enumerate()
                    .map(|(i, mut field)| {
                        field.index = i;
                        field.name = group_field_name(&field.name);
                        field
                    })
                    .collect();
                specs.truncate(start);
                let group = ExtensibleGroup {
                    fields: group_fields,
                    min_repeats,
                    max_repeats,
                };
                (specs, Some(group))
            }
        };

        let mut spec = RecordTypeSpec::new(self.name, fixed, extensible).map_err(|e| match e {
            IdfError::SchemaParse { message, .. } => IdfError::schema_parse(line, message),
            other => other,
        })?;
        spec.unique = self.unique;
        spec.required = self.required;
        spec.min_fields = self.min_fields;
        spec.memo = self.memo;
        Ok(spec)
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse IDD text into a schema registry
pub fn parse_idd(content: &str) -> Result<SchemaRegistry> {
    let mut loader = IddLoader::default();
    for (i, line) in content.lines().enumerate() {
        loader.line(i + 1, line)?;
    }
    loader.finish()
}

#[derive(Default)]
struct IddLoader {
    version: Option<String>,
    current: Option<PendingType>,
    types: Vec<RecordTypeSpec>,
}

impl IddLoader {
    fn line(&mut self, number: usize, line: &str) -> Result<()> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        if let Some(version) = trimmed.strip_prefix(VERSION_PREFIX) {
            self.version = Some(version.trim().to_string());
            return Ok(());
        }
        if trimmed.starts_with('!') {
            return Ok(());
        }

        let (code, notes) = match line.find('\\') {
            Some(pos) => (&line[..pos], Some(&line[pos..])),
            None => (line, None),
        };
        let code = code.split('!').next().unwrap_or("");
        self.code(number, code)?;

        if let Some(notes) = notes {
            let (_, (key, value)) = annotation(notes)
                .map_err(|_| IdfError::schema_parse(number, "malformed annotation"))?;
            self.annotation(number, key, value)?;
        }
        Ok(())
    }

    fn code(&mut self, number: usize, mut code: &str) -> Result<()> {
        while !code.trim().is_empty() {
            let open = self.current.as_ref().is_some_and(|t| !t.closed);
            if open {
                if let Ok((rest, (kind, field_number, terminator))) = field_code(code) {
                    if let Some(current) = self.current.as_mut() {
                        current.fields.push(PendingField {
                            kind,
                            number: field_number,
                            line: number,
                            ..PendingField::default()
                        });
                        current.closed = terminator == ';';
                    }
                    code = rest;
                    continue;
                }
            } else if field_code(code).is_ok() {
                return Err(IdfError::schema_parse(
                    number,
                    format!("field '{}' outside an open record type", code.trim()),
                ));
            }

            let (rest, (name, terminator)) = object_header(code).map_err(|_| {
                IdfError::schema_parse(number, format!("unexpected text '{}'", code.trim()))
            })?;
            if let Some(previous) = self.current.take() {
                if !previous.closed {
                    return Err(IdfError::schema_parse(
                        number,
                        format!("'{}' starts before '{}' is terminated", name, previous.name),
                    ));
                }
                self.types.push(previous.finish()?);
            }
            self.current = Some(PendingType::new(name, number, terminator == ';'));
            code = rest;
        }
        Ok(())
    }

    fn annotation(&mut self, number: usize, key: &str, value: &str) -> Result<()> {
        let lowered = key.to_ascii_lowercase();
        if lowered == "group" {
            return Ok(());
        }
        let Some(current) = self.current.as_mut() else {
            log::debug!("IDD line {}: ignoring \\{} outside a record type", number, key);
            return Ok(());
        };

        match current.fields.last_mut() {
            None => type_annotation(current, number, &lowered, value),
            Some(field) => field_annotation(field, number, &lowered, value),
        }
    }

    fn finish(mut self) -> Result<SchemaRegistry> {
        if let Some(last) = self.current.take() {
            if !last.closed {
                return Err(IdfError::schema_parse(
                    last.line,
                    format!("'{}' is not terminated", last.name),
                ));
            }
            self.types.push(last.finish()?);
        }
        SchemaRegistry::from_types(self.version, self.types)
    }
}

fn parse_count(number: usize, key: &str, value: &str) -> Result<usize> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits
        .parse::<usize>()
        .map_err(|_| {
            IdfError::schema_parse(number, format!("\\{} expects a count, got '{}'", key, value))
        })
}

fn parse_number(number: usize, key: &str, value: &str) -> Result<f64> {
    let token = value.split_whitespace().next().unwrap_or("");
    lexical_core::parse::<f64>(token.as_bytes())
        .map_err(|_| {
            IdfError::schema_parse(number, format!("\\{} expects a number, got '{}'", key, value))
        })
}

fn append_text(target: &mut Option<String>, value: &str) {
    match target {
        Some(text) => {
            text.push(' ');
            text.push_str(value);
        }
        None => *target = Some(value.to_string()),
    }
}

fn type_annotation(current: &mut PendingType, number: usize, key: &str, value: &str) -> Result<()> {
    if let Some(size) = key.strip_prefix("extensible:") {
        current.extensible_size = Some(parse_count(number, "extensible", size)?);
        return Ok(());
    }
    match key {
        "memo" => append_text(&mut current.memo, value),
        "unique-object" => current.unique = true,
        "required-object" => current.required = true,
        "min-fields" => current.min_fields = parse_count(number, key, value)?,
        "max-fields" => current.max_fields = Some(parse_count(number, key, value)?),
        "format" | "obsolete" => {}
        other => log::debug!("IDD line {}: ignoring record annotation \\{}", number, other),
    }
    Ok(())
}

fn field_annotation(field: &mut PendingField, number: usize, key: &str, value: &str) -> Result<()> {
    if key.starts_with("minimum") || key.starts_with("maximum") {
        let (bound_key, bound_value) = split_bound_key(key, value);
        let parsed = parse_number(number, bound_key, &bound_value)?;
        match bound_key {
            "minimum" => field.minimum = Some(NumericBound::inclusive(parsed)),
            "minimum>" => field.minimum = Some(NumericBound::exclusive(parsed)),
            "maximum" => field.maximum = Some(NumericBound::inclusive(parsed)),
            "maximum<" => field.maximum = Some(NumericBound::exclusive(parsed)),
            other => log::debug!("IDD line {}: ignoring bound \\{}", number, other),
        }
        return Ok(());
    }
    match key {
        "field" => field.name = Some(value.to_string()),
        "type" => {
            let value_type = FieldValueType::from_idd_tag(value).ok_or_else(|| {
                IdfError::schema_parse(number, format!("unknown field type '{}'", value))
            })?;
            field.value_type = Some(value_type);
        }
        "required-field" => field.required = true,
        "default" => field.default_value = Some(value.to_string()),
        "key" => field.keys.push(value.to_string()),
        "object-list" => field.object_lists.push(value.to_string()),
        "reference" | "reference-class-name" => field.references.push(value.to_string()),
        "units" => field.si_unit = Some(value.to_string()),
        "ip-units" => field.ip_unit = Some(value.to_string()),
        "autosizable" => field.autosizable = true,
        "autocalculatable" => field.autocalculatable = true,
        "begin-extensible" => field.begin_extensible = true,
        "note" => append_text(&mut field.note, value),
        other => log::debug!("IDD line {}: ignoring field annotation \\{}", number, other),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_IDD: &str = r#"!IDD_Version 9.6.0
! Test dictionary

\group Simulation Parameters

Version,
      \unique-object
      \format singleLine
  A1 ; \field Version Identifier
      \default 9.6

Lead Input;

\group Node-Branch Management

Node,
       \memo Named connection point
  A1 ; \field Name
       \required-field
       \reference NodeNames

NodeList,
       \extensible:1 - repeat last field
       \min-fields 2
  A1 , \field Name
       \required-field
       \reference NodeListNames
  A2 , \field Node 1 Name
       \begin-extensible
       \type object-list
       \object-list NodeNames
  A3 , \field Node 2 Name
       \type object-list
       \object-list NodeNames
  A4 ; \field Node 3 Name
       \type object-list
       \object-list NodeNames

DistrictCooling,
  A1 , \field Name
       \required-field
  A2 , \field Chilled Water Inlet Node Name
       \type node
  N1 , \field Nominal Capacity
       \units W
       \ip-units Btu/h
       \autosizable
       \minimum> 0
  A3 , \field Mode
       \key Continuous
       \key Discrete
       \default Continuous
  N2 ; \field Fraction
       \minimum 0.0
       \maximum 1.0
       \unitsBasedOnField A3
"#;

    #[test]
    fn test_parse_field_code() {
        assert_eq!(field_code("  A1 , rest"), Ok((" rest", ('A', 1, ','))));
        assert_eq!(field_code("n12;"), Ok(("", ('N', 12, ';'))));
        assert!(field_code("Node,").is_err());
    }

    #[test]
    fn test_parse_object_header() {
        assert_eq!(
            object_header("Schedule:Constant,"),
            Ok(("", ("Schedule:Constant", ',')))
        );
        assert_eq!(object_header("Lead Input;"), Ok(("", ("Lead Input", ';'))));
    }

    #[test]
    fn test_split_bound_key() {
        assert_eq!(split_bound_key("minimum>", "0"), ("minimum>", "0".to_string()));
        assert_eq!(split_bound_key("maximum<1", ""), ("maximum<", "1".to_string()));
        assert_eq!(split_bound_key("minimum", "-5"), ("minimum", "-5".to_string()));
    }

    #[test]
    fn test_parse_idd() {
        let registry = parse_idd(TEST_IDD).unwrap();
        assert_eq!(registry.version(), Some("9.6.0"));
        assert_eq!(registry.len(), 5);

        let version = registry.record_type("Version").unwrap();
        assert!(version.unique);
        assert_eq!(version.fields[0].default_value.as_deref(), Some("9.6"));

        let lead = registry.record_type("Lead Input").unwrap();
        assert!(lead.fields.is_empty());

        let cooling = registry.record_type("DistrictCooling").unwrap();
        assert_eq!(cooling.field_index("Nominal Capacity").unwrap(), 2);
        let capacity = &cooling.fields[2];
        assert_eq!(capacity.value_type, FieldValueType::Double);
        assert!(capacity.autosizable);
        assert_eq!(capacity.si_unit.as_deref(), Some("W"));
        assert_eq!(capacity.ip_unit.as_deref(), Some("Btu/h"));
        assert_eq!(capacity.minimum, Some(NumericBound::exclusive(0.0)));
        assert_eq!(
            cooling.fields[1].value_type,
            FieldValueType::AlphaNumeric
        );
        assert_eq!(cooling.fields[3].value_type, FieldValueType::Choice);
        assert_eq!(cooling.fields[3].choices, vec!["Continuous", "Discrete"]);
        assert_eq!(cooling.fields[4].maximum, Some(NumericBound::inclusive(1.0)));
    }

    #[test]
    fn test_extensible_group() {
        let registry = parse_idd(TEST_IDD).unwrap();
        let list = registry.record_type("NodeList").unwrap();
        assert_eq!(list.num_fixed_fields(), 1);
        let group = list.extensible.as_ref().unwrap();
        assert_eq!(group.size(), 1);
        assert_eq!(group.min_repeats, 1);
        assert_eq!(group.max_repeats, None);
        assert_eq!(group.fields[0].name, "Node Name");
        assert_eq!(group.fields[0].referenced_types, vec!["Node".to_string()]);
        assert_eq!(list.group_field_index("node name").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_field_code_rejected() {
        let idd = "Thing,\n  A1 , \\field Name\n  A1 ; \\field Other\n";
        let err = parse_idd(idd).unwrap_err();
        assert!(matches!(err, IdfError::SchemaParse { line: 3, .. }), "{}", err);
    }

    #[test]
    fn test_unknown_type_tag_rejected() {
        let idd = "Thing,\n  N1 ; \\field Value\n       \\type complex\n";
        assert!(matches!(
            parse_idd(idd),
            Err(IdfError::SchemaParse { line: 3, .. })
        ));
    }

    #[test]
    fn test_inconsistent_extensible_bounds_rejected() {
        let uneven = concat!(
            "Poly,\n  \\extensible:2\n  A1 , \\field Name\n  N1 , \\field X 1\n",
            "  \\begin-extensible\n  N2 , \\field Y 1\n  N3 ; \\field X 2\n",
        );
        assert!(matches!(parse_idd(uneven), Err(IdfError::SchemaParse { .. })));

        let bounds = concat!(
            "Poly,\n  \\extensible:1\n  \\min-fields 4\n  \\max-fields 2\n",
            "  A1 , \\field Name\n  N1 ; \\field X 1\n  \\begin-extensible\n",
        );
        assert!(matches!(parse_idd(bounds), Err(IdfError::SchemaParse { .. })));

        let missing = "Poly,\n  \\extensible:1\n  A1 ; \\field Name\n";
        assert!(matches!(parse_idd(missing), Err(IdfError::SchemaParse { .. })));
    }

    #[test]
    fn test_unterminated_type_rejected() {
        let idd = "Thing,\n  A1 , \\field Name\nOther,\n  A1 ; \\field Name\n";
        assert!(matches!(parse_idd(idd), Err(IdfError::SchemaParse { line: 3, .. })));
    }

    #[test]
    fn test_field_outside_type_rejected() {
        let idd = "  A1 ; \\field Name\n";
        assert!(matches!(parse_idd(idd), Err(IdfError::SchemaParse { line: 1, .. })));

        let closed = "Thing,\n  A1 ; \\field Name\n  A2 ; \\field Extra\n";
        assert!(matches!(parse_idd(closed), Err(IdfError::SchemaParse { line: 3, .. })));
    }

    #[test]
    fn test_unknown_annotations_ignored() {
        let idd = "Thing,\n  \\obsolete\n  \\license MIT\n  A1 ; \\field Name\n  \\retaincase\n";
        let registry = parse_idd(idd).unwrap();
        assert_eq!(registry.record_type("Thing").unwrap().fields.len(), 1);
    }
}
