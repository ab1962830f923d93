// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDF record tokenizer using nom combinators
//!
//! Turns the raw text of one record into its type name, field values and
//! comments.

use idf_lite_model::{IdfError, Result};
use nom::{
    bytes::complete::take_till,
    character::complete::{char, multispace0, not_line_ending, one_of, space0},
    combinator::{opt, recognize},
    IResult, Parser,
};

/// One field as written in the text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawField<'a> {
    /// Trimmed value, empty for a blank field
    pub value: &'a str,
    /// Same-line comment without its `!-` marker
    pub comment: Option<&'a str>,
}

/// One tokenized record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRecord<'a> {
    /// Full comment lines (with `!`) preceding the type name
    pub comment_lines: Vec<&'a str>,
    pub type_name: &'a str,
    pub fields: Vec<RawField<'a>>,
    /// 1-based line of the type name
    pub line: usize,
}

impl ParsedRecord<'_> {
    /// Record comment as stored on a record instance
    pub fn comment(&self) -> Option<String> {
        if self.comment_lines.is_empty() {
            None
        } else {
            Some(self.comment_lines.join("\n"))
        }
    }
}

// ============================================================================
// Parsing Primitives
// ============================================================================

/// A `!` comment up to the end of the line, marker included
fn comment(input: &str) -> IResult<&str, &str> {
    recognize((char('!'), not_line_ending)).parse(input)
}

/// Field text up to a delimiter, comment or line break
fn field_value(input: &str) -> IResult<&str, &str> {
    take_till(|c: char| matches!(c, ',' | ';' | '!' | '\n' | '\r'))(input)
}

fn delimiter(input: &str) -> IResult<&str, char> {
    let (input, _) = space0(input)?;
    one_of(",;")(input)
}

/// Optional comment on the rest of the current line
fn trailing_comment(input: &str) -> IResult<&str, Option<&str>> {
    let (input, _) = space0(input)?;
    opt(comment).parse(input)
}

/// Strip the `!-` (or `!`) marker from a field comment
fn field_comment_text(raw: &str) -> &str {
    raw.trim_start_matches('!').trim_start_matches('-').trim()
}

// ============================================================================
// Record Parsing
// ============================================================================

struct Cursor<'a> {
    input: &'a str,
    line: usize,
}

impl<'a> Cursor<'a> {
    /// Skip whitespace, counting line breaks
    fn skip_space(&mut self) {
        if let Ok((rest, space)) = multispace0::<&str, nom::error::Error<&str>>(self.input) {
            self.line += space.matches('\n').count();
            self.input = rest;
        }
    }

    /// Consume a full-line comment, if one starts here
    fn take_comment(&mut self) -> Option<&'a str> {
        let (rest, text) = comment(self.input).ok()?;
        self.input = rest;
        Some(text)
    }
}

/// Parse a complete record
///
/// Format: `Type, value1, value2;` with optional `!` comments. `line` is the
/// line on which `input` starts.
pub fn parse_record(input: &str, line: usize) -> Result<ParsedRecord<'_>> {
    let mut cursor = Cursor { input, line };

    let mut comment_lines = Vec::new();
    loop {
        cursor.skip_space();
        match cursor.take_comment() {
            Some(text) => comment_lines.push(text.trim_end()),
            None => break,
        }
    }

    let type_line = cursor.line;
    let (rest, type_name) = field_value(cursor.input)
        .map_err(|_| IdfError::syntax(type_line, "expected record type"))?;
    let type_name = type_name.trim();
    if type_name.is_empty() {
        return Err(IdfError::syntax(type_line, "expected record type"));
    }
    let (rest, mut terminator) = delimiter(rest).map_err(|_| {
        IdfError::syntax(type_line, format!("expected ',' or ';' after '{}'", type_name))
    })?;
    let (rest, _) = trailing_comment(rest)
        .map_err(|_| IdfError::syntax(type_line, "malformed comment"))?;
    cursor.input = rest;

    let mut fields = Vec::new();
    while terminator == ',' {
        cursor.skip_space();
        if cursor.take_comment().is_some() {
            continue;
        }
        let field_line = cursor.line;
        let (rest, value) = field_value(cursor.input)
            .map_err(|_| IdfError::syntax(field_line, "malformed field"))?;
        let (rest, next) = delimiter(rest).map_err(|_| {
            IdfError::syntax(
                field_line,
                format!("field {} of '{}' is not terminated", fields.len() + 1, type_name),
            )
        })?;
        let (rest, note) = trailing_comment(rest)
            .map_err(|_| IdfError::syntax(field_line, "malformed comment"))?;
        fields.push(RawField {
            value: value.trim(),
            comment: note.map(field_comment_text).filter(|c| !c.is_empty()),
        });
        cursor.input = rest;
        terminator = next;
    }

    Ok(ParsedRecord {
        comment_lines,
        type_name,
        fields,
        line: type_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comment() {
        let (remaining, text) = comment("!- Name\nnext").unwrap();
        assert_eq!(remaining, "\nnext");
        assert_eq!(text, "!- Name");
    }

    #[test]
    fn test_parse_field_value() {
        let (remaining, value) = field_value("  Core Zone , rest").unwrap();
        assert_eq!(remaining, ", rest");
        assert_eq!(value.trim(), "Core Zone");
        let (remaining, value) = field_value(";").unwrap();
        assert_eq!((remaining, value), (";", ""));
    }

    #[test]
    fn test_parse_record() {
        let text = concat!(
            "\n! Cooling plant\n!  second line\nDistrictCooling,\n",
            "  DC1,                    !- Name\n  ,\n  N2,\n",
            "  Autosize;                !- Nominal Capacity {W}",
        );
        let record = parse_record(text, 10).unwrap();
        assert_eq!(record.type_name, "DistrictCooling");
        assert_eq!(record.line, 13);
        assert_eq!(
            record.comment(),
            Some("! Cooling plant\n!  second line".to_string())
        );
        let values: Vec<&str> = record.fields.iter().map(|f| f.value).collect();
        assert_eq!(values, vec!["DC1", "", "N2", "Autosize"]);
        assert_eq!(record.fields[0].comment, Some("Name"));
        assert_eq!(record.fields[1].comment, None);
        assert_eq!(record.fields[3].comment, Some("Nominal Capacity {W}"));
    }

    #[test]
    fn test_parse_single_line_record() {
        let record = parse_record("Version,9.6;", 1).unwrap();
        assert_eq!(record.type_name, "Version");
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields[0].value, "9.6");

        let record = parse_record("Lead Input;", 1).unwrap();
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_comment_lines_between_fields_skipped() {
        let record = parse_record("Zone,\n  Core,\n! stray comment\n  0.0;", 1).unwrap();
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[1].value, "0.0");
    }

    #[test]
    fn test_unterminated_field_is_error() {
        let err = parse_record("Zone,\n  Core\n", 4).unwrap_err();
        assert!(matches!(err, IdfError::IdfSyntax { line: 5, .. }), "{}", err);
    }
}
