// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared by schemas, records and translators

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sentinel text for autosized numeric fields
pub const AUTOSIZE: &str = "Autosize";

/// Sentinel text for autocalculated numeric fields
pub const AUTOCALCULATE: &str = "Autocalculate";

/// Stable identity of a record or domain object
///
/// Handles are random (UUID v4) and never reused within a process. They are
/// displayed in braces, e.g. `{8c2c5a9e-...}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub Uuid);

impl Handle {
    /// Generate a fresh handle
    pub fn new() -> Self {
        Handle(Uuid::new_v4())
    }

    /// Parse a handle from text, with or without surrounding braces
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim().trim_start_matches('{').trim_end_matches('}');
        Uuid::parse_str(trimmed).ok().map(Handle)
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0)
    }
}

/// Declared value type of a schema field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldValueType {
    String,
    Double,
    Integer,
    Choice,
    ObjectList,
    Url,
    AlphaNumeric,
    Handle,
}

impl FieldValueType {
    /// Map an IDD `\type` tag to a value type
    ///
    /// `alpha` is free text; `node` and `external-list` name things outside the
    /// schema's reference classes and behave as alphanumeric text.
    pub fn from_idd_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "alpha" => Some(FieldValueType::String),
            "real" => Some(FieldValueType::Double),
            "integer" => Some(FieldValueType::Integer),
            "choice" => Some(FieldValueType::Choice),
            "object-list" => Some(FieldValueType::ObjectList),
            "url" => Some(FieldValueType::Url),
            "node" | "external-list" => Some(FieldValueType::AlphaNumeric),
            "handle" => Some(FieldValueType::Handle),
            _ => None,
        }
    }

    /// Check if values of this type are numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValueType::Double | FieldValueType::Integer)
    }
}

/// Validation strictness, ordered from most permissive to most demanding
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Strictness {
    None,
    Minimal,
    #[default]
    Draft,
    Final,
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Strictness::None),
            "minimal" => Ok(Strictness::Minimal),
            "draft" => Ok(Strictness::Draft),
            "final" => Ok(Strictness::Final),
            other => Err(format!("unknown strictness '{}'", other)),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strictness::None => "None",
            Strictness::Minimal => "Minimal",
            Strictness::Draft => "Draft",
            Strictness::Final => "Final",
        };
        f.write_str(name)
    }
}

/// Raw content of a numeric field
///
/// Autosize and autocalculate are kept distinct from both a value and a blank
/// so that "let the engine size this" survives a round trip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum NumericValue {
    #[default]
    Blank,
    Autosize,
    Autocalculate,
    Value(f64),
}

impl NumericValue {
    /// Get the numeric value, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            NumericValue::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, NumericValue::Blank)
    }

    pub fn is_autosized(&self) -> bool {
        matches!(self, NumericValue::Autosize)
    }

    pub fn is_autocalculated(&self) -> bool {
        matches!(self, NumericValue::Autocalculate)
    }
}

impl From<f64> for NumericValue {
    fn from(value: f64) -> Self {
        NumericValue::Value(value)
    }
}

/// Unit system for quantity access
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSystem {
    /// Storage units of the schema
    SI,
    /// Inch-pound display units
    IP,
}

/// Format a double for field storage
///
/// Integral values keep one decimal digit so they read back as reals
/// (`5000.0`, not `5000`).
pub fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
