// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for schema loading, record access and translation

use crate::FieldValueType;
use thiserror::Error;

/// Result type alias for IDF/IDD operations
pub type Result<T> = std::result::Result<T, IdfError>;

/// Errors that can occur while loading schemas, accessing records or translating
#[derive(Error, Debug)]
pub enum IdfError {
    /// Malformed IDD schema text
    #[error("Schema parse error at line {line}: {message}")]
    SchemaParse { line: usize, message: String },

    /// Record type not present in the schema
    #[error("Unknown record type '{0}'")]
    UnknownType(String),

    /// Field name not present in the record type
    #[error("Unknown field '{field}' on record type '{record_type}'")]
    UnknownField { record_type: String, field: String },

    /// Raw field text could not be coerced to the requested type
    #[error("Cannot read '{value}' as {expected:?} for field '{field}' of '{record_type}'")]
    TypeCoercion {
        record_type: String,
        field: String,
        value: String,
        expected: FieldValueType,
    },

    /// Required field with neither an explicit value nor a default
    #[error("Required field '{field}' of '{record_type}' has no value")]
    RequiredField { record_type: String, field: String },

    /// Domain object lacks a relationship its translation cannot do without
    #[error("Object '{object}' is missing required relationship '{relationship}'")]
    MissingRelationship { object: String, relationship: String },

    /// Reference field names a record that does not exist
    #[error("Field '{field}' of '{record_type}' references unknown object '{target}'")]
    DanglingReference {
        record_type: String,
        field: String,
        target: String,
    },

    /// Field text holding a separator, comment marker or line break
    #[error("Cannot write '{value}' into field '{field}' of '{record_type}'")]
    UnwritableValue {
        record_type: String,
        field: String,
        value: String,
    },

    /// Second instance of a unique record type
    #[error("Record type '{0}' is unique and already present")]
    DuplicateUniqueObject(String),

    /// Malformed IDF text
    #[error("IDF syntax error at line {line}: {message}")]
    IdfSyntax { line: usize, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl IdfError {
    /// Create a new schema parse error
    pub fn schema_parse(line: usize, msg: impl Into<String>) -> Self {
        IdfError::SchemaParse {
            line,
            message: msg.into(),
        }
    }

    /// Create a new IDF syntax error
    pub fn syntax(line: usize, msg: impl Into<String>) -> Self {
        IdfError::IdfSyntax {
            line,
            message: msg.into(),
        }
    }

    /// Create a new unknown field error
    pub fn unknown_field(record_type: impl Into<String>, field: impl Into<String>) -> Self {
        IdfError::UnknownField {
            record_type: record_type.into(),
            field: field.into(),
        }
    }

    /// Create a new missing relationship error
    pub fn missing_relationship(
        object: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        IdfError::MissingRelationship {
            object: object.into(),
            relationship: relationship.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        IdfError::Other(msg.into())
    }

    /// Whether a translation session may downgrade this error to a warning
    /// when running below `Strictness::Final`.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            IdfError::TypeCoercion { .. }
                | IdfError::RequiredField { .. }
                | IdfError::MissingRelationship { .. }
                | IdfError::DanglingReference { .. }
                | IdfError::UnwritableValue { .. }
        )
    }
}
