// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDF-Lite Model - Schema, record and validation types for IDF/IDD data
//!
//! This crate provides the schema-driven substrate shared by the IDF parser and
//! the model translators: record types loaded from an IDD, record instances
//! holding raw field text, typed coercion on top of that text, and
//! strictness-level validation.
//!
//! # Architecture
//!
//! - [`SchemaRegistry`] - Record types and their [`FieldSpec`]s
//! - [`RecordInstance`] - Raw fields plus typed getters and setters
//! - [`RecordCollection`] - Ordered records with name and reference bookkeeping
//! - [`RecordResolver`] - Record lookup and reference resolution
//! - [`RecordReader`] / [`RecordWriter`] - Text format interfaces
//! - [`validate_record`] / [`validate_collection`] - Validation queries
//!
//! # Example
//!
//! ```ignore
//! use idf_lite_model::{RecordCollection, Strictness};
//!
//! let mut collection = RecordCollection::new(schema);
//! let handle = collection.create("DistrictCooling")?;
//! let record = collection.get_mut(handle).unwrap();
//! record.set_name("DC1")?;
//! record.set_autosize("Nominal Capacity")?;
//!
//! let report = collection.validate(Strictness::Final);
//! for violation in report.errors() {
//!     println!("{}", violation);
//! }
//! ```

pub mod collection;
pub mod error;
pub mod record;
pub mod resolver;
pub mod schema;
pub mod traits;
pub mod types;
pub mod units;
pub mod validation;

// Re-export all public types
pub use collection::*;
pub use error::*;
pub use record::*;
pub use resolver::*;
pub use schema::*;
pub use traits::*;
pub use types::*;
pub use validation::*;
