// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IDF-Lite Translator - building domain model to IDF records and back
//!
//! Domain objects live in a handle-keyed [`Model`]. A [`TranslatorRegistry`]
//! maps each domain type to one [`Translator`] doing both directions, and the
//! [`ForwardTranslator`] / [`ReverseTranslator`] drivers run a whole model or
//! record collection through a session that translates every object once.
//!
//! # Example
//!
//! ```ignore
//! use idf_lite_parser::bundled_schema;
//! use idf_lite_translator::{forward_translate, reverse_translate, Model, Node};
//!
//! let schema = bundled_schema()?;
//! let mut model = Model::new();
//! model.add(Node::new("Supply Inlet"));
//!
//! let result = forward_translate(&model, schema.clone());
//! let text = result.output.unwrap_or_default();
//! let back = reverse_translate(&text, schema);
//! ```

pub mod api;
pub mod diagnostics;
pub mod domain;
pub mod driver;
pub mod outcome;
pub mod session;
pub mod translator;
pub mod translators;

pub use api::{
    forward_translate, forward_translate_prj, forward_translate_to_path, reverse_translate,
    reverse_translate_path,
};
pub use diagnostics::{Diagnostics, LogLevel, LogMessage};
pub use domain::*;
pub use driver::{ForwardTranslator, ReverseTranslator, SessionState};
pub use outcome::{Outcome, TranslationResult};
pub use session::{ForwardSession, ReverseSession};
pub use translator::{Translator, TranslatorRegistry};
