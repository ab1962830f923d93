// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation drivers
//!
//! [`ForwardTranslator`] and [`ReverseTranslator`] run one session over a
//! whole model or record collection, in registry order, and package the
//! output with its diagnostics as a [`TranslationResult`].

use crate::diagnostics::{Diagnostics, LogLevel};
use crate::domain::Model;
use crate::outcome::TranslationResult;
use crate::session::{ForwardSession, ReverseSession};
use crate::translator::TranslatorRegistry;
use idf_lite_model::{
    IdfError, RecordCollection, RecordInstance, Result, SchemaRegistry, Strictness,
    ValidationReport,
};
use std::sync::Arc;

const FORWARD_COMPONENT: &str = "idf_lite::forward";
const REVERSE_COMPONENT: &str = "idf_lite::reverse";

/// Lifecycle of a driver
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// Split a validation report into warnings and the first error
///
/// Every error is logged; the first one becomes the run's error.
fn apply_report(report: &ValidationReport, diagnostics: &mut Diagnostics) -> Option<IdfError> {
    let mut first = None;
    for violation in report.iter() {
        if violation.is_error() {
            diagnostics.error(violation.to_string());
            if first.is_none() {
                first = Some(violation.to_error());
            }
        } else {
            diagnostics.warn(violation.to_string());
        }
    }
    first
}

/// `major.minor` of an IDD version string
fn short_version(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}

// ============================================================================
// Forward
// ============================================================================

/// Translates a domain [`Model`] into a [`RecordCollection`]
///
/// # Example
///
/// ```ignore
/// let mut translator = ForwardTranslator::new(bundled_schema()?)
///     .with_strictness(Strictness::Final);
/// let result = translator.translate_model(&model);
/// ```
pub struct ForwardTranslator {
    schema: Arc<SchemaRegistry>,
    registry: Arc<TranslatorRegistry>,
    strictness: Strictness,
    log_level: LogLevel,
    state: SessionState,
}

impl ForwardTranslator {
    /// Create a driver with the built-in translators at `Draft` strictness
    pub fn new(schema: Arc<SchemaRegistry>) -> Self {
        Self {
            schema,
            registry: Arc::new(TranslatorRegistry::with_default_translators()),
            strictness: Strictness::default(),
            log_level: LogLevel::default(),
            state: SessionState::Idle,
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_registry(mut self, registry: Arc<TranslatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Lowest level kept in the result's messages
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn schema(&self) -> &Arc<SchemaRegistry> {
        &self.schema
    }

    /// Translate every object in `model`
    ///
    /// Objects are visited in registry order, then the collection is
    /// validated at the configured strictness. Validation errors fail the
    /// run; warnings are reported with the output.
    pub fn translate_model(&mut self, model: &Model) -> TranslationResult<RecordCollection> {
        self.state = SessionState::Running;
        log::debug!(
            "Forward translation of {} objects at {}",
            model.len(),
            self.strictness
        );

        let registry: &TranslatorRegistry = &self.registry;
        let diagnostics = Diagnostics::new(FORWARD_COMPONENT).with_min_level(self.log_level);
        let mut session = ForwardSession::new(
            model,
            registry,
            Arc::clone(&self.schema),
            self.strictness,
            diagnostics,
        );
        let run =
            emit_version(&mut session).and_then(|()| translate_objects(&mut session, registry));
        let (collection, mut diagnostics) = session.into_parts();

        if let Err(error) = run {
            self.state = SessionState::Failed;
            return TranslationResult::failure(error, diagnostics.take_messages());
        }

        let report = collection.validate(self.strictness);
        if let Some(error) = apply_report(&report, &mut diagnostics) {
            self.state = SessionState::Failed;
            return TranslationResult::failure(error, diagnostics.take_messages());
        }

        self.state = SessionState::Completed;
        log::debug!("Forward translation produced {} records", collection.len());
        TranslationResult::success(collection, diagnostics.take_messages())
    }
}

/// Add the `Version` record when the schema defines one
fn emit_version(session: &mut ForwardSession<'_>) -> Result<()> {
    let schema = Arc::clone(session.collection().schema());
    let (Some(spec), Some(version)) = (schema.get("Version"), schema.version()) else {
        return Ok(());
    };
    let mut record = RecordInstance::new(Arc::clone(spec));
    record.set_raw(0, short_version(version));
    session.collection_mut().insert(record)?;
    Ok(())
}

fn translate_objects(
    session: &mut ForwardSession<'_>,
    registry: &TranslatorRegistry,
) -> Result<()> {
    let model = session.model();
    let mut handles = model.handles().to_vec();
    handles.sort_by_key(|handle| {
        model
            .get(*handle)
            .map(|object| registry.object_rank(object.type_tag()))
            .unwrap_or(usize::MAX)
    });

    for handle in handles {
        session.translate_and_map_model_object(handle)?;
    }
    Ok(())
}

// ============================================================================
// Reverse
// ============================================================================

/// Translates a [`RecordCollection`] into a domain [`Model`]
pub struct ReverseTranslator {
    registry: Arc<TranslatorRegistry>,
    strictness: Strictness,
    log_level: LogLevel,
    state: SessionState,
}

impl Default for ReverseTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverseTranslator {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(TranslatorRegistry::with_default_translators()),
            strictness: Strictness::default(),
            log_level: LogLevel::default(),
            state: SessionState::Idle,
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn with_registry(mut self, registry: Arc<TranslatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Translate every record in `input`
    ///
    /// The input is validated first; validation errors fail the run before
    /// any object is built.
    pub fn translate_workspace(&mut self, input: &RecordCollection) -> TranslationResult<Model> {
        self.state = SessionState::Running;
        log::debug!(
            "Reverse translation of {} records at {}",
            input.len(),
            self.strictness
        );

        let mut diagnostics = Diagnostics::new(REVERSE_COMPONENT).with_min_level(self.log_level);
        let report = input.validate(self.strictness);
        if let Some(error) = apply_report(&report, &mut diagnostics) {
            self.state = SessionState::Failed;
            return TranslationResult::failure(error, diagnostics.take_messages());
        }

        let registry: &TranslatorRegistry = &self.registry;
        let mut handles = input.handles().to_vec();
        handles.sort_by_key(|handle| {
            input
                .get(*handle)
                .map(|record| registry.record_rank(record.type_name()))
                .unwrap_or(usize::MAX)
        });

        let mut session = ReverseSession::new(input, registry, self.strictness, diagnostics);
        let run = handles
            .into_iter()
            .try_for_each(|handle| session.translate_and_map_workspace_object(handle).map(|_| ()));
        let (model, mut diagnostics) = session.into_parts();

        match run {
            Ok(()) => {
                self.state = SessionState::Completed;
                log::debug!("Reverse translation produced {} objects", model.len());
                TranslationResult::success(model, diagnostics.take_messages())
            }
            Err(error) => {
                self.state = SessionState::Failed;
                TranslationResult::failure(error, diagnostics.take_messages())
            }
        }
    }
}
