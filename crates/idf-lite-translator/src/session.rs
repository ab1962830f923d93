// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation sessions
//!
//! A session owns the one-to-one mapping between domain objects and records
//! for a single run. Every object (or record) is translated at most once: the
//! translator registers its output before following relationships, so a
//! second visit, including one through a reference cycle, returns the
//! registered handle instead of recursing.

use crate::diagnostics::Diagnostics;
use crate::domain::{DomainObject, Model};
use crate::translator::TranslatorRegistry;
use idf_lite_model::{
    FieldSpec, Handle, IdfError, RecordCollection, RecordInstance, RecordResolver, Result,
    SchemaRegistry, Strictness,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

fn label(name: Option<&str>) -> &str {
    name.unwrap_or("<unnamed>")
}

/// Apply the strictness policy to a recoverable error
///
/// At `Final` the error is returned; below it is logged as a warning.
fn tolerate<T>(
    strictness: Strictness,
    diagnostics: &mut Diagnostics,
    result: Result<Option<T>>,
) -> Result<Option<T>> {
    match result {
        Err(error) if error.is_recoverable() && strictness < Strictness::Final => {
            diagnostics.warn(error.to_string());
            Ok(None)
        }
        other => other,
    }
}

// ============================================================================
// Forward
// ============================================================================

/// Domain model to records
pub struct ForwardSession<'a> {
    model: &'a Model,
    registry: &'a TranslatorRegistry,
    strictness: Strictness,
    collection: RecordCollection,
    mapped: FxHashMap<Handle, Option<Handle>>,
    diagnostics: Diagnostics,
}

impl<'a> ForwardSession<'a> {
    pub fn new(
        model: &'a Model,
        registry: &'a TranslatorRegistry,
        schema: Arc<SchemaRegistry>,
        strictness: Strictness,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            model,
            registry,
            strictness,
            collection: RecordCollection::new(schema),
            mapped: FxHashMap::default(),
            diagnostics,
        }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn collection(&self) -> &RecordCollection {
        &self.collection
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Record already produced for a domain object
    pub fn mapped_record(&self, object: Handle) -> Option<Handle> {
        self.mapped.get(&object).copied().flatten()
    }

    /// Translate a domain object once, returning its record
    ///
    /// `None` means the object produced no record: its type emits nothing on
    /// its own, has no translator, or failed with a recoverable error below
    /// `Final` (the tentative record is then removed).
    pub fn translate_and_map_model_object(&mut self, object: Handle) -> Result<Option<Handle>> {
        if let Some(mapped) = self.mapped.get(&object) {
            return Ok(*mapped);
        }

        let model = self.model;
        let Some(domain) = model.get(object) else {
            self.diagnostics
                .warn(format!("object {} is not part of the model", object));
            return Ok(None);
        };
        let registry = self.registry;
        let Some(translator) = registry.for_object(domain.type_tag()) else {
            self.diagnostics.warn(format!(
                "no translator for {} '{}'",
                domain.type_tag(),
                label(domain.name())
            ));
            self.mapped.insert(object, None);
            return Ok(None);
        };

        log::trace!("Translating {} '{}'", domain.type_tag(), label(domain.name()));
        match translator.forward(domain, self) {
            Ok(record) => {
                self.mapped.insert(object, record);
                Ok(record)
            }
            Err(error) => {
                if let Some(Some(record)) = self.mapped.remove(&object) {
                    self.collection.remove(record);
                }
                self.mapped.insert(object, None);
                let context = format!("{} '{}'", domain.type_tag(), label(domain.name()));
                tolerate(self.strictness, &mut self.diagnostics, Err(error)).map_err(|error| {
                    log::debug!("Translation of {} failed: {}", context, error);
                    error
                })
            }
        }
    }

    /// Create the record for `object` and map it
    ///
    /// The record name is set from the object; a name already taken in the
    /// record's naming family gets a numeric suffix. An unnamed object fails
    /// with `RequiredField` when the record type requires a name.
    pub fn create_record(
        &mut self,
        object: &dyn DomainObject,
        record_type: &str,
    ) -> Result<Handle> {
        let mut record = self.collection.new_record(record_type)?;
        let wanted = object.name().filter(|name| !name.trim().is_empty());
        let spec = Arc::clone(record.spec());
        if let Some(field) = spec.name_field() {
            match wanted {
                Some(name) => record.set_name(name)?,
                None if field.required => {
                    return Err(IdfError::RequiredField {
                        record_type: spec.name.clone(),
                        field: field.name.clone(),
                    });
                }
                None => {}
            }
        }
        let handle = self.collection.add(record)?;

        let stored = self
            .collection
            .get(handle)
            .and_then(|r| r.name())
            .map(str::to_string);
        if let (Some(wanted), Some(stored)) = (wanted, stored) {
            if wanted != stored {
                self.diagnostics.warn(format!(
                    "renamed {} '{}' to '{}'",
                    record_type, wanted, stored
                ));
            }
        }
        self.mapped.insert(object.handle(), Some(handle));
        Ok(handle)
    }

    pub fn record(&self, handle: Handle) -> Result<&RecordInstance> {
        self.collection
            .get(handle)
            .ok_or_else(|| IdfError::other(format!("record {} is not in the session", handle)))
    }

    pub fn record_mut(&mut self, handle: Handle) -> Result<&mut RecordInstance> {
        self.collection
            .get_mut(handle)
            .ok_or_else(|| IdfError::other(format!("record {} is not in the session", handle)))
    }

    /// Translate `target` and write its reference text into `field`
    ///
    /// Returns whether a reference was written.
    pub fn write_reference(
        &mut self,
        record: Handle,
        field: &str,
        target: Option<Handle>,
    ) -> Result<bool> {
        let Some(target) = target else {
            return Ok(false);
        };
        let Some(target_record) = self.translate_and_map_model_object(target)? else {
            return Ok(false);
        };
        let text = self.record(target_record)?.reference_text();
        self.record_mut(record)?.set_string(field, text)?;
        Ok(true)
    }

    /// Reference text for an extensible group value
    pub fn reference_text(&mut self, target: Handle) -> Result<Option<String>> {
        match self.translate_and_map_model_object(target)? {
            Some(record) => Ok(Some(self.record(record)?.reference_text())),
            None => Ok(None),
        }
    }

    /// Require a value, failing at `Final` and warning below
    pub fn require<T>(
        &mut self,
        value: Option<T>,
        error: impl FnOnce() -> IdfError,
    ) -> Result<Option<T>> {
        if value.is_some() {
            return Ok(value);
        }
        tolerate(self.strictness, &mut self.diagnostics, Err(error()))
    }

    pub(crate) fn collection_mut(&mut self) -> &mut RecordCollection {
        &mut self.collection
    }

    pub fn into_parts(self) -> (RecordCollection, Diagnostics) {
        (self.collection, self.diagnostics)
    }
}

// ============================================================================
// Reverse
// ============================================================================

/// Records to domain model
pub struct ReverseSession<'a> {
    input: &'a RecordCollection,
    registry: &'a TranslatorRegistry,
    strictness: Strictness,
    model: Model,
    mapped: FxHashMap<Handle, Option<Handle>>,
    diagnostics: Diagnostics,
}

impl<'a> ReverseSession<'a> {
    pub fn new(
        input: &'a RecordCollection,
        registry: &'a TranslatorRegistry,
        strictness: Strictness,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            input,
            registry,
            strictness,
            model: Model::new(),
            mapped: FxHashMap::default(),
            diagnostics,
        }
    }

    pub fn input(&self) -> &'a RecordCollection {
        self.input
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Domain object already built for a record
    pub fn mapped_object(&self, record: Handle) -> Option<Handle> {
        self.mapped.get(&record).copied().flatten()
    }

    /// Translate a record once, returning its domain object
    ///
    /// `Version` records are skipped. Records without a translator are
    /// skipped with a warning.
    pub fn translate_and_map_workspace_object(&mut self, record: Handle) -> Result<Option<Handle>> {
        if let Some(mapped) = self.mapped.get(&record) {
            return Ok(*mapped);
        }

        let input = self.input;
        let Some(instance) = input.get(record) else {
            self.diagnostics
                .warn(format!("record {} is not part of the input", record));
            return Ok(None);
        };
        if instance.type_name().eq_ignore_ascii_case("Version") {
            self.mapped.insert(record, None);
            return Ok(None);
        }
        let registry = self.registry;
        let Some(translator) = registry.for_record(instance.type_name()) else {
            self.diagnostics.warn(format!(
                "no translator for {} '{}'",
                instance.type_name(),
                instance.reference_text()
            ));
            self.mapped.insert(record, None);
            return Ok(None);
        };

        log::trace!(
            "Translating {} '{}'",
            instance.type_name(),
            instance.reference_text()
        );
        match translator.reverse(instance, self) {
            Ok(object) => {
                self.mapped.insert(record, object);
                Ok(object)
            }
            Err(error) => {
                if let Some(Some(object)) = self.mapped.remove(&record) {
                    self.model.remove(object);
                }
                self.mapped.insert(record, None);
                tolerate(self.strictness, &mut self.diagnostics, Err(error))
            }
        }
    }

    /// Add the object built for `record` to the model and map it
    pub fn register<T: DomainObject>(&mut self, record: &RecordInstance, object: T) -> Handle {
        let handle = self.model.add(object);
        self.mapped.insert(record.handle(), Some(handle));
        handle
    }

    /// Add an object that has no record of its own
    pub fn add_object<T: DomainObject>(&mut self, object: T) -> Handle {
        self.model.add(object)
    }

    /// Typed access to an object built in this session
    pub fn object_mut<T: DomainObject>(&mut self, handle: Handle) -> Result<&mut T> {
        self.model.typed_mut::<T>(handle).ok_or_else(|| {
            IdfError::other(format!(
                "object {} is not a {}",
                handle,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Apply the strictness policy to a typed read
    ///
    /// Coercion failures become a warning and an unset value below `Final`.
    pub fn lenient<T>(&mut self, value: Result<Option<T>>) -> Result<Option<T>> {
        tolerate(self.strictness, &mut self.diagnostics, value)
    }

    /// Resolve a reference field and translate its target
    ///
    /// A blank field gives `None`. A name that matches nothing fails with
    /// `DanglingReference` when the field is required and is left unset with
    /// a warning otherwise.
    pub fn resolve_relationship(
        &mut self,
        record: &RecordInstance,
        field: &str,
    ) -> Result<Option<Handle>> {
        let spec = record.spec().field_named(field)?;
        let Some(text) = record.raw_field(field)? else {
            return Ok(None);
        };
        self.resolve_target(record, spec, text)
    }

    /// Resolve a reference inside an extensible group
    pub fn resolve_extensible(
        &mut self,
        record: &RecordInstance,
        group: usize,
        field: &str,
    ) -> Result<Option<Handle>> {
        let index = record.spec().group_field_index(field)?;
        let spec = record
            .spec()
            .extensible
            .as_ref()
            .and_then(|g| g.fields.get(index))
            .ok_or_else(|| IdfError::unknown_field(record.type_name(), field))?;
        let Some(text) = record.extensible_value(group, field)? else {
            return Ok(None);
        };
        self.resolve_target(record, spec, text)
    }

    fn resolve_target(
        &mut self,
        record: &RecordInstance,
        spec: &FieldSpec,
        text: &str,
    ) -> Result<Option<Handle>> {
        let input = self.input;
        match input.resolve_text(spec, text) {
            Some(target) => self.translate_and_map_workspace_object(target.handle()),
            None if spec.required => Err(IdfError::DanglingReference {
                record_type: record.type_name().to_string(),
                field: spec.name.clone(),
                target: text.to_string(),
            }),
            None => {
                self.diagnostics.warn(format!(
                    "{} '{}': '{}' in '{}' does not name an object; left unset",
                    record.type_name(),
                    record.reference_text(),
                    text,
                    spec.name
                ));
                Ok(None)
            }
        }
    }

    pub fn into_parts(self) -> (Model, Diagnostics) {
        (self.model, self.diagnostics)
    }
}
