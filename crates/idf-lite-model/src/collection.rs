// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered collection of records sharing one schema

use crate::{
    validate_collection, Handle, IdfError, RecordInstance, RecordResolver, RecordTypeSpec,
    Result, SchemaRegistry, Strictness, ValidationReport,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Records keyed by handle, iterated in insertion order
#[derive(Clone, Debug)]
pub struct RecordCollection {
    schema: Arc<SchemaRegistry>,
    records: FxHashMap<Handle, RecordInstance>,
    order: Vec<Handle>,
}

/// Two types share a naming family when they are the same type or provide a
/// common reference class.
pub(crate) fn same_family(a: &RecordTypeSpec, b: &RecordTypeSpec) -> bool {
    if a.name.eq_ignore_ascii_case(&b.name) {
        return true;
    }
    a.reference_classes().iter().any(|class| {
        b.reference_classes()
            .iter()
            .any(|other| other.eq_ignore_ascii_case(class))
    })
}

impl RecordCollection {
    /// Create an empty collection
    pub fn new(schema: Arc<SchemaRegistry>) -> Self {
        Self {
            schema,
            records: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Arc<SchemaRegistry> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Build a detached empty record of a schema type
    pub fn new_record(&self, type_name: &str) -> Result<RecordInstance> {
        Ok(RecordInstance::new(self.schema.record_type(type_name)?))
    }

    /// Create and add an empty record, returning its handle
    pub fn create(&mut self, type_name: &str) -> Result<Handle> {
        let record = self.new_record(type_name)?;
        self.insert(record)
    }

    /// Insert a record as is
    ///
    /// Fails on a type unknown to the schema, a second instance of a unique
    /// type or a handle already in use. Name conflicts are kept and reported
    /// by validation.
    pub fn insert(&mut self, record: RecordInstance) -> Result<Handle> {
        let spec = self.schema.record_type(record.type_name())?;
        if spec.unique && !self.records_of_type(&spec.name).is_empty() {
            return Err(IdfError::DuplicateUniqueObject(spec.name.clone()));
        }
        let handle = record.handle();
        if self.records.contains_key(&handle) {
            return Err(IdfError::other(format!("handle {} already in use", handle)));
        }
        self.records.insert(handle, record);
        self.order.push(handle);
        Ok(handle)
    }

    /// Add a record, renaming it if its name is taken within its family
    pub fn add(&mut self, mut record: RecordInstance) -> Result<Handle> {
        if let Some(name) = record.name().map(str::to_string) {
            let unique = self.unique_name(None, record.spec(), &name);
            if unique != name {
                log::debug!("Renamed {} '{}' to '{}'", record.type_name(), name, unique);
                record.set_name(unique)?;
            }
        }
        self.insert(record)
    }

    pub fn get(&self, handle: Handle) -> Option<&RecordInstance> {
        self.records.get(&handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut RecordInstance> {
        self.records.get_mut(&handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.records.contains_key(&handle)
    }

    /// Handles in insertion order
    pub fn handles(&self) -> &[Handle] {
        &self.order
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &RecordInstance> {
        self.order.iter().filter_map(|h| self.records.get(h))
    }

    /// Find a record by type and name (both case-insensitive)
    pub fn find_by_name(&self, type_name: &str, name: &str) -> Option<&RecordInstance> {
        self.iter().find(|record| {
            record.type_name().eq_ignore_ascii_case(type_name)
                && record
                    .name()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name.trim()))
        })
    }

    /// Another record in the same naming family already using `name`
    pub fn name_conflict(
        &self,
        exclude: Option<Handle>,
        spec: &RecordTypeSpec,
        name: &str,
    ) -> Option<Handle> {
        self.iter()
            .filter(|record| Some(record.handle()) != exclude)
            .filter(|record| same_family(record.spec(), spec))
            .find(|record| record.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .map(RecordInstance::handle)
    }

    /// `base` if free, otherwise `base 1`, `base 2`, ...
    pub fn unique_name(
        &self,
        exclude: Option<Handle>,
        spec: &RecordTypeSpec,
        base: &str,
    ) -> String {
        if self.name_conflict(exclude, spec, base).is_none() {
            return base.to_string();
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{} {}", base, n);
            if self.name_conflict(exclude, spec, &candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Rename a record, suffixing on conflict; returns the name applied
    pub fn set_name(&mut self, handle: Handle, name: &str) -> Result<String> {
        let spec = self
            .get(handle)
            .map(|record| Arc::clone(record.spec()))
            .ok_or_else(|| IdfError::other(format!("record {} not found", handle)))?;
        let unique = self.unique_name(Some(handle), &spec, name);
        if let Some(record) = self.records.get_mut(&handle) {
            record.set_name(unique.clone())?;
        }
        Ok(unique)
    }

    /// Resolve a reference field of `record`
    ///
    /// Blank fields give `None`. A non-blank value naming nothing gives
    /// `None` below `Strictness::Final` and `DanglingReference` at `Final`.
    pub fn resolve_reference(
        &self,
        record: &RecordInstance,
        field: &str,
        strictness: Strictness,
    ) -> Result<Option<&RecordInstance>> {
        let spec = record.spec().field_named(field)?;
        let text = match record.raw_field(field)? {
            Some(text) => text,
            None => return Ok(None),
        };
        match self.resolve_text(spec, text) {
            Some(target) => Ok(Some(target)),
            None if strictness >= Strictness::Final => Err(IdfError::DanglingReference {
                record_type: record.type_name().to_string(),
                field: spec.name.clone(),
                target: text.to_string(),
            }),
            None => {
                log::debug!(
                    "{} '{}' field '{}' names unknown object '{}'",
                    record.type_name(),
                    record.reference_text(),
                    spec.name,
                    text
                );
                Ok(None)
            }
        }
    }

    /// Fields pointing at a record, as (source handle, flat position)
    pub fn referencing(&self, target: Handle) -> Vec<(Handle, usize)> {
        let Some(target_record) = self.get(target) else {
            return Vec::new();
        };
        let handle_text = target.to_string();
        let name = target_record.name();
        let target_type = target_record.type_name();

        let mut sources = Vec::new();
        for record in self.iter().filter(|r| r.handle() != target) {
            for (position, value) in record.values().iter().enumerate() {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                let Some(spec) = record.spec().spec_at(position) else {
                    continue;
                };
                if !spec.is_reference() {
                    continue;
                }
                let by_handle = value.eq_ignore_ascii_case(&handle_text);
                let by_name = name.is_some_and(|n| n.eq_ignore_ascii_case(value))
                    && (spec.referenced_types.is_empty()
                        || spec
                            .referenced_types
                            .iter()
                            .any(|t| t.eq_ignore_ascii_case(target_type)));
                if by_handle || by_name {
                    sources.push((record.handle(), position));
                }
            }
        }
        sources
    }

    /// Remove a record, blanking every field that referenced it
    pub fn remove(&mut self, handle: Handle) -> Option<RecordInstance> {
        if !self.contains(handle) {
            return None;
        }
        for (source, position) in self.referencing(handle) {
            if let Some(record) = self.records.get_mut(&source) {
                record.set_raw(position, "");
            }
        }
        self.order.retain(|h| *h != handle);
        self.records.remove(&handle)
    }

    /// Remove a record and, transitively, every record that required it
    pub fn remove_with_dependents(&mut self, handle: Handle) -> Vec<RecordInstance> {
        let mut removed = Vec::new();
        let mut pending = vec![handle];
        while let Some(next) = pending.pop() {
            let dependents: Vec<Handle> = self
                .referencing(next)
                .into_iter()
                .filter(|(source, position)| {
                    self.get(*source)
                        .and_then(|r| r.spec().spec_at(*position))
                        .is_some_and(|spec| spec.required)
                })
                .map(|(source, _)| source)
                .collect();
            if let Some(record) = self.remove(next) {
                removed.push(record);
            }
            pending.extend(dependents);
        }
        removed
    }

    /// Validate every record plus collection-level constraints
    pub fn validate(&self, strictness: Strictness) -> ValidationReport {
        validate_collection(self, strictness)
    }
}

impl RecordResolver for RecordCollection {
    fn get(&self, handle: Handle) -> Option<&RecordInstance> {
        self.records.get(&handle)
    }

    fn records_of_type(&self, type_name: &str) -> Vec<&RecordInstance> {
        self.iter()
            .filter(|record| record.type_name().eq_ignore_ascii_case(type_name))
            .collect()
    }

    fn find_named(&self, types: &[String], name: &str) -> Option<&RecordInstance> {
        self.iter().find(|record| {
            record.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
                && (types.is_empty()
                    || types
                        .iter()
                        .any(|t| t.eq_ignore_ascii_case(record.type_name())))
        })
    }

    fn all_handles(&self) -> Vec<Handle> {
        self.order.clone()
    }

    fn record_count(&self) -> usize {
        self.order.len()
    }
}
