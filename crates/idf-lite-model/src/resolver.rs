// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record lookup and reference resolution

use crate::{FieldSpec, Handle, IdfError, RecordInstance, Result};

/// Record lookup and reference resolution
///
/// Reference fields hold the target's name, or its handle text for unnamed
/// targets. Implementations resolve either form.
///
/// # Example
///
/// ```ignore
/// use idf_lite_model::RecordResolver;
///
/// fn zone_of(resolver: &dyn RecordResolver, load: &RecordInstance) -> Option<String> {
///     let spec = load.spec().field_named("Zone or ZoneList Name").ok()?;
///     let text = load.raw_field("Zone or ZoneList Name").ok()??;
///     resolver.resolve_text(spec, text).map(|zone| zone.reference_text())
/// }
/// ```
pub trait RecordResolver {
    /// Get a record by handle
    fn get(&self, handle: Handle) -> Option<&RecordInstance>;

    /// All records of a type (case-insensitive), in insertion order
    fn records_of_type(&self, type_name: &str) -> Vec<&RecordInstance>;

    /// Find a named record among the given types; any type if `types` is empty
    fn find_named(&self, types: &[String], name: &str) -> Option<&RecordInstance>;

    /// All handles in insertion order
    fn all_handles(&self) -> Vec<Handle>;

    /// Resolve the text of a reference field
    fn resolve_text(&self, spec: &FieldSpec, text: &str) -> Option<&RecordInstance> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(record) = Handle::parse(text).and_then(|h| self.get(h)) {
            return Some(record);
        }
        self.find_named(&spec.referenced_types, text)
    }

    /// Total record count
    fn record_count(&self) -> usize {
        self.all_handles().len()
    }
}

/// Extension methods for RecordResolver
pub trait RecordResolverExt: RecordResolver {
    /// Check if a record exists
    fn exists(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Get a record or return an error
    fn get_or_err(&self, handle: Handle) -> Result<&RecordInstance> {
        self.get(handle)
            .ok_or_else(|| IdfError::other(format!("record {} not found", handle)))
    }
}

// Blanket implementation for all RecordResolver types
impl<T: RecordResolver + ?Sized> RecordResolverExt for T {}
