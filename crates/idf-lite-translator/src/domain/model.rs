// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena owning all domain objects of one building model

use super::DomainObject;
use idf_lite_model::{Handle, IdfError, Result};
use rustc_hash::FxHashMap;

/// Domain objects keyed by handle, iterated in insertion order
#[derive(Debug, Default)]
pub struct Model {
    objects: FxHashMap<Handle, Box<dyn DomainObject>>,
    order: Vec<Handle>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add an object, returning its handle
    pub fn add<T: DomainObject>(&mut self, object: T) -> Handle {
        self.add_boxed(Box::new(object))
    }

    /// Add a boxed object; an object with the same handle is replaced in place
    pub fn add_boxed(&mut self, object: Box<dyn DomainObject>) -> Handle {
        let handle = object.handle();
        if self.objects.insert(handle, object).is_none() {
            self.order.push(handle);
        }
        handle
    }

    pub fn get(&self, handle: Handle) -> Option<&dyn DomainObject> {
        self.objects.get(&handle).map(|object| object.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut (dyn DomainObject + 'static)> {
        self.objects.get_mut(&handle).map(|object| object.as_mut())
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains_key(&handle)
    }

    /// Typed access to one object
    pub fn typed<T: DomainObject>(&self, handle: Handle) -> Option<&T> {
        self.get(handle)?.as_any().downcast_ref::<T>()
    }

    /// Typed mutable access to one object
    pub fn typed_mut<T: DomainObject>(&mut self, handle: Handle) -> Option<&mut T> {
        self.get_mut(handle)?.as_any_mut().downcast_mut::<T>()
    }

    /// Typed access that fails when the handle is missing or of another type
    pub fn expect_typed<T: DomainObject>(&self, handle: Handle) -> Result<&T> {
        self.typed(handle).ok_or_else(|| {
            IdfError::other(format!(
                "object {} is not a {}",
                handle,
                std::any::type_name::<T>()
            ))
        })
    }

    /// All objects of a concrete type, in insertion order
    pub fn objects_of<T: DomainObject>(&self) -> Vec<&T> {
        self.order
            .iter()
            .filter_map(|handle| self.typed::<T>(*handle))
            .collect()
    }

    /// Handles in insertion order
    pub fn handles(&self) -> &[Handle] {
        &self.order
    }

    /// Objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &dyn DomainObject> {
        self.order.iter().filter_map(|handle| self.get(*handle))
    }

    /// Find an object by type tag and name (name case-insensitive)
    pub fn find_by_name(&self, type_tag: &str, name: &str) -> Option<&dyn DomainObject> {
        self.iter().find(|object| {
            object.type_tag() == type_tag
                && object.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// Remove an object, clearing every relationship that pointed at it
    pub fn remove(&mut self, handle: Handle) -> Option<Box<dyn DomainObject>> {
        let removed = self.objects.remove(&handle)?;
        self.order.retain(|h| *h != handle);
        for object in self.objects.values_mut() {
            object.clear_reference(handle);
        }
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Node, SetpointManagerScheduled};

    #[test]
    fn test_typed_access() {
        let mut model = Model::new();
        let node = model.add(Node::new("Supply Outlet"));
        assert_eq!(model.len(), 1);
        assert_eq!(model.typed::<Node>(node).unwrap().name(), Some("Supply Outlet"));
        assert!(model.typed::<SetpointManagerScheduled>(node).is_none());
        assert!(model.expect_typed::<SetpointManagerScheduled>(node).is_err());
        assert!(model.find_by_name("Node", "supply outlet").is_some());
    }

    #[test]
    fn test_remove_clears_relationships() {
        let mut model = Model::new();
        let node = model.add(Node::new("Supply Outlet"));
        let mut manager = SetpointManagerScheduled::new("Supply Temp Manager");
        manager.set_setpoint_node(node);
        let manager = model.add(manager);
        model
            .typed_mut::<Node>(node)
            .unwrap()
            .set_setpoint_manager(manager);

        model.remove(node);
        let manager = model.typed::<SetpointManagerScheduled>(manager).unwrap();
        assert_eq!(manager.setpoint_node(), None);
        assert!(manager.relationships().is_empty());
        assert_eq!(model.objects_of::<SetpointManagerScheduled>().len(), 1);
    }
}
