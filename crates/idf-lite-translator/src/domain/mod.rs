// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building domain objects
//!
//! Domain objects live in a [`Model`] arena keyed by handle. Relationships are
//! stored as handles and resolved through the model, so objects may point at
//! each other in cycles. Optional attributes are stored as `Option` (or
//! [`NumericValue::Blank`]) and read back with their default applied;
//! `is_x_defaulted()` reports whether the stored value is absent.
//!
//! [`NumericValue::Blank`]: idf_lite_model::NumericValue::Blank

/// Implements the identity part of [`DomainObject`] for a type with a
/// `core: ObjectCore` field.
macro_rules! impl_identity {
    () => {
        fn handle(&self) -> idf_lite_model::Handle {
            self.core.handle
        }

        fn name(&self) -> Option<&str> {
            self.core.name.as_deref()
        }

        fn set_name(&mut self, name: &str) {
            self.core.name = Some(name.to_string());
        }
    };
}

mod equipment;
mod model;
mod node;
mod plant;
mod schedule;
mod setpoint;
mod zone;

pub use equipment::{DesignLevel, EquipmentDefinition, EquipmentInstance, EquipmentKind};
pub use model::Model;
pub use node::{Node, NodeList};
pub use plant::{DistrictPlant, PlantKind};
pub use schedule::{ScheduleConstant, ScheduleTypeLimits};
pub use setpoint::SetpointManagerScheduled;
pub use zone::ThermalZone;

use idf_lite_model::Handle;
use std::any::Any;
use std::fmt;

/// Downcasting support for trait objects
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Capabilities shared by every domain object
pub trait DomainObject: AsAny + fmt::Debug + Send + Sync + 'static {
    fn handle(&self) -> Handle;

    fn name(&self) -> Option<&str>;

    fn set_name(&mut self, name: &str);

    /// Type tag used to pick a translator
    fn type_tag(&self) -> &'static str;

    /// Handles this object points at, labelled by relationship
    fn relationships(&self) -> Vec<(&'static str, Handle)>;

    /// Drop every relationship pointing at `target`
    fn clear_reference(&mut self, target: Handle);
}

/// Identity shared by all domain objects
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectCore {
    pub handle: Handle,
    pub name: Option<String>,
}

impl ObjectCore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            handle: Handle::new(),
            name: Some(name.into()),
        }
    }

    pub fn unnamed() -> Self {
        Self {
            handle: Handle::new(),
            name: None,
        }
    }
}

/// Clear `slot` when it holds `target`
pub(crate) fn clear_if(slot: &mut Option<Handle>, target: Handle) {
    if *slot == Some(target) {
        *slot = None;
    }
}
