// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Built-in translators
//!
//! Forward translators create their record first, write direct fields only
//! when the domain value is not defaulted, then translate relationships.
//! Reverse translators read typed values, register the new object, then
//! resolve relationships.

mod equipment;
mod node;
mod plant;
mod schedule;
mod setpoint;
mod zone;

pub use equipment::{EquipmentDefinitionTranslator, EquipmentTranslator};
pub use node::{NodeListTranslator, NodeTranslator};
pub use plant::DistrictPlantTranslator;
pub use schedule::{ScheduleConstantTranslator, ScheduleTypeLimitsTranslator};
pub use setpoint::SetpointManagerScheduledTranslator;
pub use zone::ThermalZoneTranslator;

use crate::domain::DomainObject;
use idf_lite_model::{IdfError, Result};

/// Concrete type of a domain object handed to a translator
pub(crate) fn downcast<T: DomainObject>(object: &dyn DomainObject) -> Result<&T> {
    object.as_any().downcast_ref::<T>().ok_or_else(|| {
        IdfError::other(format!(
            "{} '{}' is not a {}",
            object.type_tag(),
            object_label(object),
            std::any::type_name::<T>()
        ))
    })
}

pub(crate) fn object_label(object: &dyn DomainObject) -> String {
    object
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| object.handle().to_string())
}
