// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Internal gain equipment
//!
//! A definition holds the design level shared by every instance; each
//! instance places the definition in a zone and scales it by a multiplier.

use super::{clear_if, DomainObject, ObjectCore};
use idf_lite_model::Handle;

const DEFAULT_END_USE: &str = "General";

/// Steam or hot water equipment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EquipmentKind {
    Steam,
    HotWater,
}

impl EquipmentKind {
    /// Type tag of the instance
    pub fn type_tag(self) -> &'static str {
        match self {
            EquipmentKind::Steam => "SteamEquipment",
            EquipmentKind::HotWater => "HotWaterEquipment",
        }
    }

    /// Type tag of the definition
    pub fn definition_tag(self) -> &'static str {
        match self {
            EquipmentKind::Steam => "SteamEquipmentDefinition",
            EquipmentKind::HotWater => "HotWaterEquipmentDefinition",
        }
    }
}

/// How the design level is specified
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DesignLevel {
    /// Total power in W
    EquipmentLevel(f64),
    /// W/m2 of zone floor area
    PerFloorArea(f64),
    /// W/person
    PerPerson(f64),
}

impl DesignLevel {
    /// Calculation method key
    pub fn method(&self) -> &'static str {
        match self {
            DesignLevel::EquipmentLevel(_) => "EquipmentLevel",
            DesignLevel::PerFloorArea(_) => "Watts/Area",
            DesignLevel::PerPerson(_) => "Watts/Person",
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            DesignLevel::EquipmentLevel(v)
            | DesignLevel::PerFloorArea(v)
            | DesignLevel::PerPerson(v) => v,
        }
    }

    /// Same method with the value scaled
    pub fn scaled(&self, factor: f64) -> Self {
        match *self {
            DesignLevel::EquipmentLevel(v) => DesignLevel::EquipmentLevel(v * factor),
            DesignLevel::PerFloorArea(v) => DesignLevel::PerFloorArea(v * factor),
            DesignLevel::PerPerson(v) => DesignLevel::PerPerson(v * factor),
        }
    }
}

/// Shared design data for equipment instances
#[derive(Clone, Debug, PartialEq)]
pub struct EquipmentDefinition {
    core: ObjectCore,
    kind: EquipmentKind,
    design_level: Option<DesignLevel>,
    fraction_latent: Option<f64>,
    fraction_radiant: Option<f64>,
    fraction_lost: Option<f64>,
}

impl EquipmentDefinition {
    pub fn new(kind: EquipmentKind, name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            kind,
            design_level: None,
            fraction_latent: None,
            fraction_radiant: None,
            fraction_lost: None,
        }
    }

    pub fn kind(&self) -> EquipmentKind {
        self.kind
    }

    pub fn design_level(&self) -> Option<DesignLevel> {
        self.design_level
    }

    pub fn set_design_level(&mut self, level: DesignLevel) {
        self.design_level = Some(level);
    }

    pub fn reset_design_level(&mut self) {
        self.design_level = None;
    }

    pub fn fraction_latent(&self) -> f64 {
        self.fraction_latent.unwrap_or(0.0)
    }

    pub fn is_fraction_latent_defaulted(&self) -> bool {
        self.fraction_latent.is_none()
    }

    pub fn set_fraction_latent(&mut self, value: f64) {
        self.fraction_latent = Some(value);
    }

    pub fn reset_fraction_latent(&mut self) {
        self.fraction_latent = None;
    }

    pub fn fraction_radiant(&self) -> f64 {
        self.fraction_radiant.unwrap_or(0.0)
    }

    pub fn is_fraction_radiant_defaulted(&self) -> bool {
        self.fraction_radiant.is_none()
    }

    pub fn set_fraction_radiant(&mut self, value: f64) {
        self.fraction_radiant = Some(value);
    }

    pub fn reset_fraction_radiant(&mut self) {
        self.fraction_radiant = None;
    }

    pub fn fraction_lost(&self) -> f64 {
        self.fraction_lost.unwrap_or(0.0)
    }

    pub fn is_fraction_lost_defaulted(&self) -> bool {
        self.fraction_lost.is_none()
    }

    pub fn set_fraction_lost(&mut self, value: f64) {
        self.fraction_lost = Some(value);
    }

    pub fn reset_fraction_lost(&mut self) {
        self.fraction_lost = None;
    }
}

impl DomainObject for EquipmentDefinition {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        self.kind.definition_tag()
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        Vec::new()
    }

    fn clear_reference(&mut self, _target: Handle) {}
}

/// One placement of an equipment definition
#[derive(Clone, Debug, PartialEq)]
pub struct EquipmentInstance {
    core: ObjectCore,
    kind: EquipmentKind,
    definition: Option<Handle>,
    zone: Option<Handle>,
    schedule: Option<Handle>,
    multiplier: Option<f64>,
    end_use_subcategory: Option<String>,
}

impl EquipmentInstance {
    pub fn new(kind: EquipmentKind, name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            kind,
            definition: None,
            zone: None,
            schedule: None,
            multiplier: None,
            end_use_subcategory: None,
        }
    }

    pub fn steam(name: impl Into<String>) -> Self {
        Self::new(EquipmentKind::Steam, name)
    }

    pub fn hot_water(name: impl Into<String>) -> Self {
        Self::new(EquipmentKind::HotWater, name)
    }

    pub fn kind(&self) -> EquipmentKind {
        self.kind
    }

    pub fn definition(&self) -> Option<Handle> {
        self.definition
    }

    pub fn set_definition(&mut self, definition: Handle) {
        self.definition = Some(definition);
    }

    pub fn zone(&self) -> Option<Handle> {
        self.zone
    }

    pub fn set_zone(&mut self, zone: Handle) {
        self.zone = Some(zone);
    }

    pub fn reset_zone(&mut self) {
        self.zone = None;
    }

    pub fn schedule(&self) -> Option<Handle> {
        self.schedule
    }

    pub fn set_schedule(&mut self, schedule: Handle) {
        self.schedule = Some(schedule);
    }

    pub fn reset_schedule(&mut self) {
        self.schedule = None;
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier.unwrap_or(1.0)
    }

    pub fn is_multiplier_defaulted(&self) -> bool {
        self.multiplier.is_none()
    }

    pub fn set_multiplier(&mut self, value: f64) {
        self.multiplier = Some(value);
    }

    pub fn reset_multiplier(&mut self) {
        self.multiplier = None;
    }

    pub fn end_use_subcategory(&self) -> &str {
        self.end_use_subcategory.as_deref().unwrap_or(DEFAULT_END_USE)
    }

    pub fn is_end_use_subcategory_defaulted(&self) -> bool {
        self.end_use_subcategory.is_none()
    }

    pub fn set_end_use_subcategory(&mut self, value: impl Into<String>) {
        self.end_use_subcategory = Some(value.into());
    }

    pub fn reset_end_use_subcategory(&mut self) {
        self.end_use_subcategory = None;
    }
}

impl DomainObject for EquipmentInstance {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        [
            ("definition", self.definition),
            ("zone", self.zone),
            ("schedule", self.schedule),
        ]
        .into_iter()
        .filter_map(|(label, h)| h.map(|h| (label, h)))
        .collect()
    }

    fn clear_reference(&mut self, target: Handle) {
        clear_if(&mut self.definition, target);
        clear_if(&mut self.zone, target);
        clear_if(&mut self.schedule, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_design_level_scaling() {
        let level = DesignLevel::PerFloorArea(12.5).scaled(2.0);
        assert_eq!(level, DesignLevel::PerFloorArea(25.0));
        assert_eq!(level.method(), "Watts/Area");
        assert_eq!(DesignLevel::EquipmentLevel(100.0).scaled(2.0).value(), 200.0);
    }

    #[test]
    fn test_instance_defaults() {
        let mut steam = EquipmentInstance::steam("Kitchen Steam");
        assert_eq!(steam.multiplier(), 1.0);
        assert_eq!(steam.end_use_subcategory(), "General");
        assert_eq!(steam.type_tag(), "SteamEquipment");
        steam.set_multiplier(2.0);
        assert!(!steam.is_multiplier_defaulted());

        let definition = EquipmentDefinition::new(EquipmentKind::HotWater, "Dishwasher");
        assert_eq!(definition.type_tag(), "HotWaterEquipmentDefinition");
        assert!(definition.design_level().is_none());
    }
}
