// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{clear_if, DomainObject, ObjectCore};
use idf_lite_model::{Handle, NumericValue};

/// Which district utility a plant draws from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlantKind {
    Cooling,
    Heating,
}

impl PlantKind {
    pub fn type_tag(self) -> &'static str {
        match self {
            PlantKind::Cooling => "DistrictCooling",
            PlantKind::Heating => "DistrictHeating",
        }
    }
}

/// Purchased chilled or hot water supplied by a district plant
#[derive(Clone, Debug, PartialEq)]
pub struct DistrictPlant {
    core: ObjectCore,
    kind: PlantKind,
    inlet_node: Option<Handle>,
    outlet_node: Option<Handle>,
    nominal_capacity: NumericValue,
    capacity_fraction_schedule: Option<Handle>,
}

impl DistrictPlant {
    pub fn new(kind: PlantKind, name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            kind,
            inlet_node: None,
            outlet_node: None,
            nominal_capacity: NumericValue::Blank,
            capacity_fraction_schedule: None,
        }
    }

    pub fn cooling(name: impl Into<String>) -> Self {
        Self::new(PlantKind::Cooling, name)
    }

    pub fn heating(name: impl Into<String>) -> Self {
        Self::new(PlantKind::Heating, name)
    }

    pub fn kind(&self) -> PlantKind {
        self.kind
    }

    pub fn inlet_node(&self) -> Option<Handle> {
        self.inlet_node
    }

    pub fn set_inlet_node(&mut self, node: Handle) {
        self.inlet_node = Some(node);
    }

    pub fn outlet_node(&self) -> Option<Handle> {
        self.outlet_node
    }

    pub fn set_outlet_node(&mut self, node: Handle) {
        self.outlet_node = Some(node);
    }

    /// Nominal capacity in W, autosize, or blank
    pub fn nominal_capacity(&self) -> NumericValue {
        self.nominal_capacity
    }

    pub fn is_nominal_capacity_autosized(&self) -> bool {
        self.nominal_capacity.is_autosized()
    }

    pub fn set_nominal_capacity(&mut self, watts: f64) {
        self.nominal_capacity = NumericValue::Value(watts);
    }

    pub fn autosize_nominal_capacity(&mut self) {
        self.nominal_capacity = NumericValue::Autosize;
    }

    pub fn reset_nominal_capacity(&mut self) {
        self.nominal_capacity = NumericValue::Blank;
    }

    pub fn capacity_fraction_schedule(&self) -> Option<Handle> {
        self.capacity_fraction_schedule
    }

    pub fn set_capacity_fraction_schedule(&mut self, schedule: Handle) {
        self.capacity_fraction_schedule = Some(schedule);
    }

    pub fn reset_capacity_fraction_schedule(&mut self) {
        self.capacity_fraction_schedule = None;
    }
}

impl DomainObject for DistrictPlant {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        [
            ("inlet_node", self.inlet_node),
            ("outlet_node", self.outlet_node),
            ("capacity_fraction_schedule", self.capacity_fraction_schedule),
        ]
        .into_iter()
        .filter_map(|(label, h)| h.map(|h| (label, h)))
        .collect()
    }

    fn clear_reference(&mut self, target: Handle) {
        clear_if(&mut self.inlet_node, target);
        clear_if(&mut self.outlet_node, target);
        clear_if(&mut self.capacity_fraction_schedule, target);
    }
}
