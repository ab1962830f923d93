// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{DomainObject, ObjectCore};
use idf_lite_model::{Handle, NumericValue};

/// Thermal zone of a building
///
/// Ceiling height, volume and floor area are autocalculated unless set.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalZone {
    core: ObjectCore,
    direction_of_relative_north: Option<f64>,
    origin: [Option<f64>; 3],
    zone_type: Option<i64>,
    multiplier: Option<i64>,
    ceiling_height: NumericValue,
    volume: NumericValue,
    floor_area: NumericValue,
}

impl ThermalZone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            direction_of_relative_north: None,
            origin: [None; 3],
            zone_type: None,
            multiplier: None,
            ceiling_height: NumericValue::Blank,
            volume: NumericValue::Blank,
            floor_area: NumericValue::Blank,
        }
    }

    pub fn direction_of_relative_north(&self) -> f64 {
        self.direction_of_relative_north.unwrap_or(0.0)
    }

    pub fn is_direction_of_relative_north_defaulted(&self) -> bool {
        self.direction_of_relative_north.is_none()
    }

    pub fn set_direction_of_relative_north(&mut self, degrees: f64) {
        self.direction_of_relative_north = Some(degrees);
    }

    pub fn reset_direction_of_relative_north(&mut self) {
        self.direction_of_relative_north = None;
    }

    /// Origin in metres, unset coordinates read as 0
    pub fn origin(&self) -> [f64; 3] {
        self.origin.map(|c| c.unwrap_or(0.0))
    }

    pub fn origin_coordinate(&self, axis: usize) -> Option<f64> {
        self.origin.get(axis).copied().flatten()
    }

    pub fn is_origin_defaulted(&self) -> bool {
        self.origin.iter().all(Option::is_none)
    }

    pub fn set_origin(&mut self, x: f64, y: f64, z: f64) {
        self.origin = [Some(x), Some(y), Some(z)];
    }

    pub(crate) fn set_origin_coordinate(&mut self, axis: usize, value: f64) {
        if let Some(slot) = self.origin.get_mut(axis) {
            *slot = Some(value);
        }
    }

    pub fn reset_origin(&mut self) {
        self.origin = [None; 3];
    }

    pub fn zone_type(&self) -> i64 {
        self.zone_type.unwrap_or(1)
    }

    pub fn is_zone_type_defaulted(&self) -> bool {
        self.zone_type.is_none()
    }

    pub fn set_zone_type(&mut self, value: i64) {
        self.zone_type = Some(value);
    }

    pub fn multiplier(&self) -> i64 {
        self.multiplier.unwrap_or(1)
    }

    pub fn is_multiplier_defaulted(&self) -> bool {
        self.multiplier.is_none()
    }

    pub fn set_multiplier(&mut self, value: i64) {
        self.multiplier = Some(value);
    }

    pub fn reset_multiplier(&mut self) {
        self.multiplier = None;
    }

    /// Stored value; blank reads as autocalculate
    pub fn ceiling_height(&self) -> NumericValue {
        autocalculated(self.ceiling_height)
    }

    pub fn is_ceiling_height_defaulted(&self) -> bool {
        self.ceiling_height.is_blank()
    }

    pub fn is_ceiling_height_autocalculated(&self) -> bool {
        self.ceiling_height().is_autocalculated()
    }

    pub fn set_ceiling_height(&mut self, metres: f64) {
        self.ceiling_height = NumericValue::Value(metres);
    }

    pub fn autocalculate_ceiling_height(&mut self) {
        self.ceiling_height = NumericValue::Autocalculate;
    }

    pub fn reset_ceiling_height(&mut self) {
        self.ceiling_height = NumericValue::Blank;
    }

    pub fn volume(&self) -> NumericValue {
        autocalculated(self.volume)
    }

    pub fn is_volume_defaulted(&self) -> bool {
        self.volume.is_blank()
    }

    pub fn set_volume(&mut self, cubic_metres: f64) {
        self.volume = NumericValue::Value(cubic_metres);
    }

    pub fn autocalculate_volume(&mut self) {
        self.volume = NumericValue::Autocalculate;
    }

    pub fn reset_volume(&mut self) {
        self.volume = NumericValue::Blank;
    }

    pub fn floor_area(&self) -> NumericValue {
        autocalculated(self.floor_area)
    }

    pub fn is_floor_area_defaulted(&self) -> bool {
        self.floor_area.is_blank()
    }

    pub fn set_floor_area(&mut self, square_metres: f64) {
        self.floor_area = NumericValue::Value(square_metres);
    }

    pub fn autocalculate_floor_area(&mut self) {
        self.floor_area = NumericValue::Autocalculate;
    }

    pub fn reset_floor_area(&mut self) {
        self.floor_area = NumericValue::Blank;
    }

    /// Raw stored values, blank when defaulted
    pub(crate) fn stored_sizes(&self) -> [NumericValue; 3] {
        [self.ceiling_height, self.volume, self.floor_area]
    }

    pub(crate) fn set_stored_sizes(&mut self, sizes: [NumericValue; 3]) {
        let [ceiling_height, volume, floor_area] = sizes;
        self.ceiling_height = ceiling_height;
        self.volume = volume;
        self.floor_area = floor_area;
    }
}

fn autocalculated(value: NumericValue) -> NumericValue {
    match value {
        NumericValue::Blank => NumericValue::Autocalculate,
        other => other,
    }
}

impl DomainObject for ThermalZone {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        "ThermalZone"
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        Vec::new()
    }

    fn clear_reference(&mut self, _target: Handle) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autocalculated_sizes() {
        let mut zone = ThermalZone::new("Core");
        assert!(zone.is_floor_area_defaulted());
        assert!(zone.floor_area().is_autocalculated());

        zone.set_floor_area(250.0);
        assert_eq!(zone.floor_area().value(), Some(250.0));
        assert!(!zone.is_floor_area_defaulted());

        zone.autocalculate_floor_area();
        assert!(zone.floor_area().is_autocalculated());
        assert!(!zone.is_floor_area_defaulted());
    }

    #[test]
    fn test_integer_defaults() {
        let mut zone = ThermalZone::new("Core");
        assert_eq!(zone.multiplier(), 1);
        assert_eq!(zone.zone_type(), 1);
        zone.set_multiplier(3);
        assert_eq!(zone.multiplier(), 3);
        zone.reset_multiplier();
        assert!(zone.is_multiplier_defaulted());
    }

    #[test]
    fn test_origin() {
        let mut zone = ThermalZone::new("Core");
        assert!(zone.is_origin_defaulted());
        zone.set_origin_coordinate(2, 3.5);
        assert_eq!(zone.origin(), [0.0, 0.0, 3.5]);
        assert_eq!(zone.origin_coordinate(0), None);
    }
}
