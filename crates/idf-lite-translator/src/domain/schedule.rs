// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{clear_if, DomainObject, ObjectCore};
use idf_lite_model::Handle;

const DEFAULT_UNIT_TYPE: &str = "Dimensionless";

/// Limits and unit type applied to schedule values
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleTypeLimits {
    core: ObjectCore,
    lower_limit: Option<f64>,
    upper_limit: Option<f64>,
    numeric_type: Option<String>,
    unit_type: Option<String>,
}

impl ScheduleTypeLimits {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            lower_limit: None,
            upper_limit: None,
            numeric_type: None,
            unit_type: None,
        }
    }

    pub fn lower_limit(&self) -> Option<f64> {
        self.lower_limit
    }

    pub fn set_lower_limit(&mut self, value: f64) {
        self.lower_limit = Some(value);
    }

    pub fn reset_lower_limit(&mut self) {
        self.lower_limit = None;
    }

    pub fn upper_limit(&self) -> Option<f64> {
        self.upper_limit
    }

    pub fn set_upper_limit(&mut self, value: f64) {
        self.upper_limit = Some(value);
    }

    pub fn reset_upper_limit(&mut self) {
        self.upper_limit = None;
    }

    /// `Continuous` or `Discrete`
    pub fn numeric_type(&self) -> Option<&str> {
        self.numeric_type.as_deref()
    }

    pub fn set_numeric_type(&mut self, value: impl Into<String>) {
        self.numeric_type = Some(value.into());
    }

    pub fn reset_numeric_type(&mut self) {
        self.numeric_type = None;
    }

    pub fn unit_type(&self) -> &str {
        self.unit_type.as_deref().unwrap_or(DEFAULT_UNIT_TYPE)
    }

    pub fn is_unit_type_defaulted(&self) -> bool {
        self.unit_type.is_none()
    }

    pub fn set_unit_type(&mut self, value: impl Into<String>) {
        self.unit_type = Some(value.into());
    }

    pub fn reset_unit_type(&mut self) {
        self.unit_type = None;
    }
}

impl DomainObject for ScheduleTypeLimits {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        "ScheduleTypeLimits"
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        Vec::new()
    }

    fn clear_reference(&mut self, _target: Handle) {}
}

/// Schedule holding one value for the whole year
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleConstant {
    core: ObjectCore,
    schedule_type_limits: Option<Handle>,
    value: Option<f64>,
}

impl ScheduleConstant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            schedule_type_limits: None,
            value: None,
        }
    }

    pub fn schedule_type_limits(&self) -> Option<Handle> {
        self.schedule_type_limits
    }

    pub fn set_schedule_type_limits(&mut self, limits: Handle) {
        self.schedule_type_limits = Some(limits);
    }

    pub fn reset_schedule_type_limits(&mut self) {
        self.schedule_type_limits = None;
    }

    /// Hourly value, 0 when unset
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    pub fn is_value_defaulted(&self) -> bool {
        self.value.is_none()
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    pub fn reset_value(&mut self) {
        self.value = None;
    }
}

impl DomainObject for ScheduleConstant {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        "ScheduleConstant"
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        self.schedule_type_limits
            .map(|h| ("schedule_type_limits", h))
            .into_iter()
            .collect()
    }

    fn clear_reference(&mut self, target: Handle) {
        clear_if(&mut self.schedule_type_limits, target);
    }
}
