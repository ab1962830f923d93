// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{clear_if, DomainObject, ObjectCore};
use idf_lite_model::Handle;

const DEFAULT_CONTROL_VARIABLE: &str = "Temperature";

/// Setpoint manager driving a node from a schedule
#[derive(Clone, Debug, PartialEq)]
pub struct SetpointManagerScheduled {
    core: ObjectCore,
    control_variable: Option<String>,
    schedule: Option<Handle>,
    setpoint_node: Option<Handle>,
}

impl SetpointManagerScheduled {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            control_variable: None,
            schedule: None,
            setpoint_node: None,
        }
    }

    pub fn control_variable(&self) -> &str {
        self.control_variable
            .as_deref()
            .unwrap_or(DEFAULT_CONTROL_VARIABLE)
    }

    pub fn is_control_variable_defaulted(&self) -> bool {
        self.control_variable.is_none()
    }

    pub fn set_control_variable(&mut self, variable: impl Into<String>) {
        self.control_variable = Some(variable.into());
    }

    pub fn reset_control_variable(&mut self) {
        self.control_variable = None;
    }

    pub fn schedule(&self) -> Option<Handle> {
        self.schedule
    }

    pub fn set_schedule(&mut self, schedule: Handle) {
        self.schedule = Some(schedule);
    }

    pub fn setpoint_node(&self) -> Option<Handle> {
        self.setpoint_node
    }

    pub fn set_setpoint_node(&mut self, node: Handle) {
        self.setpoint_node = Some(node);
    }
}

impl DomainObject for SetpointManagerScheduled {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        "SetpointManagerScheduled"
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        let mut out = Vec::new();
        if let Some(h) = self.schedule {
            out.push(("schedule", h));
        }
        if let Some(h) = self.setpoint_node {
            out.push(("setpoint_node", h));
        }
        out
    }

    fn clear_reference(&mut self, target: Handle) {
        clear_if(&mut self.schedule, target);
        clear_if(&mut self.setpoint_node, target);
    }
}
