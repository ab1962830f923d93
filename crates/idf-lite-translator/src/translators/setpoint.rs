// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{downcast, object_label};
use crate::domain::{DomainObject, SetpointManagerScheduled};
use crate::session::{ForwardSession, ReverseSession};
use crate::translator::Translator;
use idf_lite_model::{Handle, IdfError, RecordInstance, Result};

const RECORD: &str = "SetpointManager:Scheduled";
const SCHEDULE_FIELD: &str = "Schedule Name";
const NODE_FIELD: &str = "Setpoint Node or NodeList Name";

pub struct SetpointManagerScheduledTranslator;

impl Translator for SetpointManagerScheduledTranslator {
    fn object_type(&self) -> &'static str {
        "SetpointManagerScheduled"
    }

    fn record_type(&self) -> Option<&'static str> {
        Some(RECORD)
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        let manager = downcast::<SetpointManagerScheduled>(object)?;
        let handle = session.create_record(object, RECORD)?;
        // Required in the record, so the domain default is always written.
        session
            .record_mut(handle)?
            .set_choice("Control Variable", manager.control_variable())?;

        let schedule = session.require(manager.schedule(), || {
            IdfError::missing_relationship(object_label(object), "schedule")
        })?;
        session.write_reference(handle, SCHEDULE_FIELD, schedule)?;

        let node = session.require(manager.setpoint_node(), || {
            IdfError::missing_relationship(object_label(object), "setpoint node")
        })?;
        session.write_reference(handle, NODE_FIELD, node)?;
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let mut manager = SetpointManagerScheduled::new(record.reference_text());
        if let Some(variable) = record.get_choice("Control Variable")? {
            manager.set_control_variable(variable);
        }
        let handle = session.register(record, manager);

        if let Some(schedule) = session.resolve_relationship(record, SCHEDULE_FIELD)? {
            session
                .object_mut::<SetpointManagerScheduled>(handle)?
                .set_schedule(schedule);
        }
        if let Some(node) = session.resolve_relationship(record, NODE_FIELD)? {
            session
                .object_mut::<SetpointManagerScheduled>(handle)?
                .set_setpoint_node(node);
        }
        Ok(Some(handle))
    }
}
