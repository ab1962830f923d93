// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::downcast;
use crate::domain::{DomainObject, ScheduleConstant, ScheduleTypeLimits};
use crate::session::{ForwardSession, ReverseSession};
use crate::translator::Translator;
use idf_lite_model::{Handle, RecordInstance, Result};

const LIMITS_RECORD: &str = "ScheduleTypeLimits";
const CONSTANT_RECORD: &str = "Schedule:Constant";

pub struct ScheduleTypeLimitsTranslator;

impl Translator for ScheduleTypeLimitsTranslator {
    fn object_type(&self) -> &'static str {
        "ScheduleTypeLimits"
    }

    fn record_type(&self) -> Option<&'static str> {
        Some(LIMITS_RECORD)
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        let limits = downcast::<ScheduleTypeLimits>(object)?;
        let handle = session.create_record(object, LIMITS_RECORD)?;
        let record = session.record_mut(handle)?;

        if let Some(value) = limits.lower_limit() {
            record.set_double("Lower Limit Value", value)?;
        }
        if let Some(value) = limits.upper_limit() {
            record.set_double("Upper Limit Value", value)?;
        }
        if let Some(numeric_type) = limits.numeric_type() {
            record.set_choice("Numeric Type", numeric_type)?;
        }
        if !limits.is_unit_type_defaulted() {
            record.set_choice("Unit Type", limits.unit_type())?;
        }
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let mut limits = ScheduleTypeLimits::new(record.reference_text());
        if let Some(value) = session.lenient(record.get_double("Lower Limit Value"))? {
            limits.set_lower_limit(value);
        }
        if let Some(value) = session.lenient(record.get_double("Upper Limit Value"))? {
            limits.set_upper_limit(value);
        }
        if let Some(numeric_type) = record.get_choice("Numeric Type")? {
            limits.set_numeric_type(numeric_type);
        }
        if let Some(unit_type) = record.get_choice("Unit Type")? {
            limits.set_unit_type(unit_type);
        }
        Ok(Some(session.register(record, limits)))
    }
}

pub struct ScheduleConstantTranslator;

impl Translator for ScheduleConstantTranslator {
    fn object_type(&self) -> &'static str {
        "ScheduleConstant"
    }

    fn record_type(&self) -> Option<&'static str> {
        Some(CONSTANT_RECORD)
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        let schedule = downcast::<ScheduleConstant>(object)?;
        let handle = session.create_record(object, CONSTANT_RECORD)?;
        if !schedule.is_value_defaulted() {
            session
                .record_mut(handle)?
                .set_double("Hourly Value", schedule.value())?;
        }
        session.write_reference(
            handle,
            "Schedule Type Limits Name",
            schedule.schedule_type_limits(),
        )?;
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let mut schedule = ScheduleConstant::new(record.reference_text());
        if let Some(value) = session.lenient(record.get_double("Hourly Value"))? {
            schedule.set_value(value);
        }
        let handle = session.register(record, schedule);

        if let Some(limits) = session.resolve_relationship(record, "Schedule Type Limits Name")? {
            session
                .object_mut::<ScheduleConstant>(handle)?
                .set_schedule_type_limits(limits);
        }
        Ok(Some(handle))
    }
}
