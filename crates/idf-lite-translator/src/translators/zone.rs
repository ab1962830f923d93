// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::downcast;
use crate::domain::{DomainObject, ThermalZone};
use crate::session::{ForwardSession, ReverseSession};
use crate::translator::Translator;
use idf_lite_model::{Handle, RecordInstance, Result};

const RECORD: &str = "Zone";
const ORIGIN_FIELDS: [&str; 3] = ["X Origin", "Y Origin", "Z Origin"];
const SIZE_FIELDS: [&str; 3] = ["Ceiling Height", "Volume", "Floor Area"];

pub struct ThermalZoneTranslator;

impl Translator for ThermalZoneTranslator {
    fn object_type(&self) -> &'static str {
        "ThermalZone"
    }

    fn record_type(&self) -> Option<&'static str> {
        Some(RECORD)
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        let zone = downcast::<ThermalZone>(object)?;
        let handle = session.create_record(object, RECORD)?;
        let record = session.record_mut(handle)?;

        if !zone.is_direction_of_relative_north_defaulted() {
            record.set_double("Direction of Relative North", zone.direction_of_relative_north())?;
        }
        for (axis, field) in ORIGIN_FIELDS.iter().enumerate() {
            if let Some(value) = zone.origin_coordinate(axis) {
                record.set_double(field, value)?;
            }
        }
        if !zone.is_zone_type_defaulted() {
            record.set_int("Type", zone.zone_type())?;
        }
        if !zone.is_multiplier_defaulted() {
            record.set_int("Multiplier", zone.multiplier())?;
        }
        for (field, value) in SIZE_FIELDS.iter().zip(zone.stored_sizes()) {
            if !value.is_blank() {
                record.set_numeric(field, value)?;
            }
        }
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let mut zone = ThermalZone::new(record.reference_text());

        if let Some(value) = session.lenient(record.get_double("Direction of Relative North"))? {
            zone.set_direction_of_relative_north(value);
        }
        for (axis, field) in ORIGIN_FIELDS.iter().enumerate() {
            if let Some(value) = session.lenient(record.get_double(field))? {
                zone.set_origin_coordinate(axis, value);
            }
        }
        if let Some(value) = session.lenient(record.get_int("Type"))? {
            zone.set_zone_type(value);
        }
        if let Some(value) = session.lenient(record.get_int("Multiplier"))? {
            zone.set_multiplier(value);
        }

        let mut sizes = zone.stored_sizes();
        for (slot, field) in sizes.iter_mut().zip(SIZE_FIELDS) {
            if let Some(value) = session.lenient(record.get_numeric(field).map(Some))? {
                *slot = value;
            }
        }
        zone.set_stored_sizes(sizes);

        Ok(Some(session.register(record, zone)))
    }
}
