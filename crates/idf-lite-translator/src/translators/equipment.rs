// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Steam and hot water equipment
//!
//! The record flattens definition and instance: the definition's design
//! level is written scaled by the instance multiplier. Reverse translation
//! splits the record again into a definition named `<name> Definition` and
//! an instance with the default multiplier.

use super::{downcast, object_label};
use crate::domain::{
    DesignLevel, DomainObject, EquipmentDefinition, EquipmentInstance, EquipmentKind,
};
use crate::session::{ForwardSession, ReverseSession};
use crate::translator::Translator;
use idf_lite_model::{Handle, IdfError, RecordInstance, Result};

const METHOD_FIELD: &str = "Design Level Calculation Method";
const ZONE_FIELD: &str = "Zone or ZoneList Name";
const SCHEDULE_FIELD: &str = "Schedule Name";
const END_USE_FIELD: &str = "End-Use Subcategory";
const FRACTION_FIELDS: [&str; 3] = ["Fraction Latent", "Fraction Radiant", "Fraction Lost"];

/// Record field holding the value for a calculation method
fn level_field(method: &str) -> Option<&'static str> {
    match method {
        "EquipmentLevel" => Some("Design Level"),
        "Watts/Area" => Some("Power per Zone Floor Area"),
        "Watts/Person" => Some("Power per Person"),
        _ => None,
    }
}

fn fractions(definition: &EquipmentDefinition) -> [Option<f64>; 3] {
    let pick = |defaulted: bool, value: f64| (!defaulted).then_some(value);
    [
        pick(definition.is_fraction_latent_defaulted(), definition.fraction_latent()),
        pick(definition.is_fraction_radiant_defaulted(), definition.fraction_radiant()),
        pick(definition.is_fraction_lost_defaulted(), definition.fraction_lost()),
    ]
}

/// Definitions have no record of their own
pub struct EquipmentDefinitionTranslator {
    kind: EquipmentKind,
}

impl EquipmentDefinitionTranslator {
    pub fn new(kind: EquipmentKind) -> Self {
        Self { kind }
    }
}

impl Translator for EquipmentDefinitionTranslator {
    fn object_type(&self) -> &'static str {
        self.kind.definition_tag()
    }

    fn record_type(&self) -> Option<&'static str> {
        None
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        _session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        downcast::<EquipmentDefinition>(object)?;
        Ok(None)
    }

    fn reverse(
        &self,
        _record: &RecordInstance,
        _session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        Ok(None)
    }
}

pub struct EquipmentTranslator {
    kind: EquipmentKind,
}

impl EquipmentTranslator {
    pub fn new(kind: EquipmentKind) -> Self {
        Self { kind }
    }
}

impl Translator for EquipmentTranslator {
    fn object_type(&self) -> &'static str {
        self.kind.type_tag()
    }

    fn record_type(&self) -> Option<&'static str> {
        Some(self.kind.type_tag())
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        let instance = downcast::<EquipmentInstance>(object)?;
        let record_type = self.kind.type_tag();

        let definition = match session.require(instance.definition(), || {
            IdfError::missing_relationship(object_label(object), "definition")
        })? {
            Some(handle) => {
                let definition = session.model().expect_typed::<EquipmentDefinition>(handle)?;
                session.translate_and_map_model_object(handle)?;
                Some(definition)
            }
            None => None,
        };

        let handle = session.create_record(object, record_type)?;
        {
            let record = session.record_mut(handle)?;
            if let Some(definition) = definition {
                if let Some(level) = definition.design_level() {
                    let level = level.scaled(instance.multiplier());
                    record.set_choice(METHOD_FIELD, level.method())?;
                    if let Some(field) = level_field(level.method()) {
                        record.set_double(field, level.value())?;
                    }
                }
                for (field, value) in FRACTION_FIELDS.iter().zip(fractions(definition)) {
                    if let Some(value) = value {
                        record.set_double(field, value)?;
                    }
                }
            }
            if !instance.is_end_use_subcategory_defaulted() {
                record.set_string(END_USE_FIELD, instance.end_use_subcategory())?;
            }
        }

        let zone = session.require(instance.zone(), || {
            IdfError::missing_relationship(object_label(object), "zone")
        })?;
        session.write_reference(handle, ZONE_FIELD, zone)?;
        session.write_reference(handle, SCHEDULE_FIELD, instance.schedule())?;
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let name = record.reference_text();
        let mut definition = EquipmentDefinition::new(self.kind, format!("{} Definition", name));

        let method = record
            .get_choice_or_default(METHOD_FIELD)?
            .unwrap_or_else(|| "EquipmentLevel".to_string());
        if let Some(field) = level_field(&method) {
            if let Some(value) = session.lenient(record.get_double(field))? {
                let level = match method.as_str() {
                    "Watts/Area" => DesignLevel::PerFloorArea(value),
                    "Watts/Person" => DesignLevel::PerPerson(value),
                    _ => DesignLevel::EquipmentLevel(value),
                };
                definition.set_design_level(level);
            }
        }
        for (index, field) in FRACTION_FIELDS.iter().enumerate() {
            if let Some(value) = session.lenient(record.get_double(field))? {
                match index {
                    0 => definition.set_fraction_latent(value),
                    1 => definition.set_fraction_radiant(value),
                    _ => definition.set_fraction_lost(value),
                }
            }
        }

        let mut instance = EquipmentInstance::new(self.kind, name);
        if let Some(end_use) = record.get_string(END_USE_FIELD)? {
            instance.set_end_use_subcategory(end_use);
        }
        let handle = session.register(record, instance);

        if let Some(zone) = session.resolve_relationship(record, ZONE_FIELD)? {
            session.object_mut::<EquipmentInstance>(handle)?.set_zone(zone);
        }
        if let Some(schedule) = session.resolve_relationship(record, SCHEDULE_FIELD)? {
            session
                .object_mut::<EquipmentInstance>(handle)?
                .set_schedule(schedule);
        }

        let definition = session.add_object(definition);
        session
            .object_mut::<EquipmentInstance>(handle)?
            .set_definition(definition);
        Ok(Some(handle))
    }
}
