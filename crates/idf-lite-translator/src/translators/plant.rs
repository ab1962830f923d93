// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{downcast, object_label};
use crate::domain::{DistrictPlant, DomainObject, PlantKind};
use crate::session::{ForwardSession, ReverseSession};
use crate::translator::Translator;
use idf_lite_model::{Handle, IdfError, RecordInstance, Result};

const CAPACITY_FIELD: &str = "Nominal Capacity";
const SCHEDULE_FIELD: &str = "Capacity Fraction Schedule Name";

/// Shared translator for district cooling and district heating
pub struct DistrictPlantTranslator {
    kind: PlantKind,
}

impl DistrictPlantTranslator {
    pub fn new(kind: PlantKind) -> Self {
        Self { kind }
    }

    /// (inlet, outlet) node field names
    fn node_fields(&self) -> (&'static str, &'static str) {
        match self.kind {
            PlantKind::Cooling => (
                "Chilled Water Inlet Node Name",
                "Chilled Water Outlet Node Name",
            ),
            PlantKind::Heating => ("Hot Water Inlet Node Name", "Hot Water Outlet Node Name"),
        }
    }
}

impl Translator for DistrictPlantTranslator {
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
        let plant = downcast::<DistrictPlant>(object)?;
        let (inlet_field, outlet_field) = self.node_fields();
        let handle = session.create_record(object, self.kind.type_tag())?;

        let capacity = plant.nominal_capacity();
        if !capacity.is_blank() {
            session.record_mut(handle)?.set_numeric(CAPACITY_FIELD, capacity)?;
        }

        let inlet = session.require(plant.inlet_node(), || {
            IdfError::missing_relationship(object_label(object), "inlet node")
        })?;
        session.write_reference(handle, inlet_field, inlet)?;

        let outlet = session.require(plant.outlet_node(), || {
            IdfError::missing_relationship(object_label(object), "outlet node")
        })?;
        session.write_reference(handle, outlet_field, outlet)?;

        session.write_reference(handle, SCHEDULE_FIELD, plant.capacity_fraction_schedule())?;
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let (inlet_field, outlet_field) = self.node_fields();
        let mut plant = DistrictPlant::new(self.kind, record.reference_text());
        if let Some(capacity) = session.lenient(record.get_numeric(CAPACITY_FIELD).map(Some))? {
            match capacity.value() {
                Some(watts) => plant.set_nominal_capacity(watts),
                None if capacity.is_autosized() => plant.autosize_nominal_capacity(),
                None => plant.reset_nominal_capacity(),
            }
        }
        let handle = session.register(record, plant);

        if let Some(node) = session.resolve_relationship(record, inlet_field)? {
            session.object_mut::<DistrictPlant>(handle)?.set_inlet_node(node);
        }
        if let Some(node) = session.resolve_relationship(record, outlet_field)? {
            session.object_mut::<DistrictPlant>(handle)?.set_outlet_node(node);
        }
        if let Some(schedule) = session.resolve_relationship(record, SCHEDULE_FIELD)? {
            session
                .object_mut::<DistrictPlant>(handle)?
                .set_capacity_fraction_schedule(schedule);
        }
        Ok(Some(handle))
    }
}
