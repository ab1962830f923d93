// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translator trait and dispatch table
//!
//! Each domain type has one [`Translator`] doing both directions. The
//! [`TranslatorRegistry`] routes domain objects by type tag and records by
//! record type; adding a type means registering one more translator.

use crate::domain::DomainObject;
use crate::session::{ForwardSession, ReverseSession};
use idf_lite_model::{Handle, RecordInstance, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Forward and reverse translation for one domain type
pub trait Translator: Send + Sync {
    /// Type tag of the domain objects handled
    fn object_type(&self) -> &'static str;

    /// Record type read in reverse, if any
    ///
    /// Types without their own record (equipment definitions) return `None`.
    fn record_type(&self) -> Option<&'static str>;

    /// Write `object` into the session's collection
    ///
    /// Implementations create their record through
    /// [`ForwardSession::create_record`] before translating relationships and
    /// return its handle, or `None` when the type emits nothing on its own.
    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>>;

    /// Build a domain object from `record`
    ///
    /// Implementations register the new object through
    /// [`ReverseSession::register`] before resolving relationships.
    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>>;
}

/// Dispatch table from type tags and record types to translators
///
/// Registration order is translation order: a session visits objects of
/// earlier registered types first.
#[derive(Clone, Default)]
pub struct TranslatorRegistry {
    translators: Vec<Arc<dyn Translator>>,
    by_object: FxHashMap<&'static str, usize>,
    by_record: FxHashMap<String, usize>,
}

impl TranslatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in translator
    ///
    /// In order: schedule type limits, constant schedules, zones, equipment
    /// definitions, steam and hot water equipment, nodes, node lists,
    /// scheduled setpoint managers, district cooling and heating.
    pub fn with_default_translators() -> Self {
        use crate::translators::{
            DistrictPlantTranslator, EquipmentDefinitionTranslator, EquipmentTranslator,
            NodeListTranslator, NodeTranslator, ScheduleConstantTranslator,
            ScheduleTypeLimitsTranslator, SetpointManagerScheduledTranslator,
            ThermalZoneTranslator,
        };
        use crate::domain::{EquipmentKind, PlantKind};

        let mut registry = Self::new();
        registry.register(Arc::new(ScheduleTypeLimitsTranslator));
        registry.register(Arc::new(ScheduleConstantTranslator));
        registry.register(Arc::new(ThermalZoneTranslator));
        registry.register(Arc::new(EquipmentDefinitionTranslator::new(EquipmentKind::Steam)));
        registry.register(Arc::new(EquipmentDefinitionTranslator::new(EquipmentKind::HotWater)));
        registry.register(Arc::new(EquipmentTranslator::new(EquipmentKind::Steam)));
        registry.register(Arc::new(EquipmentTranslator::new(EquipmentKind::HotWater)));
        registry.register(Arc::new(NodeTranslator));
        registry.register(Arc::new(NodeListTranslator));
        registry.register(Arc::new(SetpointManagerScheduledTranslator));
        registry.register(Arc::new(DistrictPlantTranslator::new(PlantKind::Cooling)));
        registry.register(Arc::new(DistrictPlantTranslator::new(PlantKind::Heating)));
        registry
    }

    /// Register a translator
    ///
    /// A translator for an already registered type tag replaces the old one
    /// and keeps its position.
    pub fn register(&mut self, translator: Arc<dyn Translator>) {
        let object_type = translator.object_type();
        let slot = match self.by_object.get(object_type) {
            Some(&slot) => {
                let old = Arc::clone(&self.translators[slot]);
                if let Some(record_type) = old.record_type() {
                    self.by_record.remove(&record_type.to_ascii_uppercase());
                }
                self.translators[slot] = Arc::clone(&translator);
                slot
            }
            None => {
                self.translators.push(Arc::clone(&translator));
                self.translators.len() - 1
            }
        };
        self.by_object.insert(object_type, slot);
        if let Some(record_type) = translator.record_type() {
            self.by_record.insert(record_type.to_ascii_uppercase(), slot);
        }
    }

    /// Check if a type tag has a registered translator
    pub fn has_translator(&self, object_type: &str) -> bool {
        self.by_object.contains_key(object_type)
    }

    pub fn for_object(&self, object_type: &str) -> Option<&dyn Translator> {
        self.by_object
            .get(object_type)
            .map(|&slot| self.translators[slot].as_ref())
    }

    /// Translator reading a record type (case-insensitive)
    pub fn for_record(&self, record_type: &str) -> Option<&dyn Translator> {
        self.by_record
            .get(&record_type.to_ascii_uppercase())
            .map(|&slot| self.translators[slot].as_ref())
    }

    /// Position of a type tag in translation order; unknown tags sort last
    pub fn object_rank(&self, object_type: &str) -> usize {
        self.by_object
            .get(object_type)
            .copied()
            .unwrap_or(usize::MAX)
    }

    /// Position of a record type in translation order; unknown types sort last
    pub fn record_rank(&self, record_type: &str) -> usize {
        self.by_record
            .get(&record_type.to_ascii_uppercase())
            .copied()
            .unwrap_or(usize::MAX)
    }

    pub fn len(&self) -> usize {
        self.by_object.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_object.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent(&'static str);

    impl Translator for Silent {
        fn object_type(&self) -> &'static str {
            self.0
        }

        fn record_type(&self) -> Option<&'static str> {
            Some("Silent:Record")
        }

        fn forward(
            &self,
            _: &dyn DomainObject,
            _: &mut ForwardSession<'_>,
        ) -> Result<Option<Handle>> {
            Ok(None)
        }

        fn reverse(
            &self,
            _: &RecordInstance,
            _: &mut ReverseSession<'_>,
        ) -> Result<Option<Handle>> {
            Ok(None)
        }
    }

    #[test]
    fn test_default_registry() {
        let registry = TranslatorRegistry::with_default_translators();
        assert_eq!(registry.len(), 12);
        assert!(registry.has_translator("Node"));
        assert!(registry.has_translator("SteamEquipmentDefinition"));
        assert_eq!(
            registry.for_record("districtcooling").unwrap().object_type(),
            "DistrictCooling"
        );
        assert!(registry.for_record("SteamEquipmentDefinition").is_none());
        assert!(
            registry.object_rank("ScheduleTypeLimits") < registry.object_rank("ScheduleConstant")
        );
        assert_eq!(registry.record_rank("Version"), usize::MAX);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = TranslatorRegistry::with_default_translators();
        let rank = registry.object_rank("Node");
        registry.register(Arc::new(Silent("Node")));
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.object_rank("Node"), rank);
        assert!(registry.for_record("Node").is_none());
        assert_eq!(registry.for_record("Silent:Record").unwrap().object_type(), "Node");
    }
}
