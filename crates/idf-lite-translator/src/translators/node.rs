// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::downcast;
use crate::domain::{DomainObject, Node, NodeList};
use crate::session::{ForwardSession, ReverseSession};
use crate::translator::Translator;
use idf_lite_model::{Handle, RecordInstance, Result};

const NODE_RECORD: &str = "Node";
const LIST_RECORD: &str = "NodeList";
const LIST_FIELD: &str = "Node Name";

pub struct NodeTranslator;

impl Translator for NodeTranslator {
    fn object_type(&self) -> &'static str {
        "Node"
    }

    fn record_type(&self) -> Option<&'static str> {
        Some(NODE_RECORD)
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        let node = downcast::<Node>(object)?;
        let handle = session.create_record(object, NODE_RECORD)?;
        session.write_reference(handle, "Setpoint Manager Name", node.setpoint_manager())?;
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let handle = session.register(record, Node::new(record.reference_text()));
        if let Some(manager) = session.resolve_relationship(record, "Setpoint Manager Name")? {
            session
                .object_mut::<Node>(handle)?
                .set_setpoint_manager(manager);
        }
        Ok(Some(handle))
    }
}

pub struct NodeListTranslator;

impl Translator for NodeListTranslator {
    fn object_type(&self) -> &'static str {
        "NodeList"
    }

    fn record_type(&self) -> Option<&'static str> {
        Some(LIST_RECORD)
    }

    fn forward(
        &self,
        object: &dyn DomainObject,
        session: &mut ForwardSession<'_>,
    ) -> Result<Option<Handle>> {
        let list = downcast::<NodeList>(object)?;
        let handle = session.create_record(object, LIST_RECORD)?;
        for node in list.nodes() {
            if let Some(text) = session.reference_text(*node)? {
                session.record_mut(handle)?.push_extensible_group(vec![text])?;
            }
        }
        Ok(Some(handle))
    }

    fn reverse(
        &self,
        record: &RecordInstance,
        session: &mut ReverseSession<'_>,
    ) -> Result<Option<Handle>> {
        let handle = session.register(record, NodeList::new(record.reference_text()));
        for group in 0..record.num_extensible_groups() {
            if let Some(node) = session.resolve_extensible(record, group, LIST_FIELD)? {
                session.object_mut::<NodeList>(handle)?.add_node(node);
            }
        }
        Ok(Some(handle))
    }
}
