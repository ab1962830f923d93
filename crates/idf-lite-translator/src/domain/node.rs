// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{clear_if, DomainObject, ObjectCore};
use idf_lite_model::Handle;

/// Named connection point in an HVAC loop
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    core: ObjectCore,
    setpoint_manager: Option<Handle>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            setpoint_manager: None,
        }
    }

    pub fn setpoint_manager(&self) -> Option<Handle> {
        self.setpoint_manager
    }

    pub fn set_setpoint_manager(&mut self, manager: Handle) {
        self.setpoint_manager = Some(manager);
    }

    pub fn reset_setpoint_manager(&mut self) {
        self.setpoint_manager = None;
    }
}

impl DomainObject for Node {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        "Node"
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        self.setpoint_manager
            .map(|h| ("setpoint_manager", h))
            .into_iter()
            .collect()
    }

    fn clear_reference(&mut self, target: Handle) {
        clear_if(&mut self.setpoint_manager, target);
    }
}

/// Ordered list of nodes
#[derive(Clone, Debug, PartialEq)]
pub struct NodeList {
    core: ObjectCore,
    nodes: Vec<Handle>,
}

impl NodeList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: ObjectCore::new(name),
            nodes: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[Handle] {
        &self.nodes
    }

    /// Append a node; a node already listed is not added twice
    pub fn add_node(&mut self, node: Handle) -> bool {
        if self.nodes.contains(&node) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    pub fn remove_node(&mut self, node: Handle) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|h| *h != node);
        self.nodes.len() != before
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl DomainObject for NodeList {
    impl_identity!();

    fn type_tag(&self) -> &'static str {
        "NodeList"
    }

    fn relationships(&self) -> Vec<(&'static str, Handle)> {
        self.nodes.iter().map(|h| ("node", *h)).collect()
    }

    fn clear_reference(&mut self, target: Handle) {
        self.remove_node(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_list_membership() {
        let a = Handle::new();
        let b = Handle::new();
        let mut list = NodeList::new("Supply Nodes");
        assert!(list.add_node(a));
        assert!(list.add_node(b));
        assert!(!list.add_node(a));
        assert_eq!(list.nodes(), &[a, b]);

        list.clear_reference(a);
        assert_eq!(list.nodes(), &[b]);
        assert_eq!(list.relationships(), vec![("node", b)]);
    }
}
