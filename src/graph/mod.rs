//! Graph model the inspector binds against.
//!
//! This is the engine-facing surface only: typed value slots, pass-through
//! relays, dirty marking and change notices. Dependency scheduling and
//! computed-value kernels live upstream and are out of scope here.

pub mod attribute;
pub mod events;
pub mod node;
pub mod value;

pub use attribute::{force_dirty, AttrRef, Attribute, WeakAttrRef};
pub use events::GraphNotice;
pub use node::{Node, NodeRef, WeakNodeRef};
pub use value::Value;

use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};
use indexmap::IndexMap;
use log::debug;
use uuid::Uuid;

use crate::core::notify::NotifyHub;

/// Node container wiring every member to one notification hub.
pub struct Graph {
    hub: NotifyHub,
    nodes: IndexMap<Uuid, NodeRef>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            hub: NotifyHub::new(),
            nodes: IndexMap::new(),
        }
    }

    pub fn hub(&self) -> &NotifyHub {
        &self.hub
    }

    /// Add a node, attaching the graph's hub to it and its attributes.
    pub fn add_node(&mut self, mut node: Node) -> NodeRef {
        node.attach(self.hub.clone());
        let uuid = node.uuid();
        debug!("graph: add node '{}' ({})", node.name(), uuid);
        let node = Arc::new(RwLock::new(node));
        self.nodes.insert(uuid, Arc::clone(&node));
        node
    }

    pub fn node(&self, uuid: Uuid) -> Option<NodeRef> {
        self.nodes.get(&uuid).cloned()
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeRef> {
        self.nodes
            .values()
            .find(|n| n.read().expect("node lock poisoned").name() == name)
            .cloned()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeRef> {
        self.nodes.values()
    }
}

/// Connect `src -> dst`: `dst` gains an input, `src` gains an output.
/// An attribute takes at most one input.
pub fn connect(src: &AttrRef, dst: &AttrRef) -> Result<()> {
    let src_uuid = {
        let s = src.read().expect("attribute lock poisoned");
        s.uuid()
    };
    {
        let mut d = dst.write().expect("attribute lock poisoned");
        if d.input().is_some() {
            bail!("attribute '{}' already has an input", d.name());
        }
        d.set_input(Some(src_uuid));
    }
    src.write()
        .expect("attribute lock poisoned")
        .add_output(Arc::downgrade(dst));
    Ok(())
}

/// Record that `dst` is computed from `src`: dirtying `src` dirties `dst`,
/// and `dst` reports `src` among its dependencies.
pub fn affects(src: &AttrRef, dst: &AttrRef) {
    let src_uuid = src.read().expect("attribute lock poisoned").uuid();
    src.write()
        .expect("attribute lock poisoned")
        .add_affects(Arc::downgrade(dst));
    dst.write()
        .expect("attribute lock poisoned")
        .add_affected_by(src_uuid);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_links_both_ends() {
        let mut graph = Graph::new();
        let node = graph.add_node(Node::new("n"));
        let (a, b) = {
            let mut n = node.write().unwrap();
            let a = n
                .add_attribute(Attribute::pass_through("a", Value::Float(0.0)))
                .unwrap();
            let b = n.add_attribute(Attribute::new("b", Value::Float(0.0))).unwrap();
            (a, b)
        };

        connect(&a, &b).unwrap();

        assert_eq!(b.read().unwrap().input(), Some(a.read().unwrap().uuid()));
        let outs = a.read().unwrap().outputs();
        assert_eq!(outs.len(), 1);
        assert_eq!(outs[0].read().unwrap().uuid(), b.read().unwrap().uuid());
    }

    #[test]
    fn test_second_input_bails() {
        let a = Arc::new(RwLock::new(Attribute::new("a", Value::Int(0))));
        let b = Arc::new(RwLock::new(Attribute::new("b", Value::Int(0))));
        let c = Arc::new(RwLock::new(Attribute::new("c", Value::Int(0))));
        connect(&a, &c).unwrap();
        assert!(connect(&b, &c).is_err());
    }

    #[test]
    fn test_affects_records_dependency() {
        let a = Arc::new(RwLock::new(Attribute::new("a", Value::Float(0.0))));
        let b = Arc::new(RwLock::new(Attribute::new("b", Value::Float(0.0))));
        affects(&a, &b);
        assert_eq!(b.read().unwrap().affected_by().len(), 1);

        force_dirty(&a);
        assert!(b.read().unwrap().is_dirty());
    }

    #[test]
    fn test_node_lookup_by_name() {
        let mut graph = Graph::new();
        graph.add_node(Node::new("sphere1"));
        assert!(graph.node_by_name("sphere1").is_some());
        assert!(graph.node_by_name("cube1").is_none());
    }
}
