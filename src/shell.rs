//! Shared shell module for standalone binary targets.
//!
//! Provides common initialization and a demo graph so the inspector can be
//! exercised without a full editor around it.

use anyhow::Result;

use crate::graph::{affects, connect, Attribute, Graph, Node, NodeRef, Value};

pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

/// Build a small demo graph exercising every field type.
///
/// `sphere1` carries one attribute per value type plus a computed one;
/// `group1` exposes a pass-through attribute relaying into the sphere's
/// radius.
pub fn demo_graph() -> Result<(Graph, NodeRef)> {
    let mut graph = Graph::new();

    let sphere = graph.add_node(Node::new("sphere1"));
    let (radius, area) = {
        let mut n = sphere.write().expect("node lock poisoned");
        let radius = n.add_attribute(Attribute::new("radius", Value::Float(1.0)))?;
        n.add_attribute(Attribute::new("subdivisions", Value::Int(2)))?;
        n.add_attribute(Attribute::new("visible", Value::Bool(true)))?;
        n.add_attribute(Attribute::new("shader", Value::Str("lambert".into())))?;
        let area = n.add_attribute(Attribute::new("area", Value::Float(12.5664)))?;
        (radius, area)
    };
    affects(&radius, &area);

    let group = graph.add_node(Node::new("group1"));
    let size = {
        let mut n = group.write().expect("node lock poisoned");
        n.add_attribute(Attribute::pass_through("size", Value::Float(0.0)))?
    };
    connect(&size, &radius)?;

    Ok((graph, sphere))
}
