//! NODA - Node graph property inspector widgets
//!
//! Re-exports all modules for use by binary targets and host editors.

// Core infrastructure (notification hub)
pub mod core;

// App modules
pub mod config;
pub mod graph;
pub mod shell;
pub mod widgets;

// Re-export commonly used types from core
pub use core::notify::{NotifyHub, Subscription};

// Re-export graph model
pub use graph::{AttrRef, Attribute, Graph, GraphNotice, Node, NodeRef, Value};

// Re-export inspector widget surface
pub use widgets::inspector::{FieldKind, Inspector, InspectorField, InspectorState};
