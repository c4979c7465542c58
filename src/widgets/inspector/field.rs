//! Field plumbing shared by every inspector row.
//!
//! [`ObjectField`] pairs a display label with a weakly-bound graph object
//! and relays the process-wide busy broadcast into a spinner affordance.
//! [`AttributeField`] adds what attribute rows need: pass-through source
//! resolution and the value-changed subscription driving model-to-widget
//! refresh.
//!
//! Fields never own the objects they edit. Every access upgrades the weak
//! handle and no-ops when the object is gone; a field over a deleted object
//! is inert, not an error.
//!
//! Threading: subscription callbacks only flip the atomic flags here. The
//! actual widget sync runs on the UI thread when the field is next shown.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use uuid::Uuid;

use crate::core::notify::{NotifyHub, Subscription};
use crate::graph::{AttrRef, GraphNotice, NodeRef, WeakAttrRef, WeakNodeRef};

/// The graph object a field edits, held without ownership.
pub enum BoundObject {
    Attr(WeakAttrRef),
    Node(WeakNodeRef),
}

impl BoundObject {
    /// Upgrade to the bound attribute, if it is still alive.
    pub fn attr(&self) -> Option<AttrRef> {
        match self {
            BoundObject::Attr(weak) => weak.upgrade(),
            BoundObject::Node(_) => None,
        }
    }

    /// Upgrade to the bound node, if it is still alive.
    pub fn node(&self) -> Option<NodeRef> {
        match self {
            BoundObject::Node(weak) => weak.upgrade(),
            BoundObject::Attr(_) => None,
        }
    }

    pub fn is_alive(&self) -> bool {
        match self {
            BoundObject::Attr(weak) => weak.strong_count() > 0,
            BoundObject::Node(weak) => weak.strong_count() > 0,
        }
    }
}

/// Label + weakly-bound object + busy-spinner relay.
pub struct ObjectField {
    label: String,
    object: BoundObject,
    /// Set from the busy broadcast callback, read at render time
    spinning: Arc<AtomicBool>,
    /// Value widget currently interacted with; spinner must not displace it
    editing: bool,
    _spin_watch: Subscription,
}

impl ObjectField {
    pub fn new(label: impl Into<String>, object: BoundObject, hub: &NotifyHub) -> Self {
        let spinning = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&spinning);
        let _spin_watch = hub.watch(move |n| {
            if let GraphNotice::ExternalThreadActive(active) = n {
                flag.store(*active, Ordering::Relaxed);
            }
        });
        Self {
            label: label.into(),
            object,
            spinning,
            editing: false,
            _spin_watch,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn object(&self) -> &BoundObject {
        &self.object
    }

    /// Manually toggle the spinner. The non-forced path refuses while the
    /// value widget is being edited, same as the broadcast-driven path.
    pub fn set_spinning(&mut self, active: bool, force: bool) {
        if force || !self.editing {
            self.spinning.store(active, Ordering::Relaxed);
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning.load(Ordering::Relaxed)
    }

    pub(crate) fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// True when the value widget should be hidden behind the spinner:
    /// busy broadcast is on and the user is not mid-edit.
    pub fn show_spinner_instead(&self) -> bool {
        self.is_spinning() && !self.editing
    }
}

/// Attribute-bound field state: resolved source set + refresh subscription.
pub struct AttributeField {
    field: ObjectField,
    /// Resolved data holders; first entry is the canonical read source
    sources: Vec<WeakAttrRef>,
    /// Set by the value-changed callback, drained on the UI thread
    refresh: Arc<AtomicBool>,
    _value_watch: Subscription,
}

impl AttributeField {
    pub fn new(attr: &AttrRef, hub: &NotifyHub) -> Self {
        let sources = find_source_attributes(attr);
        let canonical_uuid = sources
            .first()
            .and_then(Weak::upgrade)
            .map(|a| a.read().expect("attribute lock poisoned").uuid());

        let (short, derived) = {
            let a = attr.read().expect("attribute lock poisoned");
            let short = a
                .name()
                .rsplit(':')
                .next()
                .unwrap_or_default()
                .to_string();
            (short, a.input().is_some() || !a.affected_by().is_empty())
        };
        // Computed attributes are read-mostly; mark them
        let label = if derived { format!(">{short}") } else { short };

        // Pending initial sync
        let refresh = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&refresh);
        let _value_watch = hub.watch(move |n| {
            if let GraphNotice::AttributeValueChanged(uuid) = n {
                if Some(*uuid) == canonical_uuid {
                    flag.store(true, Ordering::Relaxed);
                }
            }
        });

        Self {
            field: ObjectField::new(label, BoundObject::Attr(Arc::downgrade(attr)), hub),
            sources,
            refresh,
            _value_watch,
        }
    }

    pub fn field(&self) -> &ObjectField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ObjectField {
        &mut self.field
    }

    /// The attribute this field was bound to (possibly a pass-through).
    pub fn bound_attr(&self) -> Option<AttrRef> {
        self.field.object().attr()
    }

    pub fn sources(&self) -> &[WeakAttrRef] {
        &self.sources
    }

    /// Canonical read source: first resolved attribute still alive.
    pub fn canonical(&self) -> Option<AttrRef> {
        self.sources.first().and_then(Weak::upgrade)
    }

    /// Consume the pending-refresh flag.
    pub fn take_refresh(&self) -> bool {
        self.refresh.swap(false, Ordering::Relaxed)
    }
}

/// Resolve the attributes that actually hold data for `attr`.
///
/// A pass-through attribute is expanded depth-first into its outputs in
/// connection order, keeping only non-pass-through descendants. Each
/// attribute is visited at most once, so malformed or cyclic chains
/// terminate. When expansion yields nothing (or `attr` holds data itself)
/// the attribute is its own source.
pub fn find_source_attributes(attr: &AttrRef) -> Vec<WeakAttrRef> {
    let mut sources = Vec::new();
    let mut visited = HashSet::new();
    if attr
        .read()
        .expect("attribute lock poisoned")
        .is_pass_through()
    {
        collect_non_pass_outputs(attr, &mut sources, &mut visited);
    }
    if sources.is_empty() {
        sources.push(Arc::downgrade(attr));
    }
    sources
}

fn collect_non_pass_outputs(
    attr: &AttrRef,
    sources: &mut Vec<WeakAttrRef>,
    visited: &mut HashSet<Uuid>,
) {
    let (uuid, pass_through, outputs) = {
        let a = attr.read().expect("attribute lock poisoned");
        (a.uuid(), a.is_pass_through(), a.outputs())
    };
    if !visited.insert(uuid) {
        return;
    }
    if !pass_through {
        sources.push(Arc::downgrade(attr));
        return;
    }
    for output in outputs {
        collect_non_pass_outputs(&output, sources, visited);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{affects, connect, Attribute, Graph, Node, Value};
    use std::sync::RwLock;

    fn attr_ref(attr: Attribute) -> AttrRef {
        Arc::new(RwLock::new(attr))
    }

    fn uuids(sources: &[WeakAttrRef]) -> Vec<Uuid> {
        sources
            .iter()
            .filter_map(Weak::upgrade)
            .map(|a| a.read().unwrap().uuid())
            .collect()
    }

    #[test]
    fn test_plain_attribute_is_its_own_source() {
        let a = attr_ref(Attribute::new("a", Value::Float(0.0)));
        let sources = find_source_attributes(&a);
        assert_eq!(uuids(&sources), vec![a.read().unwrap().uuid()]);
    }

    #[test]
    fn test_pass_through_expands_in_output_order() {
        let p = attr_ref(Attribute::pass_through("p", Value::Float(0.0)));
        let a = attr_ref(Attribute::new("a", Value::Float(0.0)));
        let b = attr_ref(Attribute::new("b", Value::Float(0.0)));
        connect(&p, &a).unwrap();
        connect(&p, &b).unwrap();

        let sources = find_source_attributes(&p);
        assert_eq!(
            uuids(&sources),
            vec![a.read().unwrap().uuid(), b.read().unwrap().uuid()]
        );

        // Idempotent: resolving again yields the same set in the same order
        let again = find_source_attributes(&p);
        assert_eq!(uuids(&sources), uuids(&again));
    }

    #[test]
    fn test_nested_pass_through_chain() {
        let p1 = attr_ref(Attribute::pass_through("p1", Value::Int(0)));
        let p2 = attr_ref(Attribute::pass_through("p2", Value::Int(0)));
        let leaf = attr_ref(Attribute::new("leaf", Value::Int(0)));
        connect(&p1, &p2).unwrap();
        connect(&p2, &leaf).unwrap();

        let sources = find_source_attributes(&p1);
        assert_eq!(uuids(&sources), vec![leaf.read().unwrap().uuid()]);
    }

    #[test]
    fn test_pass_through_without_outputs_falls_back_to_itself() {
        let p = attr_ref(Attribute::pass_through("p", Value::Float(0.0)));
        let sources = find_source_attributes(&p);
        assert_eq!(uuids(&sources), vec![p.read().unwrap().uuid()]);
    }

    #[test]
    fn test_pass_through_cycle_terminates_with_fallback() {
        let p1 = attr_ref(Attribute::pass_through("p1", Value::Int(0)));
        let p2 = attr_ref(Attribute::pass_through("p2", Value::Int(0)));
        p1.write().unwrap().add_output(Arc::downgrade(&p2));
        p2.write().unwrap().add_output(Arc::downgrade(&p1));

        let sources = find_source_attributes(&p1);
        // No data holder anywhere in the cycle: the attribute itself is used
        assert_eq!(uuids(&sources), vec![p1.read().unwrap().uuid()]);
    }

    #[test]
    fn test_derived_attribute_label_prefix() {
        let mut graph = Graph::new();
        let node = graph.add_node(Node::new("sphere1"));
        let (radius, area) = {
            let mut n = node.write().unwrap();
            let radius = n
                .add_attribute(Attribute::new("radius", Value::Float(1.0)))
                .unwrap();
            let area = n
                .add_attribute(Attribute::new("area", Value::Float(0.0)))
                .unwrap();
            (radius, area)
        };
        affects(&radius, &area);

        let plain = AttributeField::new(&radius, graph.hub());
        assert_eq!(plain.field().label(), "radius");

        let derived = AttributeField::new(&area, graph.hub());
        assert_eq!(derived.field().label(), ">area");
    }

    #[test]
    fn test_dead_attribute_is_inert() {
        let hub = NotifyHub::new();
        let field = {
            let a = attr_ref(Attribute::new("a", Value::Float(0.0)));
            AttributeField::new(&a, &hub)
            // a dropped here
        };
        assert!(field.bound_attr().is_none());
        assert!(field.canonical().is_none());
        assert!(!field.field().object().is_alive());
    }

    #[test]
    fn test_spinner_respects_editing() {
        let hub = NotifyHub::new();
        let a = attr_ref(Attribute::new("a", Value::Float(0.0)));
        let mut field = AttributeField::new(&a, &hub);

        hub.emit(GraphNotice::ExternalThreadActive(true));
        assert!(field.field().show_spinner_instead());

        // Mid-edit widgets keep their widget visible
        field.field_mut().set_editing(true);
        assert!(!field.field().show_spinner_instead());

        field.field_mut().set_editing(false);
        hub.emit(GraphNotice::ExternalThreadActive(false));
        assert!(!field.field().show_spinner_instead());
    }

    #[test]
    fn test_forced_spinning_override() {
        let hub = NotifyHub::new();
        let a = attr_ref(Attribute::new("a", Value::Float(0.0)));
        let mut field = AttributeField::new(&a, &hub);

        field.field_mut().set_editing(true);
        field.field_mut().set_spinning(true, false);
        assert!(!field.field().is_spinning());

        field.field_mut().set_spinning(true, true);
        assert!(field.field().is_spinning());
    }
}
