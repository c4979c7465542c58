//! Attribute slots: typed data on graph nodes.
//!
//! Each attribute carries two value slots:
//! - `value` - the pulled/cached read side
//! - `out_value` - the written push side
//!
//! Widgets write `out_value` and then force the attribute dirty; the engine
//! promotes `out_value` into `value` when it cleans. A dirty attribute reads
//! through to its pending `out_value` so readers never observe a stale slot.
//!
//! A pass-through attribute holds no data of its own and transparently
//! forwards to its outputs; resolution of the real data holders lives in the
//! inspector field layer.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, Weak};

use log::warn;
use uuid::Uuid;

use crate::core::notify::NotifyHub;

use super::events::GraphNotice;
use super::value::Value;

/// Shared attribute handle. Nodes own these; widgets hold [`WeakAttrRef`].
pub type AttrRef = Arc<RwLock<Attribute>>;

/// Non-owning attribute handle for widgets and cross-links.
pub type WeakAttrRef = Weak<RwLock<Attribute>>;

/// Typed data slot on a graph node.
#[derive(Debug)]
pub struct Attribute {
    uuid: Uuid,
    /// Qualified as "node:attr" once attached to a node
    name: String,
    /// Read side (cached)
    value: Value,
    /// Write side (pending)
    out_value: Value,
    pass_through: bool,
    dirty: bool,
    /// Upstream connection feeding this attribute
    input: Option<Uuid>,
    /// Attributes this one feeds, in connection order
    outputs: Vec<WeakAttrRef>,
    /// Computed attributes downstream of this one
    affects: Vec<WeakAttrRef>,
    /// Upstream dependencies this attribute is computed from
    affected_by: Vec<Uuid>,
    /// None until the owning node joins a graph
    notify: Option<NotifyHub>,
}

impl Attribute {
    /// Create a data-holding attribute with both slots initialized.
    pub fn new(name: impl Into<String>, initial: Value) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            value: initial.clone(),
            out_value: initial,
            pass_through: false,
            dirty: false,
            input: None,
            outputs: Vec::new(),
            affects: Vec::new(),
            affected_by: Vec::new(),
            notify: None,
        }
    }

    /// Create a pass-through relay. `proto` fixes the slot type; the slots
    /// themselves are never the data source.
    pub fn pass_through(name: impl Into<String>, proto: Value) -> Self {
        let mut attr = Self::new(name, proto);
        attr.pass_through = true;
        attr
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn is_pass_through(&self) -> bool {
        self.pass_through
    }

    // --- Value slots ---

    /// Current value (read side). A dirty attribute reads through to the
    /// pending out value.
    pub fn value(&self) -> Value {
        if self.dirty {
            self.out_value.clone()
        } else {
            self.value.clone()
        }
    }

    /// Pending out value (write side).
    pub fn out_value(&self) -> &Value {
        &self.out_value
    }

    /// Write the out slot. The slot type is fixed at construction; a
    /// mismatched variant is dropped with a warning.
    pub fn set_out_value(&mut self, value: Value) {
        if !self.out_value.same_type(&value) {
            warn!(
                "attribute '{}': {} slot cannot take a {} value",
                self.name,
                self.out_value.type_name(),
                value.type_name()
            );
            return;
        }
        self.out_value = value;
    }

    pub fn set_out_float(&mut self, v: f64) {
        self.set_out_value(Value::Float(v));
    }

    pub fn set_out_int(&mut self, v: i32) {
        self.set_out_value(Value::Int(v));
    }

    pub fn set_out_bool(&mut self, v: bool) {
        self.set_out_value(Value::Bool(v));
    }

    pub fn set_out_str(&mut self, v: impl Into<String>) {
        self.set_out_value(Value::Str(v.into()));
    }

    // --- Dirty tracking ---

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Engine-side: promote the pending out value into the read slot.
    pub fn clean(&mut self) {
        self.value = self.out_value.clone();
        self.dirty = false;
    }

    // --- Connections ---

    pub fn input(&self) -> Option<Uuid> {
        self.input
    }

    pub(crate) fn set_input(&mut self, input: Option<Uuid>) {
        self.input = input;
    }

    /// Downstream attributes this one feeds, in connection order.
    /// Dead links are skipped.
    pub fn outputs(&self) -> Vec<AttrRef> {
        self.outputs.iter().filter_map(Weak::upgrade).collect()
    }

    pub(crate) fn add_output(&mut self, output: WeakAttrRef) {
        self.outputs.push(output);
    }

    pub fn affected_by(&self) -> &[Uuid] {
        &self.affected_by
    }

    pub(crate) fn add_affected_by(&mut self, uuid: Uuid) {
        self.affected_by.push(uuid);
    }

    pub(crate) fn add_affects(&mut self, attr: WeakAttrRef) {
        self.affects.push(attr);
    }

    pub(crate) fn attach(&mut self, hub: NotifyHub) {
        self.notify = Some(hub);
    }

    fn downstream(&self) -> Vec<AttrRef> {
        self.outputs
            .iter()
            .chain(self.affects.iter())
            .filter_map(Weak::upgrade)
            .collect()
    }
}

/// Mark `root` and everything downstream of it dirty, emitting a value
/// change notice per touched attribute.
///
/// Iterative traversal with a visited set: malformed or cyclic output
/// chains terminate, each attribute is visited at most once. Locks are
/// taken one attribute at a time and released before the notice goes out.
pub fn force_dirty(root: &AttrRef) {
    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut stack: Vec<AttrRef> = vec![Arc::clone(root)];

    while let Some(attr) = stack.pop() {
        let (uuid, notify, downstream) = {
            let mut a = attr.write().expect("attribute lock poisoned");
            if !visited.insert(a.uuid) {
                continue;
            }
            a.dirty = true;
            (a.uuid, a.notify.clone(), a.downstream())
        };
        if let Some(hub) = notify {
            hub.emit(GraphNotice::AttributeValueChanged(uuid));
        }
        stack.extend(downstream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn attr_ref(attr: Attribute) -> AttrRef {
        Arc::new(RwLock::new(attr))
    }

    fn count_value_changes(hub: &NotifyHub) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        hub.subscribe(move |n| {
            if matches!(n, GraphNotice::AttributeValueChanged(_)) {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });
        count
    }

    #[test]
    fn test_dirty_reads_through_to_out_value() {
        let mut attr = Attribute::new("radius", Value::Float(1.0));
        attr.set_out_float(2.5);
        // Not yet dirty: read side still serves the cached value
        assert_eq!(attr.value(), Value::Float(1.0));

        attr.mark_dirty();
        assert_eq!(attr.value(), Value::Float(2.5));

        attr.clean();
        assert!(!attr.is_dirty());
        assert_eq!(attr.value(), Value::Float(2.5));
    }

    #[test]
    fn test_typed_setter_rejects_mismatch() {
        let mut attr = Attribute::new("radius", Value::Float(1.0));
        attr.set_out_value(Value::Str("oops".into()));
        assert_eq!(attr.out_value(), &Value::Float(1.0));
    }

    #[test]
    fn test_force_dirty_propagates_and_notifies() {
        let hub = NotifyHub::new();
        let count = count_value_changes(&hub);
        let a = attr_ref(Attribute::new("a", Value::Int(0)));
        let b = attr_ref(Attribute::new("b", Value::Int(0)));
        let c = attr_ref(Attribute::new("c", Value::Int(0)));

        for attr in [&a, &b, &c] {
            attr.write().unwrap().attach(hub.clone());
        }
        a.write().unwrap().add_output(Arc::downgrade(&b));
        b.write().unwrap().add_affects(Arc::downgrade(&c));

        force_dirty(&a);

        assert!(a.read().unwrap().is_dirty());
        assert!(b.read().unwrap().is_dirty());
        assert!(c.read().unwrap().is_dirty());
        // One notice per touched attribute
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_force_dirty_terminates_on_cycle() {
        let hub = NotifyHub::new();
        let count = count_value_changes(&hub);
        let a = attr_ref(Attribute::pass_through("a", Value::Int(0)));
        let b = attr_ref(Attribute::pass_through("b", Value::Int(0)));
        for attr in [&a, &b] {
            attr.write().unwrap().attach(hub.clone());
        }
        a.write().unwrap().add_output(Arc::downgrade(&b));
        b.write().unwrap().add_output(Arc::downgrade(&a));

        // Must not hang or deadlock, and each attribute fires exactly once
        force_dirty(&a);
        assert!(a.read().unwrap().is_dirty());
        assert!(b.read().unwrap().is_dirty());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_force_dirty_skips_dead_links() {
        let a = attr_ref(Attribute::new("a", Value::Int(0)));
        {
            let b = attr_ref(Attribute::new("b", Value::Int(0)));
            a.write().unwrap().add_output(Arc::downgrade(&b));
            // b dropped here
        }
        force_dirty(&a);
        assert!(a.read().unwrap().is_dirty());
    }

    #[test]
    fn test_detached_attribute_dirties_silently() {
        // No graph yet: dirtying works, nothing to notify
        let a = attr_ref(Attribute::new("a", Value::Int(0)));
        force_dirty(&a);
        assert!(a.read().unwrap().is_dirty());
    }
}
