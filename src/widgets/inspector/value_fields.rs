//! Typed value fields: one variant per slot type.
//!
//! Every variant supplies the four accessors - read/write widget value,
//! read/write attribute value - and the shared sync logic in [`ValueField`]
//! does the rest:
//!
//! - `widget_value_changed` (user -> model): push the widget value into every
//!   source attribute whose current value differs, then force the bound
//!   attribute dirty so the engine recomputes dependents.
//! - `attribute_value_changed` (model -> widget): pull the canonical source
//!   value into the widget only if it differs. Never writes the model, which
//!   is what breaks the notification loop.
//!
//! [`FieldKind`] is the closed set the panel stores rows as.

use eframe::egui::Ui;
use enum_dispatch::enum_dispatch;
use log::trace;

use crate::config::{FLOAT_FIELD_DECIMALS, FLOAT_FIELD_MAX, FLOAT_FIELD_STEP, INT_FIELD_MAX};
use crate::core::notify::NotifyHub;
use crate::graph::{force_dirty, AttrRef, Attribute, Value};
use crate::widgets::spin;

use super::field::AttributeField;
use super::name_field::NameField;

/// Rendering surface of every inspector row.
#[enum_dispatch]
pub trait InspectorField {
    /// Row label ('>'-prefixed for computed attributes)
    fn label(&self) -> &str;

    /// Busy spinner should replace this row's value widget
    fn spinning(&self) -> bool;

    /// Render the value cell. Hidden entirely while spinning.
    fn show(&mut self, ui: &mut Ui);
}

/// Typed accessor set plus the shared sync contract.
pub trait ValueField {
    fn base(&self) -> &AttributeField;

    /// Current widget value
    fn get_widget_value(&self) -> Value;

    /// Push a value into the widget
    fn set_widget_value(&mut self, value: Value);

    /// Typed read of the attribute's current value
    fn get_attribute_value(&self, attr: &Attribute) -> Value;

    /// Typed write into the attribute's out slot
    fn set_attribute_value(&self, attr: &mut Attribute, value: &Value);

    /// User finished an edit: write differing sources, dirty the bound
    /// attribute. Sources already equal to the new value are not rewritten.
    fn widget_value_changed(&self) {
        let value = self.get_widget_value();
        trace!(
            "{}: commit {:?}",
            self.base().field().label(),
            value
        );
        for weak in self.base().sources().to_vec() {
            let Some(src) = weak.upgrade() else { continue };
            let mut attr = src.write().expect("attribute lock poisoned");
            if self.get_attribute_value(&attr) != value {
                self.set_attribute_value(&mut attr, &value);
            }
        }
        if let Some(bound) = self.base().bound_attr() {
            force_dirty(&bound);
        }
    }

    /// Change notice arrived: pull the canonical value into the widget if it
    /// differs. Read-only toward the model.
    fn attribute_value_changed(&mut self) {
        let Some(canonical) = self.base().canonical() else {
            return;
        };
        let value = {
            let attr = canonical.read().expect("attribute lock poisoned");
            self.get_attribute_value(&attr)
        };
        if value != self.get_widget_value() {
            self.set_widget_value(value);
        }
    }

    /// Drain a pending refresh flagged by the subscription callback.
    fn sync_from_model(&mut self) {
        if self.base().take_refresh() {
            self.attribute_value_changed();
        }
    }
}

fn round_decimals(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// === Float ===

pub struct FloatValueField {
    base: AttributeField,
    shown: f64,
}

impl FloatValueField {
    pub fn new(attr: &AttrRef, hub: &NotifyHub) -> Self {
        let mut field = Self {
            base: AttributeField::new(attr, hub),
            shown: 0.0,
        };
        field.sync_from_model();
        field
    }

    /// Commit path shared by edit-finished and wheel stepping: displayed
    /// precision is what gets written.
    pub fn commit_edit(&mut self) {
        self.shown = round_decimals(self.shown, FLOAT_FIELD_DECIMALS);
        self.widget_value_changed();
    }
}

impl ValueField for FloatValueField {
    fn base(&self) -> &AttributeField {
        &self.base
    }

    fn get_widget_value(&self) -> Value {
        Value::Float(self.shown)
    }

    fn set_widget_value(&mut self, value: Value) {
        if let Some(v) = value.as_float() {
            self.shown = v;
        }
    }

    fn get_attribute_value(&self, attr: &Attribute) -> Value {
        Value::Float(attr.value().as_float().unwrap_or_default())
    }

    fn set_attribute_value(&self, attr: &mut Attribute, value: &Value) {
        if let Some(v) = value.as_float() {
            attr.set_out_float(v);
        }
    }
}

impl InspectorField for FloatValueField {
    fn label(&self) -> &str {
        self.base.field().label()
    }

    fn spinning(&self) -> bool {
        self.base.field().show_spinner_instead()
    }

    fn show(&mut self, ui: &mut Ui) {
        self.sync_from_model();
        if self.spinning() {
            return;
        }
        let resp = spin::float_spin(
            ui,
            &mut self.shown,
            -FLOAT_FIELD_MAX..=FLOAT_FIELD_MAX,
            FLOAT_FIELD_STEP,
            FLOAT_FIELD_DECIMALS,
        );
        self.base.field_mut().set_editing(resp.active);
        if resp.committed {
            self.commit_edit();
        }
    }
}

// === Int ===

pub struct IntValueField {
    base: AttributeField,
    shown: i32,
}

impl IntValueField {
    pub fn new(attr: &AttrRef, hub: &NotifyHub) -> Self {
        let mut field = Self {
            base: AttributeField::new(attr, hub),
            shown: 0,
        };
        field.sync_from_model();
        field
    }
}

impl ValueField for IntValueField {
    fn base(&self) -> &AttributeField {
        &self.base
    }

    fn get_widget_value(&self) -> Value {
        Value::Int(self.shown)
    }

    fn set_widget_value(&mut self, value: Value) {
        if let Some(v) = value.as_int() {
            self.shown = v;
        }
    }

    fn get_attribute_value(&self, attr: &Attribute) -> Value {
        Value::Int(attr.value().as_int().unwrap_or_default())
    }

    fn set_attribute_value(&self, attr: &mut Attribute, value: &Value) {
        if let Some(v) = value.as_int() {
            attr.set_out_int(v);
        }
    }
}

impl InspectorField for IntValueField {
    fn label(&self) -> &str {
        self.base.field().label()
    }

    fn spinning(&self) -> bool {
        self.base.field().show_spinner_instead()
    }

    fn show(&mut self, ui: &mut Ui) {
        self.sync_from_model();
        if self.spinning() {
            return;
        }
        let resp = spin::int_spin(ui, &mut self.shown, -INT_FIELD_MAX..=INT_FIELD_MAX);
        self.base.field_mut().set_editing(resp.active);
        if resp.committed {
            self.widget_value_changed();
        }
    }
}

// === Bool ===

pub struct BoolValueField {
    base: AttributeField,
    shown: bool,
}

impl BoolValueField {
    pub fn new(attr: &AttrRef, hub: &NotifyHub) -> Self {
        let mut field = Self {
            base: AttributeField::new(attr, hub),
            shown: false,
        };
        field.sync_from_model();
        field
    }
}

impl ValueField for BoolValueField {
    fn base(&self) -> &AttributeField {
        &self.base
    }

    fn get_widget_value(&self) -> Value {
        Value::Bool(self.shown)
    }

    fn set_widget_value(&mut self, value: Value) {
        if let Some(v) = value.as_bool() {
            self.shown = v;
        }
    }

    fn get_attribute_value(&self, attr: &Attribute) -> Value {
        Value::Bool(attr.value().as_bool().unwrap_or_default())
    }

    fn set_attribute_value(&self, attr: &mut Attribute, value: &Value) {
        if let Some(v) = value.as_bool() {
            attr.set_out_bool(v);
        }
    }
}

impl InspectorField for BoolValueField {
    fn label(&self) -> &str {
        self.base.field().label()
    }

    fn spinning(&self) -> bool {
        self.base.field().show_spinner_instead()
    }

    fn show(&mut self, ui: &mut Ui) {
        self.sync_from_model();
        if self.spinning() {
            return;
        }
        // State change commits immediately; there is no mid-edit state
        self.base.field_mut().set_editing(false);
        if ui.checkbox(&mut self.shown, "").changed() {
            self.widget_value_changed();
        }
    }
}

// === String ===

pub struct StringValueField {
    base: AttributeField,
    shown: String,
}

impl StringValueField {
    pub fn new(attr: &AttrRef, hub: &NotifyHub) -> Self {
        let mut field = Self {
            base: AttributeField::new(attr, hub),
            shown: String::new(),
        };
        field.sync_from_model();
        field
    }
}

impl ValueField for StringValueField {
    fn base(&self) -> &AttributeField {
        &self.base
    }

    fn get_widget_value(&self) -> Value {
        Value::Str(self.shown.clone())
    }

    fn set_widget_value(&mut self, value: Value) {
        if let Some(v) = value.as_str() {
            self.shown = v.to_string();
        }
    }

    fn get_attribute_value(&self, attr: &Attribute) -> Value {
        Value::Str(attr.value().as_str().unwrap_or_default().to_string())
    }

    fn set_attribute_value(&self, attr: &mut Attribute, value: &Value) {
        if let Some(v) = value.as_str() {
            attr.set_out_str(v);
        }
    }
}

impl InspectorField for StringValueField {
    fn label(&self) -> &str {
        self.base.field().label()
    }

    fn spinning(&self) -> bool {
        self.base.field().show_spinner_instead()
    }

    fn show(&mut self, ui: &mut Ui) {
        self.sync_from_model();
        if self.spinning() {
            return;
        }
        let resp = ui.text_edit_singleline(&mut self.shown);
        self.base.field_mut().set_editing(resp.has_focus());
        if resp.lost_focus() {
            self.widget_value_changed();
        }
    }
}

/// Closed set of inspector rows.
#[enum_dispatch(InspectorField)]
pub enum FieldKind {
    Float(FloatValueField),
    Int(IntValueField),
    Bool(BoolValueField),
    Str(StringValueField),
    Name(NameField),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{connect, Attribute, Graph, GraphNotice, Node};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};

    fn graph_with_float(initial: f64) -> (Graph, AttrRef) {
        let mut graph = Graph::new();
        let node = graph.add_node(Node::new("sphere1"));
        let attr = node
            .write()
            .unwrap()
            .add_attribute(Attribute::new("radius", Value::Float(initial)))
            .unwrap();
        (graph, attr)
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
    fn test_round_trip_commit() {
        let (graph, attr) = graph_with_float(1.0);
        let mut field = FloatValueField::new(&attr, graph.hub());
        assert_eq!(field.get_widget_value(), Value::Float(1.0));

        field.set_widget_value(Value::Float(2.5));
        field.commit_edit();

        assert_eq!(attr.read().unwrap().value(), Value::Float(2.5));
        assert!(attr.read().unwrap().is_dirty());
    }

    #[test]
    fn test_commit_writes_only_differing_sources() {
        let mut graph = Graph::new();
        let node = graph.add_node(Node::new("group1"));
        let (p, a, b) = {
            let mut n = node.write().unwrap();
            let p = n
                .add_attribute(Attribute::pass_through("size", Value::Int(0)))
                .unwrap();
            let a = n.add_attribute(Attribute::new("a", Value::Int(5))).unwrap();
            let b = n.add_attribute(Attribute::new("b", Value::Int(7))).unwrap();
            (p, a, b)
        };
        connect(&p, &a).unwrap();
        connect(&p, &b).unwrap();

        // b already holds the committed value; plant a sentinel in its out
        // slot to observe whether commit rewrites it
        b.write().unwrap().set_out_int(99);

        let mut field = IntValueField::new(&p, graph.hub());
        field.set_widget_value(Value::Int(7));
        field.widget_value_changed();

        // a differed: rewritten. b was equal: out slot untouched.
        assert_eq!(a.read().unwrap().out_value(), &Value::Int(7));
        assert_eq!(b.read().unwrap().out_value(), &Value::Int(99));
    }

    #[test]
    fn test_refresh_never_writes_back() {
        let (graph, attr) = graph_with_float(1.0);
        let mut field = FloatValueField::new(&attr, graph.hub());
        let count = count_value_changes(graph.hub());

        field.set_widget_value(Value::Float(2.5));
        field.commit_edit();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // The commit's own notice flagged a refresh; draining it must not
        // emit anything new
        field.sync_from_model();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(field.get_widget_value(), Value::Float(2.5));
    }

    #[test]
    fn test_external_change_pulls_into_widget() {
        let (graph, attr) = graph_with_float(1.0);
        let mut field = FloatValueField::new(&attr, graph.hub());

        {
            let mut a = attr.write().unwrap();
            a.set_out_float(8.0);
        }
        crate::graph::force_dirty(&attr);

        field.sync_from_model();
        assert_eq!(field.get_widget_value(), Value::Float(8.0));
    }

    #[test]
    fn test_float_commit_rounds_to_four_decimals() {
        let (graph, attr) = graph_with_float(0.0);
        let mut field = FloatValueField::new(&attr, graph.hub());

        field.set_widget_value(Value::Float(3.14159));
        field.commit_edit();

        assert_eq!(field.get_widget_value(), Value::Float(3.1416));
        assert_eq!(attr.read().unwrap().value(), Value::Float(3.1416));
    }

    #[test]
    fn test_dead_attribute_commit_is_noop() {
        let hub = NotifyHub::new();
        let count = count_value_changes(&hub);
        let field = {
            let attr = Arc::new(RwLock::new(Attribute::new("a", Value::Int(1))));
            IntValueField::new(&attr, &hub)
        };
        // Bound object gone: nothing to write, nothing to dirty
        field.widget_value_changed();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_pass_through_field_edits_descendants() {
        let mut graph = Graph::new();
        let node = graph.add_node(Node::new("group1"));
        let (p, leaf) = {
            let mut n = node.write().unwrap();
            let p = n
                .add_attribute(Attribute::pass_through("size", Value::Float(0.0)))
                .unwrap();
            let leaf = n
                .add_attribute(Attribute::new("width", Value::Float(1.0)))
                .unwrap();
            (p, leaf)
        };
        connect(&p, &leaf).unwrap();

        let mut field = FloatValueField::new(&p, graph.hub());
        // Canonical read comes from the resolved descendant
        assert_eq!(field.get_widget_value(), Value::Float(1.0));

        field.set_widget_value(Value::Float(4.0));
        field.commit_edit();
        assert_eq!(leaf.read().unwrap().value(), Value::Float(4.0));
    }
}
