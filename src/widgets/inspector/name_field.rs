//! Node name row.
//!
//! Bound to a node rather than an attribute: no pass-through resolution and
//! no dirtying, renames just go straight to the node. External renames are
//! pulled into the widget through the name-changed subscription.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eframe::egui::Ui;
use log::trace;

use crate::core::notify::{NotifyHub, Subscription};
use crate::graph::{GraphNotice, NodeRef};

use super::field::{BoundObject, ObjectField};
use super::value_fields::InspectorField;

pub struct NameField {
    field: ObjectField,
    shown: String,
    refresh: Arc<AtomicBool>,
    _name_watch: Subscription,
}

impl NameField {
    pub fn new(node: &NodeRef, hub: &NotifyHub) -> Self {
        let (name, uuid) = {
            let n = node.read().expect("node lock poisoned");
            (n.name().to_string(), n.uuid())
        };
        let refresh = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&refresh);
        let _name_watch = hub.watch(move |n| {
            if matches!(n, GraphNotice::NameChanged(changed) if *changed == uuid) {
                flag.store(true, Ordering::Relaxed);
            }
        });
        Self {
            field: ObjectField::new("name", BoundObject::Node(Arc::downgrade(node)), hub),
            shown: name,
            refresh,
            _name_watch,
        }
    }

    pub fn field(&self) -> &ObjectField {
        &self.field
    }

    pub fn shown(&self) -> &str {
        &self.shown
    }

    pub fn set_shown(&mut self, text: impl Into<String>) {
        self.shown = text.into();
    }

    /// User finished editing: rename only if the text actually differs.
    pub fn widget_value_changed(&self) {
        let Some(node) = self.field.object().node() else {
            return;
        };
        let mut n = node.write().expect("node lock poisoned");
        if n.name() != self.shown {
            trace!("name: commit '{}'", self.shown);
            n.set_name(&self.shown);
        }
    }

    /// External rename arrived: pull the node's name only if it differs.
    pub fn name_changed(&mut self) {
        let Some(node) = self.field.object().node() else {
            return;
        };
        let name = node.read().expect("node lock poisoned").name().to_string();
        if name != self.shown {
            self.shown = name;
        }
    }

    /// Drain a pending refresh flagged by the subscription callback.
    pub fn sync_from_model(&mut self) {
        if self.refresh.swap(false, Ordering::Relaxed) {
            self.name_changed();
        }
    }
}

impl InspectorField for NameField {
    fn label(&self) -> &str {
        self.field.label()
    }

    fn spinning(&self) -> bool {
        self.field.show_spinner_instead()
    }

    fn show(&mut self, ui: &mut Ui) {
        self.sync_from_model();
        if self.spinning() {
            return;
        }
        let resp = ui.text_edit_singleline(&mut self.shown);
        self.field.set_editing(resp.has_focus());
        if resp.lost_focus() {
            self.widget_value_changed();
        }
    }
}
