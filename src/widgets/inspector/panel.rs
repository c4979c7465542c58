//! Inspector panel - one field row per inspected property.
//!
//! Builds a name row plus one typed row per attribute of the inspected
//! node, then renders them as a two-column table with a draggable splitter.
//! Fields self-synchronize through their subscriptions; the panel only owns
//! them and lays them out.

use std::sync::Arc;

use eframe::egui::{Pos2, Rect, Sense, Stroke, TextStyle, Ui};
use egui_extras::{Column, TableBuilder};
use log::debug;

use crate::config::LABEL_COLUMN_WIDTH;
use crate::core::notify::NotifyHub;
use crate::graph::{NodeRef, Value, WeakNodeRef};

use super::name_field::NameField;
use super::value_fields::{
    BoolValueField, FieldKind, FloatValueField, InspectorField, IntValueField, StringValueField,
};

/// Persistent UI state for the inspector panel.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct InspectorState {
    pub label_column_width: f32,
}

impl Default for InspectorState {
    fn default() -> Self {
        Self {
            label_column_width: LABEL_COLUMN_WIDTH,
        }
    }
}

/// Field rows for one inspected node.
pub struct Inspector {
    node: WeakNodeRef,
    fields: Vec<FieldKind>,
}

impl Inspector {
    /// Build rows for `node`: a name field first, then one typed field per
    /// attribute in declaration order.
    pub fn for_node(node: &NodeRef, hub: &NotifyHub) -> Self {
        let mut fields: Vec<FieldKind> = vec![NameField::new(node, hub).into()];
        {
            let n = node.read().expect("node lock poisoned");
            debug!("inspector: building {} rows for '{}'", n.attribute_count() + 1, n.name());
            for (_, attr) in n.attributes() {
                let current = attr.read().expect("attribute lock poisoned").value();
                fields.push(match current {
                    Value::Float(_) => FloatValueField::new(attr, hub).into(),
                    Value::Int(_) => IntValueField::new(attr, hub).into(),
                    Value::Bool(_) => BoolValueField::new(attr, hub).into(),
                    Value::Str(_) => StringValueField::new(attr, hub).into(),
                });
            }
        }
        Self {
            node: Arc::downgrade(node),
            fields,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.node.strong_count() > 0
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldKind] {
        &self.fields
    }

    /// Render the panel. Inert once the inspected node is gone.
    pub fn ui(&mut self, ui: &mut Ui, state: &mut InspectorState) {
        let Some(node) = self.node.upgrade() else {
            ui.label("(object removed)");
            return;
        };
        let title = node.read().expect("node lock poisoned").name().to_string();
        ui.label(format!("{}: {} properties", title, self.fields.len()));

        let row_height = ui
            .text_style_height(&TextStyle::Body)
            .max(ui.spacing().interact_size.y);

        // Clamp width bounds
        let available_width = ui.available_width();
        let min_label = 80.0;
        let max_label = (available_width - 120.0).max(min_label);
        state.label_column_width = state.label_column_width.clamp(min_label, max_label);

        // Track top to draw splitter across table height later
        let table_top = ui.cursor().min;

        TableBuilder::new(ui)
            .id_salt("inspector_table")
            .striped(true)
            .column(
                Column::initial(state.label_column_width)
                    .range(min_label..=max_label)
                    .resizable(false),
            )
            .column(Column::remainder())
            .body(|mut body| {
                for field in &mut self.fields {
                    body.row(row_height, |mut row| {
                        row.col(|ui| {
                            ui.label(format!("{}:", field.label()));
                            if field.spinning() {
                                ui.spinner();
                            }
                        });
                        row.col(|ui| {
                            field.show(ui);
                        });
                    });
                }
            });

        // Interactive splitter spanning the table
        let table_bottom = ui.cursor().min;
        let x = table_top.x + state.label_column_width;
        let splitter_rect = Rect::from_min_max(
            Pos2::new(x - 4.0, table_top.y),
            Pos2::new(x + 4.0, table_bottom.y),
        );
        let splitter_id = ui.make_persistent_id("inspector_splitter_drag");
        let response = ui.interact(splitter_rect, splitter_id, Sense::click_and_drag());
        if response.dragged() {
            state.label_column_width =
                (state.label_column_width + response.drag_delta().x).clamp(min_label, max_label);
        }
        let stroke = if response.hovered() || response.dragged() {
            Stroke::new(2.0, ui.visuals().strong_text_color())
        } else {
            Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color)
        };
        ui.painter().line_segment(
            [Pos2::new(x, table_top.y), Pos2::new(x, table_bottom.y)],
            stroke,
        );
    }
}
