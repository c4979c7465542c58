//! Numeric spin editors with wheel stepping.
//!
//! Thin DragValue wrappers that report edit *completion* separately from
//! per-keystroke changes, so fields can commit on edit-finished the way the
//! rest of the inspector does. A wheel scroll over a hovered editor adjusts
//! the value by one step and counts as a finished edit, not a silent visual
//! change.

use std::ops::RangeInclusive;

use eframe::egui::{self, Ui};

/// Outcome of one spin editor pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinResponse {
    /// Value was modified this frame (possibly mid-edit)
    pub changed: bool,
    /// Edit finished this frame: drag released, focus lost, or wheel step
    pub committed: bool,
    /// Editor is being interacted with (dragged or focused)
    pub active: bool,
}

/// Float spin editor. `decimals` bounds the displayed precision.
pub fn float_spin(
    ui: &mut Ui,
    value: &mut f64,
    range: RangeInclusive<f64>,
    step: f64,
    decimals: usize,
) -> SpinResponse {
    let resp = ui.add(
        egui::DragValue::new(value)
            .speed(step)
            .range(range.clone())
            .max_decimals(decimals),
    );

    let mut out = SpinResponse {
        changed: resp.changed(),
        committed: resp.drag_stopped() || resp.lost_focus(),
        active: resp.dragged() || resp.has_focus(),
    };

    if let Some(steps) = wheel_steps(ui, &resp) {
        *value = (*value + step * steps).clamp(*range.start(), *range.end());
        out.changed = true;
        out.committed = true;
    }
    out
}

/// Int spin editor, stepping by 1.
pub fn int_spin(ui: &mut Ui, value: &mut i32, range: RangeInclusive<i32>) -> SpinResponse {
    let resp = ui.add(egui::DragValue::new(value).speed(1.0).range(range.clone()));

    let mut out = SpinResponse {
        changed: resp.changed(),
        committed: resp.drag_stopped() || resp.lost_focus(),
        active: resp.dragged() || resp.has_focus(),
    };

    if let Some(steps) = wheel_steps(ui, &resp) {
        *value = value.saturating_add(steps as i32).clamp(*range.start(), *range.end());
        out.changed = true;
        out.committed = true;
    }
    out
}

/// Wheel movement over a hovered editor, as whole steps. None when idle.
fn wheel_steps(ui: &Ui, resp: &egui::Response) -> Option<f64> {
    if !resp.hovered() {
        return None;
    }
    let scroll = ui.input(|i| i.raw_scroll_delta.y);
    if scroll == 0.0 {
        return None;
    }
    Some(if scroll > 0.0 { 1.0 } else { -1.0 })
}
