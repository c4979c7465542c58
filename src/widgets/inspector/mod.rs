//! Inspector widget - property rows bound to graph objects.
//!
//! Each row is a field: a label plus a typed value editor weakly bound to a
//! node or attribute, kept in sync both ways through the notification hub.

mod field;
mod name_field;
mod panel;
mod value_fields;

pub use field::{find_source_attributes, AttributeField, BoundObject, ObjectField};
pub use name_field::NameField;
pub use panel::{Inspector, InspectorState};
pub use value_fields::{
    BoolValueField, FieldKind, FloatValueField, InspectorField, IntValueField, StringValueField,
    ValueField,
};
