//! Graph change notices consumed by inspector fields.
//!
//! Notices identify the changed object but carry no value payload:
//! observers re-read the current state from the graph. Emitted by
//! [`force_dirty`](super::attribute::force_dirty), by node renames, and by
//! whoever runs background computation.

use uuid::Uuid;

/// State changes observers can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNotice {
    /// An attribute's value (or pending out value) changed; re-read it
    AttributeValueChanged(Uuid),

    /// A node was renamed
    NameChanged(Uuid),

    /// Background computation started/stopped. Toggles the spinner
    /// affordance only; advisory, not a correctness mechanism
    ExternalThreadActive(bool),
}
