//! Graph nodes: named owners of ordered attribute tables.
//!
//! Attribute order is meaningful (pass-through expansion follows it), so the
//! table is an IndexMap keyed by the attribute's short name. Qualified
//! attribute names ("node:attr") are assigned when an attribute is added.

use std::sync::{Arc, RwLock, Weak};

use anyhow::{bail, Result};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::core::notify::NotifyHub;

use super::attribute::{AttrRef, Attribute};
use super::events::GraphNotice;

/// Shared node handle. The graph owns these; widgets hold [`WeakNodeRef`].
pub type NodeRef = Arc<RwLock<Node>>;

/// Non-owning node handle for widgets.
pub type WeakNodeRef = Weak<RwLock<Node>>;

pub struct Node {
    uuid: Uuid,
    name: String,
    /// Short attribute name -> shared attribute, in declaration order
    attributes: IndexMap<String, AttrRef>,
    /// None until the node joins a graph
    notify: Option<NotifyHub>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            attributes: IndexMap::new(),
            notify: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node. No-op when the name is unchanged; otherwise emits
    /// [`GraphNotice::NameChanged`]. Renaming has no dirty concept.
    pub fn set_name(&mut self, name: &str) {
        if self.name == name {
            return;
        }
        self.name = name.to_string();
        if let Some(hub) = &self.notify {
            hub.emit(GraphNotice::NameChanged(self.uuid));
        }
    }

    /// Add an attribute under its short name, qualifying the attribute's
    /// full name as "node:attr". Bails on duplicate short names.
    pub fn add_attribute(&mut self, attr: Attribute) -> Result<AttrRef> {
        let key = attr.name().to_string();
        if self.attributes.contains_key(&key) {
            bail!("node '{}' already has attribute '{}'", self.name, key);
        }
        let mut attr = attr;
        attr.set_name(format!("{}:{}", self.name, key));
        if let Some(hub) = &self.notify {
            attr.attach(hub.clone());
        }
        let attr = Arc::new(RwLock::new(attr));
        self.attributes.insert(key, Arc::clone(&attr));
        Ok(attr)
    }

    /// Look up an attribute by short name.
    pub fn attribute(&self, key: &str) -> Option<AttrRef> {
        self.attributes.get(key).cloned()
    }

    /// All attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = (&String, &AttrRef)> {
        self.attributes.iter()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub(crate) fn attach(&mut self, hub: NotifyHub) {
        for attr in self.attributes.values() {
            attr.write()
                .expect("attribute lock poisoned")
                .attach(hub.clone());
        }
        self.notify = Some(hub);
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("attributes", &self.attributes.len())
            .finish()
    }
}
