//! In-memory marker catalog.
//!
//! Records which marker kinds are selectors and which are groups (with their
//! declared members). Selector and group status are properties of a marker's
//! *kind*: `CheckRole(role=admin)` and `CheckRole(role=user)` are distinct tags
//! but both are selectors once `CheckRole` is registered.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;
use proxy_intercept_core::MarkerMetadata;
use proxy_intercept_types::Tag;
use tracing::debug;

/// Thread-safe selector/group catalog.
#[derive(Debug, Default)]
pub struct MarkerCatalog {
    /// Marker kinds usable as behavior selectors
    selectors: RwLock<BTreeSet<String>>,
    /// Group kind -> declared member markers
    groups: RwLock<BTreeMap<String, Vec<Tag>>>,
}

impl MarkerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a marker kind as a selector. Returns `false` if it already was.
    pub fn register_selector(&self, kind: impl Into<String>) -> bool {
        let kind = kind.into();
        debug!(kind = %kind, "registering selector marker");
        self.selectors.write().insert(kind)
    }

    /// Declare a group kind and its member markers, replacing any previous
    /// declaration. Returns the replaced members, if any.
    pub fn register_group(&self, kind: impl Into<String>, members: Vec<Tag>) -> Option<Vec<Tag>> {
        let kind = kind.into();
        debug!(kind = %kind, members = members.len(), "registering marker group");
        self.groups.write().insert(kind, members)
    }

    pub fn unregister_selector(&self, kind: &str) -> bool {
        self.selectors.write().remove(kind)
    }

    pub fn unregister_group(&self, kind: &str) -> Option<Vec<Tag>> {
        self.groups.write().remove(kind)
    }

    pub fn is_selector_kind(&self, kind: &str) -> bool {
        self.selectors.read().contains(kind)
    }

    pub fn is_group_kind(&self, kind: &str) -> bool {
        self.groups.read().contains_key(kind)
    }

    /// Registered selector kinds, sorted.
    pub fn selector_kinds(&self) -> Vec<String> {
        self.selectors.read().iter().cloned().collect()
    }

    /// Registered groups and their members, sorted by group kind.
    pub fn groups(&self) -> Vec<(String, Vec<Tag>)> {
        self.groups
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl MarkerMetadata for MarkerCatalog {
    fn is_selector(&self, tag: &Tag) -> bool {
        self.is_selector_kind(tag.kind())
    }

    fn is_group(&self, tag: &Tag) -> bool {
        self.is_group_kind(tag.kind())
    }

    fn group_members(&self, tag: &Tag) -> Vec<Tag> {
        self.groups.read().get(tag.kind()).cloned().unwrap_or_default()
    }
}
