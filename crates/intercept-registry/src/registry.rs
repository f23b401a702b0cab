//! In-memory behavior registry.
//!
//! Each behavior is registered with the selector tags it binds to and a
//! priority. A behavior applies to a call when *all* of its bindings are in the
//! call's selector set. Applicable behaviors are returned in ascending priority
//! order; ties keep registration order.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use proxy_intercept_core::{BehaviorHandle, BehaviorResolver};
use proxy_intercept_types::{Tag, TagSet};
use tracing::{debug, info};

use crate::error::RegistryError;

/// Result type for registry operations
type RegistryResult<T> = Result<T, RegistryError>;

/// Priority used when none is given.
pub const DEFAULT_PRIORITY: i32 = 0;

struct Registration<T, A, R, E> {
    name: String,
    bindings: Vec<Tag>,
    priority: i32,
    sequence: u64,
    behavior: BehaviorHandle<T, A, R, E>,
}

impl<T, A, R, E> Registration<T, A, R, E> {
    fn order_key(&self) -> (i32, u64) {
        (self.priority, self.sequence)
    }
}

/// Summary of one registered behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredBehavior {
    pub name: String,
    pub bindings: Vec<Tag>,
    pub priority: i32,
}

/// Thread-safe registry resolving selector sets to ordered behavior chains.
pub struct BehaviorRegistry<T, A, R, E> {
    /// Kept sorted by (priority, registration sequence)
    entries: RwLock<Vec<Registration<T, A, R, E>>>,
    next_sequence: AtomicU64,
}

impl<T, A, R, E> Default for BehaviorRegistry<T, A, R, E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
        }
    }
}

impl<T, A, R, E> BehaviorRegistry<T, A, R, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behavior under its own name.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - a behavior with the same name is already registered
    /// - `bindings` is empty
    pub fn register(
        &self,
        behavior: BehaviorHandle<T, A, R, E>,
        bindings: Vec<Tag>,
        priority: i32,
    ) -> RegistryResult<()> {
        let name = behavior.name().to_string();
        self.register_named(name, behavior, bindings, priority)
    }

    /// Register a behavior under an explicit name.
    pub fn register_named(
        &self,
        name: impl Into<String>,
        behavior: BehaviorHandle<T, A, R, E>,
        bindings: Vec<Tag>,
        priority: i32,
    ) -> RegistryResult<()> {
        let name = name.into();
        if bindings.is_empty() {
            return Err(RegistryError::NoBindings(name));
        }

        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.name == name) {
            return Err(RegistryError::DuplicateBehavior(name));
        }

        let registration = Registration {
            name,
            bindings,
            priority,
            sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            behavior,
        };
        let key = registration.order_key();
        let index = entries.partition_point(|e| e.order_key() < key);

        info!(
            behavior = %registration.name,
            priority,
            bindings = registration.bindings.len(),
            "registered behavior"
        );
        entries.insert(index, registration);
        Ok(())
    }

    /// Remove a behavior. Returns `false` if it was not registered.
    pub fn unregister(&self, name: &str) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.name != name);
        before != entries.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().iter().any(|e| e.name == name)
    }

    /// Registered behaviors in resolution order.
    pub fn list(&self) -> Vec<RegisteredBehavior> {
        self.entries
            .read()
            .iter()
            .map(|e| RegisteredBehavior {
                name: e.name.clone(),
                bindings: e.bindings.clone(),
                priority: e.priority,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T, A, R, E> BehaviorResolver<T, A, R, E> for BehaviorRegistry<T, A, R, E> {
    fn resolve(&self, tags: &TagSet) -> Vec<BehaviorHandle<T, A, R, E>> {
        let entries = self.entries.read();
        let resolved: Vec<_> = entries
            .iter()
            .filter(|e| tags.contains_all(&e.bindings))
            .map(|e| BehaviorHandle::clone(&e.behavior))
            .collect();
        debug!(bindings = %tags, resolved = resolved.len(), "resolved behaviors");
        resolved
    }
}

impl<T, A, R, E> std::fmt::Debug for BehaviorRegistry<T, A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorRegistry")
            .field("behaviors", &self.list())
            .finish()
    }
}
