//! JSON manifests describing selectors, groups, behaviors and proxied types.
//!
//! A manifest is the declarative counterpart of calling
//! [`MarkerCatalog::register_selector`], [`MarkerCatalog::register_group`] and
//! [`BehaviorRegistry::register`] by hand:
//!
//! ```json
//! {
//!   "selectors": ["Audited", "CheckRole"],
//!   "groups": { "Secured": ["CheckRole", "CheckScope"] },
//!   "behaviors": [{ "name": "AuditBehavior", "bindings": ["Audited"], "priority": 100 }],
//!   "types": [{ "name": "AccountService", "markers": ["Audited"],
//!               "methods": [{ "name": "transfer", "markers": ["Secured"] }] }]
//! }
//! ```
//!
//! Tags are either a short string (`"CheckRole(role=admin)"`) or an object
//! (`{"kind": "CheckRole", "attributes": {"role": "admin"}}`).

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use proxy_intercept_core::BehaviorHandle;
use proxy_intercept_types::{MethodMetadata, Tag, TypeMetadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::MarkerCatalog;
use crate::error::{ManifestError, RegistryError};
use crate::registry::{BehaviorRegistry, DEFAULT_PRIORITY};

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// A behavior declaration: which selectors it binds to and where it sits in
/// the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSpec {
    pub name: String,
    pub bindings: Vec<Tag>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// A proxied type as a manifest declares it: the type's own metadata plus the
/// methods that can be looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    #[serde(flatten)]
    pub metadata: TypeMetadata,
    #[serde(default)]
    pub methods: Vec<MethodMetadata>,
}

impl TypeSpec {
    pub fn new(metadata: TypeMetadata) -> Self {
        Self {
            metadata,
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Declare a method on the type.
    pub fn with_method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }

    /// Find a declared method by name.
    pub fn method(&self, name: &str) -> Option<&MethodMetadata> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Marker kinds usable as behavior selectors
    pub selectors: Vec<String>,
    /// Group kind -> member markers
    pub groups: BTreeMap<String, Vec<Tag>>,
    pub behaviors: Vec<BehaviorSpec>,
    pub types: Vec<TypeSpec>,
}

impl Manifest {
    /// Load and validate a manifest file.
    pub fn from_path(path: impl AsRef<Path>) -> ManifestResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Self = text.parse()?;
        info!(
            path = %path.display(),
            selectors = manifest.selectors.len(),
            groups = manifest.groups.len(),
            behaviors = manifest.behaviors.len(),
            types = manifest.types.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Check the manifest is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - two behaviors share a name
    /// - a behavior declares no bindings
    /// - a behavior binds a kind that is not a declared selector
    /// - two types share a name
    pub fn validate(&self) -> ManifestResult<()> {
        let selectors: HashSet<&str> = self.selectors.iter().map(String::as_str).collect();

        let mut names = HashSet::new();
        for behavior in &self.behaviors {
            if !names.insert(behavior.name.as_str()) {
                let name = behavior.name.clone();
                return Err(RegistryError::DuplicateBehavior(name).into());
            }
            if behavior.bindings.is_empty() {
                return Err(RegistryError::NoBindings(behavior.name.clone()).into());
            }
            if let Some(unknown) = behavior
                .bindings
                .iter()
                .find(|tag| !selectors.contains(tag.kind()))
            {
                return Err(ManifestError::UnknownSelector {
                    behavior: behavior.name.clone(),
                    kind: unknown.kind().to_string(),
                });
            }
        }

        let mut type_names = HashSet::new();
        for ty in &self.types {
            if !type_names.insert(ty.name()) {
                return Err(ManifestError::DuplicateType(ty.name().to_string()));
            }
        }
        Ok(())
    }

    /// Build a catalog holding the declared selectors and groups.
    pub fn build_catalog(&self) -> MarkerCatalog {
        let catalog = MarkerCatalog::new();
        for kind in &self.selectors {
            catalog.register_selector(kind.as_str());
        }
        for (kind, members) in &self.groups {
            catalog.register_group(kind.as_str(), members.clone());
        }
        catalog
    }

    /// Build a registry, asking `factory` for the implementation of each
    /// declared behavior. The behavior is registered under its manifest name.
    pub fn build_registry<T, A, R, E, F>(
        &self,
        mut factory: F,
    ) -> ManifestResult<BehaviorRegistry<T, A, R, E>>
    where
        F: FnMut(&BehaviorSpec) -> BehaviorHandle<T, A, R, E>,
    {
        let registry = BehaviorRegistry::new();
        for spec in &self.behaviors {
            debug!(behavior = %spec.name, "instantiating behavior");
            registry.register_named(
                spec.name.clone(),
                factory(spec),
                spec.bindings.clone(),
                spec.priority,
            )?;
        }
        Ok(registry)
    }

    pub fn behavior(&self, name: &str) -> Option<&BehaviorSpec> {
        self.behaviors.iter().find(|b| b.name == name)
    }

    pub fn find_type(&self, name: &str) -> ManifestResult<&TypeSpec> {
        self.types
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ManifestError::UnknownType(name.to_string()))
    }

    /// Look up a declared `(type, method)` pair.
    pub fn find_method(
        &self,
        type_name: &str,
        method: &str,
    ) -> ManifestResult<(&TypeMetadata, &MethodMetadata)> {
        let ty = self.find_type(type_name)?;
        let method = ty.method(method).ok_or_else(|| ManifestError::UnknownMethod {
            type_name: type_name.to_string(),
            method: method.to_string(),
        })?;
        Ok((&ty.metadata, method))
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}
