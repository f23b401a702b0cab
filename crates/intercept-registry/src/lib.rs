//! Catalogs and registries backing the proxy-intercept dispatcher.
//!
//! - [`MarkerCatalog`] answers the selector/group questions the extractor asks
//! - [`BehaviorRegistry`] turns a selector set into an ordered behavior chain
//! - [`Manifest`] loads both from a JSON description

pub mod catalog;
pub mod error;
pub mod manifest;
pub mod registry;

pub use catalog::MarkerCatalog;
pub use error::{ManifestError, RegistryError};
pub use manifest::{BehaviorSpec, Manifest, ManifestResult, TypeSpec};
pub use registry::{BehaviorRegistry, RegisteredBehavior, DEFAULT_PRIORITY};
