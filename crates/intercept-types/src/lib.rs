//! Shared types for the proxy-intercept workspace.
//!
//! This crate holds the vocabulary every other crate speaks:
//!
//! - [`tag`]: value-comparable markers ([`Tag`]) and the deduplicated [`TagSet`]
//! - [`metadata`]: declared type/method metadata fed into extraction
//! - [`config`]: dispatcher and extractor configuration
//! - [`env_utils`]: typed environment variable parsing used by `config`

pub mod config;
pub mod env_utils;
pub mod metadata;
pub mod tag;

pub use config::{DispatchConfig, ExtractorConfig};
pub use metadata::{DeclaresMarkers, MethodMetadata, TargetDescriptor, TypeMetadata};
pub use tag::{Tag, TagParseError, TagSet};
