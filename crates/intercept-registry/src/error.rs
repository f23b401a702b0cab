//! Errors raised while registering behaviors or loading manifests.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("behavior '{0}' is already registered")]
    DuplicateBehavior(String),

    #[error("behavior '{0}' declares no bindings")]
    NoBindings(String),
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest")]
    Parse(#[from] serde_json::Error),

    #[error("behavior '{behavior}' binds '{kind}', which is not a registered selector")]
    UnknownSelector { behavior: String, kind: String },

    #[error("type '{0}' is declared more than once")]
    DuplicateType(String),

    #[error("type '{type_name}' has no method '{method}'")]
    UnknownMethod { type_name: String, method: String },

    #[error("type '{0}' is not declared in the manifest")]
    UnknownType(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
