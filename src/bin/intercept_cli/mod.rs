//! CLI subcommand implementations for proxy-intercept

pub mod check;
pub mod explain;
pub mod extract;

use std::path::Path;

use anyhow::{Context, Result};
use proxy_intercept::{DispatchConfig, Manifest};
use serde::Serialize;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub json: bool,
    pub group_depth: Option<usize>,
    pub disabled: Vec<String>,
}

impl GlobalOptions {
    /// Environment configuration with command-line overrides applied.
    pub fn dispatch_config(&self) -> DispatchConfig {
        let mut config = DispatchConfig::from_env();
        if let Some(depth) = self.group_depth {
            config.extractor = config.extractor.with_group_depth(depth);
        }
        for kind in &self.disabled {
            config.extractor = config.extractor.with_disabled_kind(kind.as_str());
        }
        config
    }
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    Manifest::from_path(path).with_context(|| format!("loading manifest {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
