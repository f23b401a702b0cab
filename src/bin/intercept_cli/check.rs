//! Check command - validate a manifest

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use proxy_intercept::Manifest;
use serde_json::json;

use super::{load_manifest, print_json, GlobalOptions};

#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Path to the manifest JSON
    pub manifest: PathBuf,
}

impl CheckCmd {
    pub fn execute(&self, options: &GlobalOptions) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        manifest.validate()?;

        // Groups whose members are neither selectors nor groups contribute nothing.
        let inert: Vec<&str> = manifest
            .groups
            .iter()
            .filter(|(_, members)| {
                !members.iter().any(|m| is_known_kind(&manifest, m.kind()))
            })
            .map(|(kind, _)| kind.as_str())
            .collect();

        if options.json {
            print_json(&json!({
                "valid": true,
                "selectors": manifest.selectors.len(),
                "groups": manifest.groups.len(),
                "behaviors": manifest.behaviors.len(),
                "types": manifest.types.len(),
                "inert_groups": inert,
            }))?;
        } else {
            println!(
                "manifest OK: {} selectors, {} groups, {} behaviors, {} types",
                manifest.selectors.len(),
                manifest.groups.len(),
                manifest.behaviors.len(),
                manifest.types.len()
            );
            for group in inert {
                println!("warning: group '{}' has no selector or group members", group);
            }
        }
        Ok(())
    }
}

fn is_known_kind(manifest: &Manifest, kind: &str) -> bool {
    manifest.selectors.iter().any(|s| s == kind) || manifest.groups.contains_key(kind)
}
