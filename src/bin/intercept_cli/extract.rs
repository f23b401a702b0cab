//! Extract command - list the selector tags that apply to a method

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use proxy_intercept::MarkerExtractor;
use serde_json::json;

use super::{load_manifest, print_json, GlobalOptions};

#[derive(Parser, Debug)]
pub struct ExtractCmd {
    /// Path to the manifest JSON
    pub manifest: PathBuf,

    /// Declared type name
    pub type_name: String,

    /// Method name on that type
    pub method: String,
}

impl ExtractCmd {
    pub fn execute(&self, options: &GlobalOptions) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let (ty, method) = manifest.find_method(&self.type_name, &self.method)?;

        let config = options.dispatch_config();
        let catalog = Arc::new(manifest.build_catalog());
        let extractor = MarkerExtractor::with_config(catalog, config.extractor);
        let tags = extractor.extract(ty, method);

        if options.json {
            print_json(&json!({
                "type": ty.name,
                "method": method.name,
                "tags": tags,
            }))?;
        } else if tags.is_empty() {
            println!("{}::{} has no interceptor bindings", ty.name, method.name);
        } else {
            for tag in &tags {
                println!("{}", tag);
            }
        }
        Ok(())
    }
}
