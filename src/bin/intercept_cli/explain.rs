//! Explain command - dispatch a traced call and report what ran

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use proxy_intercept::trace::{explain, ExplainOptions, ExplainOutcome, ExplainReport};
use serde_json::Value;

use super::{load_manifest, print_json, GlobalOptions};

#[derive(Parser, Debug)]
pub struct ExplainCmd {
    /// Path to the manifest JSON
    pub manifest: PathBuf,

    /// Declared type name
    pub type_name: String,

    /// Method name on that type
    pub method: String,

    /// Call arguments as JSON
    #[arg(long, default_value = "null")]
    pub args: String,

    /// JSON value the original method returns
    #[arg(long, default_value = "null", conflicts_with = "fail")]
    pub returns: String,

    /// Make the original method fail with this message
    #[arg(long)]
    pub fail: Option<String>,

    /// Behavior that returns without proceeding
    #[arg(long, value_name = "BEHAVIOR")]
    pub stop_at: Option<String>,
}

fn parse_json(flag: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("--{flag} is not valid JSON: {raw}"))
}

impl ExplainCmd {
    pub fn execute(&self, options: &GlobalOptions) -> Result<()> {
        let manifest = load_manifest(&self.manifest)?;
        let explain_options = ExplainOptions {
            arguments: parse_json("args", &self.args)?,
            returns: parse_json("returns", &self.returns)?,
            fail: self.fail.clone(),
            stop_at: self.stop_at.clone(),
        };

        let report = explain(
            &manifest,
            options.dispatch_config(),
            &self.type_name,
            &self.method,
            &explain_options,
        )?;

        if options.json {
            print_json(&report)
        } else {
            print_report(&report);
            Ok(())
        }
    }
}

fn print_report(report: &ExplainReport) {
    println!("{}::{}", report.type_name, report.method);
    println!("  tags:     {}", join_or_none(&report.tags));
    println!("  chain:    {}", join_or_none(&report.chain));
    println!("  executed: {}", join_or_none(&report.executed));
    let original = if report.original_invoked {
        "invoked"
    } else {
        "not invoked"
    };
    println!("  original: {}", original);
    match &report.outcome {
        ExplainOutcome::Returned(value) => println!("  result:   {}", value),
        ExplainOutcome::Failed(message) => println!("  failed:   {}", message),
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(" -> ")
    }
}
