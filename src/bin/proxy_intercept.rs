//! proxy-intercept: inspect interceptor configuration described by a manifest
//!
//! ## Commands
//!
//! - **extract**: list the selector tags that apply to a `Type::method`
//! - **explain**: run a traced call and report the chain and its outcome
//! - **check**: validate a manifest
//!
//! ## Example Usage
//!
//! ```bash
//! # Which selectors apply to AccountService::transfer?
//! proxy-intercept extract manifest.json AccountService transfer
//!
//! # Trace a call whose original returns 42
//! proxy-intercept --json explain manifest.json AccountService transfer --returns 42
//!
//! # Trace a call that the audit behavior stops
//! proxy-intercept explain manifest.json AccountService transfer --stop-at AuditBehavior
//!
//! # Validate before shipping
//! proxy-intercept check manifest.json
//! ```
//!
//! Dispatch settings come from `PROXY_INTERCEPT_*` variables and can be
//! overridden with `--group-depth` and `--disable`.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod intercept_cli;

use intercept_cli::{check::CheckCmd, explain::ExplainCmd, extract::ExtractCmd, GlobalOptions};

#[derive(Parser)]
#[command(
    name = "proxy-intercept",
    author,
    version,
    about = "Inspect interceptor chains for proxied method calls",
    long_about = "Reads a JSON manifest of selectors, groups, behaviors and types.\n\n\
                  Shows which selectors apply to a method, which behaviors they resolve to, \
                  and how a call travels through the chain."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Group expansion depth (overrides PROXY_INTERCEPT_GROUP_DEPTH)
    #[arg(long, global = true)]
    group_depth: Option<usize>,

    /// Marker kind to switch off; may be repeated
    #[arg(long = "disable", value_name = "KIND", global = true)]
    disabled: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selector tags that apply to a method
    Extract(ExtractCmd),

    /// Dispatch a traced call and report what ran
    Explain(ExplainCmd),

    /// Validate a manifest
    Check(CheckCmd),
}

fn main() -> Result<()> {
    let Cli {
        command,
        json,
        verbose,
        group_depth,
        disabled,
    } = Cli::parse();

    proxy_intercept::logging::init(verbose);

    let options = GlobalOptions {
        json,
        group_depth,
        disabled,
    };

    match command {
        Commands::Extract(cmd) => cmd.execute(&options),
        Commands::Explain(cmd) => cmd.execute(&options),
        Commands::Check(cmd) => cmd.execute(&options),
    }
}
