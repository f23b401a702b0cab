//! Tracing subscriber setup for binaries.

use proxy_intercept_types::env_utils::env_string_or;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive (`RUST_LOG` syntax).
pub const ENV_LOG: &str = "RUST_LOG";

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install a stderr `fmt` subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let directive = env_string_or(ENV_LOG, default_directive(verbose));
    let fallback = default_directive(verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "warn");
    }
}
