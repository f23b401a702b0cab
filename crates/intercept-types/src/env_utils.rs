//! Environment variable parsing utilities.
//!
//! Dispatch configuration is read from `PROXY_INTERCEPT_*` variables. These
//! helpers keep that parsing in one place instead of repeating
//!
//! ```ignore
//! std::env::var("VAR_NAME")
//!     .ok()
//!     .and_then(|v| v.parse::<usize>().ok())
//!     .unwrap_or(default_value)
//! ```
//!
//! # Example
//!
//! ```
//! use proxy_intercept_types::env_utils::{env_bool_or, env_var_or};
//!
//! let depth: usize = env_var_or("PROXY_INTERCEPT_GROUP_DEPTH", 1);
//! let warn = env_bool_or("PROXY_INTERCEPT_WARN_UNRESOLVED", true);
//! ```

use std::str::FromStr;

/// Parse an environment variable into any `FromStr` type.
///
/// Returns `None` if the variable is unset or does not parse.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable, falling back to `default`.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Whether an environment variable is set to a truthy value
/// ("1", "true", "yes", "on", case-insensitive).
pub fn env_bool(key: &str) -> bool {
    env_bool_or(key, false)
}

/// Boolean environment variable with a default.
///
/// Unset or unrecognized values yield `default`, so `PROXY_X=maybe` does not
/// silently flip a default-on switch off.
pub fn env_bool_or(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

/// String environment variable with a default.
pub fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma-separated environment variable as a list; empty entries are dropped.
pub fn env_list(key: &str) -> Vec<String> {
    std::env::var(key)
        .ok()
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
