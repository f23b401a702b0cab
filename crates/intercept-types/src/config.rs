//! Dispatch configuration.
//!
//! Both config structs have sensible `Default`s and a `from_env()` constructor
//! reading `PROXY_INTERCEPT_*` variables:
//!
//! | Variable | Type | Default |
//! |----------|------|---------|
//! | `PROXY_INTERCEPT_GROUP_DEPTH` | usize | 1 |
//! | `PROXY_INTERCEPT_DISABLED_KINDS` | comma list | empty |
//! | `PROXY_INTERCEPT_WARN_UNRESOLVED` | bool | true |
//! | `PROXY_INTERCEPT_METRICS` | bool | true |

use crate::env_utils::{env_bool_or, env_list, env_var_or};

pub const ENV_GROUP_DEPTH: &str = "PROXY_INTERCEPT_GROUP_DEPTH";
pub const ENV_DISABLED_KINDS: &str = "PROXY_INTERCEPT_DISABLED_KINDS";
pub const ENV_WARN_UNRESOLVED: &str = "PROXY_INTERCEPT_WARN_UNRESOLVED";
pub const ENV_METRICS: &str = "PROXY_INTERCEPT_METRICS";

/// Default group expansion depth: members of a group are expanded, members
/// that are themselves groups are not.
pub const DEFAULT_GROUP_DEPTH: usize = 1;

/// Controls marker extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// How many levels of group membership to expand. `0` disables expansion.
    ///
    /// At `1` a marker already collected is not expanded again. Above `1` the
    /// result is every selector reachable within `group_depth` hops from a
    /// declared marker, independent of declaration order: a group reached
    /// first at the depth limit is still expanded when a shorter path to it
    /// turns up later.
    pub group_depth: usize,
    /// Marker kinds that are never treated as selectors, even if the metadata
    /// source says they are. Used to switch an interceptor category off.
    pub disabled_kinds: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            group_depth: DEFAULT_GROUP_DEPTH,
            disabled_kinds: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Self {
        Self {
            group_depth: env_var_or(ENV_GROUP_DEPTH, DEFAULT_GROUP_DEPTH),
            disabled_kinds: env_list(ENV_DISABLED_KINDS),
        }
    }

    pub fn with_group_depth(mut self, depth: usize) -> Self {
        self.group_depth = depth;
        self
    }

    pub fn with_disabled_kind(mut self, kind: impl Into<String>) -> Self {
        self.disabled_kinds.push(kind.into());
        self
    }

    pub fn is_disabled(&self, kind: &str) -> bool {
        self.disabled_kinds.iter().any(|k| k == kind)
    }
}

/// Controls the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub extractor: ExtractorConfig,
    /// Log a warning when markers were found but resolved to no behaviors.
    pub warn_on_unresolved: bool,
    /// Record dispatch counters.
    pub metrics_enabled: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            warn_on_unresolved: true,
            metrics_enabled: true,
        }
    }
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        Self {
            extractor: ExtractorConfig::from_env(),
            warn_on_unresolved: env_bool_or(ENV_WARN_UNRESOLVED, true),
            metrics_enabled: env_bool_or(ENV_METRICS, true),
        }
    }

    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn without_metrics(mut self) -> Self {
        self.metrics_enabled = false;
        self
    }
}
