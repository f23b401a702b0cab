//! Proxy Intercept
//!
//! Interceptor chains for proxied method calls:
//!
//! - **Marker extraction**: collect selector markers from a type and method,
//!   expanding marker groups (see [`markers`])
//! - **Behavior chains**: single-use proceed cursors ending in the original
//!   method body (see [`invocation`])
//! - **Dispatch**: the per-call entry point with transparent failure
//!   propagation (see [`Dispatcher`])
//! - **Registries and manifests**: in-memory catalogs and JSON descriptions of
//!   selectors, groups and behaviors (see [`manifest`])
//!
//! [`trace`] and [`logging`] support the `proxy-intercept` CLI.

pub mod logging;
pub mod trace;

pub use proxy_intercept_core::*;
pub use proxy_intercept_registry::*;
pub use proxy_intercept_types::*;
