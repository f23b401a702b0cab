//! Interceptor dispatch for proxied method calls.
//!
//! When a proxy receives a call, the [`Dispatcher`]:
//!
//! 1. extracts the selector tags that apply to the `(type, method)` pair,
//!    expanding marker groups ([`markers`]);
//! 2. asks a [`BehaviorResolver`] for the ordered behavior chain;
//! 3. threads the call through the chain with a single-use [`Invocation`]
//!    ([`invocation`]), ending in the original method body unless a behavior
//!    short-circuits;
//! 4. hands back exactly what the original would have: its value, or its error.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use proxy_intercept_core::{
//!     behavior_fn, BehaviorHandle, BehaviorResolver, Dispatcher, Invocation, MarkerMetadata,
//! };
//! use proxy_intercept_types::{MethodMetadata, Tag, TagSet, TypeMetadata};
//!
//! struct Selectors;
//! impl MarkerMetadata for Selectors {
//!     fn is_selector(&self, tag: &Tag) -> bool { tag.is_kind("Logged") }
//!     fn is_group(&self, _: &Tag) -> bool { false }
//!     fn group_members(&self, _: &Tag) -> Vec<Tag> { Vec::new() }
//! }
//!
//! struct Chain(Vec<BehaviorHandle<(), i32, i32, String>>);
//! impl BehaviorResolver<(), i32, i32, String> for Chain {
//!     fn resolve(&self, _: &TagSet) -> Vec<BehaviorHandle<(), i32, i32, String>> {
//!         self.0.clone()
//!     }
//! }
//!
//! let logged = behavior_fn("logged", |inv: Invocation<'_, (), i32, i32, String>| inv.proceed());
//! let dispatcher: Dispatcher<(), i32, i32, String> =
//!     Dispatcher::new(Arc::new(Selectors), Arc::new(Chain(vec![logged])));
//!
//! let ty = TypeMetadata::new("Calculator").with_marker(Tag::new("Logged"));
//! let square = MethodMetadata::new("square");
//! let result = dispatcher.dispatch(&ty, &(), &square, 7, |_, _, x| Ok(x * x));
//! assert_eq!(result, Ok(49));
//! ```

pub mod behavior;
pub mod dispatcher;
pub mod invocation;
pub mod markers;
pub mod metrics;

pub use behavior::{
    behavior_fn, Behavior, BehaviorHandle, BehaviorResolver, Failure, FnBehavior, Outcome,
};
pub use dispatcher::Dispatcher;
pub use invocation::{run_chain, CallSite, ChainExit, ChainRun, Invocation, OriginalCall};
pub use markers::{MarkerExtractor, MarkerMetadata};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
