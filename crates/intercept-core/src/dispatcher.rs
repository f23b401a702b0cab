//! The per-call entry point for proxied methods.
//!
//! ```text
//! dispatch(type, target, method, args, original)
//!   |
//!   +-- extract markers ----------- none ----------> original(target, method, args)
//!   |
//!   +-- resolve behaviors --------- none ----------> original(target, method, args)
//!   |
//!   +-- run_chain(behaviors, ..., original) --> unwrap failure / prefer recorded value
//! ```
//!
//! All three exits produce the same `Result<R, E>` the original logic would,
//! so a caller cannot tell an intercepted call from a plain one unless a
//! behavior deliberately changes the outcome.

use std::sync::Arc;

use proxy_intercept_types::{DeclaresMarkers, DispatchConfig, MethodMetadata, TagSet, TypeMetadata};
use tracing::{debug, warn};

use crate::behavior::{BehaviorHandle, BehaviorResolver};
use crate::invocation::{run_chain, CallSite};
use crate::markers::{MarkerExtractor, MarkerMetadata};
use crate::metrics::DispatchMetrics;

/// Routes proxied calls through their interceptor chains.
pub struct Dispatcher<T, A, R, E> {
    extractor: MarkerExtractor,
    resolver: Arc<dyn BehaviorResolver<T, A, R, E>>,
    config: DispatchConfig,
    metrics: DispatchMetrics,
}

impl<T, A, R, E> Dispatcher<T, A, R, E> {
    pub fn new(
        metadata: Arc<dyn MarkerMetadata>,
        resolver: Arc<dyn BehaviorResolver<T, A, R, E>>,
    ) -> Self {
        Self::with_config(metadata, resolver, DispatchConfig::default())
    }

    /// Build a dispatcher configured from `PROXY_INTERCEPT_*` variables.
    pub fn from_env(
        metadata: Arc<dyn MarkerMetadata>,
        resolver: Arc<dyn BehaviorResolver<T, A, R, E>>,
    ) -> Self {
        Self::with_config(metadata, resolver, DispatchConfig::from_env())
    }

    pub fn with_config(
        metadata: Arc<dyn MarkerMetadata>,
        resolver: Arc<dyn BehaviorResolver<T, A, R, E>>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            extractor: MarkerExtractor::with_config(metadata, config.extractor.clone()),
            resolver,
            config,
            metrics: DispatchMetrics::default(),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Selector tags that apply to `method` on `target_type`.
    pub fn extract(&self, target_type: &TypeMetadata, method: &MethodMetadata) -> TagSet {
        self.extractor.extract(target_type, method)
    }

    /// The behavior chain a call to `method` would run, with the tags that
    /// selected it. Empty when the call would go straight to the original.
    pub fn chain_for(
        &self,
        target_type: &TypeMetadata,
        method: &MethodMetadata,
    ) -> (TagSet, Vec<BehaviorHandle<T, A, R, E>>) {
        let tags = self.extract(target_type, method);
        if tags.is_empty() {
            return (tags, Vec::new());
        }
        let behaviors = self.resolver.resolve(&tags);
        (tags, behaviors)
    }

    fn count(&self, record: impl FnOnce(&DispatchMetrics)) {
        if self.config.metrics_enabled {
            record(&self.metrics);
        }
    }

    fn call_direct<F>(
        &self,
        target: &T,
        method: &MethodMetadata,
        arguments: A,
        original: F,
    ) -> Result<R, E>
    where
        F: FnOnce(&T, &MethodMetadata, &A) -> Result<R, E>,
    {
        let result = original(target, method, &arguments);
        if result.is_err() {
            self.count(DispatchMetrics::record_direct_failure);
        }
        result
    }
}

impl<T, A, R: Clone, E> Dispatcher<T, A, R, E> {
    /// Invoke `method` on `target` through whatever behaviors apply.
    ///
    /// `original` is the unintercepted method body. It runs at most once: when
    /// no behaviors apply, or when the last behavior proceeds.
    pub fn dispatch<F>(
        &self,
        target_type: &TypeMetadata,
        target: &T,
        method: &MethodMetadata,
        arguments: A,
        original: F,
    ) -> Result<R, E>
    where
        F: FnOnce(&T, &MethodMetadata, &A) -> Result<R, E>,
    {
        self.count(DispatchMetrics::record_dispatch);

        let tags = self.extractor.extract(target_type, method);
        if tags.is_empty() {
            debug!(
                target_type = %target_type.name,
                method = %method.name,
                "no interceptor bindings, calling original"
            );
            self.count(DispatchMetrics::record_direct_call);
            return self.call_direct(target, method, arguments, original);
        }

        let behaviors = self.resolver.resolve(&tags);
        if behaviors.is_empty() {
            if self.config.warn_on_unresolved {
                warn!(
                    target_type = %target_type.name,
                    method = %method.name,
                    bindings = %tags,
                    "interceptor bindings resolved to no behaviors, calling original"
                );
            } else {
                debug!(
                    target_type = %target_type.name,
                    method = %method.name,
                    bindings = %tags,
                    "interceptor bindings resolved to no behaviors, calling original"
                );
            }
            self.count(DispatchMetrics::record_unresolved_fallback);
            return self.call_direct(target, method, arguments, original);
        }

        debug!(
            target_type = %target_type.name,
            method = %method.name,
            bindings = %tags,
            chain_len = behaviors.len(),
            "dispatching through interceptor chain"
        );

        let site = CallSite {
            target,
            method,
            bindings: &tags,
        };
        let run = run_chain(&behaviors, site, arguments, original);
        let exit = run.exit();
        let entered = run.behaviors_entered;
        let behavior_failure = matches!(run.outcome(), Err(f) if f.is_behavior());
        let result = run.into_result();
        let ok = result.is_ok();

        debug!(
            method = %method.name,
            ?exit,
            entered,
            ok,
            "interceptor chain finished"
        );
        self.count(|m| m.record_chain(exit, entered, ok, behavior_failure));
        result
    }

    /// Like [`dispatch`](Self::dispatch) for targets that carry their own type
    /// metadata.
    pub fn invoke<F>(
        &self,
        target: &T,
        method: &MethodMetadata,
        arguments: A,
        original: F,
    ) -> Result<R, E>
    where
        T: DeclaresMarkers,
        F: FnOnce(&T, &MethodMetadata, &A) -> Result<R, E>,
    {
        self.dispatch(target.type_metadata(), target, method, arguments, original)
    }
}

impl<T, A, R, E> std::fmt::Debug for Dispatcher<T, A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("extractor", &self.extractor)
            .field("config", &self.config)
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}
