//! Traced dispatches over manifest-declared types.
//!
//! Every behavior a manifest declares is instantiated as a [`TraceBehavior`]
//! that records its name on a shared [`Trail`] and proceeds. Running a call
//! through that setup shows which tags were extracted, which chain was
//! resolved, and how far the call actually got.

use std::cell::Cell;
use std::sync::Arc;

use parking_lot::Mutex;
use proxy_intercept_core::{
    Behavior, BehaviorHandle, Dispatcher, Invocation, MetricsSnapshot, Outcome,
};
use proxy_intercept_registry::{Manifest, ManifestResult};
use proxy_intercept_types::DispatchConfig;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Dispatcher over JSON arguments and results, with string errors.
pub type JsonDispatcher = Dispatcher<(), Value, Value, String>;

/// Behavior handle matching [`JsonDispatcher`].
pub type JsonBehavior = BehaviorHandle<(), Value, Value, String>;

/// Context key holding the names of the trace behaviors entered so far.
pub const CONTEXT_TRAIL_KEY: &str = "trail";

/// Ordered record of the behaviors entered during a call.
#[derive(Debug, Clone, Default)]
pub struct Trail(Arc<Mutex<Vec<String>>>);

impl Trail {
    pub fn record(&self, name: &str) {
        self.0.lock().push(name.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Records itself on a [`Trail`], then proceeds or stops the chain.
pub struct TraceBehavior {
    name: String,
    trail: Trail,
    stop: bool,
}

impl TraceBehavior {
    pub fn new(name: impl Into<String>, trail: Trail) -> Self {
        Self {
            name: name.into(),
            trail,
            stop: false,
        }
    }

    /// Return without proceeding.
    pub fn stopping(mut self, stop: bool) -> Self {
        self.stop = stop;
        self
    }

    /// The value a stopping behavior returns in place of the original's.
    pub fn short_circuit_value(name: &str) -> Value {
        Value::String(format!("short-circuited by {name}"))
    }
}

impl Behavior<(), Value, Value, String> for TraceBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn around_invoke(
        &self,
        mut invocation: Invocation<'_, (), Value, Value, String>,
    ) -> Outcome<Value, String> {
        self.trail.record(&self.name);

        let mut trail = match invocation.context_value(CONTEXT_TRAIL_KEY) {
            Some(Value::Array(names)) => names.clone(),
            _ => Vec::new(),
        };
        trail.push(Value::String(self.name.clone()));
        invocation.insert_context(CONTEXT_TRAIL_KEY, Value::Array(trail));

        if self.stop {
            debug!(behavior = %self.name, "stopping chain");
            return Ok(Self::short_circuit_value(&self.name));
        }
        invocation.proceed()
    }
}

/// How the simulated original method behaves.
#[derive(Debug, Clone, Default)]
pub struct ExplainOptions {
    pub arguments: Value,
    /// Value the original returns
    pub returns: Value,
    /// When set, the original fails with this message instead
    pub fail: Option<String>,
    /// Behavior that returns without proceeding
    pub stop_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplainOutcome {
    Returned(Value),
    Failed(String),
}

/// Result of a traced dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainReport {
    #[serde(rename = "type")]
    pub type_name: String,
    pub method: String,
    /// Extracted selector tags, in extraction order
    pub tags: Vec<String>,
    /// Resolved behavior chain
    pub chain: Vec<String>,
    /// Behaviors actually entered
    pub executed: Vec<String>,
    pub original_invoked: bool,
    pub outcome: ExplainOutcome,
    pub metrics: MetricsSnapshot,
}

/// Dispatch one call to `type_name::method` with every declared behavior
/// traced.
pub fn explain(
    manifest: &Manifest,
    config: DispatchConfig,
    type_name: &str,
    method: &str,
    options: &ExplainOptions,
) -> ManifestResult<ExplainReport> {
    manifest.validate()?;
    let (ty, method) = manifest.find_method(type_name, method)?;

    let trail = Trail::default();
    let registry = manifest.build_registry(|spec| -> JsonBehavior {
        let stop = options.stop_at.as_deref() == Some(spec.name.as_str());
        let behavior = TraceBehavior::new(spec.name.clone(), trail.clone()).stopping(stop);
        Arc::new(behavior)
    })?;
    let catalog = Arc::new(manifest.build_catalog());
    let dispatcher: JsonDispatcher =
        Dispatcher::with_config(catalog, Arc::new(registry), config);

    let (tags, chain) = dispatcher.chain_for(ty, method);

    let invoked = Cell::new(false);
    let result = dispatcher.dispatch(ty, &(), method, options.arguments.clone(), |_, _, _| {
        invoked.set(true);
        match &options.fail {
            Some(message) => Err(message.clone()),
            None => Ok(options.returns.clone()),
        }
    });

    Ok(ExplainReport {
        type_name: ty.name.clone(),
        method: method.name.clone(),
        tags: tags.iter().map(ToString::to_string).collect(),
        chain: chain.iter().map(|b| b.name().to_string()).collect(),
        executed: trail.entries(),
        original_invoked: invoked.get(),
        outcome: match result {
            Ok(value) => ExplainOutcome::Returned(value),
            Err(message) => ExplainOutcome::Failed(message),
        },
        metrics: dispatcher.metrics().snapshot(),
    })
}
