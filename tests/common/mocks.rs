//! Recording behaviors and fixed resolvers.
//!
//! Every mock appends its name to a shared [`Recorder`] when entered, so tests
//! can assert exactly which behaviors ran and in what order.

use std::sync::Arc;

use parking_lot::Mutex;
use proxy_intercept::{behavior_fn, BehaviorHandle, BehaviorResolver, Failure, Invocation, TagSet};

use super::fixtures::{Account, AccountService};

pub type Handle = BehaviorHandle<AccountService, Account, u64, String>;
type Inv<'a> = Invocation<'a, AccountService, Account, u64, String>;

#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Proceeds and returns whatever comes back.
pub fn passthrough(name: &str, recorder: &Recorder) -> Handle {
    let recorder = recorder.clone();
    let label = name.to_string();
    behavior_fn(name, move |inv: Inv<'_>| {
        recorder.record(label.as_str());
        inv.proceed()
    })
}

/// Returns `value` without proceeding.
pub fn short_circuit(name: &str, recorder: &Recorder, value: u64) -> Handle {
    let recorder = recorder.clone();
    let label = name.to_string();
    behavior_fn(name, move |_inv: Inv<'_>| {
        recorder.record(label.as_str());
        Ok(value)
    })
}

/// Fails with `message` without proceeding.
pub fn failing(name: &str, recorder: &Recorder, message: &str) -> Handle {
    let recorder = recorder.clone();
    let label = name.to_string();
    let message = message.to_string();
    behavior_fn(name, move |_inv: Inv<'_>| {
        recorder.record(label.as_str());
        Err(Failure::behavior(message.clone()))
    })
}

/// Proceeds, then returns `value` in place of a successful result.
pub fn overriding(name: &str, recorder: &Recorder, value: u64) -> Handle {
    let recorder = recorder.clone();
    let label = name.to_string();
    behavior_fn(name, move |inv: Inv<'_>| {
        recorder.record(label.as_str());
        inv.proceed().map(|_| value)
    })
}

/// Proceeds; when the original logic fails, returns `fallback` instead.
pub fn recovering(name: &str, recorder: &Recorder, fallback: u64) -> Handle {
    let recorder = recorder.clone();
    let label = name.to_string();
    behavior_fn(name, move |inv: Inv<'_>| {
        recorder.record(label.as_str());
        match inv.proceed() {
            Err(failure) if failure.is_original() => Ok(fallback),
            other => other,
        }
    })
}

/// Resolves every tag set to the same chain.
pub struct FixedResolver(pub Vec<Handle>);

impl BehaviorResolver<AccountService, Account, u64, String> for FixedResolver {
    fn resolve(&self, _tags: &TagSet) -> Vec<Handle> {
        self.0.clone()
    }
}
