//! The per-call invocation context and the proceed chain.
//!
//! An [`Invocation`] is a cursor over the resolved behavior chain plus the
//! original-logic thunk. It lives for exactly one dispatch and moves through the
//! chain by value: each behavior owns it while it runs and gives it up by calling
//! [`Invocation::proceed`]. A behavior that never proceeds short-circuits the
//! chain; nothing after it runs.
//!
//! ```text
//! NOT_STARTED --proceed--> behavior[0] --proceed--> ... behavior[n-1] --proceed--> original
//!                              |                           |
//!                              +-- returns without proceed -+--> SHORT_CIRCUITED
//! ```
//!
//! Reaching the end of the chain runs the original logic once and records its
//! return value, which the dispatcher treats as authoritative (see
//! [`ChainRun::into_result`]).

use std::collections::HashMap;
use std::fmt;

use proxy_intercept_types::{MethodMetadata, TagSet};
use serde_json::Value;
use tracing::trace;

use crate::behavior::{BehaviorHandle, Failure, Outcome};

/// The original method body, bound at dispatch time.
pub type OriginalCall<'a, T, A, R, E> =
    Box<dyn FnOnce(&T, &MethodMetadata, &A) -> Result<R, E> + 'a>;

/// What happened to the original logic during a chain run.
#[derive(Debug)]
enum OriginalState<R> {
    NotReached,
    Returned(R),
    Failed,
}

/// How a chain run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainExit {
    /// The chain reached the original logic and it returned normally.
    Original,
    /// The chain reached the original logic and it failed.
    OriginalFailed,
    /// A behavior returned without proceeding; the original never ran.
    ShortCircuited,
}

/// The call site an invocation is bound to.
#[derive(Debug)]
pub struct CallSite<'a, T> {
    pub target: &'a T,
    pub method: &'a MethodMetadata,
    /// Selector tags that produced the chain.
    pub bindings: &'a TagSet,
}

impl<T> Clone for CallSite<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CallSite<'_, T> {}

/// Single-use cursor over a behavior chain.
pub struct Invocation<'a, T, A, R, E> {
    site: CallSite<'a, T>,
    arguments: A,
    chain: &'a [BehaviorHandle<T, A, R, E>],
    position: usize,
    context_data: HashMap<String, Value>,
    original: OriginalCall<'a, T, A, R, E>,
    state: &'a mut OriginalState<R>,
    entered: &'a mut usize,
}

impl<'a, T, A, R, E> Invocation<'a, T, A, R, E> {
    pub fn target(&self) -> &T {
        self.site.target
    }

    pub fn method(&self) -> &MethodMetadata {
        self.site.method
    }

    /// Selector tags that caused this chain to be built.
    pub fn bindings(&self) -> &TagSet {
        self.site.bindings
    }

    pub fn arguments(&self) -> &A {
        &self.arguments
    }

    /// Mutable access to the arguments. Changes are seen by the inner behaviors
    /// and the original logic.
    pub fn arguments_mut(&mut self) -> &mut A {
        &mut self.arguments
    }

    /// Replace the arguments, returning the previous ones.
    pub fn set_arguments(&mut self, arguments: A) -> A {
        std::mem::replace(&mut self.arguments, arguments)
    }

    /// Per-call data shared with every behavior further down the chain.
    pub fn context_data(&self) -> &HashMap<String, Value> {
        &self.context_data
    }

    pub fn context_data_mut(&mut self) -> &mut HashMap<String, Value> {
        &mut self.context_data
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context_data.get(key)
    }

    pub fn insert_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.context_data.insert(key.into(), value.into());
    }

    /// Number of behaviors entered so far, including the one holding this
    /// invocation.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Behaviors still to run before the original logic.
    pub fn remaining(&self) -> usize {
        self.chain.len() - self.position
    }

    /// Whether the next `proceed` calls the original logic.
    pub fn is_terminal(&self) -> bool {
        self.remaining() == 0
    }
}

impl<'a, T, A, R: Clone, E> Invocation<'a, T, A, R, E> {
    /// Hand control to the next behavior, or to the original logic when the
    /// chain is exhausted.
    ///
    /// Failures of the original logic come back as [`Failure::Original`].
    pub fn proceed(mut self) -> Outcome<R, E> {
        let chain = self.chain;
        if let Some(behavior) = chain.get(self.position) {
            self.position += 1;
            *self.entered = self.position;
            trace!(
                behavior = behavior.name(),
                position = self.position,
                method = %self.site.method.name,
                "entering behavior"
            );
            return behavior.around_invoke(self);
        }

        trace!(method = %self.site.method.name, "chain exhausted, calling original logic");
        let original = self.original;
        match original(self.site.target, self.site.method, &self.arguments) {
            Ok(value) => {
                *self.state = OriginalState::Returned(value.clone());
                Ok(value)
            }
            Err(e) => {
                *self.state = OriginalState::Failed;
                Err(Failure::Original(e))
            }
        }
    }
}

impl<T, A: fmt::Debug, R, E> fmt::Debug for Invocation<'_, T, A, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("method", &self.site.method.name)
            .field("bindings", &self.site.bindings)
            .field("arguments", &self.arguments)
            .field("position", &self.position)
            .field("chain_len", &self.chain.len())
            .field("context_data", &self.context_data)
            .finish()
    }
}

/// The result of driving a chain to completion.
#[derive(Debug)]
pub struct ChainRun<R, E> {
    outcome: Outcome<R, E>,
    state: OriginalState<R>,
    /// Number of behaviors that were entered.
    pub behaviors_entered: usize,
}

impl<R, E> ChainRun<R, E> {
    pub fn exit(&self) -> ChainExit {
        match self.state {
            OriginalState::NotReached => ChainExit::ShortCircuited,
            OriginalState::Returned(_) => ChainExit::Original,
            OriginalState::Failed => ChainExit::OriginalFailed,
        }
    }

    /// The outermost behavior's outcome, before the original-value override.
    pub fn outcome(&self) -> &Outcome<R, E> {
        &self.outcome
    }

    /// Resolve the caller-visible result.
    ///
    /// Failures are unwrapped to their cause. On success, if the original logic
    /// ran and returned, its recorded value is returned instead of whatever the
    /// outermost behavior produced.
    pub fn into_result(self) -> Result<R, E> {
        match (self.outcome, self.state) {
            (Err(failure), _) => Err(failure.into_inner()),
            (Ok(_), OriginalState::Returned(original)) => Ok(original),
            (Ok(value), _) => Ok(value),
        }
    }
}

/// Drive `chain` for one call, ending in `original` unless a behavior
/// short-circuits.
pub fn run_chain<'a, T, A, R, E, F>(
    chain: &'a [BehaviorHandle<T, A, R, E>],
    site: CallSite<'a, T>,
    arguments: A,
    original: F,
) -> ChainRun<R, E>
where
    R: Clone,
    F: FnOnce(&T, &MethodMetadata, &A) -> Result<R, E> + 'a,
{
    let mut state = OriginalState::NotReached;
    let mut entered = 0;
    let outcome = Invocation {
        site,
        arguments,
        chain,
        position: 0,
        context_data: HashMap::new(),
        original: Box::new(original),
        state: &mut state,
        entered: &mut entered,
    }
    .proceed();

    ChainRun {
        outcome,
        state,
        behaviors_entered: entered,
    }
}
