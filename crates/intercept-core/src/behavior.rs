//! Behaviors (interceptors), the resolver boundary, and the tagged failure type.
//!
//! A behavior receives an [`Invocation`] by value. It either hands the invocation
//! on with [`Invocation::proceed`] (at most once, since `proceed` consumes it) or
//! drops it and returns its own result, which short-circuits the rest of the
//! chain.
//!
//! Failures travel back up the chain as [`Failure`], which records whether the
//! error came from the original logic or was raised by a behavior. The
//! dispatcher strips the tag before anything reaches the caller.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use proxy_intercept_types::TagSet;

use crate::invocation::Invocation;

/// Result of running (part of) an interceptor chain.
pub type Outcome<R, E> = Result<R, Failure<E>>;

/// Shared handle to a resolved behavior.
pub type BehaviorHandle<T, A, R, E> = Arc<dyn Behavior<T, A, R, E>>;

/// A failure travelling through the chain, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<E> {
    /// Raised by the original logic. Behaviors that did not catch it pass it
    /// through untouched.
    Original(E),
    /// Raised by a behavior's own logic.
    Behavior(E),
}

impl<E> Failure<E> {
    /// Tag an error as raised by a behavior.
    pub fn behavior(error: impl Into<E>) -> Self {
        Failure::Behavior(error.into())
    }

    pub fn is_original(&self) -> bool {
        matches!(self, Failure::Original(_))
    }

    pub fn is_behavior(&self) -> bool {
        matches!(self, Failure::Behavior(_))
    }

    pub fn inner(&self) -> &E {
        match self {
            Failure::Original(e) | Failure::Behavior(e) => e,
        }
    }

    /// Drop the tag and return the caller-visible error.
    pub fn into_inner(self) -> E {
        match self {
            Failure::Original(e) | Failure::Behavior(e) => e,
        }
    }

    /// Transform the error while keeping its origin.
    pub fn map<F>(self, f: impl FnOnce(E) -> F) -> Failure<F> {
        match self {
            Failure::Original(e) => Failure::Original(f(e)),
            Failure::Behavior(e) => Failure::Behavior(f(e)),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner().fmt(f)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Failure<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner().source()
    }
}

/// Cross-cutting logic run around a proxied call.
///
/// Type parameters: `T` target, `A` arguments, `R` return value, `E` error.
pub trait Behavior<T, A, R, E>: Send + Sync {
    /// Name used in logs and chain reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn around_invoke(&self, invocation: Invocation<'_, T, A, R, E>) -> Outcome<R, E>;
}

/// Resolves the ordered behavior chain for a set of selector tags.
///
/// Implementations own the ordering policy; the dispatcher preserves the
/// returned order. Must be safe for concurrent lookups.
pub trait BehaviorResolver<T, A, R, E>: Send + Sync {
    fn resolve(&self, tags: &TagSet) -> Vec<BehaviorHandle<T, A, R, E>>;
}

/// A behavior backed by a closure.
pub struct FnBehavior<T, A, R, E, F> {
    name: String,
    f: F,
    _marker: PhantomData<fn(&T, A) -> Result<R, E>>,
}

impl<T, A, R, E, F> FnBehavior<T, A, R, E, F>
where
    F: for<'a> Fn(Invocation<'a, T, A, R, E>) -> Outcome<R, E> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _marker: PhantomData,
        }
    }
}

impl<T, A, R, E, F> Behavior<T, A, R, E> for FnBehavior<T, A, R, E, F>
where
    F: for<'a> Fn(Invocation<'a, T, A, R, E>) -> Outcome<R, E> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn around_invoke(&self, invocation: Invocation<'_, T, A, R, E>) -> Outcome<R, E> {
        (self.f)(invocation)
    }
}

/// Wrap a closure as a shareable behavior handle.
pub fn behavior_fn<T, A, R, E, F>(name: impl Into<String>, f: F) -> BehaviorHandle<T, A, R, E>
where
    T: 'static,
    A: 'static,
    R: 'static,
    E: 'static,
    F: for<'a> Fn(Invocation<'a, T, A, R, E>) -> Outcome<R, E> + Send + Sync + 'static,
{
    Arc::new(FnBehavior::new(name, f))
}
