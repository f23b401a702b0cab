//! Dispatch counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::invocation::ChainExit;

/// Dispatcher counters (thread-safe, cheap to clone).
#[derive(Debug, Clone, Default)]
pub struct DispatchMetrics {
    /// Calls handled by the dispatcher
    pub dispatches: Arc<AtomicU64>,
    /// Calls with no selector markers, sent straight to the original
    pub direct_calls: Arc<AtomicU64>,
    /// Calls whose markers resolved to zero behaviors
    pub unresolved_fallbacks: Arc<AtomicU64>,
    /// Calls run through a behavior chain
    pub intercepted_calls: Arc<AtomicU64>,
    /// Behaviors entered across all chains
    pub behaviors_entered: Arc<AtomicU64>,
    /// Chains ended by a behavior that did not proceed
    pub short_circuits: Arc<AtomicU64>,
    /// Original logic failures that reached the caller
    pub original_failures: Arc<AtomicU64>,
    /// Behavior-raised failures that reached the caller
    pub behavior_failures: Arc<AtomicU64>,
    /// Original logic failures replaced by a behavior's result
    pub recovered_failures: Arc<AtomicU64>,
}

impl DispatchMetrics {
    pub fn record_dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_direct_call(&self) {
        self.direct_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unresolved_fallback(&self) {
        self.unresolved_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished chain.
    ///
    /// `succeeded` is whether the caller got `Ok`; `behavior_failure` whether an
    /// `Err` came from a behavior rather than the original logic.
    pub fn record_chain(
        &self,
        exit: ChainExit,
        entered: usize,
        succeeded: bool,
        behavior_failure: bool,
    ) {
        self.intercepted_calls.fetch_add(1, Ordering::Relaxed);
        let entered = entered as u64;
        self.behaviors_entered.fetch_add(entered, Ordering::Relaxed);
        if exit == ChainExit::ShortCircuited {
            self.short_circuits.fetch_add(1, Ordering::Relaxed);
        }
        if succeeded {
            if exit == ChainExit::OriginalFailed {
                self.recovered_failures.fetch_add(1, Ordering::Relaxed);
            }
        } else if behavior_failure {
            self.behavior_failures.fetch_add(1, Ordering::Relaxed);
        } else {
            self.original_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an original failure on the direct (no chain) path.
    pub fn record_direct_failure(&self) {
        self.original_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dispatches: self.dispatches.load(Ordering::Relaxed),
            direct_calls: self.direct_calls.load(Ordering::Relaxed),
            unresolved_fallbacks: self.unresolved_fallbacks.load(Ordering::Relaxed),
            intercepted_calls: self.intercepted_calls.load(Ordering::Relaxed),
            behaviors_entered: self.behaviors_entered.load(Ordering::Relaxed),
            short_circuits: self.short_circuits.load(Ordering::Relaxed),
            original_failures: self.original_failures.load(Ordering::Relaxed),
            behavior_failures: self.behavior_failures.load(Ordering::Relaxed),
            recovered_failures: self.recovered_failures.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.dispatches,
            &self.direct_calls,
            &self.unresolved_fallbacks,
            &self.intercepted_calls,
            &self.behaviors_entered,
            &self.short_circuits,
            &self.original_failures,
            &self.behavior_failures,
            &self.recovered_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Snapshot of metrics (for reporting).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub dispatches: u64,
    pub direct_calls: u64,
    pub unresolved_fallbacks: u64,
    pub intercepted_calls: u64,
    pub behaviors_entered: u64,
    pub short_circuits: u64,
    pub original_failures: u64,
    pub behavior_failures: u64,
    pub recovered_failures: u64,
}

impl MetricsSnapshot {
    /// Fraction of dispatches that went through a behavior chain.
    pub fn interception_rate(&self) -> f64 {
        if self.dispatches == 0 {
            0.0
        } else {
            self.intercepted_calls as f64 / self.dispatches as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_chain_classification() {
        let metrics = DispatchMetrics::default();
        metrics.record_chain(ChainExit::Original, 2, true, false);
        metrics.record_chain(ChainExit::ShortCircuited, 1, true, false);
        metrics.record_chain(ChainExit::OriginalFailed, 2, false, false);
        metrics.record_chain(ChainExit::OriginalFailed, 1, true, false);
        metrics.record_chain(ChainExit::ShortCircuited, 1, false, true);

        let snap = metrics.snapshot();
        assert_eq!(snap.intercepted_calls, 5);
        assert_eq!(snap.behaviors_entered, 7);
        assert_eq!(snap.short_circuits, 2);
        assert_eq!(snap.original_failures, 1);
        assert_eq!(snap.recovered_failures, 1);
        assert_eq!(snap.behavior_failures, 1);
    }

    #[test]
    fn test_clones_share_counters_and_reset() {
        let metrics = DispatchMetrics::default();
        let clone = metrics.clone();
        clone.record_dispatch();
        clone.record_direct_call();
        assert_eq!(metrics.snapshot().dispatches, 1);
        assert_eq!(metrics.snapshot().interception_rate(), 0.0);

        metrics.reset();
        assert_eq!(clone.snapshot(), MetricsSnapshot::default());
    }
}
