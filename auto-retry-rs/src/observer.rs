// auto-retry-rs/src/observer.rs
// Lifecycle observer for retry execution.
//
// Modeled as a trait rather than bare callbacks so callers can wire
// notification delivery (or anything else) without the engine knowing the
// mechanism. All hooks default to no-ops.

use std::time::Duration;

use async_trait::async_trait;
use outcome_log::{AttemptRecord, ErrorClassification};

/// Observes the lifecycle of a single `execute` call.
///
/// Hook failures are the observer's own problem; implementations should
/// not panic. The engine awaits each hook before proceeding, so slow
/// observers delay the retry loop.
#[async_trait]
pub trait RetryObserver: Send + Sync {
    /// A retryable failure occurred and the engine will wait `delay`
    /// before the next attempt.
    async fn on_retry(&self, attempt: u32, error: &ErrorClassification, delay: Duration) {
        let _ = (attempt, error, delay);
    }

    /// The operation succeeded after `attempts` attempts.
    async fn on_success(&self, attempts: u32, total_duration: Duration) {
        let _ = (attempts, total_duration);
    }

    /// All allowed attempts were used and the last error is final.
    async fn on_final_failure(&self, attempts: &[AttemptRecord], error: &ErrorClassification) {
        let _ = (attempts, error);
    }
}
