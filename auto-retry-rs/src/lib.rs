// auto-retry-rs/src/lib.rs
// Library interface for the auto-retry execution engine.
//
// Public API is intentionally small: configure a `RetryExecutor`, hand it
// an async operation, get back either the operation's value (with attempt
// accounting) or the operation's own last error.
//
// Design notes:
// - Attempts are strictly sequential; each backoff depends on the outcome
//   of the previous attempt.
// - Every `execute` call appends exactly one outcome line to the log,
//   success or failure. A failing log write is reported through tracing
//   and never changes the operation's result.
// - The original error is propagated unchanged on exhaustion or on a
//   non-retryable classification, so callers keep the ability to match on
//   their own failure types.

pub mod backoff;
pub mod classify;
pub mod error;
pub mod executor;
pub mod observer;


pub use backoff::BackoffStrategy;
pub use classify::classify;
pub use error::OperationError;
pub use executor::{RetryConfig, RetryExecutor, RetryOutcome};
pub use observer::RetryObserver;
