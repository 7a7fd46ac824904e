// outcome-log-rs/src/lib.rs
// Shared data model and persistence for execution outcomes.
//
// Design notes:
// - `ExecutionOutcome` is the unit of durable state for the whole loop:
//   the retry engine appends one per call, the analyzer reads them back.
// - Records are immutable once appended. All statistics downstream are
//   recomputed from the log; nothing here is ever updated in place.
// - The wire format keeps camelCase field names so existing log files
//   written by earlier tooling stay readable.

pub mod record;
pub mod store;

pub use record::{
    AttemptRecord, ErrorCategory, ErrorClassification, ExecutionContext, ExecutionOutcome,
    OutcomeKind,
};
pub use store::{LogError, OutcomeLog};
