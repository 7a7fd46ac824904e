// baseline-rs/src/lib.rs
// Rolling per-source baseline metrics and validation against them.
//
// The store keeps the last 30 samples per source plus their running
// averages. It is the only mutable state outside the outcome log, and it
// is rewritten whole on every update: safe under the one-writer-at-a-time
// scheduling this pipeline assumes, a known race if moved into a
// concurrent server.

pub mod store;
pub mod validate;

pub use store::{
    BaselineAverages, BaselineEntry, BaselineError, BaselineSample, BaselineStore,
    FileBaselineStore, MAX_SAMPLES,
};
pub use validate::{
    validate_metrics, ExecutionMetrics, FlagKind, FlagSeverity, ValidationFlag,
    ValidationThresholds,
};
