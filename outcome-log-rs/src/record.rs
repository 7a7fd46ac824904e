// outcome-log-rs/src/record.rs
// Structured execution outcome records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Final disposition of one `execute` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Failure,
}

/// Coarse error category derived during classification.
///
/// `Network`, `Http` and `Timeout` are considered transient and therefore
/// retryable; `Unknown` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Network,
    Http,
    Timeout,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Http => write!(f, "http"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// Classifier output attached to failed attempts.
///
/// `retryable` and `category` are derived by the retry engine, never
/// supplied by the caller. `suggested_fix` is a static advisory string
/// keyed by the error code / status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorClassification {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub retryable: bool,
    pub category: ErrorCategory,
    pub suggested_fix: String,
}

/// One attempt inside an `execute` call. Attempt numbers are 1-based and
/// contiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub attempt: u32,
    pub success: bool,
    /// Wall-clock duration of this attempt in milliseconds.
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorClassification>,
}

/// Free-form caller context. `source_id` groups related executions (a
/// specific recurring job); entries without one are treated as ad-hoc or
/// test runs by the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ExecutionContext {
    /// Context tagged with a grouping source id.
    pub fn for_source(source_id: impl Into<String>) -> Self {
        Self {
            source_id: Some(source_id.into()),
            extra: BTreeMap::new(),
        }
    }

    /// Untagged context for ad-hoc or test executions.
    pub fn ad_hoc() -> Self {
        Self::default()
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// The recorded result of one `execute` call, success or failure, with
/// full attempt history.
///
/// Invariants maintained by the constructors:
/// - at least one attempt is present
/// - the last attempt's success flag matches `kind`
/// - `final_error` is present iff `kind` is `Failure`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: OutcomeKind,
    #[serde(default)]
    pub context: ExecutionContext,
    pub attempts: Vec<AttemptRecord>,
    /// Wall-clock milliseconds from first attempt start to final resolution.
    pub total_duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_error: Option<ErrorClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ExecutionOutcome {
    pub fn success(
        context: ExecutionContext,
        attempts: Vec<AttemptRecord>,
        total_duration: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: OutcomeKind::Success,
            context,
            attempts,
            total_duration,
            final_error: None,
            reason: None,
        }
    }

    pub fn failure(
        context: ExecutionContext,
        attempts: Vec<AttemptRecord>,
        total_duration: u64,
        final_error: ErrorClassification,
        reason: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            kind: OutcomeKind::Failure,
            context,
            attempts,
            total_duration,
            final_error: Some(final_error),
            reason,
        }
    }

    pub fn source_id(&self) -> Option<&str> {
        self.context.source_id.as_deref()
    }

    /// True when more than one attempt was needed.
    pub fn was_retried(&self) -> bool {
        self.attempts.len() > 1
    }
}
