// baseline-rs/src/validate.rs
// Metric validation against a source's baseline.

use serde::{Deserialize, Serialize};

use crate::store::BaselineEntry;

/// Metrics observed for one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionMetrics {
    /// Wall-clock completion time in milliseconds.
    pub completion_time: u64,
    pub token_usage: u64,
    pub tool_errors: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagKind {
    HighErrorRate,
    PerformanceDegradation,
    TokenUsageHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlagSeverity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFlag {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub severity: FlagSeverity,
    pub detail: String,
}

/// Validation thresholds. Tool errors use an absolute ceiling; time and
/// token checks are multiples of the source's baseline average and only
/// fire once a baseline exists.
#[derive(Debug, Clone, Copy)]
pub struct ValidationThresholds {
    pub max_tool_errors: u64,
    pub completion_time_multiplier: f64,
    pub token_usage_multiplier: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            max_tool_errors: 2,
            completion_time_multiplier: 1.5,
            token_usage_multiplier: 1.3,
        }
    }
}

pub fn validate_metrics(
    metrics: &ExecutionMetrics,
    baseline: Option<&BaselineEntry>,
    thresholds: &ValidationThresholds,
) -> Vec<ValidationFlag> {
    let mut flags = Vec::new();

    if metrics.tool_errors > thresholds.max_tool_errors {
        flags.push(ValidationFlag {
            kind: FlagKind::HighErrorRate,
            severity: FlagSeverity::High,
            detail: format!(
                "Tool errors: {} (threshold: {})",
                metrics.tool_errors, thresholds.max_tool_errors
            ),
        });
    }

    if let Some(baseline) = baseline {
        if baseline.avg.completion_time > 0.0 {
            let threshold = baseline.avg.completion_time * thresholds.completion_time_multiplier;
            if metrics.completion_time as f64 > threshold {
                flags.push(ValidationFlag {
                    kind: FlagKind::PerformanceDegradation,
                    severity: FlagSeverity::Medium,
                    detail: format!(
                        "Completion time: {}ms (baseline avg: {:.0}ms, threshold: {:.0}ms)",
                        metrics.completion_time, baseline.avg.completion_time, threshold
                    ),
                });
            }
        }

        if baseline.avg.token_usage > 0.0 {
            let threshold = baseline.avg.token_usage * thresholds.token_usage_multiplier;
            if metrics.token_usage as f64 > threshold {
                flags.push(ValidationFlag {
                    kind: FlagKind::TokenUsageHigh,
                    severity: FlagSeverity::Low,
                    detail: format!(
                        "Token usage: {} (baseline avg: {:.0}, threshold: {:.0})",
                        metrics.token_usage, baseline.avg.token_usage, threshold
                    ),
                });
            }
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BaselineAverages;

    fn baseline(completion_time: f64, token_usage: f64) -> BaselineEntry {
        BaselineEntry {
            samples: Vec::new(),
            avg: BaselineAverages {
                completion_time,
                token_usage,
                tool_errors: 0.0,
            },
        }
    }

    #[test]
    fn tool_errors_flag_without_any_baseline() {
        let metrics = ExecutionMetrics {
            completion_time: 100,
            token_usage: 10,
            tool_errors: 3,
        };
        let flags = validate_metrics(&metrics, None, &ValidationThresholds::default());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].kind, FlagKind::HighErrorRate);
        assert_eq!(flags[0].severity, FlagSeverity::High);
        assert!(flags[0].detail.contains("3"));
    }

    #[test]
    fn degradation_flags_need_a_baseline() {
        let metrics = ExecutionMetrics {
            completion_time: 10000,
            token_usage: 2000,
            tool_errors: 0,
        };
        assert!(validate_metrics(&metrics, None, &ValidationThresholds::default()).is_empty());

        let entry = baseline(4000.0, 1000.0);
        let flags = validate_metrics(&metrics, Some(&entry), &ValidationThresholds::default());
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].kind, FlagKind::PerformanceDegradation);
        assert_eq!(flags[0].severity, FlagSeverity::Medium);
        assert_eq!(flags[1].kind, FlagKind::TokenUsageHigh);
        assert_eq!(flags[1].severity, FlagSeverity::Low);
    }

    #[test]
    fn values_at_threshold_do_not_flag() {
        // 1.5x and 1.3x exactly are not over the line.
        let metrics = ExecutionMetrics {
            completion_time: 6000,
            token_usage: 1300,
            tool_errors: 2,
        };
        let entry = baseline(4000.0, 1000.0);
        let flags = validate_metrics(&metrics, Some(&entry), &ValidationThresholds::default());
        assert!(flags.is_empty());
    }

    #[test]
    fn flag_wire_format_is_screaming_snake() {
        let flag = ValidationFlag {
            kind: FlagKind::PerformanceDegradation,
            severity: FlagSeverity::Medium,
            detail: "slow".to_string(),
        };
        let value = serde_json::to_value(&flag).unwrap();
        assert_eq!(value["type"], "PERFORMANCE_DEGRADATION");
        assert_eq!(value["severity"], "MEDIUM");
    }
}
