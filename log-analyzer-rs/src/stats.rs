// log-analyzer-rs/src/stats.rs
// Aggregate statistics over windowed outcome entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use outcome_log::{ErrorCategory, ExecutionOutcome, OutcomeKind};

/// One recorded error occurrence within a source's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub category: ErrorCategory,
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Counters and rates for one execution population (overall or one source).
///
/// `retries` counts outcomes that needed more than one attempt, not the
/// number of extra attempts. `avg_attempts` follows the historical
/// definition `(total + retries) / total`, which equals the true mean only
/// when no outcome needs more than one retry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStats {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub retries: u64,
    pub retry_rate: f64,
    pub failure_rate: f64,
    pub avg_attempts: f64,
    pub avg_duration: f64,
    pub durations: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEvent>,
}

impl ExecutionStats {
    fn finalize(&mut self) {
        if self.total > 0 {
            self.retry_rate = self.retries as f64 / self.total as f64;
            self.failure_rate = self.failure as f64 / self.total as f64;
            self.avg_attempts = (self.total + self.retries) as f64 / self.total as f64;
        }
        if !self.durations.is_empty() {
            self.avg_duration =
                self.durations.iter().sum::<u64>() as f64 / self.durations.len() as f64;
        }
    }
}

/// Error occurrences aggregated by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBreakdown {
    pub count: u64,
    pub types: BTreeMap<String, u64>,
}

impl ErrorBreakdown {
    /// Most frequent error type in this category.
    pub fn top_type(&self) -> Option<(&str, u64)> {
        self.types
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(name, count)| (name.as_str(), *count))
    }
}

/// Duration percentiles via the nearest-rank method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub min: u64,
    pub max: u64,
}

impl PerformanceMetrics {
    pub fn from_durations(durations: &[u64]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }
        let mut sorted = durations.to_vec();
        sorted.sort_unstable();
        Self {
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Nearest-rank percentile over an ascending-sorted slice:
/// index = ceil(p/100 * n) - 1, clamped to the valid range.
pub fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

/// Counts for untagged (ad-hoc / test) executions, reported separately and
/// excluded from pattern detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStats {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
}

/// Full statistics for one analysis window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub overall: ExecutionStats,
    pub by_source: BTreeMap<String, ExecutionStats>,
    pub by_error: BTreeMap<ErrorCategory, ErrorBreakdown>,
    pub performance: PerformanceMetrics,
    pub tests: TestStats,
}

/// Compute overall, per-source and error-breakdown statistics.
///
/// Entries without a source id are summarized in `tests` only. Error
/// occurrences are collected from entries that failed or needed retries.
pub fn compute_stats(entries: &[ExecutionOutcome]) -> Stats {
    let mut stats = Stats::default();

    for entry in entries {
        let Some(source_id) = entry.source_id() else {
            stats.tests.total += 1;
            match entry.kind {
                OutcomeKind::Success => stats.tests.success += 1,
                OutcomeKind::Failure => stats.tests.failure += 1,
            }
            continue;
        };

        let source_stats = stats.by_source.entry(source_id.to_string()).or_default();

        stats.overall.total += 1;
        source_stats.total += 1;

        match entry.kind {
            OutcomeKind::Success => {
                stats.overall.success += 1;
                source_stats.success += 1;
            }
            OutcomeKind::Failure => {
                stats.overall.failure += 1;
                source_stats.failure += 1;
            }
        }

        if entry.was_retried() {
            stats.overall.retries += 1;
            source_stats.retries += 1;
        }

        stats.overall.durations.push(entry.total_duration);
        source_stats.durations.push(entry.total_duration);

        if entry.kind == OutcomeKind::Failure || entry.was_retried() {
            for attempt in &entry.attempts {
                if let Some(error) = &attempt.error {
                    let breakdown = stats.by_error.entry(error.category).or_default();
                    breakdown.count += 1;
                    *breakdown
                        .types
                        .entry(error.error_type.clone())
                        .or_insert(0) += 1;

                    source_stats.errors.push(ErrorEvent {
                        category: error.category,
                        error_type: error.error_type.clone(),
                        message: error.message.clone(),
                    });
                }
            }
        }
    }

    stats.overall.finalize();
    for source_stats in stats.by_source.values_mut() {
        source_stats.finalize();
    }
    stats.performance = PerformanceMetrics::from_durations(&stats.overall.durations);

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_is_nearest_rank() {
        let sorted: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&sorted, 50.0), 50);
        assert_eq!(percentile(&sorted, 95.0), 95);
        assert_eq!(percentile(&sorted, 99.0), 99);
        assert_eq!(percentile(&sorted, 100.0), 100);
    }

    #[test]
    fn percentile_small_samples_clamp() {
        assert_eq!(percentile(&[], 95.0), 0);
        assert_eq!(percentile(&[7], 50.0), 7);
        assert_eq!(percentile(&[7], 99.0), 7);
        let two = [3, 9];
        assert_eq!(percentile(&two, 50.0), 3);
        assert_eq!(percentile(&two, 95.0), 9);
    }

    #[test]
    fn percentiles_are_monotonic() {
        let durations: Vec<u64> = vec![120, 5, 900, 900, 43, 77, 5000, 250, 250, 31];
        let perf = PerformanceMetrics::from_durations(&durations);
        assert!(perf.min <= perf.p50);
        assert!(perf.p50 <= perf.p95);
        assert!(perf.p95 <= perf.p99);
        assert!(perf.p99 <= perf.max);
    }

    #[test]
    fn top_type_picks_most_frequent() {
        let mut breakdown = ErrorBreakdown::default();
        breakdown.count = 5;
        breakdown.types.insert("HTTP 500".to_string(), 2);
        breakdown.types.insert("HTTP 429".to_string(), 3);
        assert_eq!(breakdown.top_type(), Some(("HTTP 429", 3)));
    }

    #[test]
    fn finalize_uses_historical_avg_attempts_formula() {
        let mut stats = ExecutionStats {
            total: 10,
            success: 9,
            failure: 1,
            retries: 4,
            durations: vec![100; 10],
            ..ExecutionStats::default()
        };
        stats.finalize();
        assert!((stats.avg_attempts - 1.4).abs() < 1e-9);
        assert!((stats.retry_rate - 0.4).abs() < 1e-9);
        assert!((stats.failure_rate - 0.1).abs() < 1e-9);
        assert!((stats.avg_duration - 100.0).abs() < 1e-9);
    }
}
