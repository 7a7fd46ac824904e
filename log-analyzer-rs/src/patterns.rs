// log-analyzer-rs/src/patterns.rs
// Threshold-based pattern detection over computed statistics.

use serde::{Deserialize, Serialize};

use outcome_log::ErrorCategory;

use crate::stats::{PerformanceMetrics, Stats};

/// Anomaly signal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    HighRetryRate,
    HighFailureRate,
    SlowResponse,
    InconsistentPerformance,
    RecurringError,
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternType::HighRetryRate => write!(f, "high_retry_rate"),
            PatternType::HighFailureRate => write!(f, "high_failure_rate"),
            PatternType::SlowResponse => write!(f, "slow_response"),
            PatternType::InconsistentPerformance => write!(f, "inconsistent_performance"),
            PatternType::RecurringError => write!(f, "recurring_error"),
        }
    }
}

/// Severity in priority order: High sorts before Medium before Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
        }
    }
}

/// A derived anomaly signal, scoped to either a source or an error
/// category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub description: String,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_executions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PerformanceMetrics>,
}

impl Pattern {
    fn for_source(pattern_type: PatternType, severity: Severity, source_id: &str) -> Self {
        Self {
            pattern_type,
            severity,
            source_id: Some(source_id.to_string()),
            category: None,
            value: 0.0,
            threshold: None,
            description: String::new(),
            suggestion: String::new(),
            affected_executions: None,
            top_error_type: None,
            current_timeout: None,
            recommended_timeout: None,
            metrics: None,
        }
    }
}

/// Detection thresholds with the historical defaults. Injectable so tests
/// can exercise boundaries without large fixtures.
#[derive(Debug, Clone)]
pub struct PatternThresholds {
    pub retry_rate: f64,
    pub retry_rate_high: f64,
    pub failure_rate: f64,
    pub failure_rate_high: f64,
    /// Reference execution timeout used for slow-response detection.
    pub reference_timeout_ms: f64,
    pub slow_fraction: f64,
    pub slow_fraction_high: f64,
    pub p95_over_p50_ratio: f64,
    pub recurring_error_count: u64,
    pub recurring_error_count_high: u64,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            retry_rate: 0.10,
            retry_rate_high: 0.20,
            failure_rate: 0.01,
            failure_rate_high: 0.05,
            reference_timeout_ms: 15000.0,
            slow_fraction: 0.8,
            slow_fraction_high: 0.9,
            p95_over_p50_ratio: 2.0,
            recurring_error_count: 3,
            recurring_error_count_high: 10,
        }
    }
}

/// Scan per-source statistics and the error breakdown for threshold
/// violations. Sources below `min_sample_size` are skipped entirely.
/// Results are ordered high severity first.
pub fn detect_patterns(
    stats: &Stats,
    min_sample_size: u64,
    thresholds: &PatternThresholds,
) -> Vec<Pattern> {
    let mut patterns = Vec::new();

    for (source_id, data) in &stats.by_source {
        if data.total < min_sample_size {
            continue;
        }

        if data.retry_rate > thresholds.retry_rate {
            let severity = if data.retry_rate > thresholds.retry_rate_high {
                Severity::High
            } else {
                Severity::Medium
            };
            let mut pattern = Pattern::for_source(PatternType::HighRetryRate, severity, source_id);
            pattern.value = data.retry_rate;
            pattern.threshold = Some(thresholds.retry_rate);
            pattern.description = format!(
                "{:.1}% of executions needed retry (threshold: {:.0}%)",
                data.retry_rate * 100.0,
                thresholds.retry_rate * 100.0
            );
            pattern.suggestion = "increase maxRetries".to_string();
            pattern.affected_executions = Some(data.retries);
            patterns.push(pattern);
        }

        if data.failure_rate > thresholds.failure_rate {
            let severity = if data.failure_rate > thresholds.failure_rate_high {
                Severity::High
            } else {
                Severity::Medium
            };
            let mut pattern =
                Pattern::for_source(PatternType::HighFailureRate, severity, source_id);
            pattern.value = data.failure_rate;
            pattern.threshold = Some(thresholds.failure_rate);
            pattern.description = format!(
                "{:.1}% final failure rate (threshold: {:.0}%)",
                data.failure_rate * 100.0,
                thresholds.failure_rate * 100.0
            );
            pattern.suggestion = "increase maxRetries or investigate root cause".to_string();
            pattern.affected_executions = Some(data.failure);
            patterns.push(pattern);
        }

        let slow_threshold = thresholds.reference_timeout_ms * thresholds.slow_fraction;
        if data.avg_duration > slow_threshold {
            let severity = if data.avg_duration
                > thresholds.reference_timeout_ms * thresholds.slow_fraction_high
            {
                Severity::High
            } else {
                Severity::Medium
            };
            let mut pattern = Pattern::for_source(PatternType::SlowResponse, severity, source_id);
            pattern.value = data.avg_duration;
            pattern.threshold = Some(slow_threshold);
            pattern.description = format!(
                "Avg response {}ms exceeds {:.0}% of the {}ms timeout",
                data.avg_duration.round() as u64,
                thresholds.slow_fraction * 100.0,
                thresholds.reference_timeout_ms as u64
            );
            pattern.suggestion = "increase timeout".to_string();
            pattern.current_timeout = Some(thresholds.reference_timeout_ms as u64);
            pattern.recommended_timeout = Some((data.avg_duration * 1.5).ceil() as u64);
            patterns.push(pattern);
        }

        let performance = PerformanceMetrics::from_durations(&data.durations);
        if performance.p50 > 0
            && (performance.p95 as f64) > (performance.p50 as f64) * thresholds.p95_over_p50_ratio
        {
            let ratio = performance.p95 as f64 / performance.p50 as f64;
            let mut pattern =
                Pattern::for_source(PatternType::InconsistentPerformance, Severity::Low, source_id);
            pattern.value = ratio;
            pattern.description = format!(
                "P95 ({}ms) is {:.1}x higher than median",
                performance.p95, ratio
            );
            pattern.suggestion = "investigate outliers".to_string();
            pattern.metrics = Some(performance);
            patterns.push(pattern);
        }
    }

    for (category, breakdown) in &stats.by_error {
        if breakdown.count > thresholds.recurring_error_count {
            let severity = if breakdown.count > thresholds.recurring_error_count_high {
                Severity::High
            } else {
                Severity::Medium
            };
            let top_type = breakdown
                .top_type()
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| "unknown".to_string());

            patterns.push(Pattern {
                pattern_type: PatternType::RecurringError,
                severity,
                source_id: None,
                category: Some(*category),
                value: breakdown.count as f64,
                threshold: Some(thresholds.recurring_error_count as f64),
                description: format!("{category} errors occurred {} times", breakdown.count),
                suggestion: suggestion_for_error(*category, &top_type).to_string(),
                affected_executions: None,
                top_error_type: Some(top_type),
                current_timeout: None,
                recommended_timeout: None,
                metrics: None,
            });
        }
    }

    patterns.sort_by_key(|pattern| pattern.severity);
    patterns
}

fn suggestion_for_error(category: ErrorCategory, top_type: &str) -> &'static str {
    match category {
        ErrorCategory::Timeout => "Increase timeout or check network latency",
        ErrorCategory::Http => {
            if top_type == "HTTP 429" {
                "Increase backoff delay to avoid rate limits"
            } else {
                "Check API status and retry logic"
            }
        }
        ErrorCategory::Network => "Check network connectivity and DNS resolution",
        ErrorCategory::Unknown => "Investigate error logs for root cause",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ExecutionStats;

    fn source_stats(total: u64, retries: u64, failure: u64, durations: Vec<u64>) -> ExecutionStats {
        let mut stats = ExecutionStats {
            total,
            success: total - failure,
            failure,
            retries,
            durations,
            ..ExecutionStats::default()
        };
        stats.retry_rate = retries as f64 / total as f64;
        stats.failure_rate = failure as f64 / total as f64;
        if !stats.durations.is_empty() {
            stats.avg_duration =
                stats.durations.iter().sum::<u64>() as f64 / stats.durations.len() as f64;
        }
        stats
    }

    #[test]
    fn severity_orders_high_first() {
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
    }

    #[test]
    fn high_retry_rate_detected_with_high_severity() {
        // Scenario: 100 outcomes, 25 retried -> retryRate 0.25 > 0.20.
        let mut stats = Stats::default();
        stats
            .by_source
            .insert("X".to_string(), source_stats(100, 25, 0, vec![100; 100]));

        let patterns = detect_patterns(&stats, 5, &PatternThresholds::default());
        let pattern = patterns
            .iter()
            .find(|p| p.pattern_type == PatternType::HighRetryRate)
            .expect("pattern emitted");
        assert_eq!(pattern.severity, Severity::High);
        assert_eq!(pattern.source_id.as_deref(), Some("X"));
        assert_eq!(pattern.threshold, Some(0.10));
        assert!((pattern.value - 0.25).abs() < 1e-9);
    }

    #[test]
    fn sources_below_min_sample_size_are_skipped() {
        let mut stats = Stats::default();
        stats
            .by_source
            .insert("tiny".to_string(), source_stats(4, 4, 4, vec![100; 4]));

        let patterns = detect_patterns(&stats, 5, &PatternThresholds::default());
        assert!(patterns.is_empty());
    }

    #[test]
    fn slow_response_recommends_scaled_timeout() {
        let mut stats = Stats::default();
        stats
            .by_source
            .insert("slow".to_string(), source_stats(10, 0, 0, vec![13000; 10]));

        let patterns = detect_patterns(&stats, 5, &PatternThresholds::default());
        let pattern = patterns
            .iter()
            .find(|p| p.pattern_type == PatternType::SlowResponse)
            .expect("pattern emitted");
        // 13000 > 0.8*15000 but not > 0.9*15000.
        assert_eq!(pattern.severity, Severity::Medium);
        assert_eq!(pattern.recommended_timeout, Some(19500));
    }

    #[test]
    fn inconsistent_performance_is_always_low() {
        let mut durations = vec![100; 90];
        durations.extend(vec![1000; 10]);
        let mut stats = Stats::default();
        stats
            .by_source
            .insert("jittery".to_string(), source_stats(100, 0, 0, durations));

        let patterns = detect_patterns(&stats, 5, &PatternThresholds::default());
        let pattern = patterns
            .iter()
            .find(|p| p.pattern_type == PatternType::InconsistentPerformance)
            .expect("pattern emitted");
        assert_eq!(pattern.severity, Severity::Low);
    }

    #[test]
    fn recurring_errors_scope_to_category() {
        let mut stats = Stats::default();
        let breakdown = stats.by_error.entry(ErrorCategory::Http).or_default();
        breakdown.count = 12;
        breakdown.types.insert("HTTP 429".to_string(), 9);
        breakdown.types.insert("HTTP 500".to_string(), 3);

        let patterns = detect_patterns(&stats, 5, &PatternThresholds::default());
        assert_eq!(patterns.len(), 1);
        let pattern = &patterns[0];
        assert_eq!(pattern.pattern_type, PatternType::RecurringError);
        assert_eq!(pattern.severity, Severity::High);
        assert_eq!(pattern.category, Some(ErrorCategory::Http));
        assert_eq!(pattern.top_error_type.as_deref(), Some("HTTP 429"));
        assert!(pattern.suggestion.contains("backoff"));
    }

    #[test]
    fn patterns_sort_by_severity() {
        let mut stats = Stats::default();
        // Low severity: inconsistent performance only.
        let mut durations = vec![100; 9];
        durations.push(1000);
        stats
            .by_source
            .insert("a".to_string(), source_stats(10, 0, 0, durations));
        // High severity: failure rate 10%.
        stats
            .by_source
            .insert("z".to_string(), source_stats(10, 0, 1, vec![100; 10]));

        let patterns = detect_patterns(&stats, 5, &PatternThresholds::default());
        assert!(patterns.len() >= 2);
        assert_eq!(patterns[0].severity, Severity::High);
        assert_eq!(patterns.last().unwrap().severity, Severity::Low);
    }
}
