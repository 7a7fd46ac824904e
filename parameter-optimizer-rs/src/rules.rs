// parameter-optimizer-rs/src/rules.rs
// Per-pattern recommendation rules.

use serde_json::json;

use log_analyzer::stats::percentile;
use log_analyzer::trends::{SourceTrend, TrendDirection};
use log_analyzer::{ExecutionStats, Pattern};
use outcome_log::ErrorCategory;

use crate::safety::Param;
use crate::{Confidence, OptimizerConfig, Recommendation};

// Sample counts per day for the inferred schedule frequencies.
const QUARTER_HOURLY_PER_DAY: u64 = 96;
const HOURLY_PER_DAY: u64 = 24;

/// Frequency-inferred sample gate: a source is trusted only once it has
/// 3 days' worth of samples for an inferred 15-minute schedule, or 7 days'
/// worth for hourly or daily schedules. The frequency itself is guessed
/// from sample count magnitude; a declared per-source frequency would be
/// sturdier and can replace this in one place.
pub fn has_sufficient_samples(total: u64) -> bool {
    let min_required = if total >= QUARTER_HOURLY_PER_DAY * 3 {
        QUARTER_HOURLY_PER_DAY * 3
    } else if total >= HOURLY_PER_DAY * 7 {
        HOURLY_PER_DAY * 7
    } else {
        7
    };
    total >= min_required
}

/// maxRetries proposal for high retry / failure rates. Escalates by +2 for
/// severe rates, damps to +1 on an improving trend, allows one extra step
/// on a degrading one, then clamps to the safety envelope. A proposal equal
/// to the current value is dropped.
pub fn recommend_max_retries(
    pattern: &Pattern,
    stats: &ExecutionStats,
    trend: Option<&SourceTrend>,
    source_id: &str,
    config: &OptimizerConfig,
) -> Option<Recommendation> {
    let current = config.current.max_retries;
    let bounds = config.safety.max_retries;
    let retry_rate = stats.retry_rate;
    let failure_rate = stats.failure_rate;

    let mut proposed = if failure_rate > 0.05 || retry_rate > 0.20 {
        (current + 2).min(bounds.max)
    } else {
        current + 1
    };

    if let Some(trend) = trend {
        match trend.retry_rate.trend {
            TrendDirection::Decreasing => proposed = proposed.min(current + 1),
            TrendDirection::Increasing => proposed = (proposed + 1).min(bounds.max),
        }
    }

    proposed = bounds.clamp(proposed);
    if proposed == current {
        return None;
    }

    Some(Recommendation {
        source_id: source_id.to_string(),
        param: Param::MaxRetries,
        current,
        proposed,
        reason: format!(
            "Retry rate {:.1}% (threshold: 10%), Failure rate {:.2}%",
            retry_rate * 100.0,
            failure_rate * 100.0
        ),
        expected_improvement: estimate_retry_improvement(current, proposed),
        pattern: pattern.pattern_type,
        severity: pattern.severity,
        safe: config.safety.is_safe(Param::MaxRetries, proposed),
        confidence: calculate_confidence(stats, trend),
        warning: None,
        recommendation: None,
        metadata: json!({
            "retryRate": retry_rate,
            "failureRate": failure_rate,
            "trend": trend_label(trend.map(|t| t.retry_rate.trend)),
            "sampleSize": stats.total,
        }),
    })
}

/// timeout proposal for slow responses. Targets 1.5x the source's p95,
/// rounded to the nearest 5 seconds and clamped. Decreasing the timeout is
/// allowed only on a clearly improving duration trend.
pub fn recommend_timeout(
    pattern: &Pattern,
    stats: &ExecutionStats,
    trend: Option<&SourceTrend>,
    source_id: &str,
    config: &OptimizerConfig,
) -> Option<Recommendation> {
    let current = config.current.timeout_ms;

    let mut sorted = stats.durations.clone();
    sorted.sort_unstable();
    let p95 = percentile(&sorted, 95.0);

    let target = (p95 as f64 * 1.5).ceil();
    let proposed = (target / 5000.0).round() as u64 * 5000;
    let bounded = config.safety.timeout.clamp(proposed);

    if bounded == current {
        return None;
    }
    if bounded < current {
        match trend {
            Some(trend) if trend.avg_duration.trend == TrendDirection::Decreasing => {}
            _ => return None,
        }
    }

    Some(Recommendation {
        source_id: source_id.to_string(),
        param: Param::Timeout,
        current,
        proposed: bounded,
        reason: format!(
            "P95 response {}ms, avg {}ms (current timeout: {}ms)",
            p95,
            stats.avg_duration.round() as u64,
            current
        ),
        expected_improvement: if bounded > current {
            "Timeout errors eliminated".to_string()
        } else {
            "Faster failure detection".to_string()
        },
        pattern: pattern.pattern_type,
        severity: pattern.severity,
        safe: config.safety.is_safe(Param::Timeout, bounded),
        confidence: calculate_confidence(stats, trend),
        warning: None,
        recommendation: None,
        metadata: json!({
            "avgDuration": stats.avg_duration,
            "p95Duration": p95,
            "trend": trend_label(trend.map(|t| t.avg_duration.trend)),
            "sampleSize": stats.total,
        }),
    })
}

/// backoffBase proposal for rate limiting: when the dominant recurring
/// HTTP error is a 429, double the base delay. Dropped when already at the
/// envelope ceiling. Rate limiting is an unambiguous signal, so confidence
/// is fixed at medium regardless of sample size.
pub fn recommend_backoff(
    pattern: &Pattern,
    source_id: &str,
    config: &OptimizerConfig,
) -> Option<Recommendation> {
    if pattern.category != Some(ErrorCategory::Http)
        || pattern.top_error_type.as_deref() != Some("HTTP 429")
    {
        return None;
    }

    let current = config.current.backoff_base_ms;
    let proposed = current * 2;
    if proposed > config.safety.backoff_base.max {
        return None;
    }

    Some(Recommendation {
        source_id: source_id.to_string(),
        param: Param::BackoffBase,
        current,
        proposed,
        reason: format!(
            "HTTP 429 (Rate Limit) errors: {} times",
            pattern.value as u64
        ),
        expected_improvement: "Rate limit errors reduced".to_string(),
        pattern: pattern.pattern_type,
        severity: pattern.severity,
        safe: config.safety.is_safe(Param::BackoffBase, proposed),
        confidence: Confidence::Medium,
        warning: None,
        recommendation: None,
        metadata: json!({
            "errorCount": pattern.value as u64,
            "errorType": pattern.top_error_type,
        }),
    })
}

/// Recovery model: each added retry recovers ~70% of remaining failures.
/// Reports the relative reduction in the final failure rate.
fn estimate_retry_improvement(current: u64, proposed: u64) -> String {
    let recovery_rate: f64 = 0.70;
    let current_recovery = 1.0 - (1.0 - recovery_rate).powi(current as i32);
    let proposed_recovery = 1.0 - (1.0 - recovery_rate).powi(proposed as i32);

    let improvement = (proposed_recovery - current_recovery) / (1.0 - current_recovery);
    format!("Final failure rate -{:.0}%", improvement * 100.0)
}

/// Score 0..8: sample size contributes up to 3, a clear retry-rate trend
/// up to 2. Maps to high at >=4, medium at >=2, otherwise low.
pub fn calculate_confidence(stats: &ExecutionStats, trend: Option<&SourceTrend>) -> Confidence {
    let mut score = 0;

    if stats.total >= 500 {
        score += 3;
    } else if stats.total >= 200 {
        score += 2;
    } else if stats.total >= 100 {
        score += 1;
    }

    if let Some(trend) = trend {
        let change = trend.retry_rate.change.abs();
        if change > 50.0 {
            score += 2;
        } else if change > 20.0 {
            score += 1;
        }
    }

    if score >= 4 {
        Confidence::High
    } else if score >= 2 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn trend_label(direction: Option<TrendDirection>) -> String {
    direction
        .map(|d| d.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
