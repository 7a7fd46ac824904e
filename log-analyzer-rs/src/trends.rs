// log-analyzer-rs/src/trends.rs
// Per-source direction-of-change detection over daily aggregates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use outcome_log::ExecutionOutcome;

/// Direction of a metric between the first and second half of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "increasing"),
            TrendDirection::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// One metric's half-over-half comparison. `change` is a signed
/// percentage of the first-half average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTrend {
    pub trend: TrendDirection,
    pub change: f64,
    pub first_half: f64,
    pub second_half: f64,
}

impl MetricTrend {
    fn compare(first: f64, second: f64, guard_zero_base: bool) -> Self {
        let base = if guard_zero_base && first == 0.0 {
            1.0
        } else {
            first
        };
        Self {
            trend: if second > first {
                TrendDirection::Increasing
            } else {
                TrendDirection::Decreasing
            },
            change: (second - first) / base * 100.0,
            first_half: first,
            second_half: second,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTrend {
    pub retry_rate: MetricTrend,
    pub avg_duration: MetricTrend,
}

pub type Trends = BTreeMap<String, SourceTrend>;

#[derive(Default)]
struct DayBucket {
    total: u64,
    retries: u64,
    durations: Vec<u64>,
}

struct DayPoint {
    retry_rate: f64,
    avg_duration: f64,
}

/// Compare the first and second half of each source's daily aggregates.
///
/// Days are calendar days in UTC. Sources with fewer than two active days
/// in the window get no trend entry. The split point is floor(n / 2), so
/// with an odd day count the second half holds the extra day.
pub fn analyze_trends(entries: &[ExecutionOutcome]) -> Trends {
    let mut by_day: BTreeMap<String, BTreeMap<String, DayBucket>> = BTreeMap::new();

    for entry in entries {
        let Some(source_id) = entry.source_id() else {
            continue;
        };
        let day = entry.timestamp.format("%Y-%m-%d").to_string();
        let bucket = by_day
            .entry(source_id.to_string())
            .or_default()
            .entry(day)
            .or_default();

        bucket.total += 1;
        if entry.was_retried() {
            bucket.retries += 1;
        }
        bucket.durations.push(entry.total_duration);
    }

    let mut trends = Trends::new();

    for (source_id, days) in by_day {
        if days.len() < 2 {
            continue;
        }

        // BTreeMap iteration is already date-ordered for ISO day keys.
        let points: Vec<DayPoint> = days
            .values()
            .map(|bucket| DayPoint {
                retry_rate: bucket.retries as f64 / bucket.total as f64,
                avg_duration: bucket.durations.iter().sum::<u64>() as f64
                    / bucket.durations.len() as f64,
            })
            .collect();

        let mid = points.len() / 2;
        let (first, second) = points.split_at(mid);

        let retry_first = first.iter().map(|p| p.retry_rate).sum::<f64>() / first.len() as f64;
        let retry_second = second.iter().map(|p| p.retry_rate).sum::<f64>() / second.len() as f64;
        let duration_first =
            first.iter().map(|p| p.avg_duration).sum::<f64>() / first.len() as f64;
        let duration_second =
            second.iter().map(|p| p.avg_duration).sum::<f64>() / second.len() as f64;

        trends.insert(
            source_id,
            SourceTrend {
                retry_rate: MetricTrend::compare(retry_first, retry_second, true),
                avg_duration: MetricTrend::compare(duration_first, duration_second, false),
            },
        );
    }

    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use outcome_log::{AttemptRecord, ExecutionContext};

    fn outcome(source: &str, day: u32, attempts: u32, duration: u64) -> ExecutionOutcome {
        let records: Vec<AttemptRecord> = (1..=attempts)
            .map(|n| AttemptRecord {
                attempt: n,
                success: n == attempts,
                duration: duration / attempts as u64,
                error: None,
            })
            .collect();
        let mut entry =
            ExecutionOutcome::success(ExecutionContext::for_source(source), records, duration);
        entry.timestamp = Utc.with_ymd_and_hms(2026, 8, day, 12, 0, 0).unwrap();
        entry
    }

    #[test]
    fn single_day_produces_no_trend() {
        let entries = vec![outcome("only", 1, 1, 100), outcome("only", 1, 2, 200)];
        assert!(analyze_trends(&entries).is_empty());
    }

    #[test]
    fn rising_duration_reports_increasing() {
        // Four days: avg 100ms, 100ms then 300ms, 300ms.
        let entries = vec![
            outcome("s", 1, 1, 100),
            outcome("s", 2, 1, 100),
            outcome("s", 3, 1, 300),
            outcome("s", 4, 1, 300),
        ];
        let trends = analyze_trends(&entries);
        let trend = &trends["s"];
        assert_eq!(trend.avg_duration.trend, TrendDirection::Increasing);
        assert!((trend.avg_duration.change - 200.0).abs() < 1e-9);
        assert_eq!(trend.retry_rate.trend, TrendDirection::Decreasing);
    }

    #[test]
    fn zero_retry_baseline_uses_unit_divisor() {
        // First half retry rate 0, second half 1.0: change is 100, not inf.
        let entries = vec![
            outcome("s", 1, 1, 100),
            outcome("s", 2, 3, 100),
        ];
        let trends = analyze_trends(&entries);
        let retry = &trends["s"].retry_rate;
        assert_eq!(retry.trend, TrendDirection::Increasing);
        assert!((retry.change - 100.0).abs() < 1e-9);
        assert!(retry.change.is_finite());
    }

    #[test]
    fn odd_day_count_gives_second_half_the_extra_day() {
        // Days: 100, 400, 400. mid = 1, first = [100], second = [400, 400].
        let entries = vec![
            outcome("s", 1, 1, 100),
            outcome("s", 2, 1, 400),
            outcome("s", 3, 1, 400),
        ];
        let trends = analyze_trends(&entries);
        let duration = &trends["s"].avg_duration;
        assert!((duration.first_half - 100.0).abs() < 1e-9);
        assert!((duration.second_half - 400.0).abs() < 1e-9);
    }
}
