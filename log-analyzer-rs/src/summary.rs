// log-analyzer-rs/src/summary.rs
// Human-oriented rollup with pre-formatted rate strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use outcome_log::ErrorCategory;

use crate::stats::Stats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total_executions: u64,
    pub success_rate: String,
    pub retry_rate: String,
    pub failure_rate: String,
    pub avg_attempts: String,
    pub avg_duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub executions: u64,
    pub success_rate: String,
    pub retry_rate: String,
    pub avg_duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopError {
    pub category: ErrorCategory,
    pub count: u64,
    pub top_type: String,
}

/// Pre-formatted digest for reports and notifications. Rates are rendered
/// as strings here so every consumer prints them identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub overall: OverallSummary,
    pub sources: BTreeMap<String, SourceSummary>,
    pub top_errors: Vec<TopError>,
}

fn rate(numerator: u64, denominator: u64) -> String {
    if denominator == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", numerator as f64 / denominator as f64 * 100.0)
}

/// Build the digest. An empty window yields zero counts and "0.0%" rates
/// rather than undefined values.
pub fn build_summary(stats: &Stats) -> Summary {
    let overall = OverallSummary {
        total_executions: stats.overall.total,
        success_rate: rate(stats.overall.success, stats.overall.total),
        retry_rate: rate(stats.overall.retries, stats.overall.total),
        failure_rate: rate(stats.overall.failure, stats.overall.total),
        avg_attempts: format!("{:.2}", stats.overall.avg_attempts),
        avg_duration: format!("{}ms", stats.overall.avg_duration.round() as u64),
    };

    let sources = stats
        .by_source
        .iter()
        .map(|(source_id, data)| {
            (
                source_id.clone(),
                SourceSummary {
                    executions: data.total,
                    success_rate: rate(data.success, data.total),
                    retry_rate: rate(data.retries, data.total),
                    avg_duration: format!("{}ms", data.avg_duration.round() as u64),
                },
            )
        })
        .collect();

    let mut top_errors: Vec<TopError> = stats
        .by_error
        .iter()
        .map(|(category, breakdown)| TopError {
            category: *category,
            count: breakdown.count,
            top_type: breakdown
                .top_type()
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
        .collect();
    top_errors.sort_by(|a, b| b.count.cmp(&a.count));
    top_errors.truncate(5);

    Summary {
        overall,
        sources,
        top_errors,
    }
}
