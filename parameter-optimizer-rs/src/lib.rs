// parameter-optimizer-rs/src/lib.rs
// Turns detected patterns into bounded configuration-change
// recommendations.
//
// Recommendations are advisory only. Nothing here writes configuration;
// the output is a ranked list for a human (or a separate, explicitly
// confirmed apply step) to act on. Malformed or unrecognized pattern
// input never fails a run, it simply yields no recommendation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use log_analyzer::{Pattern, PatternType, Severity, Stats, Trends};

pub mod combine;
pub mod notify;
pub mod rules;
pub mod safety;
pub mod snapshot;


pub use notify::{NotificationField, NotificationPayload};
pub use safety::{Param, ParamRange, SafetyRules};
pub use snapshot::{RecommendationSnapshot, SnapshotStats, SnapshotSummary};

/// Confidence in priority order: High sorts before Medium before Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// One proposed parameter change for one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub source_id: String,
    pub param: Param,
    pub current: u64,
    pub proposed: u64,
    pub reason: String,
    pub expected_improvement: String,
    pub pattern: PatternType,
    pub severity: Severity,
    pub safe: bool,
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    pub metadata: serde_json::Value,
}

/// Baseline parameter values that proposals are measured against.
#[derive(Debug, Clone, Copy)]
pub struct CurrentParams {
    pub max_retries: u64,
    pub timeout_ms: u64,
    pub backoff_base_ms: u64,
}

impl Default for CurrentParams {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_ms: 15000,
            backoff_base_ms: 1000,
        }
    }
}

/// Optimizer configuration, injected rather than read from globals.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    pub current: CurrentParams,
    pub safety: SafetyRules,
    /// Reference re-trigger interval for recurring jobs.
    pub reference_interval_ms: u64,
    /// Fraction of the interval that retrying may consume before the
    /// combination is flagged.
    pub interval_budget: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            current: CurrentParams::default(),
            safety: SafetyRules::default(),
            reference_interval_ms: 15 * 60 * 1000,
            interval_budget: 0.8,
        }
    }
}

pub struct ParameterOptimizer {
    config: OptimizerConfig,
}

impl ParameterOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Produce the ranked recommendation list for one analysis run.
    pub fn generate_recommendations(
        &self,
        patterns: &[Pattern],
        stats: &Stats,
        trends: &Trends,
    ) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        for (source_id, source_patterns) in group_patterns_by_source(patterns, stats) {
            let Some(source_stats) = stats.by_source.get(&source_id) else {
                continue;
            };

            if !rules::has_sufficient_samples(source_stats.total) {
                tracing::info!(
                    source_id = %source_id,
                    samples = source_stats.total,
                    "insufficient samples, skipping source"
                );
                continue;
            }

            let trend = trends.get(&source_id);
            for pattern in source_patterns {
                let rec = match pattern.pattern_type {
                    PatternType::HighRetryRate | PatternType::HighFailureRate => {
                        rules::recommend_max_retries(
                            pattern,
                            source_stats,
                            trend,
                            &source_id,
                            &self.config,
                        )
                    }
                    PatternType::SlowResponse => rules::recommend_timeout(
                        pattern,
                        source_stats,
                        trend,
                        &source_id,
                        &self.config,
                    ),
                    PatternType::RecurringError => {
                        rules::recommend_backoff(pattern, &source_id, &self.config)
                    }
                    PatternType::InconsistentPerformance => None,
                };
                if let Some(rec) = rec {
                    recommendations.push(rec);
                }
            }
        }

        combine::validate_combinations(&mut recommendations, &self.config);
        prioritize(&mut recommendations);
        recommendations
    }
}

/// Group patterns by the source they apply to. Source-scoped patterns map
/// directly; category-scoped patterns (recurring errors) are attributed to
/// every source whose recorded error events include that category.
fn group_patterns_by_source<'a>(
    patterns: &'a [Pattern],
    stats: &Stats,
) -> BTreeMap<String, Vec<&'a Pattern>> {
    let mut by_source: BTreeMap<String, Vec<&Pattern>> = BTreeMap::new();

    for pattern in patterns {
        if let Some(source_id) = &pattern.source_id {
            by_source.entry(source_id.clone()).or_default().push(pattern);
        } else if let Some(category) = pattern.category {
            for (source_id, source_stats) in &stats.by_source {
                if source_stats
                    .errors
                    .iter()
                    .any(|event| event.category == category)
                {
                    by_source.entry(source_id.clone()).or_default().push(pattern);
                }
            }
        }
    }

    by_source
}

/// Severity first, then confidence, then unsafe before safe so the items
/// needing review surface at the top.
fn prioritize(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(a.confidence.cmp(&b.confidence))
            .then(a.safe.cmp(&b.safe))
    });
}
