// log-analyzer-rs/src/lib.rs
// Analysis of the execution outcome log.
//
// Everything here is a pure function of the log contents plus the clock:
// statistics, patterns and trends are recomputed in full on every run and
// never mutated incrementally. Data-quality problems inside the log
// (malformed lines) are skipped by the reader; only total unavailability
// of the input is an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use outcome_log::{ExecutionOutcome, LogError, OutcomeLog};

pub mod patterns;
pub mod report;
pub mod stats;
pub mod summary;
pub mod trends;

#[cfg(test)]
mod tests;

pub use patterns::{Pattern, PatternThresholds, PatternType, Severity};
pub use stats::{ErrorBreakdown, ExecutionStats, PerformanceMetrics, Stats, TestStats};
pub use summary::Summary;
pub use trends::{MetricTrend, SourceTrend, TrendDirection, Trends};

/// Analyzer error type.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("log error: {0}")]
    Log(#[from] LogError),
}

/// Analysis tuning knobs, injected explicitly so tests can use alternate
/// thresholds.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Only entries newer than now minus this window are analyzed.
    pub time_window: std::time::Duration,
    /// Per-source sample count below which no patterns are evaluated.
    pub min_sample_size: u64,
    pub thresholds: PatternThresholds,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            time_window: std::time::Duration::from_secs(7 * 24 * 3600),
            min_sample_size: 5,
            thresholds: PatternThresholds::default(),
        }
    }
}

impl AnalyzerOptions {
    pub fn with_window_days(days: u64) -> Self {
        Self {
            time_window: std::time::Duration::from_secs(days * 24 * 3600),
            ..Self::default()
        }
    }
}

/// Full analysis output for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub summary: Summary,
    pub stats: Stats,
    pub patterns: Vec<Pattern>,
    pub trends: Trends,
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub analysis_id: Uuid,
    pub total_entries: usize,
    pub analyzed_entries: usize,
    pub time_window_ms: u64,
    pub analyzed_at: DateTime<Utc>,
}

/// Reads the outcome log and derives statistics, patterns and trends.
pub struct LogAnalyzer {
    options: AnalyzerOptions,
}

impl LogAnalyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self { options }
    }

    pub async fn analyze(&self, log: &OutcomeLog) -> Result<Analysis, AnalyzeError> {
        self.analyze_at(log, Utc::now()).await
    }

    /// Analysis with an explicit "now", used by tests for a stable window.
    pub async fn analyze_at(
        &self,
        log: &OutcomeLog,
        now: DateTime<Utc>,
    ) -> Result<Analysis, AnalyzeError> {
        let entries = log.read_all().await?;
        let cutoff = now - chrono::Duration::milliseconds(self.options.time_window.as_millis() as i64);

        let filtered: Vec<ExecutionOutcome> = entries
            .iter()
            .filter(|entry| entry.timestamp >= cutoff)
            .cloned()
            .collect();

        let stats = stats::compute_stats(&filtered);
        let patterns = patterns::detect_patterns(
            &stats,
            self.options.min_sample_size,
            &self.options.thresholds,
        );
        let trends = trends::analyze_trends(&filtered);
        let summary = summary::build_summary(&stats);

        tracing::debug!(
            total = entries.len(),
            analyzed = filtered.len(),
            patterns = patterns.len(),
            "analysis complete"
        );

        Ok(Analysis {
            summary,
            stats,
            patterns,
            trends,
            metadata: AnalysisMetadata {
                analysis_id: Uuid::new_v4(),
                total_entries: entries.len(),
                analyzed_entries: filtered.len(),
                time_window_ms: self.options.time_window.as_millis() as u64,
                analyzed_at: now,
            },
        })
    }
}
