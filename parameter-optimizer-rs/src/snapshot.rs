// parameter-optimizer-rs/src/snapshot.rs
// Per-run recommendation snapshot document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use log_analyzer::{Analysis, Severity};

use crate::{Confidence, Recommendation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub total: usize,
    pub safe: usize,
    pub high_severity: usize,
    pub high_confidence: usize,
}

/// Headline numbers carried alongside the recommendations, pre-formatted
/// the same way as the analysis summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub total_executions: u64,
    pub success_rate: String,
    pub retry_rate: String,
    pub avg_duration: String,
}

/// One analysis run's recommendations plus context, written to a fixed
/// "latest" path and a dated history path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSnapshot {
    pub timestamp: DateTime<Utc>,
    pub analysis_id: Uuid,
    pub recommendations: Vec<Recommendation>,
    pub summary: SnapshotSummary,
    pub stats: SnapshotStats,
}

impl RecommendationSnapshot {
    pub fn new(analysis: &Analysis, recommendations: Vec<Recommendation>) -> Self {
        let summary = SnapshotSummary {
            total: recommendations.len(),
            safe: recommendations.iter().filter(|r| r.safe).count(),
            high_severity: recommendations
                .iter()
                .filter(|r| r.severity == Severity::High)
                .count(),
            high_confidence: recommendations
                .iter()
                .filter(|r| r.confidence == Confidence::High)
                .count(),
        };

        Self {
            timestamp: Utc::now(),
            analysis_id: analysis.metadata.analysis_id,
            recommendations,
            summary,
            stats: SnapshotStats {
                total_executions: analysis.summary.overall.total_executions,
                success_rate: analysis.summary.overall.success_rate.clone(),
                retry_rate: analysis.summary.overall.retry_rate.clone(),
                avg_duration: analysis.summary.overall.avg_duration.clone(),
            },
        }
    }
}
