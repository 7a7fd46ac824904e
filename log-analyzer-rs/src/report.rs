// log-analyzer-rs/src/report.rs
// Plain-text rendering of an analysis for terminal output.

use std::fmt::Write as _;

use crate::Analysis;

const RULE: &str = "============================================================";

/// Render the analysis as a plain-text report.
pub fn render_report(analysis: &Analysis) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(out, "Outcome Log Analysis");
    let _ = writeln!(out, "{RULE}\n");

    let overall = &analysis.summary.overall;
    let _ = writeln!(out, "Overall Summary:");
    let _ = writeln!(out, "  Total Executions: {}", overall.total_executions);
    let _ = writeln!(out, "  Success Rate: {}", overall.success_rate);
    let _ = writeln!(out, "  Retry Rate: {}", overall.retry_rate);
    let _ = writeln!(out, "  Failure Rate: {}", overall.failure_rate);
    let _ = writeln!(out, "  Avg Attempts: {}", overall.avg_attempts);
    let _ = writeln!(out, "  Avg Duration: {}", overall.avg_duration);

    let perf = &analysis.stats.performance;
    let _ = writeln!(out, "\nPerformance Metrics:");
    let _ = writeln!(out, "  P50 (median): {}ms", perf.p50);
    let _ = writeln!(out, "  P95: {}ms", perf.p95);
    let _ = writeln!(out, "  P99: {}ms", perf.p99);
    let _ = writeln!(out, "  Min: {}ms", perf.min);
    let _ = writeln!(out, "  Max: {}ms", perf.max);

    if !analysis.summary.sources.is_empty() {
        let _ = writeln!(out, "\nBy Source:");
        for (source_id, data) in &analysis.summary.sources {
            let _ = writeln!(out, "\n  {source_id}:");
            let _ = writeln!(out, "    Executions: {}", data.executions);
            let _ = writeln!(out, "    Success: {}", data.success_rate);
            let _ = writeln!(out, "    Retry: {}", data.retry_rate);
            let _ = writeln!(out, "    Avg Duration: {}", data.avg_duration);
        }
    }

    if analysis.patterns.is_empty() {
        let _ = writeln!(out, "\nNo patterns detected, all metrics within normal range");
    } else {
        let _ = writeln!(out, "\nDetected Patterns:");
        for pattern in &analysis.patterns {
            let _ = writeln!(
                out,
                "\n  [{}] {}",
                pattern.severity.to_string().to_uppercase(),
                pattern.pattern_type
            );
            if let Some(source_id) = &pattern.source_id {
                let _ = writeln!(out, "    Source: {source_id}");
            }
            if let Some(category) = &pattern.category {
                let _ = writeln!(out, "    Category: {category}");
            }
            let _ = writeln!(out, "    {}", pattern.description);
            let _ = writeln!(out, "    Suggestion: {}", pattern.suggestion);
        }
    }

    if !analysis.trends.is_empty() {
        let _ = writeln!(out, "\nTrends:");
        for (source_id, trend) in &analysis.trends {
            let _ = writeln!(out, "\n  {source_id}:");
            let _ = writeln!(
                out,
                "    Retry Rate: {} ({}{:.1}%)",
                trend.retry_rate.trend,
                if trend.retry_rate.change > 0.0 { "+" } else { "" },
                trend.retry_rate.change
            );
            let _ = writeln!(
                out,
                "    Avg Duration: {} ({}{:.1}%)",
                trend.avg_duration.trend,
                if trend.avg_duration.change > 0.0 { "+" } else { "" },
                trend.avg_duration.change
            );
        }
    }

    if !analysis.summary.top_errors.is_empty() {
        let _ = writeln!(out, "\nTop Errors:");
        for error in &analysis.summary.top_errors {
            let _ = writeln!(
                out,
                "  - {} ({}x) - {}",
                error.category, error.count, error.top_type
            );
        }
    }

    let metadata = &analysis.metadata;
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(
        out,
        "Analyzed: {} entries ({} total)",
        metadata.analyzed_entries, metadata.total_entries
    );
    let _ = writeln!(
        out,
        "Time Window: {} days",
        metadata.time_window_ms / (24 * 3600 * 1000)
    );
    let _ = writeln!(out, "Analyzed At: {}", metadata.analyzed_at.to_rfc3339());
    let _ = writeln!(out, "{RULE}");

    out
}
