use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use tempfile::TempDir;

use outcome_log::{
    AttemptRecord, ErrorCategory, ErrorClassification, ExecutionContext, ExecutionOutcome,
    OutcomeLog,
};

use crate::patterns::{PatternType, Severity};
use crate::trends::TrendDirection;
use crate::{AnalyzerOptions, LogAnalyzer};

fn timeout_classification() -> ErrorClassification {
    ErrorClassification {
        error_type: "ETIMEDOUT".to_string(),
        message: "socket timed out".to_string(),
        status_code: None,
        retryable: true,
        category: ErrorCategory::Network,
        suggested_fix: "Network timeout - check connection or increase timeout".to_string(),
    }
}

fn success_entry(source: &str, attempts: u32, duration: u64) -> ExecutionOutcome {
    let records: Vec<AttemptRecord> = (1..=attempts)
        .map(|n| AttemptRecord {
            attempt: n,
            success: n == attempts,
            duration: duration / u64::from(attempts),
            error: (n != attempts).then(timeout_classification),
        })
        .collect();
    ExecutionOutcome::success(ExecutionContext::for_source(source), records, duration)
}

async fn seeded_log(dir: &TempDir, entries: &[ExecutionOutcome]) -> OutcomeLog {
    let log = OutcomeLog::new(dir.path().join("outcomes.ndjson"));
    for entry in entries {
        log.append(entry).await.expect("append");
    }
    log
}

#[tokio::test]
async fn quarter_retry_rate_flags_high_severity_pattern() {
    // 100 executions for one source, 25 of them retried.
    let dir = tempfile::tempdir().expect("tempdir");
    let entries: Vec<ExecutionOutcome> = (0..100)
        .map(|n| success_entry("price-monitor", if n < 25 { 2 } else { 1 }, 200))
        .collect();
    let log = seeded_log(&dir, &entries).await;

    let analysis = LogAnalyzer::new(AnalyzerOptions::default())
        .analyze(&log)
        .await
        .expect("analyze");

    assert_eq!(analysis.stats.overall.total, 100);
    assert_eq!(analysis.stats.overall.retries, 25);
    assert!((analysis.stats.overall.retry_rate - 0.25).abs() < 1e-9);
    assert_eq!(analysis.summary.overall.retry_rate, "25.0%");

    let pattern = analysis
        .patterns
        .iter()
        .find(|p| p.pattern_type == PatternType::HighRetryRate)
        .expect("high retry rate flagged");
    assert_eq!(pattern.severity, Severity::High);
    assert_eq!(pattern.source_id.as_deref(), Some("price-monitor"));
}

#[tokio::test]
async fn analysis_is_deterministic_for_a_fixed_clock() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entries: Vec<ExecutionOutcome> = (0..20)
        .map(|n| success_entry("exchange-rate", 1 + (n % 2), 100 + n as u64 * 10))
        .collect();
    let log = seeded_log(&dir, &entries).await;

    let now = Utc::now() + ChronoDuration::minutes(1);
    let analyzer = LogAnalyzer::new(AnalyzerOptions::default());
    let first = analyzer.analyze_at(&log, now).await.expect("first run");
    let second = analyzer.analyze_at(&log, now).await.expect("second run");

    assert_eq!(first.stats, second.stats);
    assert_eq!(first.patterns, second.patterns);
    assert_eq!(first.trends, second.trends);
    assert_eq!(first.summary, second.summary);
    assert_ne!(first.metadata.analysis_id, second.metadata.analysis_id);
}

#[tokio::test]
async fn stale_entries_fall_outside_the_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut old = success_entry("price-monitor", 1, 100);
    old.timestamp = Utc::now() - ChronoDuration::days(30);
    let fresh = success_entry("price-monitor", 1, 100);
    let log = seeded_log(&dir, &[old, fresh]).await;

    let analysis = LogAnalyzer::new(AnalyzerOptions::default())
        .analyze(&log)
        .await
        .expect("analyze");

    assert_eq!(analysis.metadata.total_entries, 2);
    assert_eq!(analysis.metadata.analyzed_entries, 1);
    assert_eq!(analysis.stats.overall.total, 1);
}

#[tokio::test]
async fn empty_window_yields_calm_report() {
    // Entries exist but none fall inside the window.
    let dir = tempfile::tempdir().expect("tempdir");
    let mut old = success_entry("price-monitor", 2, 100);
    old.timestamp = Utc::now() - ChronoDuration::days(30);
    let log = seeded_log(&dir, &[old]).await;

    let analysis = LogAnalyzer::new(AnalyzerOptions::default())
        .analyze(&log)
        .await
        .expect("analyze");

    assert_eq!(analysis.stats.overall.total, 0);
    assert!(analysis.patterns.is_empty());
    assert!(analysis.trends.is_empty());
    assert_eq!(analysis.summary.overall.success_rate, "0.0%");
    assert_eq!(analysis.summary.overall.failure_rate, "0.0%");

    let report = crate::report::render_report(&analysis);
    assert!(report.contains("No patterns detected"));
    assert!(!report.contains("NaN"));
}

#[tokio::test]
async fn missing_log_file_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = OutcomeLog::new(dir.path().join("absent.ndjson"));

    let result = LogAnalyzer::new(AnalyzerOptions::default()).analyze(&log).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn multi_day_history_produces_trends() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap();
    let mut entries = Vec::new();
    for day in 0..4 {
        for _ in 0..5 {
            // Durations climb day over day.
            let mut entry = success_entry("price-monitor", 1, 100 + day * 200);
            entry.timestamp = base + ChronoDuration::days(day as i64);
            entries.push(entry);
        }
    }
    let log = seeded_log(&dir, &entries).await;

    let now = base + ChronoDuration::days(4);
    let analysis = LogAnalyzer::new(AnalyzerOptions::default())
        .analyze_at(&log, now)
        .await
        .expect("analyze");

    let trend = analysis
        .trends
        .get("price-monitor")
        .expect("trend for source");
    assert_eq!(trend.avg_duration.trend, TrendDirection::Increasing);
    assert!(trend.avg_duration.change > 0.0);
}
