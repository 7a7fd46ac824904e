// auto-tune-rs/src/main.rs
// Scheduled tuning pipeline: analyze the outcome log, generate parameter
// recommendations, persist snapshots, and stage a notification payload.
// Recommendations are never applied automatically.
//
// Usage: auto-tune [LOG_PATH] [DAYS]
// Output directory: SELF_HEAL_OUTPUT_DIR, default data/self-heal/tuning

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use chrono::Utc;
use tracing_subscriber::EnvFilter;

use log_analyzer::{AnalyzerOptions, LogAnalyzer, Severity};
use outcome_log::OutcomeLog;
use parameter_optimizer::{
    NotificationPayload, OptimizerConfig, ParameterOptimizer, RecommendationSnapshot,
};

fn output_dir() -> PathBuf {
    std::env::var("SELF_HEAL_OUTPUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/self-heal/tuning"))
}

fn write_json(path: &PathBuf, value: &impl serde::Serialize) -> Result<(), String> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|err| format!("serializing {}: {err}", path.display()))?;
    std::fs::write(path, body).map_err(|err| format!("writing {}: {err}", path.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let started = Instant::now();
    let mut args = std::env::args().skip(1);
    let log_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(OutcomeLog::default_path);
    let days: u64 = match args.next() {
        Some(raw) => match raw.parse() {
            Ok(days) => days,
            Err(_) => {
                eprintln!("invalid day count: {raw}");
                return ExitCode::FAILURE;
            }
        },
        None => 7,
    };

    let out_dir = output_dir();
    if let Err(err) = std::fs::create_dir_all(&out_dir) {
        eprintln!("Error creating {}: {err}", out_dir.display());
        return ExitCode::FAILURE;
    }

    println!("[{}] Auto-tune starting", Utc::now().to_rfc3339());
    println!("Log: {}", log_path.display());
    println!("Time Window: {days} days\n");

    // Step 1: analyze.
    println!("Step 1: analyzing outcome log...");
    let log = OutcomeLog::new(&log_path);
    let analyzer = LogAnalyzer::new(AnalyzerOptions::with_window_days(days));
    let analysis = match analyzer.analyze(&log).await {
        Ok(analysis) => analysis,
        Err(err) => {
            tracing::error!(error = %err, path = %log_path.display(), "analysis failed");
            eprintln!("  analysis failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("  {} entries analyzed", analysis.metadata.analyzed_entries);

    if let Err(err) = write_json(&out_dir.join("analysis-latest.json"), &analysis) {
        eprintln!("Error {err}");
        return ExitCode::FAILURE;
    }

    // Step 2: recommend.
    println!("\nStep 2: generating recommendations...");
    let optimizer = ParameterOptimizer::new(OptimizerConfig::default());
    let recommendations =
        optimizer.generate_recommendations(&analysis.patterns, &analysis.stats, &analysis.trends);
    println!("  {} recommendation(s)", recommendations.len());

    let snapshot = RecommendationSnapshot::new(&analysis, recommendations);

    if let Err(err) = write_json(&out_dir.join("recommendations-latest.json"), &snapshot) {
        eprintln!("Error {err}");
        return ExitCode::FAILURE;
    }
    let dated = out_dir.join(format!(
        "recommendations-{}.json",
        snapshot.timestamp.format("%Y-%m-%d")
    ));
    if let Err(err) = write_json(&dated, &snapshot) {
        eprintln!("Error {err}");
        return ExitCode::FAILURE;
    }

    // Step 3: report.
    let elapsed = started.elapsed();
    println!("\n==================================================");
    println!("Auto-Tune Result");
    println!("==================================================");
    println!("Run Time: {}ms", elapsed.as_millis());
    println!("Window: {days} days");
    println!("Executions: {}", snapshot.stats.total_executions);
    println!("Success Rate: {}", snapshot.stats.success_rate);
    println!("Retry Rate: {}", snapshot.stats.retry_rate);
    println!("Avg Duration: {}", snapshot.stats.avg_duration);
    println!("Patterns: {}", analysis.patterns.len());
    println!(
        "Recommendations: {} ({} safe)",
        snapshot.summary.total, snapshot.summary.safe
    );
    println!("==================================================");

    if snapshot.recommendations.is_empty() {
        println!("\nAll parameters within normal range, no changes suggested");
    } else {
        println!("\nRecommendations:");
        for (i, rec) in snapshot.recommendations.iter().enumerate() {
            let severity = match rec.severity {
                Severity::High => "[HIGH]",
                Severity::Medium => "[MED]",
                Severity::Low => "[LOW]",
            };
            let safety = if rec.safe { "[SAFE]" } else { "[REVIEW]" };
            println!(
                "  {i}. {severity} {safety} {}: {} {} -> {}",
                rec.source_id, rec.param, rec.current, rec.proposed
            );
        }

        // Step 4: stage the notification payload for the delivery side.
        let payload = NotificationPayload::tuning_report(&snapshot);
        if let Err(err) = write_json(&out_dir.join("notification-latest.json"), &payload) {
            eprintln!("Error {err}");
            return ExitCode::FAILURE;
        }
        println!("\nNotification payload staged");
    }

    println!(
        "\n[{}] Done ({}ms)",
        Utc::now().to_rfc3339(),
        elapsed.as_millis()
    );
    ExitCode::SUCCESS
}
