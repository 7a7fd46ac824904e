// log-analyzer-rs/src/main.rs
// Outcome log analysis CLI.
//
// Usage: log-analyzer [LOG_PATH] [DAYS]
// Writes the full analysis JSON next to the log as log-analysis.json.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use log_analyzer::report::render_report;
use log_analyzer::{AnalyzerOptions, LogAnalyzer};
use outcome_log::OutcomeLog;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

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

    println!("Analyzing: {}", log_path.display());
    println!("Time Window: {days} days\n");

    let log = OutcomeLog::new(&log_path);
    let analyzer = LogAnalyzer::new(AnalyzerOptions::with_window_days(days));

    let analysis = match analyzer.analyze(&log).await {
        Ok(analysis) => analysis,
        Err(err) => {
            tracing::error!(error = %err, path = %log_path.display(), "analysis failed");
            eprintln!("Error analyzing logs: {err}");
            return ExitCode::FAILURE;
        }
    };

    print!("{}", render_report(&analysis));

    let output_path = log_path
        .parent()
        .map(|dir| dir.join("log-analysis.json"))
        .unwrap_or_else(|| PathBuf::from("log-analysis.json"));
    match serde_json::to_string_pretty(&analysis) {
        Ok(body) => {
            if let Err(err) = std::fs::write(&output_path, body) {
                eprintln!("Error writing {}: {err}", output_path.display());
                return ExitCode::FAILURE;
            }
            println!("Full analysis saved to: {}\n", output_path.display());
        }
        Err(err) => {
            eprintln!("Error serializing analysis: {err}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
