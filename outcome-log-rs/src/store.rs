// outcome-log-rs/src/store.rs
// Append-only NDJSON persistence for execution outcomes.
//
// Implementation notes:
// - One serialized ExecutionOutcome per line, UTF-8, append-only.
// - Reads stream line by line; blank lines are skipped and lines that fail
//   to parse are logged and skipped rather than failing the whole read.
// - Writers are expected to be short-lived sequential processes; there is
//   no cross-process locking.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::record::ExecutionOutcome;

/// Store error type.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Append-only, newline-delimited outcome log.
pub struct OutcomeLog {
    path: PathBuf,
}

impl OutcomeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Conventional log location, overridable via SELF_HEAL_LOG_PATH.
    pub fn default_path() -> PathBuf {
        std::env::var("SELF_HEAL_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/self-heal/retry-outcomes.ndjson"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent_dir(&self) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Append one outcome as a single line. The line (record + newline) is
    /// written with one write call per part and flushed before returning.
    pub async fn append(&self, outcome: &ExecutionOutcome) -> Result<(), LogError> {
        self.ensure_parent_dir().await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut line = serde_json::to_string(outcome)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    /// Read every parseable outcome in file order.
    ///
    /// A missing file is an error here: the analyzer treats total input
    /// unavailability as fatal while tolerating individual bad lines.
    pub async fn read_all(&self) -> Result<Vec<ExecutionOutcome>, LogError> {
        let file = fs::File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();

        let mut out = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ExecutionOutcome>(&line) {
                Ok(outcome) => out.push(outcome),
                Err(err) => {
                    let preview: String = line.chars().take(50).collect();
                    tracing::warn!(error = %err, line = %preview, "skipping unparseable outcome line");
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AttemptRecord, ExecutionContext};

    fn outcome(source: &str, duration: u64) -> ExecutionOutcome {
        ExecutionOutcome::success(
            ExecutionContext::for_source(source),
            vec![AttemptRecord {
                attempt: 1,
                success: true,
                duration,
                error: None,
            }],
            duration,
        )
    }

    #[tokio::test]
    async fn append_then_read_recovers_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = OutcomeLog::new(dir.path().join("outcomes.ndjson"));

        log.append(&outcome("a", 10)).await.expect("append");
        log.append(&outcome("b", 20)).await.expect("append");

        let entries = log.read_all().await.expect("read");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source_id(), Some("a"));
        assert_eq!(entries[1].total_duration, 20);
    }

    #[tokio::test]
    async fn append_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = OutcomeLog::new(dir.path().join("nested/deep/outcomes.ndjson"));

        log.append(&outcome("a", 5)).await.expect("append");
        assert!(log.path().exists());
    }

    #[tokio::test]
    async fn read_skips_blank_and_malformed_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("outcomes.ndjson");
        let log = OutcomeLog::new(&path);

        log.append(&outcome("a", 10)).await.expect("append");
        tokio::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .await
            .expect("open")
            .write_all(b"\n{not json}\n")
            .await
            .expect("write garbage");
        log.append(&outcome("b", 20)).await.expect("append");

        let entries = log.read_all().await.expect("read");
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = OutcomeLog::new(dir.path().join("absent.ndjson"));
        assert!(log.read_all().await.is_err());
    }
}
