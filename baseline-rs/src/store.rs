// baseline-rs/src/store.rs
// Key-value baseline store with a file-backed implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::validate::ExecutionMetrics;

/// Rolling window size per source.
pub const MAX_SAMPLES: usize = 30;

#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSample {
    pub timestamp: DateTime<Utc>,
    pub completion_time: u64,
    pub token_usage: u64,
    pub tool_errors: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineAverages {
    pub completion_time: f64,
    pub token_usage: f64,
    pub tool_errors: f64,
}

/// One source's rolling sample window and its averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineEntry {
    pub samples: Vec<BaselineSample>,
    pub avg: BaselineAverages,
}

impl BaselineEntry {
    /// Append a sample, dropping the oldest beyond the window, and
    /// recompute the averages.
    pub fn push_sample(&mut self, metrics: &ExecutionMetrics, at: DateTime<Utc>) {
        self.samples.push(BaselineSample {
            timestamp: at,
            completion_time: metrics.completion_time,
            token_usage: metrics.token_usage,
            tool_errors: metrics.tool_errors,
        });
        if self.samples.len() > MAX_SAMPLES {
            let excess = self.samples.len() - MAX_SAMPLES;
            self.samples.drain(..excess);
        }

        let n = self.samples.len() as f64;
        self.avg = BaselineAverages {
            completion_time: self.samples.iter().map(|s| s.completion_time).sum::<u64>() as f64 / n,
            token_usage: self.samples.iter().map(|s| s.token_usage).sum::<u64>() as f64 / n,
            tool_errors: self.samples.iter().map(|s| s.tool_errors).sum::<u64>() as f64 / n,
        };
    }
}

/// Explicit get/put seam over the baseline storage, so the read-modify-
/// write cycle stays behind one interface regardless of backend.
#[async_trait]
pub trait BaselineStore: Send + Sync {
    async fn get(&self, source_id: &str) -> Result<Option<BaselineEntry>, BaselineError>;

    async fn put(&self, source_id: &str, entry: BaselineEntry) -> Result<(), BaselineError>;

    /// Record one execution's metrics and return the updated entry.
    async fn record_sample(
        &self,
        source_id: &str,
        metrics: &ExecutionMetrics,
    ) -> Result<BaselineEntry, BaselineError> {
        let mut entry = self.get(source_id).await?.unwrap_or_default();
        entry.push_sample(metrics, Utc::now());
        self.put(source_id, entry.clone()).await?;
        Ok(entry)
    }
}

/// Single JSON document keyed by source id, read and rewritten whole.
pub struct FileBaselineStore {
    path: PathBuf,
}

impl FileBaselineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> Result<BTreeMap<String, BaselineEntry>, BaselineError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_document(
        &self,
        document: &BTreeMap<String, BaselineEntry>,
    ) -> Result<(), BaselineError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(document)?;
        fs::write(&self.path, body).await?;
        Ok(())
    }
}

#[async_trait]
impl BaselineStore for FileBaselineStore {
    async fn get(&self, source_id: &str) -> Result<Option<BaselineEntry>, BaselineError> {
        Ok(self.read_document().await?.remove(source_id))
    }

    async fn put(&self, source_id: &str, entry: BaselineEntry) -> Result<(), BaselineError> {
        let mut document = self.read_document().await?;
        tracing::debug!(source_id = %source_id, samples = entry.samples.len(), "updating baseline");
        document.insert(source_id.to_string(), entry);
        self.write_document(&document).await
    }
}
