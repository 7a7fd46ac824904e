// auto-retry-rs/src/executor.rs
// The retry loop: run, classify, back off, record.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use outcome_log::{AttemptRecord, ExecutionContext, ExecutionOutcome, OutcomeLog};

use crate::backoff::BackoffStrategy;
use crate::classify::classify;
use crate::error::OperationError;
use crate::observer::RetryObserver;

/// Retry engine configuration. Injected explicitly so tests and callers
/// can tune thresholds without global state.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum attempts per `execute` call (the first attempt counts).
    pub max_retries: u32,
    pub backoff: BackoffStrategy,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: BackoffStrategy::Exponential,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Construct configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable. Never panics.
    ///
    /// - SELF_HEAL_MAX_RETRIES: attempt cap
    /// - SELF_HEAL_BACKOFF: "exponential" | "linear" | "fixed"
    /// - SELF_HEAL_BASE_DELAY_MS: base backoff delay
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_retries = std::env::var("SELF_HEAL_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_retries);

        let backoff = match std::env::var("SELF_HEAL_BACKOFF").as_deref() {
            Ok("linear") => BackoffStrategy::Linear,
            Ok("fixed") => BackoffStrategy::Fixed,
            Ok("exponential") => BackoffStrategy::Exponential,
            _ => defaults.backoff,
        };

        let base_delay = std::env::var("SELF_HEAL_BASE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_delay);

        Self {
            max_retries,
            backoff,
            base_delay,
        }
    }
}

/// Successful result of an `execute` call with attempt accounting.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub value: T,
    pub attempts: u32,
    pub total_duration: Duration,
}

/// Runs operations with bounded sequential retry.
pub struct RetryExecutor {
    config: RetryConfig,
    log: OutcomeLog,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig, log: OutcomeLog) -> Self {
        Self {
            config,
            log,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds or retries are exhausted.
    ///
    /// On success returns the operation's value plus attempt accounting.
    /// On exhaustion, or immediately on a non-retryable classification,
    /// returns the operation's own last error unchanged. Exactly one
    /// outcome is appended to the log either way.
    pub async fn execute<T, F, Fut>(
        &self,
        operation: F,
        context: ExecutionContext,
    ) -> Result<RetryOutcome<T>, OperationError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, OperationError>>,
    {
        let max_retries = self.config.max_retries.max(1);
        let started = Instant::now();
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for attempt in 1..=max_retries {
            let attempt_start = Instant::now();
            metrics::increment_counter!("self_heal_retry_attempts_total");

            match operation().await {
                Ok(value) => {
                    let duration = attempt_start.elapsed();
                    let total_duration = started.elapsed();

                    attempts.push(AttemptRecord {
                        attempt,
                        success: true,
                        duration: duration.as_millis() as u64,
                        error: None,
                    });

                    self.record(ExecutionOutcome::success(
                        context.clone(),
                        attempts.clone(),
                        total_duration.as_millis() as u64,
                    ))
                    .await;

                    metrics::increment_counter!("self_heal_retry_success_total");
                    if attempt > 1 {
                        tracing::info!(
                            attempt,
                            total_duration_ms = total_duration.as_millis() as u64,
                            "operation succeeded after retries"
                        );
                    }

                    if let Some(observer) = &self.observer {
                        observer.on_success(attempt, total_duration).await;
                    }

                    return Ok(RetryOutcome {
                        value,
                        attempts: attempt,
                        total_duration,
                    });
                }
                Err(error) => {
                    let duration = attempt_start.elapsed();
                    let classification = classify(&error);

                    attempts.push(AttemptRecord {
                        attempt,
                        success: false,
                        duration: duration.as_millis() as u64,
                        error: Some(classification.clone()),
                    });

                    if attempt == max_retries {
                        self.record(ExecutionOutcome::failure(
                            context.clone(),
                            attempts.clone(),
                            started.elapsed().as_millis() as u64,
                            classification.clone(),
                            None,
                        ))
                        .await;

                        metrics::increment_counter!("self_heal_retry_failure_total");
                        tracing::warn!(
                            attempts = attempt,
                            error = %error,
                            category = %classification.category,
                            "operation failed after exhausting retries"
                        );

                        if let Some(observer) = &self.observer {
                            observer.on_final_failure(&attempts, &classification).await;
                        }

                        return Err(error);
                    }

                    if !classification.retryable {
                        self.record(ExecutionOutcome::failure(
                            context.clone(),
                            attempts.clone(),
                            started.elapsed().as_millis() as u64,
                            classification.clone(),
                            Some("non-retryable error".to_string()),
                        ))
                        .await;

                        metrics::increment_counter!("self_heal_retry_failure_total");
                        tracing::warn!(
                            attempt,
                            error = %error,
                            error_type = %classification.error_type,
                            "non-retryable error; not retrying"
                        );

                        return Err(error);
                    }

                    let delay = self.config.backoff.delay(self.config.base_delay, attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        category = %classification.category,
                        "retryable failure; backing off"
                    );

                    if let Some(observer) = &self.observer {
                        observer.on_retry(attempt, &classification, delay).await;
                    }

                    sleep(delay).await;
                }
            }
        }

        unreachable!("retry loop returns on the final attempt")
    }

    /// Append an outcome, reporting any log failure through tracing. The
    /// operation's result must never be masked by log I/O problems.
    async fn record(&self, outcome: ExecutionOutcome) {
        if let Err(err) = self.log.append(&outcome).await {
            metrics::increment_counter!("self_heal_log_write_failures_total");
            tracing::warn!(
                error = %err,
                path = %self.log.path().display(),
                "failed to append execution outcome; operation result unaffected"
            );
        }
    }
}
