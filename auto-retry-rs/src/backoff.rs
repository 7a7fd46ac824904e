// auto-retry-rs/src/backoff.rs
// Backoff delay calculation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// base, 2*base, 4*base, ...
    #[default]
    Exponential,
    /// base, 2*base, 3*base, ...
    Linear,
    /// base every time.
    Fixed,
}

impl BackoffStrategy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay(&self, base: Duration, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Exponential => {
                base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            }
            BackoffStrategy::Linear => base.saturating_mul(attempt.max(1)),
            BackoffStrategy::Fixed => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: Duration = Duration::from_millis(1000);

    #[test]
    fn exponential_doubles_per_attempt() {
        let strategy = BackoffStrategy::Exponential;
        assert_eq!(strategy.delay(BASE, 1), Duration::from_millis(1000));
        assert_eq!(strategy.delay(BASE, 2), Duration::from_millis(2000));
        assert_eq!(strategy.delay(BASE, 3), Duration::from_millis(4000));
        assert_eq!(strategy.delay(BASE, 5), Duration::from_millis(16000));
    }

    #[test]
    fn linear_grows_by_base() {
        let strategy = BackoffStrategy::Linear;
        assert_eq!(strategy.delay(BASE, 1), Duration::from_millis(1000));
        assert_eq!(strategy.delay(BASE, 3), Duration::from_millis(3000));
    }

    #[test]
    fn fixed_is_constant() {
        let strategy = BackoffStrategy::Fixed;
        assert_eq!(strategy.delay(BASE, 1), BASE);
        assert_eq!(strategy.delay(BASE, 4), BASE);
    }

    #[test]
    fn strategy_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BackoffStrategy::Exponential).unwrap(),
            "\"exponential\""
        );
    }
}
