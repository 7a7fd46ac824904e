// parameter-optimizer-rs/src/safety.rs
// Tunable parameters and their hard safety envelopes.

use serde::{Deserialize, Serialize};

/// The three tunable retry-engine parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    #[serde(rename = "maxRetries")]
    MaxRetries,
    #[serde(rename = "timeout")]
    Timeout,
    #[serde(rename = "backoffBase")]
    BackoffBase,
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::MaxRetries => write!(f, "maxRetries"),
            Param::Timeout => write!(f, "timeout"),
            Param::BackoffBase => write!(f, "backoffBase"),
        }
    }
}

/// Inclusive bounds for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRange {
    pub min: u64,
    pub max: u64,
}

impl ParamRange {
    pub fn contains(&self, value: u64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: u64) -> u64 {
        value.clamp(self.min, self.max)
    }
}

/// Per-parameter safety envelopes. Proposals outside these bounds are
/// never emitted; proposals are clamped into them first.
///
/// maxRetries: too few means a high final failure rate, too many means
/// slow exhaustion. timeout: must stay within the scheduling interval.
/// backoffBase: base delay for exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct SafetyRules {
    pub max_retries: ParamRange,
    pub timeout: ParamRange,
    pub backoff_base: ParamRange,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            max_retries: ParamRange { min: 2, max: 5 },
            timeout: ParamRange {
                min: 10000,
                max: 30000,
            },
            backoff_base: ParamRange {
                min: 1000,
                max: 5000,
            },
        }
    }
}

impl SafetyRules {
    pub fn range(&self, param: Param) -> ParamRange {
        match param {
            Param::MaxRetries => self.max_retries,
            Param::Timeout => self.timeout,
            Param::BackoffBase => self.backoff_base,
        }
    }

    pub fn is_safe(&self, param: Param, value: u64) -> bool {
        self.range(param).contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_envelopes() {
        let rules = SafetyRules::default();
        assert!(rules.is_safe(Param::MaxRetries, 2));
        assert!(rules.is_safe(Param::MaxRetries, 5));
        assert!(!rules.is_safe(Param::MaxRetries, 6));
        assert!(!rules.is_safe(Param::Timeout, 9999));
        assert!(rules.is_safe(Param::Timeout, 30000));
        assert!(!rules.is_safe(Param::BackoffBase, 5001));
    }

    #[test]
    fn param_serializes_with_wire_names() {
        assert_eq!(
            serde_json::to_string(&Param::MaxRetries).unwrap(),
            "\"maxRetries\""
        );
        assert_eq!(
            serde_json::to_string(&Param::BackoffBase).unwrap(),
            "\"backoffBase\""
        );
    }
}
