// parameter-optimizer-rs/src/combine.rs
// Combined-effect validation for multi-parameter proposals.

use std::collections::BTreeMap;

use crate::safety::Param;
use crate::{CurrentParams, OptimizerConfig, Recommendation};

/// Worst-case wall-clock time for one execution under the given
/// parameters: every attempt times out, every backoff is waited in full.
/// Exponential backoff sums to base * (2^n - 1).
pub fn worst_case_total_ms(params: &CurrentParams) -> u64 {
    let backoff_total = params
        .backoff_base_ms
        .saturating_mul(2u64.saturating_pow(params.max_retries as u32).saturating_sub(1));
    params
        .timeout_ms
        .saturating_mul(params.max_retries)
        .saturating_add(backoff_total)
}

/// For each source with more than one proposed change, merge the proposals
/// over the current parameters and check that the worst case stays within
/// the interval budget. A recurring job's total retry time must not exceed
/// its own re-trigger interval or executions start overlapping; when it
/// would, every recommendation for that source is downgraded to unsafe
/// with an apply-one-at-a-time instruction.
pub fn validate_combinations(recommendations: &mut [Recommendation], config: &OptimizerConfig) {
    let mut by_source: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, rec) in recommendations.iter().enumerate() {
        by_source.entry(rec.source_id.clone()).or_default().push(index);
    }

    let budget_ms = (config.reference_interval_ms as f64 * config.interval_budget) as u64;

    for indexes in by_source.values() {
        if indexes.len() < 2 {
            continue;
        }

        let mut merged = config.current;
        for &index in indexes {
            let rec = &recommendations[index];
            match rec.param {
                Param::MaxRetries => merged.max_retries = rec.proposed,
                Param::Timeout => merged.timeout_ms = rec.proposed,
                Param::BackoffBase => merged.backoff_base_ms = rec.proposed,
            }
        }

        let worst_case = worst_case_total_ms(&merged);
        if worst_case > budget_ms {
            let warning = format!(
                "Combined params may exceed scheduling interval: {}s > {}s",
                worst_case / 1000,
                budget_ms / 1000
            );
            for &index in indexes {
                let rec = &mut recommendations[index];
                rec.safe = false;
                rec.warning = Some(warning.clone());
                rec.recommendation =
                    Some("Apply one at a time, verify each before next".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_case_formula() {
        // timeout 20000 x 4 retries + 1000 x (2^4 - 1) = 95000.
        let params = CurrentParams {
            max_retries: 4,
            timeout_ms: 20000,
            backoff_base_ms: 1000,
        };
        assert_eq!(worst_case_total_ms(&params), 95000);
    }

    #[test]
    fn defaults_fit_the_interval_budget() {
        let config = OptimizerConfig::default();
        let worst_case = worst_case_total_ms(&config.current);
        let budget = (config.reference_interval_ms as f64 * config.interval_budget) as u64;
        assert!(worst_case < budget);
    }
}
