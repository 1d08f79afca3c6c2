use serde::{Deserialize, Serialize};

use super::statistics::{percentile_sorted, sorted_copy};
use crate::error::RetireSimError;
use crate::simulation::PathOutcome;
use crate::types::{Fraction, Money};
use crate::RetireSimResult;

/// Share of the ensemble that forms the Expected Shortfall tail.
pub const TAIL_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub success_probability: f64,
    pub shortfall_probability: f64,
    /// Mean shortfall ratio over the paths that fell short; 0 when none did.
    pub average_shortfall: Fraction,
    pub worst_case_shortfall: Fraction,
    /// 5th percentile of final portfolio value.
    pub value_at_risk_95: Money,
    /// 1st percentile of final portfolio value.
    pub value_at_risk_99: Money,
    /// Mean inflation-adjusted monthly income of the worst 5% of paths.
    pub expected_shortfall: Money,
}

/// Number of outcomes in the tail of an ensemble of `n`. Never zero for a
/// non-empty ensemble.
pub fn tail_count(n: usize) -> usize {
    ((n as f64 * TAIL_FRACTION).floor() as usize).clamp(1, n.max(1))
}

pub fn risk_metrics(outcomes: &[PathOutcome]) -> RetireSimResult<RiskMetrics> {
    if outcomes.is_empty() {
        return Err(RetireSimError::InsufficientData(
            "no simulated paths for risk metrics".into(),
        ));
    }
    let n = outcomes.len() as f64;

    let successes = outcomes.iter().filter(|o| o.is_success()).count();
    let success_probability = successes as f64 / n;

    let shortfalls: Vec<f64> = outcomes
        .iter()
        .map(|o| o.shortfall_risk)
        .filter(|s| *s > 0.0)
        .collect();
    let (average_shortfall, worst_case_shortfall) = if shortfalls.is_empty() {
        (0.0, 0.0)
    } else {
        (
            shortfalls.iter().sum::<f64>() / shortfalls.len() as f64,
            shortfalls.iter().copied().fold(0.0, f64::max),
        )
    };

    let finals = sorted_copy(outcomes.iter().map(|o| o.final_portfolio_value));
    let incomes = sorted_copy(outcomes.iter().map(|o| o.inflation_adjusted_income));
    let tail = &incomes[..tail_count(incomes.len())];

    Ok(RiskMetrics {
        success_probability,
        shortfall_probability: 1.0 - success_probability,
        average_shortfall,
        worst_case_shortfall,
        value_at_risk_95: percentile_sorted(&finals, 5.0),
        value_at_risk_99: percentile_sorted(&finals, 1.0),
        expected_shortfall: tail.iter().sum::<f64>() / tail.len() as f64,
    })
}
