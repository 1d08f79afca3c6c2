use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::RetireSimError;
use crate::simulation::PathOutcome;
use crate::types::{Fraction, Money};
use crate::RetireSimResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Distribution summary of a currency-valued outcome across the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDistribution {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Distribution summary of per-path maximum drawdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownDistribution {
    pub mean: Fraction,
    pub median: Fraction,
    pub std_dev: Fraction,
    pub max: Fraction,
    pub p75: Fraction,
    pub p90: Fraction,
    pub p95: Fraction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleStatistics {
    /// Final nominal portfolio value.
    pub portfolio: ValueDistribution,
    /// Final nominal monthly income under the 4% rule.
    pub income: ValueDistribution,
    /// Final monthly income in today's money.
    pub real_income: ValueDistribution,
    pub drawdown: DrawdownDistribution,
}

/// Cross-path percentiles of one projection year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearBand {
    pub year: u32,
    pub p10: Money,
    pub p50: Money,
    pub p90: Money,
    pub real_p10: Money,
    pub real_p50: Money,
    pub real_p90: Money,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Percentile of a **sorted** slice using linear interpolation between
/// adjacent order statistics. `p` is in percent. Empty input gives NaN.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            if lower == upper {
                sorted[lower]
            } else {
                let (lo, hi) = (sorted[lower], sorted[upper]);
                let frac = rank - lower as f64;
                (lo + (hi - lo) * frac).max(lo).min(hi)
            }
        }
    }
}

pub(crate) fn sorted_copy(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn require_non_empty(values: &[f64], what: &str) -> RetireSimResult<()> {
    if values.is_empty() {
        return Err(RetireSimError::InsufficientData(format!(
            "cannot summarise {what} of an empty ensemble"
        )));
    }
    Ok(())
}

impl ValueDistribution {
    /// Summarise `values` (any order).
    pub fn from_values(values: &[f64]) -> RetireSimResult<Self> {
        require_non_empty(values, "values")?;
        let sorted = sorted_copy(values.iter().copied());

        Ok(Self {
            mean: sorted.iter().mean(),
            median: percentile_sorted(&sorted, 50.0),
            std_dev: sorted.iter().population_std_dev(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p10: percentile_sorted(&sorted, 10.0),
            p25: percentile_sorted(&sorted, 25.0),
            p75: percentile_sorted(&sorted, 75.0),
            p90: percentile_sorted(&sorted, 90.0),
        })
    }
}

impl DrawdownDistribution {
    pub fn from_values(values: &[f64]) -> RetireSimResult<Self> {
        require_non_empty(values, "drawdowns")?;
        let sorted = sorted_copy(values.iter().copied());

        Ok(Self {
            mean: sorted.iter().mean(),
            median: percentile_sorted(&sorted, 50.0),
            std_dev: sorted.iter().population_std_dev(),
            max: sorted[sorted.len() - 1],
            p75: percentile_sorted(&sorted, 75.0),
            p90: percentile_sorted(&sorted, 90.0),
            p95: percentile_sorted(&sorted, 95.0),
        })
    }
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

/// Distribution summaries of final value, income and drawdown.
pub fn summarize(outcomes: &[PathOutcome]) -> RetireSimResult<EnsembleStatistics> {
    if outcomes.is_empty() {
        return Err(RetireSimError::InsufficientData(
            "no simulated paths to summarise".into(),
        ));
    }

    let collect = |f: fn(&PathOutcome) -> f64| outcomes.iter().map(f).collect::<Vec<_>>();

    Ok(EnsembleStatistics {
        portfolio: ValueDistribution::from_values(&collect(|o| o.final_portfolio_value))?,
        income: ValueDistribution::from_values(&collect(|o| o.final_monthly_income))?,
        real_income: ValueDistribution::from_values(&collect(|o| o.inflation_adjusted_income))?,
        drawdown: DrawdownDistribution::from_values(&collect(|o| o.max_drawdown))?,
    })
}

/// p10/p50/p90 of nominal and real value for every projection year.
///
/// Years are aligned by index; a path shorter than the longest one simply
/// stops contributing.
pub fn yearly_bands(outcomes: &[PathOutcome]) -> Vec<YearBand> {
    let years = outcomes
        .iter()
        .map(|o| o.yearly_results.len())
        .max()
        .unwrap_or(0);

    (0..years)
        .map(|idx| {
            let snapshots = || outcomes.iter().filter_map(|o| o.yearly_results.get(idx));
            let nominal = sorted_copy(snapshots().map(|s| s.total_value));
            let real = sorted_copy(snapshots().map(|s| s.real_value));
            YearBand {
                year: idx as u32 + 1,
                p10: percentile_sorted(&nominal, 10.0),
                p50: percentile_sorted(&nominal, 50.0),
                p90: percentile_sorted(&nominal, 90.0),
                real_p10: percentile_sorted(&real, 10.0),
                real_p50: percentile_sorted(&real, 50.0),
                real_p90: percentile_sorted(&real, 90.0),
            }
        })
        .collect()
}
