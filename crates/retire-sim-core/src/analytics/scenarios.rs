use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::parameters::Regime;
use crate::simulation::PathOutcome;
use crate::types::{Fraction, Money};

/// How often a regime occurred across all path-years and how portfolios
/// fared in those years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub occurrences: u64,
    /// occurrences / (paths x years per path)
    pub frequency: f64,
    /// Mean year-end total value in years under this regime.
    pub average_return: Money,
    /// Mean growth-only portfolio return in years under this regime.
    pub average_growth_return: Fraction,
}

#[derive(Default)]
struct Tally {
    occurrences: u64,
    value_sum: f64,
    return_sum: f64,
    return_count: u64,
}

/// Tally regimes over every simulated year. Regimes that never occurred
/// are absent from the map.
pub fn scenario_analysis(outcomes: &[PathOutcome]) -> BTreeMap<Regime, ScenarioSummary> {
    let mut tallies: BTreeMap<Regime, Tally> = BTreeMap::new();
    let mut path_years = 0u64;

    for snapshot in outcomes.iter().flat_map(|o| &o.yearly_results) {
        path_years += 1;
        let tally = tallies.entry(snapshot.outcome.economic_scenario).or_default();
        tally.occurrences += 1;
        tally.value_sum += snapshot.total_value;
        if let Some(r) = snapshot.portfolio_return {
            tally.return_sum += r;
            tally.return_count += 1;
        }
    }

    tallies
        .into_iter()
        .map(|(regime, t)| {
            let summary = ScenarioSummary {
                occurrences: t.occurrences,
                frequency: t.occurrences as f64 / path_years as f64,
                average_return: t.value_sum / t.occurrences as f64,
                average_growth_return: if t.return_count > 0 {
                    t.return_sum / t.return_count as f64
                } else {
                    0.0
                },
            };
            (regime, summary)
        })
        .collect()
}
