//! Pure reductions over a finished ensemble: distribution summaries, risk
//! metrics, regime analysis and recommendations.

pub mod recommendations;
pub mod risk;
pub mod scenarios;
pub mod statistics;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use recommendations::{recommendations, Priority, Recommendation, RecommendationKind};
pub use risk::{risk_metrics, RiskMetrics};
pub use scenarios::{scenario_analysis, ScenarioSummary};
pub use statistics::{
    percentile_sorted, summarize, yearly_bands, DrawdownDistribution, EnsembleStatistics,
    ValueDistribution, YearBand,
};

use crate::parameters::Regime;
use crate::simulation::PathOutcome;
use crate::types::Language;
use crate::RetireSimResult;

/// Everything derived from an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleReport {
    pub statistics: EnsembleStatistics,
    pub risk_metrics: RiskMetrics,
    pub scenarios: BTreeMap<Regime, ScenarioSummary>,
    pub yearly_bands: Vec<YearBand>,
    pub recommendations: Vec<Recommendation>,
}

/// Run every reduction over `outcomes`. Fails only on an empty ensemble.
pub fn aggregate(outcomes: &[PathOutcome], language: Language) -> RetireSimResult<EnsembleReport> {
    let statistics = summarize(outcomes)?;
    let risk_metrics = risk_metrics(outcomes)?;
    let recommendations = recommendations(&statistics, &risk_metrics, language);

    Ok(EnsembleReport {
        scenarios: scenario_analysis(outcomes),
        yearly_bands: yearly_bands(outcomes),
        statistics,
        risk_metrics,
        recommendations,
    })
}
