use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use super::inputs::{PlanConfig, SimulationInput};
use super::path::{PathOutcome, PathSimulator, PENSION_CONTRIBUTION_SHARE, WITHDRAWAL_RATE};
use crate::analytics::{self, EnsembleStatistics, Recommendation, RiskMetrics, ScenarioSummary, YearBand};
use crate::error::RetireSimError;
use crate::parameters::{ParameterModel, Regime};
use crate::types::{with_metadata, ComputationOutput, Language};
use crate::RetireSimResult;

pub const DEFAULT_PROJECTION_YEARS: u32 = 30;
pub const DEFAULT_SIMULATION_COUNT: u32 = 10_000;

const PROGRESS_INTERVAL: u32 = 1_000;
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Cooperative cancellation flag shared between the caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub projection_years: u32,
    pub simulation_count: u32,
    pub language: Language,
    /// Base seed. `None` draws a fresh one per run.
    pub seed: Option<u64>,
    /// Run paths on the rayon pool when the `parallel` feature is enabled.
    pub parallel: bool,
    pub cancellation: Option<CancellationToken>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            projection_years: DEFAULT_PROJECTION_YEARS,
            simulation_count: DEFAULT_SIMULATION_COUNT,
            language: Language::En,
            seed: None,
            parallel: true,
            cancellation: None,
        }
    }
}

impl RunOptions {
    pub fn new(projection_years: u32, simulation_count: u32) -> Self {
        Self {
            projection_years,
            simulation_count,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn validate(&self) -> RetireSimResult<()> {
        if self.projection_years == 0 {
            return Err(RetireSimError::invalid_input(
                "projectionYears",
                "must be at least 1",
            ));
        }
        if self.simulation_count == 0 {
            return Err(RetireSimError::invalid_input(
                "simulationCount",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub simulations: u32,
    pub projection_years: u32,
    /// Base seed actually used; replaying it reproduces the run.
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outcomes: Vec<PathOutcome>,
    pub statistics: EnsembleStatistics,
    pub risk_metrics: RiskMetrics,
    pub scenarios: BTreeMap<Regime, ScenarioSummary>,
    pub yearly_bands: Vec<YearBand>,
    pub recommendations: Vec<Recommendation>,
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(GOLDEN_GAMMA);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of path `index` within a run seeded with `base`. Depends only on
/// the pair, so paths may run in any order on any thread.
pub fn path_seed(base: u64, index: u32) -> u64 {
    splitmix64(base ^ u64::from(index).wrapping_mul(GOLDEN_GAMMA))
}

fn run_path(simulator: &PathSimulator<'_>, base_seed: u64, index: u32) -> PathOutcome {
    let mut rng = StdRng::seed_from_u64(path_seed(base_seed, index));
    simulator.run(&mut rng)
}

// ---------------------------------------------------------------------------
// Path execution
// ---------------------------------------------------------------------------

fn execute_sequential(
    simulator: &PathSimulator<'_>,
    options: &RunOptions,
    seed: u64,
) -> RetireSimResult<Vec<PathOutcome>> {
    let requested = options.simulation_count;
    let mut outcomes = Vec::with_capacity(requested as usize);

    for index in 0..requested {
        if options.is_cancelled() {
            return Err(RetireSimError::Cancelled {
                completed: index,
                requested,
            });
        }
        outcomes.push(run_path(simulator, seed, index));

        let done = index + 1;
        if done % PROGRESS_INTERVAL == 0 {
            debug!(completed = done, requested, "simulation progress");
        }
    }
    Ok(outcomes)
}

#[cfg(feature = "parallel")]
fn execute_parallel(
    simulator: &PathSimulator<'_>,
    options: &RunOptions,
    seed: u64,
) -> RetireSimResult<Vec<PathOutcome>> {
    use rayon::prelude::*;
    use std::sync::atomic::AtomicU32;

    let requested = options.simulation_count;
    let completed = AtomicU32::new(0);

    (0..requested)
        .into_par_iter()
        .map(|index| {
            if options.is_cancelled() {
                return Err(RetireSimError::Cancelled {
                    completed: completed.load(Ordering::Relaxed),
                    requested,
                });
            }
            let outcome = run_path(simulator, seed, index);
            completed.fetch_add(1, Ordering::Relaxed);
            Ok(outcome)
        })
        .collect()
}

fn execute(
    simulator: &PathSimulator<'_>,
    options: &RunOptions,
    seed: u64,
) -> RetireSimResult<Vec<PathOutcome>> {
    #[cfg(feature = "parallel")]
    if options.parallel {
        return execute_parallel(simulator, options, seed);
    }
    execute_sequential(simulator, options, seed)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless Monte Carlo driver over an immutable [`ParameterModel`].
///
/// Cheap to share: every run builds its own path states and RNGs.
#[derive(Debug, Clone, Default)]
pub struct SimulationEngine {
    model: ParameterModel,
}

impl SimulationEngine {
    pub fn new(model: ParameterModel) -> RetireSimResult<Self> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &ParameterModel {
        &self.model
    }

    /// Normalize `input` and run it.
    pub fn run(&self, input: &SimulationInput, options: &RunOptions) -> RetireSimResult<SimulationResult> {
        let normalized = input.normalize()?;
        self.run_plan(&normalized.config, options)
    }

    /// Simulate every path of an already normalized plan and reduce the
    /// ensemble.
    pub fn run_plan(&self, plan: &PlanConfig, options: &RunOptions) -> RetireSimResult<SimulationResult> {
        let start = Instant::now();
        let seed = options.seed.unwrap_or_else(rand::random);

        info!(
            simulations = options.simulation_count,
            projection_years = options.projection_years,
            seed,
            parallel = options.parallel && cfg!(feature = "parallel"),
            "starting retirement simulation"
        );

        let outcomes = self.simulate_paths(plan, options, seed)?;
        let report = analytics::aggregate(&outcomes, options.language)?;

        info!(
            success_probability = report.risk_metrics.success_probability,
            elapsed_us = start.elapsed().as_micros() as u64,
            "retirement simulation finished"
        );

        Ok(SimulationResult {
            simulations: options.simulation_count,
            projection_years: options.projection_years,
            seed,
            outcomes,
            statistics: report.statistics,
            risk_metrics: report.risk_metrics,
            scenarios: report.scenarios,
            yearly_bands: report.yearly_bands,
            recommendations: report.recommendations,
        })
    }

    /// Produce the raw ensemble without aggregating it.
    pub fn simulate_paths(
        &self,
        plan: &PlanConfig,
        options: &RunOptions,
        seed: u64,
    ) -> RetireSimResult<Vec<PathOutcome>> {
        options.validate()?;
        let simulator = PathSimulator::new(&self.model, plan, options.projection_years)?;

        execute(&simulator, options, seed).inspect_err(|e| {
            if let RetireSimError::Cancelled { completed, requested } = e {
                warn!(completed, requested, "simulation cancelled");
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Run the built-in model with default options apart from the arguments.
pub fn run_simulation(
    inputs: &SimulationInput,
    projection_years: u32,
    simulation_count: u32,
    language: Language,
) -> RetireSimResult<SimulationResult> {
    let options = RunOptions::new(projection_years, simulation_count).with_language(language);
    SimulationEngine::default().run(inputs, &options)
}

fn default_projection_years() -> u32 {
    DEFAULT_PROJECTION_YEARS
}

fn default_simulation_count() -> u32 {
    DEFAULT_SIMULATION_COUNT
}

/// Request envelope used by the CLI and the JS bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    #[serde(default)]
    pub inputs: SimulationInput,
    #[serde(default = "default_projection_years")]
    pub projection_years: u32,
    #[serde(default = "default_simulation_count")]
    pub simulation_count: u32,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Keep every path in the result. Large: one snapshot per path-year.
    #[serde(default)]
    pub include_paths: bool,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            inputs: SimulationInput::default(),
            projection_years: DEFAULT_PROJECTION_YEARS,
            simulation_count: DEFAULT_SIMULATION_COUNT,
            language: Language::En,
            seed: None,
            include_paths: false,
        }
    }
}

impl SimulationRequest {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            projection_years: self.projection_years,
            simulation_count: self.simulation_count,
            language: self.language,
            seed: self.seed,
            ..RunOptions::default()
        }
    }
}

/// Run a request against the built-in model and wrap the result in the
/// computation envelope.
pub fn simulate(request: &SimulationRequest) -> RetireSimResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let normalized = request.inputs.normalize()?;

    let mut result = SimulationEngine::default().run_plan(&normalized.config, &request.options())?;
    if !request.include_paths {
        result.outcomes.clear();
    }

    let assumptions = json!({
        "plan": normalized.config,
        "projectionYears": request.projection_years,
        "simulationCount": request.simulation_count,
        "seed": result.seed,
        "withdrawalRate": WITHDRAWAL_RATE,
        "pensionContributionShare": PENSION_CONTRIBUTION_SHARE,
        "regimeSelection": "independent draw each year",
    });

    Ok(with_metadata(
        "Monte Carlo retirement projection with regime-switching annual returns and a 4% withdrawal rule",
        &assumptions,
        normalized.warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SEED: u64 = 42;

    fn input(value: serde_json::Value) -> SimulationInput {
        serde_json::from_value(value).unwrap()
    }

    fn options(sims: u32) -> RunOptions {
        RunOptions::new(20, sims).with_seed(SEED)
    }

    #[test]
    fn test_path_seeds_differ() {
        let seeds: std::collections::HashSet<u64> = (0..1_000).map(|i| path_seed(SEED, i)).collect();
        assert_eq!(seeds.len(), 1_000);
        assert_ne!(path_seed(1, 0), path_seed(2, 0));
    }

    #[test]
    fn test_same_seed_same_result() {
        let engine = SimulationEngine::default();
        let inputs = input(json!({ "currentSavings": 150000, "currentCrypto": 10000 }));
        let a = engine.run(&inputs, &options(300)).unwrap();
        let b = engine.run(&inputs, &options(300)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let engine = SimulationEngine::default();
        let inputs = input(json!({ "currentSavings": 150000 }));
        let par = engine.run(&inputs, &options(500).with_parallel(true)).unwrap();
        let seq = engine.run(&inputs, &options(500).with_parallel(false)).unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn test_different_seed_different_result() {
        let engine = SimulationEngine::default();
        let inputs = input(json!({ "currentSavings": 150000 }));
        let a = engine.run(&inputs, &options(200)).unwrap();
        let b = engine.run(&inputs, &options(200).with_seed(SEED + 1)).unwrap();
        assert_ne!(a.statistics, b.statistics);
    }

    #[test]
    fn test_cancelled_token_aborts_run() {
        let token = CancellationToken::new();
        token.cancel();
        let engine = SimulationEngine::default();
        for parallel in [true, false] {
            let opts = options(100).with_parallel(parallel).with_cancellation(token.clone());
            let err = engine.run(&SimulationInput::default(), &opts).unwrap_err();
            assert!(matches!(err, RetireSimError::Cancelled { requested: 100, .. }));
        }
    }

    #[test]
    fn test_zero_counts_are_rejected() {
        let engine = SimulationEngine::default();
        let inputs = SimulationInput::default();
        assert!(matches!(
            engine.run(&inputs, &RunOptions::new(0, 10)),
            Err(RetireSimError::InvalidInput { .. })
        ));
        assert!(matches!(
            engine.run(&inputs, &RunOptions::new(10, 0)),
            Err(RetireSimError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_invalid_model_is_rejected() {
        let mut model = ParameterModel::default();
        model.scenarios.boom.probability = 0.5;
        assert!(matches!(
            SimulationEngine::new(model),
            Err(RetireSimError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_result_shape() {
        let engine = SimulationEngine::default();
        let result = engine.run(&SimulationInput::default(), &options(50)).unwrap();
        assert_eq!(result.simulations, 50);
        assert_eq!(result.outcomes.len(), 50);
        assert_eq!(result.yearly_bands.len(), 20);
        assert_eq!(result.seed, SEED);
        let occurrences: u64 = result.scenarios.values().map(|s| s.occurrences).sum();
        assert_eq!(occurrences, 50 * 20);
    }

    #[test]
    fn test_simulate_envelope_drops_paths_and_reports_warnings() {
        let request: SimulationRequest = serde_json::from_value(json!({
            "inputs": { "currentSavings": "lots", "targetMonthlyIncome": 5000 },
            "projectionYears": 10,
            "simulationCount": 100,
            "seed": 7,
        }))
        .unwrap();
        let output = simulate(&request).unwrap();
        assert!(output.result.outcomes.is_empty());
        assert_eq!(output.result.seed, 7);
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].starts_with("currentSavings"));
        assert_eq!(output.metadata.precision, "ieee754_f64");
        assert_eq!(output.assumptions["simulationCount"], 100);

        let json = serde_json::to_value(&output).unwrap();
        assert!(json["result"].get("outcomes").is_none());
        assert!(json["result"]["riskMetrics"]["successProbability"].is_number());
    }

    #[test]
    fn test_request_defaults() {
        let request: SimulationRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.projection_years, 30);
        assert_eq!(request.simulation_count, 10_000);
        assert_eq!(request.language, Language::En);
        assert!(!request.include_paths);
    }
}
