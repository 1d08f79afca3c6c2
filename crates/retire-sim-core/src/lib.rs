pub mod analytics;
pub mod error;
pub mod parameters;
pub mod simulation;
pub mod types;

pub use analytics::{
    EnsembleStatistics, Priority, Recommendation, RecommendationKind, RiskMetrics,
    ScenarioSummary, YearBand,
};
pub use error::RetireSimError;
pub use parameters::{AssetClass, AssetMap, AssetParameters, ParameterModel, Regime, ReturnLaw};
pub use simulation::{
    run_simulation, simulate, CancellationToken, PathOutcome, RunOptions, SimulationEngine,
    SimulationInput, SimulationRequest, SimulationResult,
};
pub use types::*;

/// Standard result type for all retirement-simulation operations
pub type RetireSimResult<T> = Result<T, RetireSimError>;
