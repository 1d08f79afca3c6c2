//! Input normalization, the per-path simulator and the Monte Carlo driver.

pub mod driver;
pub mod inputs;
pub mod path;
pub mod sampling;

pub use driver::{
    path_seed, run_simulation, simulate, CancellationToken, RunOptions, SimulationEngine,
    SimulationRequest, SimulationResult, DEFAULT_PROJECTION_YEARS, DEFAULT_SIMULATION_COUNT,
};
pub use inputs::{NormalizedInput, PlanConfig, SimulationInput};
pub use path::{PathOutcome, PathSimulator, PortfolioState, YearOutcome, YearSnapshot};
