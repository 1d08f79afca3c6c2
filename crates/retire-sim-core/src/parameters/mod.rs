//! Static return model: per-asset parameters and the economic-regime table.

pub mod assets;
pub mod regimes;

use serde::{Deserialize, Serialize};

use crate::RetireSimResult;
pub use assets::{
    AssetClass, AssetMap, AssetParameters, AssetTable, CompositeParameters, CorrelationKey,
    ReturnLaw,
};
pub use regimes::{EconomicScenario, Regime, ScenarioTable};

/// Immutable configuration handed to the simulation engine at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterModel {
    pub assets: AssetTable,
    pub scenarios: ScenarioTable,
}

impl ParameterModel {
    pub fn new(assets: AssetTable, scenarios: ScenarioTable) -> Self {
        Self { assets, scenarios }
    }

    pub fn validate(&self) -> RetireSimResult<()> {
        self.assets.validate()?;
        self.scenarios.validate()
    }

    /// Same regime table, different asset parameters.
    pub fn with_assets(&self, assets: AssetTable) -> Self {
        Self {
            assets,
            scenarios: self.scenarios.clone(),
        }
    }

    /// Same asset table, with `regime` drawn every year.
    pub fn with_forced_regime(&self, regime: Regime) -> Self {
        Self {
            assets: self.assets.clone(),
            scenarios: self.scenarios.forced(regime),
        }
    }
}
