use serde::{Deserialize, Serialize};

use super::assets::AssetClass;
use crate::error::RetireSimError;
use crate::RetireSimResult;

/// Tolerance for the sum of regime probabilities.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Discrete macroeconomic regime, drawn independently every simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Recession,
    Expansion,
    Boom,
    Stagflation,
}

impl Regime {
    /// Enumeration order of the cumulative-probability walk. The last entry
    /// is the fallback when rounding leaves an uncovered tail.
    pub const ALL: [Regime; 4] = [
        Regime::Recession,
        Regime::Expansion,
        Regime::Boom,
        Regime::Stagflation,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Regime::Recession => "recession",
            Regime::Expansion => "expansion",
            Regime::Boom => "boom",
            Regime::Stagflation => "stagflation",
        }
    }
}

/// Probability and return/inflation multipliers of one regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicScenario {
    pub probability: f64,
    pub stock_return_multiplier: f64,
    pub bond_return_multiplier: f64,
    pub real_estate_return_multiplier: f64,
    pub inflation_multiplier: f64,
    /// Average persistence in years. Carried as data only: regimes are
    /// drawn independently each year.
    pub duration: f64,
}

impl EconomicScenario {
    /// Multiplier applied to an asset's percent return under this regime.
    /// Crypto rides the stock multiplier.
    pub fn multiplier_for(&self, asset: AssetClass) -> f64 {
        match asset {
            AssetClass::Pension | AssetClass::PersonalPortfolio | AssetClass::Crypto => {
                self.stock_return_multiplier
            }
            AssetClass::TrainingFund => self.bond_return_multiplier,
            AssetClass::RealEstate => self.real_estate_return_multiplier,
        }
    }
}

/// The four regimes, one field each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    pub recession: EconomicScenario,
    pub expansion: EconomicScenario,
    pub boom: EconomicScenario,
    pub stagflation: EconomicScenario,
}

impl Default for ScenarioTable {
    fn default() -> Self {
        Self {
            recession: EconomicScenario {
                probability: 0.15,
                stock_return_multiplier: -0.2,
                bond_return_multiplier: 1.2,
                real_estate_return_multiplier: 0.7,
                inflation_multiplier: 0.6,
                duration: 1.5,
            },
            expansion: EconomicScenario {
                probability: 0.60,
                stock_return_multiplier: 1.0,
                bond_return_multiplier: 1.0,
                real_estate_return_multiplier: 1.0,
                inflation_multiplier: 1.0,
                duration: 6.0,
            },
            boom: EconomicScenario {
                probability: 0.15,
                stock_return_multiplier: 1.5,
                bond_return_multiplier: 0.8,
                real_estate_return_multiplier: 1.3,
                inflation_multiplier: 1.2,
                duration: 3.0,
            },
            stagflation: EconomicScenario {
                probability: 0.10,
                stock_return_multiplier: 0.3,
                bond_return_multiplier: 0.5,
                real_estate_return_multiplier: 0.9,
                inflation_multiplier: 2.5,
                duration: 2.0,
            },
        }
    }
}

impl ScenarioTable {
    pub fn get(&self, regime: Regime) -> &EconomicScenario {
        match regime {
            Regime::Recession => &self.recession,
            Regime::Expansion => &self.expansion,
            Regime::Boom => &self.boom,
            Regime::Stagflation => &self.stagflation,
        }
    }

    fn get_mut(&mut self, regime: Regime) -> &mut EconomicScenario {
        match regime {
            Regime::Recession => &mut self.recession,
            Regime::Expansion => &mut self.expansion,
            Regime::Boom => &mut self.boom,
            Regime::Stagflation => &mut self.stagflation,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Regime, &EconomicScenario)> + '_ {
        Regime::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    pub fn total_probability(&self) -> f64 {
        self.iter().map(|(_, s)| s.probability).sum()
    }

    /// Copy of this table where `regime` always occurs. Multipliers are kept.
    pub fn forced(&self, regime: Regime) -> Self {
        let mut table = self.clone();
        for r in Regime::ALL {
            table.get_mut(r).probability = if r == regime { 1.0 } else { 0.0 };
        }
        table
    }

    /// Map a uniform draw in [0, 1) to a regime by walking the cumulative
    /// probability masses in enumeration order. Regimes with zero mass are
    /// never selected.
    pub fn select(&self, draw: f64) -> Regime {
        let mut cumulative = 0.0;
        for (regime, scenario) in self.iter() {
            if scenario.probability <= 0.0 {
                continue;
            }
            cumulative += scenario.probability;
            if draw <= cumulative {
                return regime;
            }
        }
        Regime::Stagflation
    }

    pub(crate) fn validate(&self) -> RetireSimResult<()> {
        for (regime, scenario) in self.iter() {
            let p = scenario.probability;
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(RetireSimError::invalid_parameters(
                    &format!("scenarios.{}.probability", regime.key()),
                    format!("must lie in [0, 1], got {p}"),
                ));
            }
        }
        let total = self.total_probability();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(RetireSimError::invalid_parameters(
                "scenarios",
                format!("regime probabilities must sum to 1.0, got {total}"),
            ));
        }
        Ok(())
    }
}
