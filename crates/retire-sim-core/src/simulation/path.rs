use rand::Rng;
use serde::{Deserialize, Serialize};

use super::inputs::PlanConfig;
use super::sampling::{sample_normal, sample_return};
use crate::error::RetireSimError;
use crate::parameters::{AssetClass, AssetMap, AssetParameters, ParameterModel, Regime, ReturnLaw, ScenarioTable};
use crate::types::{Fraction, Money};
use crate::RetireSimResult;

/// Sustainable annual withdrawal as a fraction of the final portfolio.
pub const WITHDRAWAL_RATE: Fraction = 0.04;

/// Share of each contribution going to the pension; the rest goes to the
/// personal portfolio.
pub const PENSION_CONTRIBUTION_SHARE: Fraction = 0.6;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Draws and cash flows of one simulated year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearOutcome {
    /// Regime-adjusted returns as fractions. Exactly 0 for assets that
    /// started the year with a non-positive balance.
    pub returns: AssetMap<Fraction>,
    pub contributions: AssetMap<Money>,
    pub inflation: Fraction,
    pub economic_scenario: Regime,
}

/// A year's outcome together with the portfolio state after applying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSnapshot {
    pub year: u32,
    #[serde(flatten)]
    pub outcome: YearOutcome,
    pub total_value: Money,
    pub real_value: Money,
    pub drawdown: Fraction,
    pub max_drawdown: Fraction,
    /// Growth-only portfolio return for the year, before contributions.
    /// `None` when the year started from a non-positive total.
    pub portfolio_return: Option<Fraction>,
}

/// Mutable state owned by one path.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub balances: AssetMap<Money>,
    pub max_value_seen: Money,
    pub cumulative_inflation_index: f64,
    pub max_drawdown: Fraction,
}

impl PortfolioState {
    pub fn new(balances: AssetMap<Money>) -> Self {
        Self {
            max_value_seen: balances.total(),
            balances,
            cumulative_inflation_index: 1.0,
            max_drawdown: 0.0,
        }
    }

    pub fn total_value(&self) -> Money {
        self.balances.total()
    }

    pub fn real_value(&self) -> Money {
        self.total_value() / self.cumulative_inflation_index
    }

    /// Grow every balance by its return, then add contributions.
    /// Returns the growth-only change in total value.
    fn apply(&mut self, outcome: &YearOutcome) -> Money {
        let mut growth = 0.0;
        for asset in AssetClass::ALL {
            let balance = self.balances.get_mut(asset);
            let gain = *balance * outcome.returns.get(asset);
            *balance += gain;
            *balance += outcome.contributions.get(asset);
            growth += gain;
        }
        self.cumulative_inflation_index *= 1.0 + outcome.inflation;
        growth
    }

    /// Update the high-water mark and return this year's drawdown.
    ///
    /// Drawdown is measured against the running peak and clamped to [0, 1];
    /// a path whose peak never rose above zero has no drawdown.
    fn mark_drawdown(&mut self) -> Fraction {
        let total = self.total_value();
        self.max_value_seen = self.max_value_seen.max(total);
        let drawdown = if self.max_value_seen > 0.0 {
            ((self.max_value_seen - total) / self.max_value_seen).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.max_drawdown = self.max_drawdown.max(drawdown);
        drawdown
    }
}

/// Everything retained about one finished path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathOutcome {
    pub yearly_results: Vec<YearSnapshot>,
    pub final_portfolio_value: Money,
    pub final_monthly_income: Money,
    pub inflation_adjusted_income: Money,
    /// 1.0 when the inflation-adjusted income meets the target, else 0.0.
    pub success_probability: f64,
    pub shortfall_risk: Fraction,
    pub max_drawdown: Fraction,
    pub cumulative_inflation: f64,
}

impl PathOutcome {
    pub fn is_success(&self) -> bool {
        self.success_probability >= 1.0
    }
}

// ---------------------------------------------------------------------------
// Path simulator
// ---------------------------------------------------------------------------

/// Advances single paths year by year.
///
/// Built once per run: the caller overrides and the personal-portfolio
/// blend are resolved here, so each path only draws random numbers.
#[derive(Debug, Clone)]
pub struct PathSimulator<'a> {
    plan: &'a PlanConfig,
    scenarios: &'a ScenarioTable,
    assets: AssetMap<AssetParameters>,
    inflation: AssetParameters,
    projection_years: u32,
}

fn override_field(asset: AssetClass) -> &'static str {
    match asset {
        AssetClass::Pension => "pensionReturn",
        AssetClass::TrainingFund => "trainingFundReturn",
        AssetClass::PersonalPortfolio => "stockPercentage",
        AssetClass::RealEstate => "realEstateReturn",
        AssetClass::Crypto => "cryptoReturn",
    }
}

impl<'a> PathSimulator<'a> {
    pub fn new(
        model: &'a ParameterModel,
        plan: &'a PlanConfig,
        projection_years: u32,
    ) -> RetireSimResult<Self> {
        let stock_weight = plan.stock_weight();
        let mut assets = AssetMap::from_fn(|asset| model.assets.for_asset(asset, stock_weight));
        for asset in AssetClass::ALL {
            if let Some(expected) = plan.return_override(asset) {
                let params = assets.get_mut(asset);
                if params.distribution == ReturnLaw::Lognormal && expected <= 0.0 {
                    return Err(RetireSimError::invalid_input(
                        override_field(asset),
                        format!("lognormal returns need a positive expected return, got {expected}"),
                    ));
                }
                *params = params.with_expected_return(expected);
            }
        }

        let inflation = match plan.inflation_rate {
            Some(rate) => model.assets.inflation.with_expected_return(rate),
            None => model.assets.inflation.clone(),
        };

        Ok(Self {
            plan,
            scenarios: &model.scenarios,
            assets,
            inflation,
            projection_years,
        })
    }

    /// Resolved parameters actually sampled for `asset`.
    pub fn asset_parameters(&self, asset: AssetClass) -> &AssetParameters {
        self.assets.get(asset)
    }

    pub fn inflation_parameters(&self) -> &AssetParameters {
        &self.inflation
    }

    /// Draw the regime, inflation, returns and contributions for `year`
    /// (1-based) given the balances at the start of the year.
    pub fn draw_year<R: Rng>(&self, balances: &AssetMap<Money>, year: u32, rng: &mut R) -> YearOutcome {
        let regime = self.scenarios.select(rng.gen::<f64>());
        let scenario = self.scenarios.get(regime);

        let inflation_pct = sample_normal(rng, self.inflation.expected_return, self.inflation.volatility)
            * scenario.inflation_multiplier;
        let inflation = inflation_pct.max(0.0) / 100.0;

        let mut returns = AssetMap::<Fraction>::default();
        for asset in AssetClass::ALL {
            if *balances.get(asset) > 0.0 {
                let base = sample_return(rng, self.assets.get(asset));
                *returns.get_mut(asset) = base * scenario.multiplier_for(asset) / 100.0;
            }
        }

        let mut contributions = AssetMap::<Money>::default();
        if year <= self.plan.years_to_retirement {
            let annual = self.plan.annual_contribution();
            contributions.pension = annual * PENSION_CONTRIBUTION_SHARE;
            contributions.personal_portfolio = annual * (1.0 - PENSION_CONTRIBUTION_SHARE);
        }

        YearOutcome {
            returns,
            contributions,
            inflation,
            economic_scenario: regime,
        }
    }

    /// Simulate one complete path. Always runs every projection year, even
    /// once the portfolio is exhausted.
    pub fn run<R: Rng>(&self, rng: &mut R) -> PathOutcome {
        let mut state = PortfolioState::new(self.plan.balances);
        let mut yearly_results = Vec::with_capacity(self.projection_years as usize);

        for year in 1..=self.projection_years {
            let start_total = state.total_value();
            let outcome = self.draw_year(&state.balances, year, rng);
            let growth = state.apply(&outcome);
            let drawdown = state.mark_drawdown();

            yearly_results.push(YearSnapshot {
                year,
                total_value: state.total_value(),
                real_value: state.real_value(),
                drawdown,
                max_drawdown: state.max_drawdown,
                portfolio_return: (start_total > 0.0).then(|| growth / start_total),
                outcome,
            });
        }

        self.complete(state, yearly_results)
    }

    fn complete(&self, state: PortfolioState, yearly_results: Vec<YearSnapshot>) -> PathOutcome {
        let target = self.plan.target_monthly_income;
        let final_portfolio_value = state.total_value();
        let final_monthly_income = final_portfolio_value * WITHDRAWAL_RATE / 12.0;
        let inflation_adjusted_income = final_monthly_income / state.cumulative_inflation_index;

        let success_probability = if inflation_adjusted_income >= target { 1.0 } else { 0.0 };
        let shortfall_risk = (target - inflation_adjusted_income).max(0.0) / target;

        PathOutcome {
            yearly_results,
            final_portfolio_value,
            final_monthly_income,
            inflation_adjusted_income,
            success_probability,
            shortfall_risk,
            max_drawdown: state.max_drawdown,
            cumulative_inflation: state.cumulative_inflation_index,
        }
    }
}
