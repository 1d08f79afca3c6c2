use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RetireSimError;
use crate::types::{Fraction, Percent};
use crate::RetireSimResult;

// ---------------------------------------------------------------------------
// Asset classes
// ---------------------------------------------------------------------------

/// Balance-carrying asset classes of a retirement portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetClass {
    Pension,
    TrainingFund,
    PersonalPortfolio,
    RealEstate,
    Crypto,
}

impl AssetClass {
    /// Fixed iteration order used everywhere an ensemble is built, so that
    /// random draws are consumed in the same sequence on every run.
    pub const ALL: [AssetClass; 5] = [
        AssetClass::Pension,
        AssetClass::TrainingFund,
        AssetClass::PersonalPortfolio,
        AssetClass::RealEstate,
        AssetClass::Crypto,
    ];

    pub fn key(self) -> &'static str {
        match self {
            AssetClass::Pension => "pension",
            AssetClass::TrainingFund => "trainingFund",
            AssetClass::PersonalPortfolio => "personalPortfolio",
            AssetClass::RealEstate => "realEstate",
            AssetClass::Crypto => "crypto",
        }
    }
}

/// Targets of a correlation hint: the asset classes plus the two
/// sub-models of the personal portfolio and inflation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrelationKey {
    Pension,
    TrainingFund,
    PersonalPortfolio,
    Stocks,
    Bonds,
    RealEstate,
    Crypto,
    Inflation,
}

/// Sampling law for an asset's annual return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnLaw {
    /// Unbounded; can produce returns below -100%. Accepted approximation.
    Normal,
    /// Always positive in percent space.
    Lognormal,
}

// ---------------------------------------------------------------------------
// Per-asset parameters
// ---------------------------------------------------------------------------

/// Expected return and volatility of one asset class, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetParameters {
    pub expected_return: Percent,
    pub volatility: Percent,
    pub distribution: ReturnLaw,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub correlations: BTreeMap<CorrelationKey, f64>,
}

impl AssetParameters {
    pub fn new(expected_return: Percent, volatility: Percent, distribution: ReturnLaw) -> Self {
        Self {
            expected_return,
            volatility,
            distribution,
            correlations: BTreeMap::new(),
        }
    }

    pub fn with_correlation(mut self, key: CorrelationKey, coefficient: f64) -> Self {
        self.correlations.insert(key, coefficient);
        self
    }

    pub fn correlation(&self, key: CorrelationKey) -> Option<f64> {
        self.correlations.get(&key).copied()
    }

    /// Same volatility and law, caller-supplied mean.
    pub fn with_expected_return(&self, expected_return: Percent) -> Self {
        Self {
            expected_return,
            ..self.clone()
        }
    }

    pub(crate) fn validate(&self, field: &str) -> RetireSimResult<()> {
        if !self.expected_return.is_finite() {
            return Err(RetireSimError::invalid_parameters(
                field,
                "expectedReturn must be finite",
            ));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(RetireSimError::invalid_parameters(
                field,
                "volatility must be finite and >= 0",
            ));
        }
        if self.distribution == ReturnLaw::Lognormal && self.expected_return <= 0.0 {
            return Err(RetireSimError::invalid_parameters(
                field,
                "lognormal law requires a positive expectedReturn",
            ));
        }
        for (key, rho) in &self.correlations {
            if !(-1.0..=1.0).contains(rho) {
                return Err(RetireSimError::invalid_parameters(
                    field,
                    format!("correlation with {key:?} must lie in [-1, 1], got {rho}"),
                ));
            }
        }
        Ok(())
    }
}

/// The personal portfolio is a stock/bond blend whose weights come from
/// the caller's allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeParameters {
    pub stocks: AssetParameters,
    pub bonds: AssetParameters,
}

impl CompositeParameters {
    /// Collapse the two sub-models into one normal-law asset.
    ///
    /// Mean is the weighted mean. Volatility is the two-asset portfolio
    /// volatility using the stocks/bonds correlation hint (0 when absent).
    pub fn blend(&self, stock_weight: Fraction) -> AssetParameters {
        let w = stock_weight.clamp(0.0, 1.0);
        let rho = self
            .stocks
            .correlation(CorrelationKey::Bonds)
            .or_else(|| self.bonds.correlation(CorrelationKey::Stocks))
            .unwrap_or(0.0);
        let (sigma_s, sigma_b) = (self.stocks.volatility, self.bonds.volatility);

        let expected_return = w * self.stocks.expected_return + (1.0 - w) * self.bonds.expected_return;
        let variance = (w * sigma_s).powi(2)
            + ((1.0 - w) * sigma_b).powi(2)
            + 2.0 * w * (1.0 - w) * rho * sigma_s * sigma_b;

        AssetParameters {
            expected_return,
            volatility: variance.max(0.0).sqrt(),
            distribution: ReturnLaw::Normal,
            correlations: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset-keyed map
// ---------------------------------------------------------------------------

/// One value per asset class. Exhaustive by construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMap<T> {
    pub pension: T,
    pub training_fund: T,
    pub personal_portfolio: T,
    pub real_estate: T,
    pub crypto: T,
}

impl<T> AssetMap<T> {
    pub fn from_fn(mut f: impl FnMut(AssetClass) -> T) -> Self {
        Self {
            pension: f(AssetClass::Pension),
            training_fund: f(AssetClass::TrainingFund),
            personal_portfolio: f(AssetClass::PersonalPortfolio),
            real_estate: f(AssetClass::RealEstate),
            crypto: f(AssetClass::Crypto),
        }
    }

    pub fn get(&self, asset: AssetClass) -> &T {
        match asset {
            AssetClass::Pension => &self.pension,
            AssetClass::TrainingFund => &self.training_fund,
            AssetClass::PersonalPortfolio => &self.personal_portfolio,
            AssetClass::RealEstate => &self.real_estate,
            AssetClass::Crypto => &self.crypto,
        }
    }

    pub fn get_mut(&mut self, asset: AssetClass) -> &mut T {
        match asset {
            AssetClass::Pension => &mut self.pension,
            AssetClass::TrainingFund => &mut self.training_fund,
            AssetClass::PersonalPortfolio => &mut self.personal_portfolio,
            AssetClass::RealEstate => &mut self.real_estate,
            AssetClass::Crypto => &mut self.crypto,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, &T)> + '_ {
        AssetClass::ALL.into_iter().map(move |asset| (asset, self.get(asset)))
    }
}

impl AssetMap<f64> {
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }
}

// ---------------------------------------------------------------------------
// Asset table
// ---------------------------------------------------------------------------

/// Static per-asset return model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTable {
    pub pension: AssetParameters,
    pub training_fund: AssetParameters,
    pub personal_portfolio: CompositeParameters,
    pub real_estate: AssetParameters,
    pub crypto: AssetParameters,
    pub inflation: AssetParameters,
}

impl Default for AssetTable {
    fn default() -> Self {
        use CorrelationKey as C;
        use ReturnLaw::{Lognormal, Normal};

        Self {
            pension: AssetParameters::new(7.0, 15.0, Normal)
                .with_correlation(C::TrainingFund, 0.85)
                .with_correlation(C::PersonalPortfolio, 0.75)
                .with_correlation(C::RealEstate, 0.30)
                .with_correlation(C::Crypto, 0.20),
            training_fund: AssetParameters::new(6.0, 12.0, Normal)
                .with_correlation(C::Pension, 0.85)
                .with_correlation(C::PersonalPortfolio, 0.70),
            personal_portfolio: CompositeParameters {
                stocks: AssetParameters::new(8.0, 18.0, Normal)
                    .with_correlation(C::Bonds, -0.20)
                    .with_correlation(C::Crypto, 0.30),
                bonds: AssetParameters::new(3.5, 5.0, Normal).with_correlation(C::Stocks, -0.20),
            },
            real_estate: AssetParameters::new(6.0, 10.0, Normal).with_correlation(C::Pension, 0.30),
            crypto: AssetParameters::new(15.0, 60.0, Lognormal).with_correlation(C::Stocks, 0.30),
            inflation: AssetParameters::new(2.5, 1.0, Normal),
        }
    }
}

impl AssetTable {
    pub(crate) fn validate(&self) -> RetireSimResult<()> {
        self.pension.validate("assets.pension")?;
        self.training_fund.validate("assets.trainingFund")?;
        self.personal_portfolio.stocks.validate("assets.personalPortfolio.stocks")?;
        self.personal_portfolio.bonds.validate("assets.personalPortfolio.bonds")?;
        self.real_estate.validate("assets.realEstate")?;
        self.crypto.validate("assets.crypto")?;
        self.inflation.validate("assets.inflation")
    }

    /// Base entry for a balance-carrying asset. The personal portfolio is
    /// blended at `stock_weight`.
    pub fn for_asset(&self, asset: AssetClass, stock_weight: Fraction) -> AssetParameters {
        match asset {
            AssetClass::Pension => self.pension.clone(),
            AssetClass::TrainingFund => self.training_fund.clone(),
            AssetClass::PersonalPortfolio => self.personal_portfolio.blend(stock_weight),
            AssetClass::RealEstate => self.real_estate.clone(),
            AssetClass::Crypto => self.crypto.clone(),
        }
    }
}
