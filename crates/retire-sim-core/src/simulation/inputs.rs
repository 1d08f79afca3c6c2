use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RetireSimError;
use crate::parameters::{AssetClass, AssetMap};
use crate::types::{Fraction, Money, Percent};
use crate::RetireSimResult;

pub const DEFAULT_CURRENT_AGE: u32 = 30;
pub const DEFAULT_RETIREMENT_AGE: u32 = 67;
pub const DEFAULT_STOCK_PERCENTAGE: Percent = 60.0;
pub const DEFAULT_MONTHLY_CONTRIBUTION: Money = 1_000.0;
pub const DEFAULT_TARGET_MONTHLY_INCOME: Money = 10_000.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Caller-supplied planning record, as loosely typed as the UI produces it.
///
/// Every field accepts a number, a numeric string or null. Missing and
/// unparseable values fall back to documented defaults during
/// [`SimulationInput::normalize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_age: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retirement_age: Option<Value>,
    /// Annual inflation in percent. Defaults to the parameter model's mean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflation_rate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_savings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_training_fund: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_personal_portfolio: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_real_estate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_crypto: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pension_return: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_fund_return: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_estate_return: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crypto_return: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_percentage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_contributions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_monthly_income: Option<Value>,
}

/// Fully populated plan produced by normalization. Every field is usable
/// as-is by the path simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    pub current_age: u32,
    pub retirement_age: u32,
    pub years_to_retirement: u32,
    /// `None` means the parameter model's inflation mean.
    pub inflation_rate: Option<Percent>,
    pub balances: AssetMap<Money>,
    /// Caller overrides of expected return. The personal portfolio is
    /// driven by `stock_percentage` instead and is always `None`.
    pub return_overrides: AssetMap<Option<Percent>>,
    pub stock_percentage: Percent,
    pub monthly_contribution: Money,
    pub target_monthly_income: Money,
}

impl PlanConfig {
    pub fn stock_weight(&self) -> Fraction {
        self.stock_percentage / 100.0
    }

    pub fn annual_contribution(&self) -> Money {
        self.monthly_contribution * 12.0
    }
}

/// Result of normalization: the plan plus one warning per substituted default.
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub config: PlanConfig,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Numeric coercion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Coerced {
    Absent,
    Number(f64),
    Unparseable,
}

/// Parse the longest numeric prefix of `s` after leading whitespace.
///
/// `"42.5%"` gives 42.5, `"1e3 units"` gives 1000, `"abc"` gives `None`.
pub fn parse_leading_f64(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn coerce(value: Option<&Value>) -> Coerced {
    match value {
        None | Some(Value::Null) => Coerced::Absent,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Coerced::Number(v),
            _ => Coerced::Unparseable,
        },
        Some(Value::String(s)) => match parse_leading_f64(s) {
            Some(v) => Coerced::Number(v),
            None => Coerced::Unparseable,
        },
        Some(_) => Coerced::Unparseable,
    }
}

/// Collects substitution warnings while reading fields.
#[derive(Default)]
struct FieldReader {
    warnings: Vec<String>,
}

impl FieldReader {
    fn number_or(&mut self, field: &str, value: &Option<Value>, default: f64) -> f64 {
        match coerce(value.as_ref()) {
            Coerced::Number(v) => v,
            Coerced::Absent => default,
            Coerced::Unparseable => {
                self.substituted(field, value, &default.to_string());
                default
            }
        }
    }

    fn optional(&mut self, field: &str, value: &Option<Value>, fallback: &str) -> Option<f64> {
        match coerce(value.as_ref()) {
            Coerced::Number(v) => Some(v),
            Coerced::Absent => None,
            Coerced::Unparseable => {
                self.substituted(field, value, fallback);
                None
            }
        }
    }

    fn age_or(&mut self, field: &str, value: &Option<Value>, default: u32) -> u32 {
        let raw = self.number_or(field, value, f64::from(default));
        raw.trunc().max(0.0) as u32
    }

    fn substituted(&mut self, field: &str, value: &Option<Value>, used: &str) {
        let shown = value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        warn!(field, value = %shown, used, "unparseable input replaced by default");
        self.warnings
            .push(format!("{field}: could not parse {shown}, using {used}"));
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

impl SimulationInput {
    /// Turn the loose record into a [`PlanConfig`].
    ///
    /// Never fails on malformed numbers; fails only when the target
    /// income is explicitly zero or negative, which would make every
    /// shortfall ratio undefined.
    pub fn normalize(&self) -> RetireSimResult<NormalizedInput> {
        let mut reader = FieldReader::default();

        let current_age = reader.age_or("currentAge", &self.current_age, DEFAULT_CURRENT_AGE);
        let retirement_age =
            reader.age_or("retirementAge", &self.retirement_age, DEFAULT_RETIREMENT_AGE);
        let inflation_rate =
            reader.optional("inflationRate", &self.inflation_rate, "the model default");

        let balances = AssetMap {
            pension: reader.number_or("currentSavings", &self.current_savings, 0.0),
            training_fund: reader.number_or("currentTrainingFund", &self.current_training_fund, 0.0),
            personal_portfolio: reader.number_or(
                "currentPersonalPortfolio",
                &self.current_personal_portfolio,
                0.0,
            ),
            real_estate: reader.number_or("currentRealEstate", &self.current_real_estate, 0.0),
            crypto: reader.number_or("currentCrypto", &self.current_crypto, 0.0),
        };

        let return_overrides = AssetMap {
            pension: reader.optional("pensionReturn", &self.pension_return, "the model default"),
            training_fund: reader.optional(
                "trainingFundReturn",
                &self.training_fund_return,
                "the model default",
            ),
            personal_portfolio: None,
            real_estate: reader.optional(
                "realEstateReturn",
                &self.real_estate_return,
                "the model default",
            ),
            crypto: reader.optional("cryptoReturn", &self.crypto_return, "the model default"),
        };

        let stock_percentage = reader
            .number_or("stockPercentage", &self.stock_percentage, DEFAULT_STOCK_PERCENTAGE)
            .clamp(0.0, 100.0);
        let monthly_contribution = reader.number_or(
            "monthlyContributions",
            &self.monthly_contributions,
            DEFAULT_MONTHLY_CONTRIBUTION,
        );

        let target_monthly_income = match coerce(self.target_monthly_income.as_ref()) {
            Coerced::Number(v) if v <= 0.0 => {
                return Err(RetireSimError::invalid_input(
                    "targetMonthlyIncome",
                    format!("must be > 0, got {v}"),
                ));
            }
            _ => reader.number_or(
                "targetMonthlyIncome",
                &self.target_monthly_income,
                DEFAULT_TARGET_MONTHLY_INCOME,
            ),
        };

        let config = PlanConfig {
            current_age,
            retirement_age,
            years_to_retirement: retirement_age.saturating_sub(current_age),
            inflation_rate,
            balances,
            return_overrides,
            stock_percentage,
            monthly_contribution,
            target_monthly_income,
        };
        debug!(
            current_age,
            retirement_age,
            years_to_retirement = config.years_to_retirement,
            total_balance = config.balances.total(),
            target_monthly_income,
            "normalized simulation input"
        );

        Ok(NormalizedInput {
            config,
            warnings: reader.warnings,
        })
    }
}

impl PlanConfig {
    /// Expected-return override for `asset`, if the caller supplied one.
    pub fn return_override(&self, asset: AssetClass) -> Option<Percent> {
        *self.return_overrides.get(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn input(value: Value) -> SimulationInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_input_uses_defaults() {
        let n = SimulationInput::default().normalize().unwrap();
        let c = &n.config;
        assert_eq!(c.current_age, 30);
        assert_eq!(c.retirement_age, 67);
        assert_eq!(c.years_to_retirement, 37);
        assert_eq!(c.inflation_rate, None);
        assert_eq!(c.balances, AssetMap::default());
        assert_eq!(c.return_overrides, AssetMap::default());
        assert_eq!(c.stock_percentage, 60.0);
        assert_eq!(c.monthly_contribution, 1_000.0);
        assert_eq!(c.target_monthly_income, 10_000.0);
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let n = input(json!({
            "currentAge": "40",
            "currentSavings": "200000 ILS",
            "monthlyContributions": " 2500.5",
            "inflationRate": "3%",
        }))
        .normalize()
        .unwrap();
        assert_eq!(n.config.current_age, 40);
        assert_eq!(n.config.balances.pension, 200_000.0);
        assert_eq!(n.config.monthly_contribution, 2_500.5);
        assert_eq!(n.config.inflation_rate, Some(3.0));
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn test_unparseable_values_fall_back_with_warning() {
        let n = input(json!({
            "currentAge": "forty",
            "currentCrypto": true,
            "pensionReturn": "n/a",
        }))
        .normalize()
        .unwrap();
        assert_eq!(n.config.current_age, DEFAULT_CURRENT_AGE);
        assert_eq!(n.config.balances.crypto, 0.0);
        assert_eq!(n.config.return_overrides.pension, None);
        assert_eq!(n.warnings.len(), 3);
        assert!(n.warnings[0].starts_with("currentAge"));
    }

    #[test]
    fn test_null_is_treated_as_absent() {
        let n = input(json!({ "monthlyContributions": null }))
            .normalize()
            .unwrap();
        assert_eq!(n.config.monthly_contribution, DEFAULT_MONTHLY_CONTRIBUTION);
        assert!(n.warnings.is_empty());
    }

    #[test]
    fn test_explicit_zero_is_kept() {
        let n = input(json!({ "monthlyContributions": 0, "stockPercentage": 0 }))
            .normalize()
            .unwrap();
        assert_eq!(n.config.monthly_contribution, 0.0);
        assert_eq!(n.config.stock_percentage, 0.0);
    }

    #[test]
    fn test_stock_percentage_clamped() {
        let n = input(json!({ "stockPercentage": 140 })).normalize().unwrap();
        assert_eq!(n.config.stock_percentage, 100.0);
        assert_eq!(n.config.stock_weight(), 1.0);
    }

    #[test]
    fn test_retirement_before_current_age_gives_zero_years() {
        let n = input(json!({ "currentAge": 70, "retirementAge": 65 }))
            .normalize()
            .unwrap();
        assert_eq!(n.config.years_to_retirement, 0);
    }

    #[test]
    fn test_fractional_ages_truncate() {
        let n = input(json!({ "currentAge": 41.9, "retirementAge": "66.5" }))
            .normalize()
            .unwrap();
        assert_eq!(n.config.current_age, 41);
        assert_eq!(n.config.retirement_age, 66);
    }

    #[test]
    fn test_non_positive_target_income_rejected() {
        for bad in [json!(0), json!(-500), json!("0")] {
            let err = input(json!({ "targetMonthlyIncome": bad })).normalize();
            assert!(
                matches!(err, Err(RetireSimError::InvalidInput { ref field, .. }) if field == "targetMonthlyIncome")
            );
        }
    }

    #[test]
    fn test_unparseable_target_income_uses_default() {
        let n = input(json!({ "targetMonthlyIncome": "lots" }))
            .normalize()
            .unwrap();
        assert_eq!(n.config.target_monthly_income, DEFAULT_TARGET_MONTHLY_INCOME);
        assert_eq!(n.warnings.len(), 1);
    }

    #[test]
    fn test_overrides_captured_per_asset() {
        let n = input(json!({
            "pensionReturn": 5.5,
            "trainingFundReturn": "4",
            "realEstateReturn": 3,
            "cryptoReturn": 20,
        }))
        .normalize()
        .unwrap();
        let c = &n.config;
        assert_eq!(c.return_override(AssetClass::Pension), Some(5.5));
        assert_eq!(c.return_override(AssetClass::TrainingFund), Some(4.0));
        assert_eq!(c.return_override(AssetClass::PersonalPortfolio), None);
        assert_eq!(c.return_override(AssetClass::RealEstate), Some(3.0));
        assert_eq!(c.return_override(AssetClass::Crypto), Some(20.0));
    }

    #[test]
    fn test_parse_leading_f64() {
        assert_eq!(parse_leading_f64("12"), Some(12.0));
        assert_eq!(parse_leading_f64("  -3.5abc"), Some(-3.5));
        assert_eq!(parse_leading_f64(".5"), Some(0.5));
        assert_eq!(parse_leading_f64("7."), Some(7.0));
        assert_eq!(parse_leading_f64("1e3x"), Some(1000.0));
        assert_eq!(parse_leading_f64("2e"), Some(2.0));
        assert_eq!(parse_leading_f64("abc"), None);
        assert_eq!(parse_leading_f64(""), None);
        assert_eq!(parse_leading_f64("-"), None);
        assert_eq!(parse_leading_f64("."), None);
        assert_eq!(parse_leading_f64("Infinity"), None);
    }
}
