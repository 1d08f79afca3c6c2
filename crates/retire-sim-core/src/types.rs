use serde::{Deserialize, Serialize};

/// Rates and returns quoted in percent (7.0 = 7%), as the parameter tables store them.
pub type Percent = f64;

/// Rates, returns and ratios as plain fractions (0.07 = 7%).
pub type Fraction = f64;

/// Currency amounts. The engine is currency-agnostic.
pub type Money = f64;

/// Language tag for localized recommendation text.
///
/// Serializes as "en"/"he"; deserializes leniently through [`Language::from_tag`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Language {
    #[default]
    En,
    He,
}

impl Language {
    /// Parse a loose language tag ("he", "he-IL", "hebrew", "EN"...).
    /// Anything that is not recognisably Hebrew falls back to English.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        let hebrew = matches!(tag.as_str(), "he" | "iw" | "hebrew")
            || tag.starts_with("he-")
            || tag.starts_with("he_");
        if hebrew {
            Language::He
        } else {
            Language::En
        }
    }
}

impl From<String> for Language {
    fn from(tag: String) -> Self {
        Language::from_tag(&tag)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}
