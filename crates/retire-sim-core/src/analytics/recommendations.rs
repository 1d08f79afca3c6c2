use serde::{Deserialize, Serialize};

use super::risk::RiskMetrics;
use super::statistics::EnsembleStatistics;
use crate::types::{Fraction, Language};

pub const LOW_SUCCESS_THRESHOLD: Fraction = 0.70;
pub const HIGH_SUCCESS_THRESHOLD: Fraction = 0.90;
pub const HIGH_DRAWDOWN_THRESHOLD: Fraction = 0.40;
pub const SHORTFALL_THRESHOLD: Fraction = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    LowSuccess,
    HighSuccess,
    HighDrawdownRisk,
    ShortfallRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub actions: Vec<String>,
}

struct Text {
    title: &'static str,
    description: &'static str,
    actions: &'static [&'static str],
}

impl RecommendationKind {
    pub fn priority(self) -> Priority {
        match self {
            RecommendationKind::LowSuccess | RecommendationKind::ShortfallRisk => Priority::High,
            RecommendationKind::HighDrawdownRisk => Priority::Medium,
            RecommendationKind::HighSuccess => Priority::Low,
        }
    }

    fn text(self, language: Language) -> Text {
        match (self, language) {
            (RecommendationKind::LowSuccess, Language::En) => Text {
                title: "Low probability of reaching your retirement goal",
                description: "Fewer than 70% of simulated futures reach your target monthly income.",
                actions: &[
                    "Increase monthly contributions",
                    "Extend your working years",
                    "Consider a higher-risk, higher-return allocation",
                    "Reduce expected retirement expenses",
                ],
            },
            (RecommendationKind::LowSuccess, Language::He) => Text {
                title: "סיכוי נמוך להשגת יעד הפרישה",
                description: "פחות מ-70% מהתרחישים המדומים מגיעים להכנסה החודשית שהגדרת.",
                actions: &[
                    "הגדל את ההפקדות החודשיות",
                    "הארך את שנות העבודה",
                    "שקול תמהיל השקעות עם סיכון ותשואה גבוהים יותר",
                    "צמצם את הוצאות הפרישה הצפויות",
                ],
            },
            (RecommendationKind::HighSuccess, Language::En) => Text {
                title: "Your plan is on track",
                description: "More than 90% of simulated futures reach your target monthly income.",
                actions: &[
                    "Consider reducing portfolio risk",
                    "Consider retiring earlier",
                    "Consider increasing your planned lifestyle spending",
                ],
            },
            (RecommendationKind::HighSuccess, Language::He) => Text {
                title: "התוכנית שלך במסלול הנכון",
                description: "יותר מ-90% מהתרחישים המדומים מגיעים להכנסה החודשית שהגדרת.",
                actions: &[
                    "שקול להפחית את רמת הסיכון בתיק",
                    "שקול פרישה מוקדמת",
                    "שקול להגדיל את רמת החיים המתוכננת",
                ],
            },
            (RecommendationKind::HighDrawdownRisk, Language::En) => Text {
                title: "High drawdown risk",
                description: "In the worst 10% of simulated futures the portfolio falls more than 40% from its peak.",
                actions: &[
                    "Diversify across more asset classes",
                    "Reduce your bond allocation",
                    "Add alternative investments",
                ],
            },
            (RecommendationKind::HighDrawdownRisk, Language::He) => Text {
                title: "סיכון גבוה לירידת ערך",
                description: "ב-10% מהתרחישים הגרועים ביותר התיק יורד ביותר מ-40% מהשיא.",
                actions: &[
                    "פזר את ההשקעות על פני יותר אפיקים",
                    "הפחת את החשיפה לאג\"ח",
                    "הוסף השקעות אלטרנטיביות",
                ],
            },
            (RecommendationKind::ShortfallRisk, Language::En) => Text {
                title: "Significant income shortfall risk",
                description: "When the plan falls short, it misses the target income by more than 20% on average.",
                actions: &[
                    "Review your retirement income target",
                    "Boost your savings rate",
                    "Optimize your asset allocation",
                ],
            },
            (RecommendationKind::ShortfallRisk, Language::He) => Text {
                title: "סיכון משמעותי לפער בהכנסה",
                description: "כאשר התוכנית אינה עומדת ביעד, הפער הממוצע מההכנסה הרצויה עולה על 20%.",
                actions: &[
                    "בחן מחדש את יעד ההכנסה בפרישה",
                    "הגדל את שיעור החיסכון",
                    "בצע אופטימיזציה לתמהיל הנכסים",
                ],
            },
        }
    }

    pub fn recommendation(self, language: Language) -> Recommendation {
        let text = self.text(language);
        Recommendation {
            kind: self,
            priority: self.priority(),
            title: text.title.to_string(),
            description: text.description.to_string(),
            actions: text.actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Threshold-driven advice. Conditions are checked in a fixed order and
/// several may fire at once.
pub fn recommendations(
    statistics: &EnsembleStatistics,
    risk: &RiskMetrics,
    language: Language,
) -> Vec<Recommendation> {
    let checks = [
        (
            risk.success_probability < LOW_SUCCESS_THRESHOLD,
            RecommendationKind::LowSuccess,
        ),
        (
            risk.success_probability > HIGH_SUCCESS_THRESHOLD,
            RecommendationKind::HighSuccess,
        ),
        (
            statistics.drawdown.p90 > HIGH_DRAWDOWN_THRESHOLD,
            RecommendationKind::HighDrawdownRisk,
        ),
        (
            risk.average_shortfall > SHORTFALL_THRESHOLD,
            RecommendationKind::ShortfallRisk,
        ),
    ];

    checks
        .into_iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, kind)| kind.recommendation(language))
        .collect()
}
