use retire_sim_core::analytics::{aggregate, percentile_sorted, risk_metrics, summarize};
use retire_sim_core::simulation::SimulationInput;
use retire_sim_core::{Language, RunOptions, SimulationEngine};
use serde_json::json;

const SEED: u64 = 42;

fn ensemble(sims: u32) -> Vec<retire_sim_core::PathOutcome> {
    let inputs: SimulationInput = serde_json::from_value(json!({
        "currentAge": 45,
        "currentSavings": 300000,
        "currentRealEstate": 500000,
        "currentCrypto": 20000,
        "targetMonthlyIncome": 9000,
    }))
    .unwrap();
    let engine = SimulationEngine::default();
    let plan = inputs.normalize().unwrap().config;
    engine
        .simulate_paths(&plan, &RunOptions::new(30, sims), SEED)
        .unwrap()
}

#[test]
fn test_percentile_ordering_on_real_ensemble() {
    let stats = summarize(&ensemble(1000)).unwrap();
    for d in [&stats.portfolio, &stats.income, &stats.real_income] {
        assert!(d.min <= d.p10);
        assert!(d.p10 <= d.p25);
        assert!(d.p25 <= d.median);
        assert!(d.median <= d.p75);
        assert!(d.p75 <= d.p90);
        assert!(d.p90 <= d.max);
    }
    let dd = &stats.drawdown;
    assert!(dd.median <= dd.p75 && dd.p75 <= dd.p90 && dd.p90 <= dd.p95 && dd.p95 <= dd.max);
    assert!(dd.max <= 1.0);
}

#[test]
fn test_income_follows_four_percent_rule() {
    let outcomes = ensemble(200);
    let stats = summarize(&outcomes).unwrap();
    let expected = stats.portfolio.mean * 0.04 / 12.0;
    assert!((stats.income.mean - expected).abs() / expected < 1e-9);
    assert!(stats.real_income.mean < stats.income.mean);
}

#[test]
fn test_success_and_shortfall_are_complementary() {
    let risk = risk_metrics(&ensemble(500)).unwrap();
    assert_eq!(risk.success_probability + risk.shortfall_probability, 1.0);
    assert!(risk.value_at_risk_99 <= risk.value_at_risk_95);
}

#[test]
fn test_aggregation_is_idempotent() {
    let outcomes = ensemble(300);
    let a = aggregate(&outcomes, Language::En).unwrap();
    let b = aggregate(&outcomes, Language::En).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_yearly_bands_are_ordered() {
    let report = aggregate(&ensemble(300), Language::En).unwrap();
    assert_eq!(report.yearly_bands.len(), 30);
    for (i, band) in report.yearly_bands.iter().enumerate() {
        assert_eq!(band.year as usize, i + 1);
        assert!(band.p10 <= band.p50 && band.p50 <= band.p90);
        assert!(band.real_p10 <= band.real_p50 && band.real_p50 <= band.real_p90);
    }
}

#[test]
fn test_scenario_frequencies_sum_to_one() {
    let report = aggregate(&ensemble(300), Language::En).unwrap();
    let total: f64 = report.scenarios.values().map(|s| s.frequency).sum();
    assert!((total - 1.0).abs() < 1e-9);
    let occurrences: u64 = report.scenarios.values().map(|s| s.occurrences).sum();
    assert_eq!(occurrences, 300 * 30);
}

#[test]
fn test_expected_shortfall_is_mean_of_worst_tail() {
    let outcomes = ensemble(400);
    let risk = risk_metrics(&outcomes).unwrap();
    let mut incomes: Vec<f64> = outcomes.iter().map(|o| o.inflation_adjusted_income).collect();
    incomes.sort_by(|a, b| a.total_cmp(b));
    let worst = &incomes[..20];
    let expected = worst.iter().sum::<f64>() / 20.0;
    assert!((risk.expected_shortfall - expected).abs() < 1e-6);
    assert!(risk.expected_shortfall <= percentile_sorted(&incomes, 50.0));
}
