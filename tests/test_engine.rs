//! End-to-end tests for the portfolio engine.

use mpt_risk::portfolio::value_at_risk;
use mpt_risk::portfolio::AssetAllocation;
use mpt_risk::portfolio::AssetClass;
use mpt_risk::portfolio::PortfolioInputs;
use mpt_risk::portfolio::RebalanceFrequency;
use mpt_risk::portfolio::RiskTolerance;
use mpt_risk::PortfolioEngine;
use mpt_risk::PortfolioEngineConfig;
use mpt_risk::PortfolioError;

fn asset(symbol: &str, allocation: f64, ret: f64, vol: f64, class: AssetClass) -> AssetAllocation {
  AssetAllocation::new(
    symbol.to_string(),
    symbol.to_string(),
    allocation,
    ret,
    vol,
    class,
  )
}

fn portfolio(assets: Vec<AssetAllocation>, years: u32, tolerance: RiskTolerance) -> PortfolioInputs {
  PortfolioInputs {
    assets,
    total_investment: 100_000.0,
    time_horizon: years,
    risk_tolerance: tolerance,
    rebalance_frequency: RebalanceFrequency::Quarterly,
    expected_inflation: 2.5,
    tax_rate: None,
  }
}

fn engine() -> PortfolioEngine {
  PortfolioEngine::new(PortfolioEngineConfig::default().with_seed(2024))
}

#[test]
fn balanced_sixty_forty() {
  let inputs = portfolio(
    vec![
      asset("VTI", 60.0, 9.0, 18.0, AssetClass::Stocks),
      asset("BND", 40.0, 4.0, 6.0, AssetClass::Bonds),
    ],
    10,
    RiskTolerance::Moderate,
  );
  let outcome = engine().calculate(&inputs).unwrap();
  let out = &outcome.outputs;

  assert!((out.expected_return - 7.0).abs() < 1e-9);
  assert!(out.volatility > 0.0);
  assert!(out.sharpe_ratio > 0.0);
  assert!(out.nominal_future_value > 100_000.0);
  assert!(out.real_future_value < out.nominal_future_value);
  assert!(out.monte_carlo_median > 0.0);
  assert!(out.monte_carlo_worst_case <= out.monte_carlo_median);
  assert!(out.monte_carlo_median <= out.monte_carlo_best_case);
  assert!(out.probability_of_loss > 0.0);
  assert!(out.probability_of_loss < 50.0);
  assert!(out.after_tax_future_value.is_none());
  assert!(outcome.explanation.contains("Portfolio expected return"));

  let suggested: f64 = out.optimized_portfolio.iter().map(|a| a.allocation).sum();
  assert!((suggested - 100.0).abs() < 0.01);
  assert_eq!(out.allocation_changes.len(), 2);
}

#[test]
fn conservative_bond_heavy() {
  let inputs = portfolio(
    vec![
      asset("BND", 70.0, 4.0, 6.0, AssetClass::Bonds),
      asset("VTI", 30.0, 9.0, 18.0, AssetClass::Stocks),
    ],
    10,
    RiskTolerance::Conservative,
  );
  let out = engine().calculate(&inputs).unwrap().outputs;

  assert!(out.expected_return < 7.0);
  assert!(out.volatility < 15.0);
  assert!(out.probability_of_loss < 30.0);
}

#[test]
fn aggressive_long_horizon() {
  let inputs = portfolio(
    vec![
      asset("VTI", 80.0, 10.0, 20.0, AssetClass::Stocks),
      asset("BND", 20.0, 4.0, 6.0, AssetClass::Bonds),
    ],
    30,
    RiskTolerance::Aggressive,
  );
  let out = engine().calculate(&inputs).unwrap().outputs;

  assert!(out.expected_return > 7.0);
  assert!(out.volatility > 12.0);
  assert!(out.portfolio_beta > 0.7);
}

#[test]
fn invalid_inputs_fail() {
  let mut inputs = portfolio(Vec::new(), 10, RiskTolerance::Moderate);
  inputs.total_investment = -1_000.0;
  let err = engine().calculate(&inputs).unwrap_err();
  assert!(matches!(err, PortfolioError::CalculationFailed(_)));
  assert!(err.to_string().starts_with("Portfolio calculation failed"));

  let mut negative = portfolio(
    vec![asset("VTI", 100.0, 9.0, 18.0, AssetClass::Stocks)],
    10,
    RiskTolerance::Moderate,
  );
  negative.total_investment = -1_000.0;
  assert!(engine().calculate(&negative).is_err());
}

#[test]
fn tax_rate_reduces_gains() {
  let mut inputs = portfolio(
    vec![
      asset("VTI", 60.0, 9.0, 18.0, AssetClass::Stocks),
      asset("BND", 40.0, 4.0, 6.0, AssetClass::Bonds),
    ],
    20,
    RiskTolerance::Moderate,
  );
  inputs.tax_rate = Some(15.0);
  let out = engine().calculate(&inputs).unwrap().outputs;

  let after_tax = out.after_tax_future_value.unwrap();
  assert!(after_tax < out.nominal_future_value);
  assert!(after_tax > 100_000.0);
}

#[test]
fn value_at_risk_is_sane() {
  let var = value_at_risk(100_000.0, 8.0, 15.0, 0.95, 1.0);
  assert!(var > 0.0);
  assert!(var < 50_000.0);
}

#[test]
fn serial_and_parallel_agree_on_shape() {
  let inputs = portfolio(
    vec![
      asset("VTI", 50.0, 9.0, 18.0, AssetClass::Stocks),
      asset("GLD", 25.0, 5.0, 15.0, AssetClass::Commodities),
      asset("BND", 25.0, 4.0, 6.0, AssetClass::Bonds),
    ],
    15,
    RiskTolerance::Moderate,
  );
  let mut serial = PortfolioEngineConfig::default().with_seed(5).with_paths(4_000);
  serial.monte_carlo.parallel = false;
  let parallel = PortfolioEngineConfig::default().with_seed(5).with_paths(4_000);

  let a = PortfolioEngine::new(serial).calculate(&inputs).unwrap();
  let b = PortfolioEngine::new(parallel).calculate(&inputs).unwrap();

  assert_eq!(a.metrics, b.metrics);
  let drift = (a.monte_carlo.expected_value - b.monte_carlo.expected_value).abs();
  assert!(drift / a.monte_carlo.expected_value < 0.05);
}

#[test]
fn json_in_json_out() {
  let json = r#"{
    "assets": [
      {"symbol": "VTI", "name": "Total Stock Market", "allocation": 60,
       "expectedReturn": 9.0, "standardDeviation": 18, "assetClass": "stocks"},
      {"symbol": "BTC", "name": "Bitcoin", "allocation": 40,
       "expectedReturn": 15.0, "standardDeviation": 60, "assetClass": "crypto"}
    ],
    "totalInvestment": 50000,
    "timeHorizon": 5,
    "riskTolerance": "aggressive",
    "rebalanceFrequency": "never",
    "expectedInflation": 2.0
  }"#;
  let inputs: PortfolioInputs = serde_json::from_str(json).unwrap();
  let outcome = engine().calculate(&inputs).unwrap();

  assert_eq!(outcome.outputs.rebalancing_cost, 0.0);
  assert!(outcome.outputs.rebalancing_benefit < 0.0);

  let value = serde_json::to_value(&outcome).unwrap();
  assert!(value["outputs"]["expectedReturn"].is_number());
  assert!(value["outputs"]["optimizedPortfolio"].is_array());
  assert!(value["intermediateSteps"]["monteCarlo"].is_string());
}

#[test]
fn zero_volatility_portfolio() {
  let inputs = portfolio(
    vec![
      asset("SPAXX", 50.0, 4.0, 0.0, AssetClass::Cash),
      asset("VMFXX", 50.0, 4.0, 0.0, AssetClass::Cash),
    ],
    10,
    RiskTolerance::Conservative,
  );
  let outcome = engine().calculate(&inputs).unwrap();
  let out = &outcome.outputs;

  assert_eq!(out.volatility, 0.0);
  assert_eq!(out.sharpe_ratio, f64::INFINITY);
  assert_eq!(out.sortino_ratio, f64::INFINITY);
  assert_eq!(out.treynor_ratio, f64::INFINITY);
  assert_eq!(out.probability_of_loss, 0.0);
  assert_eq!(out.monte_carlo_worst_case, out.monte_carlo_best_case);
  let gap = (out.monte_carlo_median - out.nominal_future_value).abs();
  assert!(gap / out.nominal_future_value < 1e-9);

  let value = serde_json::to_value(&outcome).unwrap();
  assert_eq!(value["outputs"]["sharpeRatio"], "Infinity");
  assert_eq!(value["metrics"]["treynorRatio"], "Infinity");
}

#[test]
fn single_asset_portfolio() {
  let inputs = portfolio(
    vec![asset("VTI", 100.0, 9.0, 18.0, AssetClass::Stocks)],
    10,
    RiskTolerance::Aggressive,
  );
  let out = engine().calculate(&inputs).unwrap().outputs;

  assert!((out.expected_return - 9.0).abs() < 1e-9);
  assert!((out.volatility - 18.0).abs() < 1e-9);
  assert!((out.portfolio_beta - 1.0).abs() < 1e-12);
  assert_eq!(out.optimized_portfolio.len(), 1);
  assert!((out.optimized_portfolio[0].allocation - 100.0).abs() < 1e-9);
}

#[test]
fn zero_horizon_keeps_initial_value() {
  let inputs = portfolio(
    vec![
      asset("VTI", 60.0, 9.0, 18.0, AssetClass::Stocks),
      asset("BND", 40.0, 4.0, 6.0, AssetClass::Bonds),
    ],
    0,
    RiskTolerance::Moderate,
  );
  let outcome = engine().calculate(&inputs).unwrap();
  let out = &outcome.outputs;
  let mc = &outcome.monte_carlo;

  assert_eq!(out.max_drawdown, 0.0);
  assert_eq!(out.calmar_ratio, f64::INFINITY);
  assert_eq!(out.nominal_future_value, 100_000.0);
  assert_eq!(out.real_future_value, 100_000.0);

  for v in [
    mc.percentile5,
    mc.percentile10,
    mc.percentile25,
    mc.percentile50,
    mc.percentile75,
    mc.percentile90,
    mc.percentile95,
    mc.expected_value,
    mc.expected_shortfall,
  ] {
    assert_eq!(v, 100_000.0);
  }
  assert_eq!(mc.standard_deviation, 0.0);
  assert_eq!(mc.probability_of_loss, 0.0);
  assert_eq!(outcome.intermediate_steps["monteCarlo"], "1000 paths × 0 years");
}
