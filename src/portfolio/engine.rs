//! # Portfolio Engine
//!
//! $$
//! \text{inputs} \xrightarrow{\ \mu_p,\sigma_p,\beta\ } \text{metrics}
//! \xrightarrow{\ \text{MC}\ } \text{outcomes}
//! \xrightarrow{\ \text{optimize, rebalance}\ } \text{result}
//! $$
//!
//! Orchestration of the aggregator, risk metrics, Monte Carlo, optimizer and
//! rebalancing model into one flat result. Risk figures always use the
//! caller's allocation; the optimized allocation is a suggestion only.

use std::collections::BTreeMap;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::aggregator::expected_return;
use super::aggregator::portfolio_alpha;
use super::aggregator::portfolio_beta;
use super::aggregator::portfolio_volatility;
use super::config::PortfolioEngineConfig;
use super::correlation::build_correlation_matrix;
use super::monte_carlo::simulate;
use super::monte_carlo::simulate_par;
use super::monte_carlo::MonteCarloResult;
use super::optimizer::allocation_changes;
use super::optimizer::optimize;
use super::rebalancing::rebalancing_impact_with_rate;
use super::rebalancing::RebalancingImpact;
use super::risk_metrics::calmar_ratio;
use super::risk_metrics::downside_deviation;
use super::risk_metrics::max_drawdown_estimate;
use super::risk_metrics::sharpe_ratio;
use super::risk_metrics::sortino_ratio;
use super::risk_metrics::treynor_ratio;
use super::risk_metrics::value_at_risk;
use super::types::AssetAllocation;
use super::types::PortfolioInputs;
use super::types::PortfolioMetrics;
use super::types::PortfolioOutputs;
use crate::error::ensure_finite;
use crate::error::PortfolioError;
use crate::error::Result;

/// Allowed deviation of the allocation total from 100.
pub const ALLOCATION_TOLERANCE: f64 = 0.01;

/// Everything one calculation produces.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOutcome {
  pub outputs: PortfolioOutputs,
  pub metrics: PortfolioMetrics,
  pub monte_carlo: MonteCarloResult,
  pub rebalancing: RebalancingImpact,
  /// Human-readable summary.
  pub explanation: String,
  /// Labelled intermediate values, formatted for display.
  pub intermediate_steps: BTreeMap<String, String>,
}

/// Compound `principal` at `rate` percent a year for `years`.
pub fn future_value(principal: f64, rate: f64, years: f64) -> f64 {
  principal * (1.0 + rate / 100.0).powf(years)
}

/// Deflate a nominal value by `inflation` percent a year over `years`.
pub fn real_value(nominal: f64, inflation: f64, years: f64) -> f64 {
  nominal / (1.0 + inflation / 100.0).powf(years)
}

/// Nominal value after tax at `tax_rate` percent on gains above `invested`.
pub fn after_tax_value(nominal: f64, invested: f64, tax_rate: f64) -> f64 {
  nominal - (nominal - invested).max(0.0) * tax_rate / 100.0
}

fn validate_inputs(inputs: &PortfolioInputs) -> Result<()> {
  if inputs.assets.is_empty() {
    return Err(PortfolioError::EmptyPortfolio);
  }
  for (i, a) in inputs.assets.iter().enumerate() {
    ensure_finite(a.allocation, format!("assets[{i}].allocation"))?;
    ensure_finite(a.expected_return, format!("assets[{i}].expectedReturn"))?;
    ensure_finite(a.standard_deviation, format!("assets[{i}].standardDeviation"))?;
  }
  ensure_finite(inputs.total_investment, "totalInvestment")?;
  if inputs.total_investment <= 0.0 {
    return Err(PortfolioError::invalid_parameter(
      "totalInvestment must be positive",
    ));
  }
  ensure_finite(inputs.expected_inflation, "expectedInflation")?;
  if let Some(rate) = inputs.tax_rate {
    ensure_finite(rate, "taxRate")?;
  }
  Ok(())
}

/// Orchestrates the portfolio stages over one set of inputs.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Engine using the given market assumptions and simulation settings.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Current market assumptions and simulation settings.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  /// Run a full calculation.
  ///
  /// Randomness comes from the configured seed, or system entropy when unset.
  pub fn calculate(&self, inputs: &PortfolioInputs) -> Result<PortfolioOutcome> {
    let mc = &self.config.monte_carlo;
    match (mc.parallel, mc.seed) {
      (true, seed) => {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        self.run(inputs, |value, ret, vol, years, paths| {
          simulate_par(value, ret, vol, years, paths, seed)
        })
      }
      (false, Some(seed)) => self.calculate_with_rng(inputs, &mut StdRng::seed_from_u64(seed)),
      (false, None) => self.calculate_with_rng(inputs, &mut rand::rng()),
    }
  }

  /// Run a full calculation drawing Monte Carlo samples from `rng`.
  pub fn calculate_with_rng<R: Rng + ?Sized>(
    &self,
    inputs: &PortfolioInputs,
    rng: &mut R,
  ) -> Result<PortfolioOutcome> {
    self.run(inputs, |value, ret, vol, years, paths| {
      simulate(rng, value, ret, vol, years, paths)
    })
  }

  /// Risk and return figures of `assets` for the given investment and horizon.
  ///
  /// Fails when `corr` is not n×n for n assets.
  pub fn metrics(
    &self,
    assets: &[AssetAllocation],
    corr: &Array2<f64>,
    total_investment: f64,
    horizon_years: u32,
  ) -> Result<PortfolioMetrics> {
    let rf = self.config.risk_free_rate;
    let ret = expected_return(assets);
    let volatility = portfolio_volatility(assets, Some(corr))?;
    let beta = portfolio_beta(assets);
    let max_drawdown = max_drawdown_estimate(volatility, horizon_years as f64);

    Ok(PortfolioMetrics {
      expected_return: ret,
      volatility,
      sharpe_ratio: sharpe_ratio(ret, volatility, rf),
      sortino_ratio: sortino_ratio(ret, downside_deviation(volatility), rf),
      treynor_ratio: treynor_ratio(ret, beta, rf),
      calmar_ratio: calmar_ratio(ret, max_drawdown),
      value_at_risk: value_at_risk(
        total_investment,
        ret,
        volatility,
        self.config.var_confidence,
        self.config.var_horizon_years,
      ),
      max_drawdown,
      beta,
      alpha: portfolio_alpha(ret, beta, self.config.market_return, rf),
    })
  }

  fn run<F>(&self, inputs: &PortfolioInputs, sample: F) -> Result<PortfolioOutcome>
  where
    F: FnOnce(f64, f64, f64, u32, usize) -> Result<MonteCarloResult>,
  {
    self.evaluate(inputs, sample).map_err(|e| {
      error!(error = %e, "portfolio calculation failed");
      e.wrap()
    })
  }

  fn evaluate<F>(&self, inputs: &PortfolioInputs, sample: F) -> Result<PortfolioOutcome>
  where
    F: FnOnce(f64, f64, f64, u32, usize) -> Result<MonteCarloResult>,
  {
    self.config.validate()?;
    validate_inputs(inputs)?;

    let assets = &inputs.assets;
    let allocated: f64 = assets.iter().map(|a| a.allocation).sum();
    if (allocated - 100.0).abs() > ALLOCATION_TOLERANCE {
      warn!(allocated, "asset allocations do not sum to 100");
    }

    let corr = build_correlation_matrix(assets);
    let metrics = self.metrics(assets, &corr, inputs.total_investment, inputs.time_horizon)?;
    debug!(
      expected_return = metrics.expected_return,
      volatility = metrics.volatility,
      beta = metrics.beta,
      "aggregated portfolio risk"
    );

    let requested = self.config.monte_carlo.num_paths;
    let paths = self.config.monte_carlo.paths_within_budget(inputs.time_horizon);
    if paths < requested {
      warn!(requested, paths, "Monte Carlo path count capped by path-step budget");
    }
    let monte_carlo = sample(
      inputs.total_investment,
      metrics.expected_return,
      metrics.volatility,
      inputs.time_horizon,
      paths,
    )?;

    let optimized = optimize(assets, inputs.risk_tolerance);
    let changes = allocation_changes(assets, &optimized);
    let rebalancing = rebalancing_impact_with_rate(
      inputs.rebalance_frequency,
      inputs.total_investment,
      metrics.volatility,
      self.config.transaction_cost_rate,
    );

    let years = inputs.time_horizon as f64;
    let nominal = future_value(inputs.total_investment, metrics.expected_return, years);
    let real = real_value(nominal, inputs.expected_inflation, years);
    let after_tax = inputs
      .tax_rate
      .map(|rate| after_tax_value(nominal, inputs.total_investment, rate));

    let outputs = PortfolioOutputs {
      expected_return: metrics.expected_return,
      volatility: metrics.volatility,
      sharpe_ratio: metrics.sharpe_ratio,
      sortino_ratio: metrics.sortino_ratio,
      treynor_ratio: metrics.treynor_ratio,
      calmar_ratio: metrics.calmar_ratio,
      value_at_risk: metrics.value_at_risk,
      max_drawdown: metrics.max_drawdown,
      portfolio_beta: metrics.beta,
      portfolio_alpha: metrics.alpha,
      nominal_future_value: nominal,
      real_future_value: real,
      after_tax_future_value: after_tax,
      monte_carlo_median: monte_carlo.percentile50,
      monte_carlo_worst_case: monte_carlo.percentile10,
      monte_carlo_best_case: monte_carlo.percentile90,
      monte_carlo_expected_shortfall: monte_carlo.expected_shortfall,
      probability_of_loss: monte_carlo.probability_of_loss,
      optimized_portfolio: optimized,
      allocation_changes: changes,
      rebalancing_cost: rebalancing.transaction_costs,
      rebalancing_benefit: rebalancing.net_benefit,
    };

    let explanation = self.explain(inputs, &outputs);
    let intermediate_steps = self.intermediate_steps(inputs, &metrics, paths, &rebalancing);
    info!(
      assets = assets.len(),
      horizon = inputs.time_horizon,
      expected_return = outputs.expected_return,
      volatility = outputs.volatility,
      probability_of_loss = outputs.probability_of_loss,
      "portfolio calculation complete"
    );

    Ok(PortfolioOutcome {
      outputs,
      metrics,
      monte_carlo,
      rebalancing,
      explanation,
      intermediate_steps,
    })
  }

  fn explain(&self, inputs: &PortfolioInputs, out: &PortfolioOutputs) -> String {
    let mut text = format!(
      "Portfolio expected return is {:.2}% with {:.2}% annual volatility (Sharpe ratio {:.2}, beta {:.2}). ",
      out.expected_return, out.volatility, out.sharpe_ratio, out.portfolio_beta
    );
    text.push_str(&format!(
      "Over {} years ${:.2} grows to ${:.2} nominal, or ${:.2} after {:.2}% inflation. ",
      inputs.time_horizon,
      inputs.total_investment,
      out.nominal_future_value,
      out.real_future_value,
      inputs.expected_inflation
    ));
    if let (Some(value), Some(rate)) = (out.after_tax_future_value, inputs.tax_rate) {
      text.push_str(&format!("After {rate:.2}% tax on gains: ${value:.2}. "));
    }
    text.push_str(&format!(
      "Monte Carlo simulation gives a median outcome of ${:.2} (10th percentile ${:.2}, 90th percentile ${:.2}) and a {:.1}% probability of loss. ",
      out.monte_carlo_median,
      out.monte_carlo_worst_case,
      out.monte_carlo_best_case,
      out.probability_of_loss
    ));
    text.push_str(&format!(
      "At {:.0}% confidence the one-period value at risk is ${:.2}. ",
      self.config.var_confidence * 100.0,
      out.value_at_risk
    ));
    text.push_str(&format!(
      "Rebalancing {} costs ${:.2} a year for a net benefit of ${:.2}; the {} allocation suggestion is listed separately.",
      inputs.rebalance_frequency, out.rebalancing_cost, out.rebalancing_benefit, inputs.risk_tolerance
    ));
    text
  }

  fn intermediate_steps(
    &self,
    inputs: &PortfolioInputs,
    metrics: &PortfolioMetrics,
    paths: usize,
    rebalancing: &RebalancingImpact,
  ) -> BTreeMap<String, String> {
    let rf = self.config.risk_free_rate;
    let mut steps = BTreeMap::new();
    steps.insert(
      "weightedReturn".to_string(),
      format!("Σ wᵢ·μᵢ = {:.2}%", metrics.expected_return),
    );
    steps.insert(
      "portfolioVolatility".to_string(),
      format!("√(wᵀΣw) = {:.2}%", metrics.volatility),
    );
    steps.insert(
      "portfolioBeta".to_string(),
      format!("Σ wᵢ·βᵢ = {:.3}", metrics.beta),
    );
    steps.insert(
      "sharpeRatio".to_string(),
      format!(
        "({:.2}% − {:.2}%) / {:.2}% = {:.3}",
        metrics.expected_return, rf, metrics.volatility, metrics.sharpe_ratio
      ),
    );
    steps.insert(
      "valueAtRisk".to_string(),
      format!(
        "{:.0}% over {} year(s) = ${:.2}",
        self.config.var_confidence * 100.0,
        self.config.var_horizon_years,
        metrics.value_at_risk
      ),
    );
    steps.insert(
      "nominalGrowth".to_string(),
      format!(
        "${:.2} × (1 + {:.2}%)^{}",
        inputs.total_investment, metrics.expected_return, inputs.time_horizon
      ),
    );
    steps.insert(
      "inflationAdjustment".to_string(),
      format!(
        "÷ (1 + {:.2}%)^{}",
        inputs.expected_inflation, inputs.time_horizon
      ),
    );
    steps.insert(
      "monteCarlo".to_string(),
      format!("{paths} paths × {} years", inputs.time_horizon),
    );
    steps.insert(
      "rebalancing".to_string(),
      format!(
        "{} × {:.2}% × ${:.2} = ${:.2}",
        inputs.rebalance_frequency.per_year(),
        self.config.transaction_cost_rate * 100.0,
        inputs.total_investment,
        rebalancing.transaction_costs
      ),
    );
    steps
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;
  use crate::portfolio::types::AssetClass;
  use crate::portfolio::types::RebalanceFrequency;
  use crate::portfolio::types::RiskTolerance;

  fn inputs() -> PortfolioInputs {
    PortfolioInputs {
      assets: vec![
        AssetAllocation::new(
          "VTI".to_string(),
          "Total Stock Market".to_string(),
          60.0,
          9.0,
          18.0,
          AssetClass::Stocks,
        ),
        AssetAllocation::new(
          "BND".to_string(),
          "Total Bond Market".to_string(),
          40.0,
          4.0,
          6.0,
          AssetClass::Bonds,
        ),
      ],
      total_investment: 100_000.0,
      time_horizon: 20,
      risk_tolerance: RiskTolerance::Moderate,
      rebalance_frequency: RebalanceFrequency::Quarterly,
      expected_inflation: 2.5,
      tax_rate: None,
    }
  }

  fn engine() -> PortfolioEngine {
    PortfolioEngine::new(PortfolioEngineConfig::default().with_seed(7))
  }

  #[test]
  fn growth_helpers() {
    assert_abs_diff_eq!(future_value(100.0, 10.0, 2.0), 121.0, epsilon = 1e-9);
    assert_abs_diff_eq!(real_value(121.0, 10.0, 2.0), 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(after_tax_value(150.0, 100.0, 20.0), 140.0, epsilon = 1e-9);
    assert_abs_diff_eq!(after_tax_value(90.0, 100.0, 20.0), 90.0, epsilon = 1e-9);
  }

  #[test]
  fn metrics_use_configured_rates() {
    let engine = PortfolioEngine::new(PortfolioEngineConfig {
      risk_free_rate: 1.0,
      ..PortfolioEngineConfig::default()
    });
    let assets = inputs().assets;
    let corr = build_correlation_matrix(&assets);
    let m = engine.metrics(&assets, &corr, 100_000.0, 4).unwrap();

    assert_abs_diff_eq!(m.sharpe_ratio, 6.0 / m.volatility, epsilon = 1e-12);
    assert_abs_diff_eq!(m.max_drawdown, 4.0 * m.volatility, epsilon = 1e-12);
    assert_abs_diff_eq!(m.sortino_ratio, 6.0 / (0.65 * m.volatility), epsilon = 1e-12);
  }

  #[test]
  fn metrics_reject_mismatched_correlation() {
    let assets = inputs().assets;
    let corr = Array2::from_elem((3, 3), 0.5);
    let err = engine().metrics(&assets, &corr, 100_000.0, 4).unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidParameter { .. }));
  }

  #[test]
  fn seeded_engine_is_reproducible() {
    let a = engine().calculate(&inputs()).unwrap();
    let b = engine().calculate(&inputs()).unwrap();
    assert_eq!(a.outputs, b.outputs);
    assert_eq!(a.explanation, b.explanation);
  }

  #[test]
  fn caller_rng_drives_simulation() {
    let engine = PortfolioEngine::default();
    let a = engine
      .calculate_with_rng(&inputs(), &mut StdRng::seed_from_u64(1))
      .unwrap();
    let b = engine
      .calculate_with_rng(&inputs(), &mut StdRng::seed_from_u64(1))
      .unwrap();
    assert_eq!(a.monte_carlo, b.monte_carlo);
  }

  #[test]
  fn steps_are_labelled() {
    let outcome = engine().calculate(&inputs()).unwrap();
    for key in [
      "weightedReturn",
      "portfolioVolatility",
      "sharpeRatio",
      "valueAtRisk",
      "monteCarlo",
      "rebalancing",
    ] {
      assert!(outcome.intermediate_steps.contains_key(key), "missing {key}");
    }
    assert_eq!(outcome.intermediate_steps["monteCarlo"], "1000 paths × 20 years");
  }

  #[test]
  fn empty_portfolio_is_wrapped() {
    let mut bad = inputs();
    bad.assets.clear();
    let err = engine().calculate(&bad).unwrap_err();
    assert_eq!(
      err,
      PortfolioError::CalculationFailed(Box::new(PortfolioError::EmptyPortfolio))
    );
  }

  #[test]
  fn non_finite_input_names_the_field() {
    let mut bad = inputs();
    bad.assets[1].standard_deviation = f64::NAN;
    let err = engine().calculate(&bad).unwrap_err();
    assert!(err.to_string().contains("assets[1].standardDeviation"));
  }

  #[test]
  #[traced_test]
  fn warns_when_allocations_drift_from_100() {
    let mut skewed = inputs();
    skewed.assets[0].allocation = 70.0;
    assert!(engine().calculate(&skewed).is_ok());
    assert!(logs_contain("asset allocations do not sum to 100"));
  }

  #[test]
  #[traced_test]
  fn warns_when_budget_caps_paths() {
    let mut config = PortfolioEngineConfig::default().with_seed(1).with_paths(500);
    config.monte_carlo.max_path_steps = 2_000;
    let outcome = PortfolioEngine::new(config).calculate(&inputs()).unwrap();
    assert_eq!(outcome.intermediate_steps["monteCarlo"], "100 paths × 20 years");
    assert!(logs_contain("Monte Carlo path count capped"));
  }
}
