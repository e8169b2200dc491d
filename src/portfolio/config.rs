//! # Engine Configuration
//!
//! $$
//! \theta = (r_f,\ r_m,\ \alpha_{\mathrm{VaR}},\ h_{\mathrm{VaR}},\ c,\ N)
//! $$
//!
//! Market assumptions and simulation settings for [`super::PortfolioEngine`].

use serde::Deserialize;
use serde::Serialize;

use super::monte_carlo::MonteCarloConfig;
use super::rebalancing::DEFAULT_COST_RATE;
use crate::error::ensure_finite;
use crate::error::PortfolioError;
use crate::error::Result;

/// Market assumptions and Monte Carlo settings shared by every [`super::PortfolioEngine`] call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioEngineConfig {
  /// Risk-free rate in percent, used by Sharpe, Sortino, Treynor and alpha.
  pub risk_free_rate: f64,
  /// Expected market return in percent, used by CAPM alpha.
  pub market_return: f64,
  /// VaR confidence level; 0.99 selects the 99% quantile, anything else 95%.
  pub var_confidence: f64,
  /// VaR horizon in years.
  pub var_horizon_years: f64,
  /// Cost of one rebalance as a fraction of portfolio value.
  pub transaction_cost_rate: f64,
  pub monte_carlo: MonteCarloConfig,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      risk_free_rate: 3.0,
      market_return: 10.0,
      var_confidence: 0.95,
      var_horizon_years: 1.0,
      transaction_cost_rate: DEFAULT_COST_RATE,
      monte_carlo: MonteCarloConfig::default(),
    }
  }
}

impl PortfolioEngineConfig {
  /// Parse a config from JSON; missing fields take their defaults.
  pub fn from_json_str(json: &str) -> Result<Self> {
    let config: Self = serde_json::from_str(json)
      .map_err(|e| PortfolioError::invalid_parameter(format!("config: {e}")))?;
    config.validate()?;
    Ok(config)
  }

  /// Fix the Monte Carlo seed.
  pub fn with_seed(mut self, seed: u64) -> Self {
    self.monte_carlo.seed = Some(seed);
    self
  }

  /// Set the number of Monte Carlo paths.
  pub fn with_paths(mut self, num_paths: usize) -> Self {
    self.monte_carlo.num_paths = num_paths;
    self
  }

  /// Reject settings no calculation can run with.
  pub fn validate(&self) -> Result<()> {
    ensure_finite(self.risk_free_rate, "config.risk_free_rate")?;
    ensure_finite(self.market_return, "config.market_return")?;
    ensure_finite(self.var_confidence, "config.var_confidence")?;
    ensure_finite(self.var_horizon_years, "config.var_horizon_years")?;
    ensure_finite(self.transaction_cost_rate, "config.transaction_cost_rate")?;

    if self.var_confidence <= 0.0 || self.var_confidence >= 1.0 {
      return Err(PortfolioError::invalid_parameter(
        "var_confidence must lie in (0, 1)",
      ));
    }
    if self.var_horizon_years < 0.0 {
      return Err(PortfolioError::invalid_parameter(
        "var_horizon_years must be non-negative",
      ));
    }
    if self.transaction_cost_rate < 0.0 {
      return Err(PortfolioError::invalid_parameter(
        "transaction_cost_rate must be non-negative",
      ));
    }
    if self.monte_carlo.num_paths == 0 || self.monte_carlo.max_path_steps == 0 {
      return Err(PortfolioError::invalid_parameter(
        "Monte Carlo needs at least one path",
      ));
    }
    Ok(())
  }
}
