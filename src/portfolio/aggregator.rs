//! # Return/Risk Aggregator
//!
//! $$
//! \mu_p=\sum_i w_i\mu_i,\qquad
//! \sigma_p=\sqrt{\sum_i\sum_j w_i w_j \sigma_i \sigma_j \rho_{ij}},\qquad
//! \alpha = \mu_p - \left(r_f + \beta_p (r_m - r_f)\right)
//! $$
//!
//! Weighted return, correlation-aware volatility and CAPM beta/alpha.

use ndarray::Array1;
use ndarray::Array2;

use super::correlation::build_correlation_matrix;
use super::correlation::covariance_matrix;
use super::types::AssetAllocation;
use super::types::AssetClass;
use crate::error::Result;

/// Beta assumed for asset classes without a table entry.
pub const DEFAULT_BETA: f64 = 0.5;

/// Market sensitivity of an asset class.
pub fn class_beta(class: AssetClass) -> f64 {
  match class {
    AssetClass::Stocks => 1.0,
    AssetClass::Bonds => 0.2,
    AssetClass::Commodities => 0.8,
    AssetClass::Reits => 0.9,
    AssetClass::Cash => 0.0,
    AssetClass::Alternatives => 0.6,
    AssetClass::Unknown => DEFAULT_BETA,
  }
}

fn weights(assets: &[AssetAllocation]) -> Array1<f64> {
  assets.iter().map(|a| a.allocation / 100.0).collect()
}

/// Allocation-weighted expected return, in percent.
pub fn expected_return(assets: &[AssetAllocation]) -> f64 {
  assets
    .iter()
    .map(|a| (a.allocation / 100.0) * (a.expected_return / 100.0))
    .sum::<f64>()
    * 100.0
}

/// Portfolio volatility in percent.
///
/// Uses the asset-class correlation model when `corr` is `None`. A supplied
/// `corr` must be n×n for n assets.
pub fn portfolio_volatility(
  assets: &[AssetAllocation],
  corr: Option<&Array2<f64>>,
) -> Result<f64> {
  let variance = portfolio_variance(assets, corr)?;
  Ok(variance.max(0.0).sqrt() * 100.0)
}

/// Portfolio variance as a fraction, `wᵀ Σ w`.
pub fn portfolio_variance(assets: &[AssetAllocation], corr: Option<&Array2<f64>>) -> Result<f64> {
  let cov = match corr {
    Some(corr) => covariance_matrix(assets, corr)?,
    None => covariance_matrix(assets, &build_correlation_matrix(assets))?,
  };
  let w = weights(assets);
  Ok(w.dot(&cov.dot(&w)))
}

/// Allocation-weighted beta from the per-class table.
pub fn portfolio_beta(assets: &[AssetAllocation]) -> f64 {
  assets
    .iter()
    .map(|a| (a.allocation / 100.0) * class_beta(a.asset_class))
    .sum()
}

/// Jensen's alpha in percent.
pub fn portfolio_alpha(portfolio_return: f64, beta: f64, market_return: f64, risk_free: f64) -> f64 {
  portfolio_return - (risk_free + beta * (market_return - risk_free))
}
