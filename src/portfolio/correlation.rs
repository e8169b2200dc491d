//! # Correlation Model
//!
//! $$
//! \rho_{ij} = \begin{cases} 1 & i=j \\ \rho(c_i, c_j) & i \ne j \end{cases},
//! \qquad \Sigma_{ij} = \sigma_i \sigma_j \rho_{ij}
//! $$
//!
//! Asset-class correlation lookup and matrix construction.

use ndarray::Array2;

use super::types::AssetAllocation;
use super::types::AssetClass;
use crate::error::PortfolioError;
use crate::error::Result;

/// Correlation assumed for any pair of classes missing from [`CORRELATION_TABLE`].
pub const DEFAULT_CORRELATION: f64 = 0.30;

/// Long-run correlations between asset classes, one entry per unordered pair.
pub const CORRELATION_TABLE: [(AssetClass, AssetClass, f64); 21] = [
  (AssetClass::Stocks, AssetClass::Stocks, 0.85),
  (AssetClass::Stocks, AssetClass::Bonds, -0.15),
  (AssetClass::Stocks, AssetClass::Commodities, 0.30),
  (AssetClass::Stocks, AssetClass::Reits, 0.70),
  (AssetClass::Stocks, AssetClass::Cash, 0.00),
  (AssetClass::Stocks, AssetClass::Alternatives, 0.50),
  (AssetClass::Bonds, AssetClass::Bonds, 0.90),
  (AssetClass::Bonds, AssetClass::Commodities, 0.00),
  (AssetClass::Bonds, AssetClass::Reits, 0.20),
  (AssetClass::Bonds, AssetClass::Cash, 0.30),
  (AssetClass::Bonds, AssetClass::Alternatives, 0.10),
  (AssetClass::Commodities, AssetClass::Commodities, 0.70),
  (AssetClass::Commodities, AssetClass::Reits, 0.30),
  (AssetClass::Commodities, AssetClass::Cash, 0.00),
  (AssetClass::Commodities, AssetClass::Alternatives, 0.40),
  (AssetClass::Reits, AssetClass::Reits, 0.80),
  (AssetClass::Reits, AssetClass::Cash, 0.00),
  (AssetClass::Reits, AssetClass::Alternatives, 0.40),
  (AssetClass::Cash, AssetClass::Cash, 0.95),
  (AssetClass::Cash, AssetClass::Alternatives, 0.00),
  (AssetClass::Alternatives, AssetClass::Alternatives, 0.60),
];

/// Correlation between two asset classes, looked up in either order.
pub fn class_correlation(a: AssetClass, b: AssetClass) -> f64 {
  CORRELATION_TABLE
    .iter()
    .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
    .map(|(_, _, rho)| *rho)
    .unwrap_or(DEFAULT_CORRELATION)
}

/// Build the n×n correlation matrix for `assets`, indexed by position.
pub fn build_correlation_matrix(assets: &[AssetAllocation]) -> Array2<f64> {
  let n = assets.len();
  let mut corr = Array2::from_elem((n, n), 1.0);

  for i in 0..n {
    for j in (i + 1)..n {
      let rho = class_correlation(assets[i].asset_class, assets[j].asset_class);
      corr[[i, j]] = rho;
      corr[[j, i]] = rho;
    }
  }

  corr
}

/// Build the covariance matrix (fractions) from per-asset standard deviations (percent).
///
/// `corr` must be n×n for n assets.
pub fn covariance_matrix(assets: &[AssetAllocation], corr: &Array2<f64>) -> Result<Array2<f64>> {
  let n = assets.len();
  if corr.dim() != (n, n) {
    return Err(PortfolioError::invalid_parameter(format!(
      "correlation matrix is {:?}, expected ({n}, {n})",
      corr.dim()
    )));
  }

  let sigmas: Vec<f64> = assets
    .iter()
    .map(|a| a.standard_deviation / 100.0)
    .collect();
  Ok(Array2::from_shape_fn((n, n), |(i, j)| {
    sigmas[i] * sigmas[j] * corr[[i, j]]
  }))
}
