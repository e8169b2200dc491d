//! # Portfolio Types
//!
//! $$
//! \sum_i w_i = 100,\qquad \mu_p = \sum_i \frac{w_i}{100}\,\mu_i
//! $$
//!
//! Input records, asset-class enums and the flat output record.

use std::fmt::Display;

use impl_new_derive::ImplNew;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;

use super::optimizer::AllocationChange;

/// Asset-class bucket driving correlation, beta and optimizer defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
  Stocks,
  Bonds,
  Commodities,
  Reits,
  Cash,
  Alternatives,
  /// Any class the lookup tables do not know about.
  #[serde(other)]
  Unknown,
}

impl Display for AssetClass {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AssetClass::Stocks => write!(f, "stocks"),
      AssetClass::Bonds => write!(f, "bonds"),
      AssetClass::Commodities => write!(f, "commodities"),
      AssetClass::Reits => write!(f, "reits"),
      AssetClass::Cash => write!(f, "cash"),
      AssetClass::Alternatives => write!(f, "alternatives"),
      AssetClass::Unknown => write!(f, "unknown"),
    }
  }
}

/// Investor risk tier.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
  Conservative,
  #[default]
  Moderate,
  Aggressive,
}

impl Display for RiskTolerance {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RiskTolerance::Conservative => write!(f, "conservative"),
      RiskTolerance::Moderate => write!(f, "moderate"),
      RiskTolerance::Aggressive => write!(f, "aggressive"),
    }
  }
}

/// How often the portfolio is traded back to target.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
  Monthly,
  #[default]
  Quarterly,
  Annually,
  Never,
}

impl RebalanceFrequency {
  /// Number of rebalances per year.
  pub fn per_year(&self) -> u32 {
    match self {
      RebalanceFrequency::Monthly => 12,
      RebalanceFrequency::Quarterly => 4,
      RebalanceFrequency::Annually => 1,
      RebalanceFrequency::Never => 0,
    }
  }
}

impl Display for RebalanceFrequency {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RebalanceFrequency::Monthly => write!(f, "monthly"),
      RebalanceFrequency::Quarterly => write!(f, "quarterly"),
      RebalanceFrequency::Annually => write!(f, "annually"),
      RebalanceFrequency::Never => write!(f, "never"),
    }
  }
}

/// One holding of the portfolio. All figures are percentages.
#[derive(ImplNew, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
  /// Ticker symbol
  pub symbol: String,
  /// Display name
  pub name: String,
  /// Share of the portfolio, 0..=100
  pub allocation: f64,
  /// Expected annual return in percent
  pub expected_return: f64,
  /// Annual standard deviation in percent
  pub standard_deviation: f64,
  /// Asset class bucket
  pub asset_class: AssetClass,
}

/// Validated inputs for one engine invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInputs {
  pub assets: Vec<AssetAllocation>,
  /// Initial capital.
  pub total_investment: f64,
  /// Investment horizon in whole years.
  pub time_horizon: u32,
  pub risk_tolerance: RiskTolerance,
  pub rebalance_frequency: RebalanceFrequency,
  /// Expected annual inflation in percent.
  pub expected_inflation: f64,
  /// Tax rate on gains in percent.
  #[serde(default)]
  pub tax_rate: Option<f64>,
}

/// Write a ratio as a JSON number, or as `"Infinity"`, `"-Infinity"` or `"NaN"`
/// when it has no finite value.
fn serialize_ratio<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
  if value.is_finite() {
    serializer.serialize_f64(*value)
  } else if value.is_nan() {
    serializer.serialize_str("NaN")
  } else if value.is_sign_positive() {
    serializer.serialize_str("Infinity")
  } else {
    serializer.serialize_str("-Infinity")
  }
}

/// Risk and return figures of a portfolio. Percent units unless noted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
  pub expected_return: f64,
  pub volatility: f64,
  /// Dimensionless.
  #[serde(serialize_with = "serialize_ratio")]
  pub sharpe_ratio: f64,
  /// Dimensionless.
  #[serde(serialize_with = "serialize_ratio")]
  pub sortino_ratio: f64,
  /// Dimensionless.
  #[serde(serialize_with = "serialize_ratio")]
  pub treynor_ratio: f64,
  /// Dimensionless.
  #[serde(serialize_with = "serialize_ratio")]
  pub calmar_ratio: f64,
  /// Currency units.
  pub value_at_risk: f64,
  pub max_drawdown: f64,
  /// Dimensionless.
  pub beta: f64,
  pub alpha: f64,
}

/// Flat result record handed to the display layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioOutputs {
  pub expected_return: f64,
  pub volatility: f64,
  /// Ratios are written as `"Infinity"`/`"-Infinity"` when unbounded.
  #[serde(serialize_with = "serialize_ratio")]
  pub sharpe_ratio: f64,
  #[serde(serialize_with = "serialize_ratio")]
  pub sortino_ratio: f64,
  #[serde(serialize_with = "serialize_ratio")]
  pub treynor_ratio: f64,
  #[serde(serialize_with = "serialize_ratio")]
  pub calmar_ratio: f64,
  pub value_at_risk: f64,
  pub max_drawdown: f64,
  pub portfolio_beta: f64,
  pub portfolio_alpha: f64,
  pub nominal_future_value: f64,
  pub real_future_value: f64,
  /// Present only when a tax rate was supplied.
  pub after_tax_future_value: Option<f64>,
  pub monte_carlo_median: f64,
  /// 10th percentile outcome.
  pub monte_carlo_worst_case: f64,
  /// 90th percentile outcome.
  pub monte_carlo_best_case: f64,
  pub monte_carlo_expected_shortfall: f64,
  /// Percent of simulated paths ending below the initial investment.
  pub probability_of_loss: f64,
  pub optimized_portfolio: Vec<AssetAllocation>,
  pub allocation_changes: Vec<AllocationChange>,
  pub rebalancing_cost: f64,
  pub rebalancing_benefit: f64,
}
