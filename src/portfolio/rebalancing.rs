//! # Rebalancing Cost Model
//!
//! $$
//! C = c\,V\,k,\qquad
//! D = \begin{cases} -0.02\,\sigma V & k = 0 \\ 0.01\,\sigma V\,k/12 & k > 0 \end{cases},\qquad
//! B = D - C
//! $$
//!
//! Annual transaction-cost drag against allocation-drift benefit for a cadence of `k` rebalances a year.

use serde::Serialize;

use super::types::RebalanceFrequency;

/// Default cost of one rebalance as a fraction of portfolio value.
pub const DEFAULT_COST_RATE: f64 = 0.001;

/// Annual drag of never rebalancing, per unit of volatility.
const UNMANAGED_DRIFT_DRAG: f64 = 0.02;

/// Annual benefit of monthly rebalancing, per unit of volatility.
const MANAGED_DRIFT_BENEFIT: f64 = 0.01;

/// Annual cost/benefit of a rebalancing cadence, in currency units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalancingImpact {
  pub transaction_costs: f64,
  pub drift_impact: f64,
  pub net_benefit: f64,
}

/// Rebalancing impact with `volatility` in percent and the given cost rate.
pub fn rebalancing_impact_with_rate(
  frequency: RebalanceFrequency,
  portfolio_value: f64,
  volatility: f64,
  cost_rate: f64,
) -> RebalancingImpact {
  let per_year = frequency.per_year() as f64;
  let sigma = volatility / 100.0;
  let transaction_costs = portfolio_value * cost_rate * per_year;

  let drift_impact = match frequency {
    RebalanceFrequency::Never => -sigma * portfolio_value * UNMANAGED_DRIFT_DRAG,
    _ => sigma * portfolio_value * MANAGED_DRIFT_BENEFIT * per_year / 12.0,
  };

  RebalancingImpact {
    transaction_costs,
    drift_impact,
    net_benefit: drift_impact - transaction_costs,
  }
}

/// Rebalancing impact at the default 0.1% cost per rebalance.
pub fn rebalancing_impact(
  frequency: RebalanceFrequency,
  portfolio_value: f64,
  volatility: f64,
) -> RebalancingImpact {
  rebalancing_impact_with_rate(frequency, portfolio_value, volatility, DEFAULT_COST_RATE)
}
