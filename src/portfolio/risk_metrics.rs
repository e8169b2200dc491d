//! # Risk-Adjusted Metrics
//!
//! $$
//! S=\frac{\mu_p-r_f}{\sigma_p},\qquad
//! \mathrm{VaR}_\alpha = V - V\left(1+\mu_p h - z_\alpha \sigma_p\sqrt{h}\right)
//! $$
//!
//! Sharpe/Sortino/Treynor/Calmar ratios, parametric VaR and drawdown heuristics.
//! Returns and volatilities are percentages.

/// Downside deviation as a share of total volatility.
pub const DOWNSIDE_RATIO: f64 = 0.65;

/// Excess return over a risk measure. Zero risk yields ±∞, or 0 when there is no excess.
fn excess_ratio(excess: f64, risk: f64) -> f64 {
  if risk == 0.0 && excess == 0.0 {
    0.0
  } else {
    excess / risk
  }
}

/// Sharpe ratio.
#[must_use]
pub fn sharpe_ratio(ret: f64, volatility: f64, risk_free: f64) -> f64 {
  excess_ratio(ret - risk_free, volatility)
}

/// Sortino ratio using a downside-only risk measure.
#[must_use]
pub fn sortino_ratio(ret: f64, downside_deviation: f64, risk_free: f64) -> f64 {
  excess_ratio(ret - risk_free, downside_deviation)
}

/// Treynor ratio, excess return per unit of beta.
#[must_use]
pub fn treynor_ratio(ret: f64, beta: f64, risk_free: f64) -> f64 {
  excess_ratio(ret - risk_free, beta)
}

/// Calmar ratio, return per unit of estimated maximum drawdown.
#[must_use]
pub fn calmar_ratio(ret: f64, max_drawdown: f64) -> f64 {
  excess_ratio(ret, max_drawdown)
}

/// Heuristic downside deviation, a fixed share of total volatility.
#[must_use]
pub fn downside_deviation(volatility: f64) -> f64 {
  volatility * DOWNSIDE_RATIO
}

/// One-sided normal quantile for the supported confidence levels.
///
/// Only 99% selects 2.326; every other level falls back to the 95% quantile.
pub fn z_score(confidence: f64) -> f64 {
  if (confidence - 0.99).abs() < 1e-9 {
    2.326
  } else {
    1.645
  }
}

/// Parametric Value-at-Risk in currency units.
///
/// Negative when the worst case still ends above `value`.
#[must_use]
pub fn value_at_risk(
  value: f64,
  expected_return: f64,
  volatility: f64,
  confidence: f64,
  horizon_years: f64,
) -> f64 {
  let z = z_score(confidence);
  let ret = expected_return / 100.0 * horizon_years;
  let vol = volatility / 100.0 * horizon_years.sqrt();
  let worst_case_value = value * (1.0 + ret - z * vol);
  value - worst_case_value
}

/// Empirical maximum drawdown estimate in percent, `2σ√h`.
#[must_use]
pub fn max_drawdown_estimate(volatility: f64, horizon_years: f64) -> f64 {
  2.0 * volatility * horizon_years.sqrt()
}
