use std::fs;

use anyhow::Context;
use anyhow::Result;
use mpt_risk::portfolio::AssetAllocation;
use mpt_risk::portfolio::AssetClass;
use mpt_risk::portfolio::PortfolioInputs;
use mpt_risk::portfolio::RebalanceFrequency;
use mpt_risk::portfolio::RiskTolerance;
use mpt_risk::PortfolioEngine;
use mpt_risk::PortfolioEngineConfig;
use prettytable::row;
use prettytable::Table;
use tracing_subscriber::EnvFilter;

// Usage: mpt-risk [inputs.json] [config.json]
fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let mut args = std::env::args().skip(1);
  let inputs = match args.next() {
    Some(path) => read_inputs(&path)?,
    None => sample_inputs(),
  };
  let config = match args.next() {
    Some(path) => {
      let json = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
      PortfolioEngineConfig::from_json_str(&json)?
    }
    None => PortfolioEngineConfig::default(),
  };

  let outcome = PortfolioEngine::new(config).calculate(&inputs)?;
  let out = &outcome.outputs;

  let mut summary = Table::new();
  summary.add_row(row!["Metric", "Value"]);
  summary.add_row(row!["Expected return", format!("{:.2}%", out.expected_return)]);
  summary.add_row(row!["Volatility", format!("{:.2}%", out.volatility)]);
  summary.add_row(row!["Sharpe ratio", format!("{:.3}", out.sharpe_ratio)]);
  summary.add_row(row!["Sortino ratio", format!("{:.3}", out.sortino_ratio)]);
  summary.add_row(row!["Treynor ratio", format!("{:.3}", out.treynor_ratio)]);
  summary.add_row(row!["Calmar ratio", format!("{:.3}", out.calmar_ratio)]);
  summary.add_row(row!["Value at risk", format!("{:.2}", out.value_at_risk)]);
  summary.add_row(row!["Max drawdown (est.)", format!("{:.2}%", out.max_drawdown)]);
  summary.add_row(row!["Beta", format!("{:.3}", out.portfolio_beta)]);
  summary.add_row(row!["Alpha", format!("{:.2}%", out.portfolio_alpha)]);
  summary.add_row(row!["Nominal future value", format!("{:.2}", out.nominal_future_value)]);
  summary.add_row(row!["Real future value", format!("{:.2}", out.real_future_value)]);
  if let Some(value) = out.after_tax_future_value {
    summary.add_row(row!["After-tax future value", format!("{value:.2}")]);
  }
  summary.add_row(row!["MC median", format!("{:.2}", out.monte_carlo_median)]);
  summary.add_row(row!["MC P10", format!("{:.2}", out.monte_carlo_worst_case)]);
  summary.add_row(row!["MC P90", format!("{:.2}", out.monte_carlo_best_case)]);
  summary.add_row(row!["Probability of loss", format!("{:.1}%", out.probability_of_loss)]);
  summary.add_row(row!["Rebalancing cost", format!("{:.2}", out.rebalancing_cost)]);
  summary.add_row(row!["Rebalancing benefit", format!("{:.2}", out.rebalancing_benefit)]);
  summary.printstd();

  let mut allocation = Table::new();
  allocation.add_row(row!["Symbol", "Current", "Suggested", "Change"]);
  for change in &out.allocation_changes {
    allocation.add_row(row![
      change.symbol,
      format!("{:.2}", change.current_weight),
      format!("{:.2}", change.target_weight),
      format!("{:+.2}", change.weight_change)
    ]);
  }
  allocation.printstd();

  println!("\n{}", outcome.explanation);
  Ok(())
}

fn read_inputs(path: &str) -> Result<PortfolioInputs> {
  let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
  serde_json::from_str(&json).with_context(|| format!("parsing {path}"))
}

fn sample_inputs() -> PortfolioInputs {
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
    tax_rate: Some(15.0),
  }
}
