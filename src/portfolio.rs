//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \sum_i \sum_j w_i w_j \sigma_i \sigma_j \rho_{ij}
//! $$
//!
//! Portfolio risk metrics, Monte Carlo projection and allocation suggestions.

pub mod aggregator;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod monte_carlo;
pub mod optimizer;
pub mod rebalancing;
pub mod risk_metrics;
pub mod types;

pub use aggregator::expected_return;
pub use aggregator::portfolio_alpha;
pub use aggregator::portfolio_beta;
pub use aggregator::portfolio_volatility;
pub use config::PortfolioEngineConfig;
pub use correlation::build_correlation_matrix;
pub use correlation::class_correlation;
pub use engine::PortfolioEngine;
pub use engine::PortfolioOutcome;
pub use monte_carlo::simulate;
pub use monte_carlo::simulate_par;
pub use monte_carlo::MonteCarloConfig;
pub use monte_carlo::MonteCarloResult;
pub use optimizer::optimize;
pub use optimizer::AllocationChange;
pub use rebalancing::rebalancing_impact;
pub use rebalancing::RebalancingImpact;
pub use risk_metrics::max_drawdown_estimate;
pub use risk_metrics::sharpe_ratio;
pub use risk_metrics::sortino_ratio;
pub use risk_metrics::value_at_risk;
pub use types::AssetAllocation;
pub use types::AssetClass;
pub use types::PortfolioInputs;
pub use types::PortfolioMetrics;
pub use types::PortfolioOutputs;
pub use types::RebalanceFrequency;
pub use types::RiskTolerance;
