//! # mpt-risk
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Modern-Portfolio-Theory risk engine: correlation-aware volatility,
//! risk-adjusted ratios, parametric VaR, Monte Carlo projection of compounding
//! returns, risk-tier re-weighting and rebalancing cost analysis.

pub mod error;
pub mod portfolio;

pub use error::PortfolioError;
pub use error::Result;
pub use portfolio::PortfolioEngine;
pub use portfolio::PortfolioEngineConfig;
