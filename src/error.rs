//! # Errors
//!
//! $$
//! \text{calculate}: \text{PortfolioInputs} \to \text{Outcome} \;\cup\; \text{PortfolioError}
//! $$
//!
//! Error taxonomy for the portfolio engine.

use thiserror::Error;

/// Result type alias for portfolio engine operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;

/// Errors raised by the portfolio engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  /// No assets were supplied.
  #[error("portfolio must contain at least one asset")]
  EmptyPortfolio,

  /// A numeric input was NaN or infinite.
  #[error("non-finite value in {field}")]
  NonFinite { field: String },

  /// A parameter is outside the domain the engine can work with.
  #[error("invalid parameter: {message}")]
  InvalidParameter { message: String },

  /// Any stage failure, wrapped by the orchestrator.
  #[error("Portfolio calculation failed: {0}")]
  CalculationFailed(Box<PortfolioError>),
}

impl PortfolioError {
  /// Create a non-finite value error.
  pub fn non_finite(field: impl Into<String>) -> Self {
    Self::NonFinite {
      field: field.into(),
    }
  }

  /// Create an invalid parameter error.
  pub fn invalid_parameter(message: impl Into<String>) -> Self {
    Self::InvalidParameter {
      message: message.into(),
    }
  }

  /// Wrap a stage error with orchestrator context. Already wrapped errors are kept as-is.
  pub fn wrap(self) -> Self {
    match self {
      Self::CalculationFailed(_) => self,
      other => Self::CalculationFailed(Box::new(other)),
    }
  }
}

/// Fail with [`PortfolioError::NonFinite`] when `value` is NaN or infinite.
pub(crate) fn ensure_finite(value: f64, field: impl Into<String>) -> Result<f64> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(PortfolioError::non_finite(field))
  }
}
