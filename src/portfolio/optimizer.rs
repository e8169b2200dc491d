//! # Allocation Optimizer
//!
//! $$
//! w_i' = T_{b(i)} \cdot \frac{w_i}{\sum_{j:\,b(j)=b(i)} w_j},\qquad
//! w_i^\* = 100\,\frac{w_i'}{\sum_k w_k'}
//! $$
//!
//! Risk-tier re-weighting. Each asset's class bucket (stocks, bonds, or
//! everything else as alternatives) receives the tier's target weight, split
//! among the bucket's assets by their current within-bucket share. This is a
//! heuristic, not a mean-variance solve.

use serde::Serialize;
use tracing::debug;

use super::types::AssetAllocation;
use super::types::AssetClass;
use super::types::RiskTolerance;

/// Class bucket used by the re-weighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationBucket {
  Stocks,
  Bonds,
  Alternatives,
}

impl From<AssetClass> for AllocationBucket {
  fn from(class: AssetClass) -> Self {
    match class {
      AssetClass::Stocks => AllocationBucket::Stocks,
      AssetClass::Bonds => AllocationBucket::Bonds,
      _ => AllocationBucket::Alternatives,
    }
  }
}

/// Target macro allocation of a risk tier, in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierTarget {
  pub stocks: f64,
  pub bonds: f64,
  pub alternatives: f64,
}

impl TierTarget {
  pub const CONSERVATIVE: Self = Self {
    stocks: 30.0,
    bonds: 60.0,
    alternatives: 10.0,
  };
  pub const MODERATE: Self = Self {
    stocks: 60.0,
    bonds: 30.0,
    alternatives: 10.0,
  };
  pub const AGGRESSIVE: Self = Self {
    stocks: 80.0,
    bonds: 10.0,
    alternatives: 10.0,
  };

  pub fn for_tolerance(tolerance: RiskTolerance) -> Self {
    match tolerance {
      RiskTolerance::Conservative => Self::CONSERVATIVE,
      RiskTolerance::Moderate => Self::MODERATE,
      RiskTolerance::Aggressive => Self::AGGRESSIVE,
    }
  }

  pub fn weight(&self, bucket: AllocationBucket) -> f64 {
    match bucket {
      AllocationBucket::Stocks => self.stocks,
      AllocationBucket::Bonds => self.bonds,
      AllocationBucket::Alternatives => self.alternatives,
    }
  }
}

/// Suggested move for one asset.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationChange {
  pub symbol: String,
  pub current_weight: f64,
  pub target_weight: f64,
  pub weight_change: f64,
}

fn bucket_total(assets: &[AssetAllocation], bucket: AllocationBucket) -> f64 {
  assets
    .iter()
    .filter(|a| AllocationBucket::from(a.asset_class) == bucket)
    .map(|a| a.allocation)
    .sum()
}

/// Re-weight `assets` toward the tier target; allocations sum to 100.
///
/// A bucket whose assets all hold zero weight gets nothing. If every asset
/// ends at zero the weight is split evenly.
pub fn optimize(assets: &[AssetAllocation], tolerance: RiskTolerance) -> Vec<AssetAllocation> {
  if assets.is_empty() {
    return Vec::new();
  }

  let target = TierTarget::for_tolerance(tolerance);
  let raw: Vec<f64> = assets
    .iter()
    .map(|a| {
      let bucket = AllocationBucket::from(a.asset_class);
      let total = bucket_total(assets, bucket);
      if total > 0.0 {
        target.weight(bucket) * (a.allocation / total)
      } else {
        0.0
      }
    })
    .collect();

  let sum: f64 = raw.iter().sum();
  let weights: Vec<f64> = if sum > 0.0 && sum.is_finite() {
    raw.iter().map(|w| w / sum * 100.0).collect()
  } else {
    vec![100.0 / assets.len() as f64; assets.len()]
  };
  debug!(%tolerance, raw_total = sum, "re-weighted allocation");

  assets
    .iter()
    .zip(weights)
    .map(|(a, allocation)| AssetAllocation {
      allocation,
      ..a.clone()
    })
    .collect()
}

/// Per-asset difference between the current and suggested allocation.
pub fn allocation_changes(
  current: &[AssetAllocation],
  target: &[AssetAllocation],
) -> Vec<AllocationChange> {
  current
    .iter()
    .zip(target)
    .map(|(c, t)| AllocationChange {
      symbol: c.symbol.clone(),
      current_weight: c.allocation,
      target_weight: t.allocation,
      weight_change: t.allocation - c.allocation,
    })
    .collect()
}
