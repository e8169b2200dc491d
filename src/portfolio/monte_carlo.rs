//! # Monte Carlo Simulator
//!
//! $$
//! V_{t+1} = V_t\,(1 + \mu + \sigma Z_t),\qquad Z_t = \sqrt{-2\ln U_1}\cos(2\pi U_2)
//! $$
//!
//! Compounding annual-return paths with Box–Muller normals, order-statistic
//! percentiles and loss probability. Sequential sampling takes any [`Rng`];
//! parallel sampling splits paths into fixed chunks with per-chunk seeded generators.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Open01;
use rayon::prelude::*;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::error::ensure_finite;
use crate::error::PortfolioError;
use crate::error::Result;

/// Paths per parallel work unit. Fixed so results do not depend on thread count.
const PAR_CHUNK: usize = 256;

/// Tail share averaged by the expected shortfall.
const SHORTFALL_TAIL: f64 = 0.05;

/// Simulation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
  /// Number of independent paths.
  pub num_paths: usize,
  /// Seed for reproducible runs; `None` draws from system entropy.
  pub seed: Option<u64>,
  /// Upper bound on `num_paths × horizon_years`.
  pub max_path_steps: usize,
  /// Sample paths on the rayon pool.
  pub parallel: bool,
}

impl Default for MonteCarloConfig {
  fn default() -> Self {
    Self {
      num_paths: 1_000,
      seed: None,
      max_path_steps: 5_000_000,
      parallel: true,
    }
  }
}

impl MonteCarloConfig {
  /// Path count that keeps `paths × years` within [`Self::max_path_steps`].
  pub fn paths_within_budget(&self, horizon_years: u32) -> usize {
    if horizon_years == 0 {
      return self.num_paths;
    }
    let cap = (self.max_path_steps / horizon_years as usize).max(1);
    self.num_paths.min(cap)
  }
}

/// Distribution summary of simulated terminal values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
  pub percentile5: f64,
  pub percentile10: f64,
  pub percentile25: f64,
  pub percentile50: f64,
  pub percentile75: f64,
  pub percentile90: f64,
  pub percentile95: f64,
  /// Mean terminal value.
  pub expected_value: f64,
  /// Population standard deviation of terminal values.
  pub standard_deviation: f64,
  /// Mean of the worst 5% of terminal values.
  pub expected_shortfall: f64,
  /// Percent of paths ending below the initial value.
  pub probability_of_loss: f64,
}

/// One standard-normal variate from two uniforms via Box–Muller.
#[inline]
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
  let u1: f64 = rng.sample(Open01);
  let u2: f64 = rng.random();
  (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Terminal value of one path; `mu` and `sigma` are fractions.
#[inline]
fn simulate_path<R: Rng + ?Sized>(
  rng: &mut R,
  initial_value: f64,
  mu: f64,
  sigma: f64,
  horizon_years: u32,
) -> f64 {
  let mut value = initial_value;
  for _ in 0..horizon_years {
    let z = standard_normal(rng);
    value *= 1.0 + mu + sigma * z;
  }
  value
}

fn check_inputs(initial_value: f64, expected_return: f64, volatility: f64, num_paths: usize) -> Result<()> {
  ensure_finite(initial_value, "initial_value")?;
  ensure_finite(expected_return, "expected_return")?;
  ensure_finite(volatility, "volatility")?;
  if num_paths == 0 {
    return Err(PortfolioError::invalid_parameter(
      "Monte Carlo needs at least one path",
    ));
  }
  Ok(())
}

/// Simulate `num_paths` paths on the caller's generator.
///
/// `expected_return` and `volatility` are annual percentages.
pub fn simulate<R: Rng + ?Sized>(
  rng: &mut R,
  initial_value: f64,
  expected_return: f64,
  volatility: f64,
  horizon_years: u32,
  num_paths: usize,
) -> Result<MonteCarloResult> {
  check_inputs(initial_value, expected_return, volatility, num_paths)?;
  let mu = expected_return / 100.0;
  let sigma = volatility / 100.0;

  let outcomes: Vec<f64> = (0..num_paths)
    .map(|_| simulate_path(&mut *rng, initial_value, mu, sigma, horizon_years))
    .collect();

  summarize(outcomes, initial_value)
}

/// Simulate on the rayon pool. Output depends only on `seed`, not on thread count.
pub fn simulate_par(
  initial_value: f64,
  expected_return: f64,
  volatility: f64,
  horizon_years: u32,
  num_paths: usize,
  seed: u64,
) -> Result<MonteCarloResult> {
  check_inputs(initial_value, expected_return, volatility, num_paths)?;
  let mu = expected_return / 100.0;
  let sigma = volatility / 100.0;

  let mut outcomes = vec![0.0; num_paths];
  outcomes
    .par_chunks_mut(PAR_CHUNK)
    .enumerate()
    .for_each(|(chunk, out)| {
      let mut rng = StdRng::seed_from_u64(chunk_seed(seed, chunk));
      for v in out.iter_mut() {
        *v = simulate_path(&mut rng, initial_value, mu, sigma, horizon_years);
      }
    });

  summarize(outcomes, initial_value)
}

fn chunk_seed(seed: u64, chunk: usize) -> u64 {
  seed.wrapping_add((chunk as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

/// Order-statistic percentile `sorted[⌊p·n⌋]`, clamped to the last index.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
  let n = sorted.len();
  let idx = ((p * n as f64).floor() as usize).min(n.saturating_sub(1));
  sorted[idx]
}

/// Reduce terminal values to a [`MonteCarloResult`].
pub fn summarize(mut outcomes: Vec<f64>, initial_value: f64) -> Result<MonteCarloResult> {
  if outcomes.is_empty() {
    return Err(PortfolioError::invalid_parameter(
      "Monte Carlo needs at least one path",
    ));
  }
  outcomes.sort_by(|a, b| a.total_cmp(b));

  let n = outcomes.len() as f64;
  let mean = outcomes.iter().sum::<f64>() / n;
  let variance = outcomes.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
  let losses = outcomes.iter().filter(|&&v| v < initial_value).count();

  let tail = ((n * SHORTFALL_TAIL).ceil() as usize).clamp(1, outcomes.len());
  let expected_shortfall = outcomes[..tail].iter().sum::<f64>() / tail as f64;

  let result = MonteCarloResult {
    percentile5: percentile(&outcomes, 0.05),
    percentile10: percentile(&outcomes, 0.10),
    percentile25: percentile(&outcomes, 0.25),
    percentile50: percentile(&outcomes, 0.50),
    percentile75: percentile(&outcomes, 0.75),
    percentile90: percentile(&outcomes, 0.90),
    percentile95: percentile(&outcomes, 0.95),
    expected_value: mean,
    standard_deviation: variance.sqrt(),
    expected_shortfall,
    probability_of_loss: losses as f64 / n * 100.0,
  };
  debug!(
    paths = outcomes.len(),
    median = result.percentile50,
    probability_of_loss = result.probability_of_loss,
    "monte carlo summary"
  );

  Ok(result)
}
