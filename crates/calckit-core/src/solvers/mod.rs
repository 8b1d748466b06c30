//! Root finding for calculators that invert a monotone pricing function.
//!
//! - [`bisect`]: validated bisection, fails fast when the bracket does not
//!   contain the target
//! - [`bisect_unchecked`]: the bare fixed-iteration loop, no validation
//!
//! Both run exactly `max_iterations` halvings. There is no tolerance-based
//! early exit: with the default 100 iterations on [0, 1] the bracket width
//! ends far below f64 resolution.

mod bisection;

pub use bisection::{bisect, bisect_unchecked};

use serde::{Deserialize, Serialize};

/// Default lower bound of the search bracket (0%).
pub const DEFAULT_LOW: f64 = 0.0;

/// Default upper bound of the search bracket (100%).
pub const DEFAULT_HIGH: f64 = 1.0;

/// Default number of halvings.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Most halvings [`bisect`] will run. Past ~1100 the bracket of any f64
/// interval has already collapsed to a single point.
pub const MAX_ITERATIONS: u32 = 1_000;

/// Direction in which the function moves as its argument grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Monotonicity {
    /// Price falls as rate rises (bond pricing).
    #[default]
    Decreasing,
    /// Price rises with the argument (option price in volatility).
    Increasing,
}

/// Search bracket and iteration budget for [`bisect`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BisectionConfig {
    #[serde(default = "default_low")]
    pub low: f64,
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub monotonicity: Monotonicity,
}

fn default_low() -> f64 {
    DEFAULT_LOW
}

fn default_high() -> f64 {
    DEFAULT_HIGH
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            monotonicity: Monotonicity::Decreasing,
        }
    }
}

impl BisectionConfig {
    /// Creates a decreasing-function config over `[low, high]`.
    #[must_use]
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_monotonicity(mut self, monotonicity: Monotonicity) -> Self {
        self.monotonicity = monotonicity;
        self
    }

    /// Upper bound on the distance between the estimate and the true root.
    pub fn error_bound(&self) -> f64 {
        (self.high - self.low) / 2f64.powi(self.max_iterations.min(i32::MAX as u32) as i32)
    }
}

/// Outcome of a validated bisection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BisectionResult {
    /// Midpoint of the final bracket (or the matching endpoint).
    pub estimate: f64,
    /// Final bracket.
    pub low: f64,
    pub high: f64,
    /// Halvings performed; 0 when the target sat on an endpoint.
    pub iterations: u32,
    /// `f(estimate) - target`.
    pub residual: f64,
}
