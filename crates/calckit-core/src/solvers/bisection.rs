//! Bisection on a monotone function.

use tracing::debug;

use crate::error::CalcError;
use crate::solvers::{BisectionConfig, BisectionResult, Monotonicity, MAX_ITERATIONS};
use crate::CalcResult;

/// Which half of the bracket keeps the root after evaluating the midpoint.
#[inline]
fn root_above(value: f64, target: f64, monotonicity: Monotonicity) -> bool {
    match monotonicity {
        Monotonicity::Decreasing => value > target,
        Monotonicity::Increasing => value < target,
    }
}

/// Fixed-iteration bisection without any validation.
///
/// Halves `[config.low, config.high]` exactly `config.max_iterations` times
/// and returns the last midpoint. If the bracket does not contain the
/// target the loop still terminates, but the returned point is meaningless
/// and no error is signalled. NaN from `f` sends every step to the lower
/// half. Prefer [`bisect`] unless that behaviour is what you want.
pub fn bisect_unchecked<F>(target: f64, f: F, config: &BisectionConfig) -> f64
where
    F: Fn(f64) -> f64,
{
    let mut low = config.low;
    let mut high = config.high;
    let mut mid = (low + high) / 2.0;

    for _ in 0..config.max_iterations {
        mid = (low + high) / 2.0;
        if root_above(f(mid), target, config.monotonicity) {
            low = mid;
        } else {
            high = mid;
        }
    }

    mid
}

/// Validated bisection.
///
/// Checks that the bracket is well formed and actually contains `target`
/// before searching:
///
/// * decreasing `f`: `f(low) >= target >= f(high)`
/// * increasing `f`: `f(low) <= target <= f(high)`
///
/// A target equal to `f(low)` or `f(high)` returns that endpoint without
/// iterating. Otherwise runs exactly `max_iterations` halvings and returns
/// the midpoint of the final bracket, which lies within
/// [`BisectionConfig::error_bound`] of the root.
///
/// # Example
///
/// ```rust
/// use calckit_core::solvers::{bisect, BisectionConfig};
///
/// // 1 / (1 + r) = 0.8  =>  r = 0.25
/// let res = bisect(0.8, |r| 1.0 / (1.0 + r), &BisectionConfig::default()).unwrap();
/// assert!((res.estimate - 0.25).abs() < 1e-12);
/// ```
pub fn bisect<F>(target: f64, f: F, config: &BisectionConfig) -> CalcResult<BisectionResult>
where
    F: Fn(f64) -> f64,
{
    validate_config(target, config)?;

    let mut low = config.low;
    let mut high = config.high;
    let f_low = finite(f(low), "bisection lower bound")?;
    let f_high = finite(f(high), "bisection upper bound")?;

    if f_low == target {
        return Ok(endpoint(low, config, 0.0));
    }
    if f_high == target {
        return Ok(endpoint(high, config, 0.0));
    }

    let bracketed = match config.monotonicity {
        Monotonicity::Decreasing => f_low >= target && target >= f_high,
        Monotonicity::Increasing => f_low <= target && target <= f_high,
    };
    if !bracketed {
        return Err(CalcError::NoRootInBracket {
            low,
            high,
            price_low: f_low,
            price_high: f_high,
            target,
        });
    }

    debug!(
        target,
        low,
        high,
        max_iterations = config.max_iterations,
        "bisection start"
    );

    for _ in 0..config.max_iterations {
        let mid = (low + high) / 2.0;
        let value = finite(f(mid), "bisection midpoint")?;
        if root_above(value, target, config.monotonicity) {
            low = mid;
        } else {
            high = mid;
        }
    }

    let estimate = (low + high) / 2.0;
    let residual = finite(f(estimate), "bisection estimate")? - target;
    debug!(estimate, residual, "bisection done");

    Ok(BisectionResult {
        estimate,
        low,
        high,
        iterations: config.max_iterations,
        residual,
    })
}

fn validate_config(target: f64, config: &BisectionConfig) -> CalcResult<()> {
    if !target.is_finite() {
        return Err(CalcError::invalid("target", "Target must be a finite number"));
    }
    if !config.low.is_finite() || !config.high.is_finite() {
        return Err(CalcError::invalid(
            "bracket",
            "Bracket bounds must be finite numbers",
        ));
    }
    if config.max_iterations > MAX_ITERATIONS {
        return Err(CalcError::invalid(
            "max_iterations",
            format!("At most {MAX_ITERATIONS} iterations are allowed"),
        ));
    }
    if config.low >= config.high {
        return Err(CalcError::invalid(
            "bracket",
            format!(
                "Lower bound {} must be below upper bound {}",
                config.low, config.high
            ),
        ));
    }
    Ok(())
}

fn finite(value: f64, context: &str) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFiniteValue {
            context: context.to_string(),
            value,
        })
    }
}

fn endpoint(x: f64, config: &BisectionConfig, residual: f64) -> BisectionResult {
    debug!(estimate = x, "bisection target on bracket endpoint");
    BisectionResult {
        estimate: x,
        low: config.low,
        high: config.high,
        iterations: 0,
        residual,
    }
}
