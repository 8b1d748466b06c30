use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::classify::{classify, Band};
use crate::error::CalcError;
use crate::solvers::{bisect, BisectionConfig, Monotonicity};
use crate::types::{
    require_finite, require_positive, with_metadata, ComputationOutput, Percent, Precision,
};
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Abramowitz & Stegun 26.2.17 coefficients.
const AS_P: f64 = 0.231_641_9;
const AS_B: [f64; 5] = [
    0.319_381_530,
    -0.356_563_782,
    1.781_477_937,
    -1.821_255_978,
    1.330_274_429,
];

/// 1 / sqrt(2 pi)
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Default implied volatility search range, as decimals (0.01% .. 500%).
const IV_LOW: f64 = 0.0001;
const IV_HIGH: f64 = 5.0;

/// Spot / strike bands for calls. Puts swap the outer labels.
const CALL_MONEYNESS: [Band; 2] = [Band::new(0.98, "OTM"), Band::new(1.02, "ATM")];
const PUT_MONEYNESS: [Band; 2] = [Band::new(0.98, "ITM"), Band::new(1.02, "ATM")];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

/// European option on a dividend-paying underlying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionInput {
    pub kind: OptionKind,
    pub spot: f64,
    pub strike: f64,
    /// Time to expiry in years.
    pub years: f64,
    /// Continuously compounded risk-free rate, percent.
    pub risk_free_rate: Percent,
    /// Annualised volatility, percent.
    pub volatility: Percent,
    /// Continuous dividend yield, percent.
    #[serde(default)]
    pub dividend_yield: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionOutput {
    pub price: f64,
    pub d1: f64,
    pub d2: f64,
    pub delta: f64,
    pub intrinsic_value: f64,
    pub time_value: f64,
    /// "ITM", "ATM" or "OTM".
    pub moneyness: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpliedVolInput {
    pub kind: OptionKind,
    pub spot: f64,
    pub strike: f64,
    pub years: f64,
    pub risk_free_rate: Percent,
    #[serde(default)]
    pub dividend_yield: Percent,
    /// Observed option premium.
    pub market_price: f64,
    /// Volatility bracket as decimals. Monotonicity is always increasing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<BisectionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpliedVolOutput {
    /// Implied volatility, percent.
    pub volatility: Percent,
    pub model_price: f64,
    pub iterations: u32,
}

// ---------------------------------------------------------------------------
// Normal distribution
// ---------------------------------------------------------------------------

/// Standard normal density.
pub fn norm_pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF, polynomial approximation (absolute error < 7.5e-8).
pub fn norm_cdf(x: f64) -> f64 {
    if x < 0.0 {
        return 1.0 - norm_cdf(-x);
    }
    let t = 1.0 / (1.0 + AS_P * x);
    let poly = AS_B.iter().rev().fold(0.0, |acc, b| acc * t + b) * t;
    1.0 - norm_pdf(x) * poly
}

// ---------------------------------------------------------------------------
// Black-Scholes core
// ---------------------------------------------------------------------------

struct Terms {
    spot: f64,
    strike: f64,
    years: f64,
    rate: f64,
    div: f64,
}

impl Terms {
    fn d1_d2(&self, sigma: f64) -> (f64, f64) {
        let vol_sqrt_t = sigma * self.years.sqrt();
        let d1 = ((self.spot / self.strike).ln()
            + (self.rate - self.div + 0.5 * sigma * sigma) * self.years)
            / vol_sqrt_t;
        (d1, d1 - vol_sqrt_t)
    }

    fn price(&self, kind: OptionKind, sigma: f64) -> f64 {
        let (d1, d2) = self.d1_d2(sigma);
        let df_s = self.spot * (-self.div * self.years).exp();
        let df_k = self.strike * (-self.rate * self.years).exp();
        match kind {
            OptionKind::Call => df_s * norm_cdf(d1) - df_k * norm_cdf(d2),
            OptionKind::Put => df_k * norm_cdf(-d2) - df_s * norm_cdf(-d1),
        }
    }

    fn delta(&self, kind: OptionKind, d1: f64) -> f64 {
        let carry = (-self.div * self.years).exp();
        match kind {
            OptionKind::Call => carry * norm_cdf(d1),
            OptionKind::Put => carry * (norm_cdf(d1) - 1.0),
        }
    }

    fn intrinsic(&self, kind: OptionKind) -> f64 {
        match kind {
            OptionKind::Call => (self.spot - self.strike).max(0.0),
            OptionKind::Put => (self.strike - self.spot).max(0.0),
        }
    }
}

fn terms(
    spot: f64,
    strike: f64,
    years: f64,
    risk_free_rate: Percent,
    dividend_yield: Percent,
) -> CalcResult<Terms> {
    require_positive("spot", spot)?;
    require_positive("strike", strike)?;
    require_positive("years", years)?;
    require_finite("risk_free_rate", risk_free_rate)?;
    require_finite("dividend_yield", dividend_yield)?;
    Ok(Terms {
        spot,
        strike,
        years,
        rate: risk_free_rate / 100.0,
        div: dividend_yield / 100.0,
    })
}

fn moneyness(kind: OptionKind, spot: f64, strike: f64) -> &'static str {
    let ratio = spot / strike;
    match kind {
        OptionKind::Call => classify(ratio, &CALL_MONEYNESS, "ITM"),
        OptionKind::Put => classify(ratio, &PUT_MONEYNESS, "OTM"),
    }
}

// ---------------------------------------------------------------------------
// Public API — Option price
// ---------------------------------------------------------------------------

/// Black-Scholes-Merton price and delta of a European option.
pub fn price_option(input: &OptionInput) -> CalcResult<ComputationOutput<OptionOutput>> {
    let start = Instant::now();

    let t = terms(
        input.spot,
        input.strike,
        input.years,
        input.risk_free_rate,
        input.dividend_yield,
    )?;
    require_positive("volatility", input.volatility)?;
    let sigma = input.volatility / 100.0;

    let (d1, d2) = t.d1_d2(sigma);
    let price = t.price(input.kind, sigma);
    let intrinsic_value = t.intrinsic(input.kind);

    let output = OptionOutput {
        price,
        d1,
        d2,
        delta: t.delta(input.kind, d1),
        intrinsic_value,
        time_value: price - intrinsic_value,
        moneyness: moneyness(input.kind, input.spot, input.strike).to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "model": "Black-Scholes-Merton",
        "exercise": "European",
        "normal_cdf": "Abramowitz-Stegun 26.2.17",
        "compounding": "continuous",
    });

    Ok(with_metadata(
        "Black-Scholes option price",
        &assumptions,
        Vec::new(),
        elapsed,
        Precision::Float64,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Public API — Implied volatility
// ---------------------------------------------------------------------------

/// Volatility that reproduces `market_price` under Black-Scholes.
///
/// Option value rises with volatility, so the search runs bisection on an
/// increasing function over [0.01%, 500%] unless `solver` says otherwise.
pub fn implied_volatility(
    input: &ImpliedVolInput,
) -> CalcResult<ComputationOutput<ImpliedVolOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let t = terms(
        input.spot,
        input.strike,
        input.years,
        input.risk_free_rate,
        input.dividend_yield,
    )?;
    require_positive("market_price", input.market_price)?;

    let config = input
        .solver
        .unwrap_or_else(|| BisectionConfig::new(IV_LOW, IV_HIGH))
        .with_monotonicity(Monotonicity::Increasing);
    if config.low <= 0.0 {
        return Err(CalcError::invalid(
            "solver.low",
            "Volatility bracket must start above zero",
        ));
    }

    let intrinsic = t.intrinsic(input.kind);
    if input.market_price < intrinsic {
        warnings.push(format!(
            "Market price {} is below intrinsic value {intrinsic:.4}",
            input.market_price
        ));
    }

    let solved = bisect(input.market_price, |s| t.price(input.kind, s), &config)?;

    let output = ImpliedVolOutput {
        volatility: solved.estimate * 100.0,
        model_price: t.price(input.kind, solved.estimate),
        iterations: solved.iterations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "model": "Black-Scholes-Merton",
        "solver": "bisection",
        "bracket_volatility": [config.low, config.high],
        "max_iterations": config.max_iterations,
    });

    Ok(with_metadata(
        "Implied volatility (bisection on Black-Scholes price)",
        &assumptions,
        warnings,
        elapsed,
        Precision::Float64,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn atm_call() -> OptionInput {
        OptionInput {
            kind: OptionKind::Call,
            spot: 100.0,
            strike: 100.0,
            years: 1.0,
            risk_free_rate: 5.0,
            volatility: 20.0,
            dividend_yield: 0.0,
        }
    }

    #[test]
    fn test_norm_cdf_reference_points() {
        assert_abs_diff_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(norm_cdf(1.0), 0.841_344_746, epsilon = 1e-7);
        assert_abs_diff_eq!(norm_cdf(-1.96), 0.024_997_895, epsilon = 1e-7);
    }

    #[test]
    fn test_call_textbook_value() {
        // Hull: S=K=100, r=5%, sigma=20%, T=1 => C ~ 10.4506
        let out = price_option(&atm_call()).unwrap();
        assert_abs_diff_eq!(out.result.price, 10.4506, epsilon = 1e-3);
        assert_eq!(out.result.moneyness, "ATM");
    }

    #[test]
    fn test_put_call_parity() {
        let call = price_option(&atm_call()).unwrap().result.price;
        let mut put_in = atm_call();
        put_in.kind = OptionKind::Put;
        let put = price_option(&put_in).unwrap().result.price;
        // C - P = S - K e^{-rT}
        let parity = 100.0 - 100.0 * (-0.05f64).exp();
        assert_abs_diff_eq!(call - put, parity, epsilon = 1e-6);
    }

    #[test]
    fn test_moneyness_labels() {
        assert_eq!(moneyness(OptionKind::Call, 120.0, 100.0), "ITM");
        assert_eq!(moneyness(OptionKind::Call, 80.0, 100.0), "OTM");
        assert_eq!(moneyness(OptionKind::Put, 80.0, 100.0), "ITM");
        assert_eq!(moneyness(OptionKind::Put, 120.0, 100.0), "OTM");
    }

    #[test]
    fn test_implied_vol_round_trip() {
        let price = price_option(&atm_call()).unwrap().result.price;
        let input = ImpliedVolInput {
            kind: OptionKind::Call,
            spot: 100.0,
            strike: 100.0,
            years: 1.0,
            risk_free_rate: 5.0,
            dividend_yield: 0.0,
            market_price: price,
            solver: None,
        };
        let out = implied_volatility(&input).unwrap();
        assert_abs_diff_eq!(out.result.volatility, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_implied_vol_unreachable_price() {
        // A call can never be worth more than the spot.
        let input = ImpliedVolInput {
            kind: OptionKind::Call,
            spot: 100.0,
            strike: 100.0,
            years: 1.0,
            risk_free_rate: 5.0,
            dividend_yield: 0.0,
            market_price: 150.0,
            solver: None,
        };
        assert!(matches!(
            implied_volatility(&input),
            Err(CalcError::NoRootInBracket { .. })
        ));
    }

    #[test]
    fn test_price_option_rejects_zero_vol() {
        let mut input = atm_call();
        input.volatility = 0.0;
        assert!(matches!(
            price_option(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }
}
