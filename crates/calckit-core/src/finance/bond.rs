use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::classify::premium_or_discount;
use crate::error::CalcError;
use crate::finance::interest::MAX_PERIODS;
use crate::solvers::{bisect, BisectionConfig, Monotonicity};
use crate::types::{
    require_finite, require_positive, with_metadata, ComputationOutput, Percent, Precision,
};
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prices within this distance of face value are reported as "par".
const PAR_TOLERANCE: f64 = 1e-6;

/// Total periods closer than this to an integer are treated as whole.
const WHOLE_PERIOD_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Input / Output types — Yield to Maturity
// ---------------------------------------------------------------------------

/// Fixed-coupon bond as entered on the YTM form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondParams {
    /// Face (par) value repaid at maturity.
    pub face_value: f64,
    /// Annual coupon rate in percent (5.0 = 5%).
    pub coupon_rate: Percent,
    /// Coupon payments per year.
    pub periods_per_year: u32,
    /// Years remaining until maturity.
    pub years_to_maturity: f64,
    /// Current market price.
    pub current_price: f64,
    /// Search bracket over the annual rate as a decimal. Defaults to [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<BisectionConfig>,
}

/// Output of the YTM solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldToMaturityOutput {
    /// Annual yield to maturity in percent.
    pub rate: Percent,
    /// Yield per coupon period in percent.
    pub periodic_rate: Percent,
    /// (1 + periodic)^periods_per_year - 1, in percent.
    pub effective_annual_rate: Percent,
    /// Annual coupon / current price, in percent.
    pub current_yield: Percent,
    /// Model price at the solved yield.
    pub price_at_yield: f64,
    /// Bisection halvings performed.
    pub iterations: u32,
    /// "premium", "discount" or "par".
    pub classification: String,
}

// ---------------------------------------------------------------------------
// Input / Output types — Bond Price
// ---------------------------------------------------------------------------

/// Forward pricing at a known yield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceInput {
    pub face_value: f64,
    /// Annual coupon rate in percent.
    pub coupon_rate: Percent,
    pub periods_per_year: u32,
    pub years_to_maturity: f64,
    /// Annual discount rate in percent.
    pub annual_rate: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondPriceOutput {
    pub price: f64,
    pub periodic_coupon: f64,
    pub total_periods: f64,
    /// Price relative to face value: "premium", "discount" or "par".
    pub classification: String,
}

// ---------------------------------------------------------------------------
// Pricing function
// ---------------------------------------------------------------------------

/// Present value of a fixed-coupon bond at `annual_rate` (decimal, 0.05 = 5%).
///
/// `c = coupon/100 * face / ppy`, `y = annual_rate / ppy`, `n = years * ppy`;
/// price is the sum of `c / (1+y)^t` for whole periods `t = 1..=floor(n)`
/// plus `face / (1+y)^n`.
///
/// Strictly decreasing in `annual_rate` while `y > -1` and the face value is
/// positive. No validation: `y = -1` divides by zero and bad parameters come
/// back as NaN or infinity.
pub fn bond_price(
    face_value: f64,
    coupon_rate: Percent,
    periods_per_year: u32,
    years_to_maturity: f64,
    annual_rate: f64,
) -> f64 {
    let ppy = f64::from(periods_per_year);
    let coupon = coupon_rate / 100.0 * face_value / ppy;
    let y = annual_rate / ppy;
    let n = years_to_maturity * ppy;
    let one_plus_y = 1.0 + y;

    let whole_periods = whole_periods(n);
    let mut price = 0.0;
    let mut discount = 1.0;
    for _ in 0..whole_periods {
        discount *= one_plus_y;
        price += coupon / discount;
    }

    price + face_value / one_plus_y.powf(n)
}

/// Number of full coupon periods in `n`, absorbing float noise like 9.999999999.
fn whole_periods(n: f64) -> u64 {
    if !n.is_finite() || n <= 0.0 {
        return 0;
    }
    let rounded = n.round();
    if (n - rounded).abs() < WHOLE_PERIOD_EPS {
        rounded as u64
    } else {
        n.floor() as u64
    }
}

// ---------------------------------------------------------------------------
// Public API — Yield to Maturity
// ---------------------------------------------------------------------------

/// Solve for the annual yield that prices the bond at `current_price`.
///
/// Inverts [`bond_price`] by bisection over the annual rate. The bracket
/// defaults to [0%, 100%]; a price that needs a yield outside it (for
/// example a negative yield) fails with `NoRootInBracket` instead of
/// returning a wrong number. Widen `solver` to search elsewhere.
pub fn compute_yield_to_maturity(
    params: &BondParams,
) -> CalcResult<ComputationOutput<YieldToMaturityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_bond_params(params)?;

    let config = params.solver.unwrap_or_default();
    validate_solver(&config, params.periods_per_year)?;

    let n = params.years_to_maturity * f64::from(params.periods_per_year);
    if !is_whole(n) {
        warnings.push(format!(
            "{n} coupon periods is not a whole number; the final partial period pays no coupon"
        ));
    }

    let price_fn = |rate: f64| {
        bond_price(
            params.face_value,
            params.coupon_rate,
            params.periods_per_year,
            params.years_to_maturity,
            rate,
        )
    };
    let solved = bisect(params.current_price, price_fn, &config)?;

    let ppy = f64::from(params.periods_per_year);
    let periodic = solved.estimate / ppy;
    let annual_coupon = params.coupon_rate / 100.0 * params.face_value;

    if solved.estimate < 0.0 {
        warnings.push("Negative yield: price exceeds the undiscounted cash flows".into());
    }

    let output = YieldToMaturityOutput {
        rate: solved.estimate * 100.0,
        periodic_rate: periodic * 100.0,
        effective_annual_rate: ((1.0 + periodic).powf(ppy) - 1.0) * 100.0,
        current_yield: annual_coupon / params.current_price * 100.0,
        price_at_yield: price_fn(solved.estimate),
        iterations: solved.iterations,
        classification: premium_or_discount(
            params.current_price,
            params.face_value,
            PAR_TOLERANCE,
        )
        .to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": "bisection",
        "bracket_annual_rate": [config.low, config.high],
        "max_iterations": config.max_iterations,
        "error_bound": config.error_bound(),
        "compounding": "periodic, at coupon frequency",
    });

    Ok(with_metadata(
        "Yield to Maturity (bisection on discounted cash flows)",
        &assumptions,
        warnings,
        elapsed,
        Precision::Float64,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Public API — Bond Price
// ---------------------------------------------------------------------------

/// Price a bond at a known annual yield.
pub fn compute_bond_price(
    input: &BondPriceInput,
) -> CalcResult<ComputationOutput<BondPriceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_terms(
        input.face_value,
        input.coupon_rate,
        input.periods_per_year,
        input.years_to_maturity,
    )?;
    require_finite("annual_rate", input.annual_rate)?;

    let ppy = f64::from(input.periods_per_year);
    let rate = input.annual_rate / 100.0;
    if rate / ppy <= -1.0 {
        return Err(CalcError::invalid(
            "annual_rate",
            "Periodic rate must be greater than -100%",
        ));
    }

    let total_periods = input.years_to_maturity * ppy;
    if !is_whole(total_periods) {
        warnings.push(format!(
            "{total_periods} coupon periods is not a whole number; the final partial period pays no coupon"
        ));
    }

    let price = bond_price(
        input.face_value,
        input.coupon_rate,
        input.periods_per_year,
        input.years_to_maturity,
        rate,
    );
    if !price.is_finite() {
        return Err(CalcError::NonFiniteValue {
            context: "bond price".into(),
            value: price,
        });
    }

    let output = BondPriceOutput {
        price,
        periodic_coupon: input.coupon_rate / 100.0 * input.face_value / ppy,
        total_periods,
        classification: premium_or_discount(price, input.face_value, PAR_TOLERANCE).to_string(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounding": "periodic, at coupon frequency",
        "price_type": "dirty",
    });

    Ok(with_metadata(
        "Bond Price (discounted cash flows)",
        &assumptions,
        warnings,
        elapsed,
        Precision::Float64,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Domain checks run before the pricing function is ever evaluated.
pub fn validate_bond_params(params: &BondParams) -> CalcResult<()> {
    validate_terms(
        params.face_value,
        params.coupon_rate,
        params.periods_per_year,
        params.years_to_maturity,
    )?;
    require_positive("current_price", params.current_price)?;
    Ok(())
}

fn validate_terms(
    face_value: f64,
    coupon_rate: f64,
    periods_per_year: u32,
    years_to_maturity: f64,
) -> CalcResult<()> {
    require_positive("face_value", face_value)?;
    require_finite("coupon_rate", coupon_rate)?;
    if coupon_rate < 0.0 {
        return Err(CalcError::invalid(
            "coupon_rate",
            "Coupon rate cannot be negative",
        ));
    }
    if periods_per_year == 0 {
        return Err(CalcError::invalid(
            "periods_per_year",
            "Periods per year must be at least 1",
        ));
    }
    require_positive("years_to_maturity", years_to_maturity)?;
    let n = years_to_maturity * f64::from(periods_per_year);
    if n > MAX_PERIODS as f64 {
        return Err(CalcError::invalid(
            "years_to_maturity",
            format!("{n} coupon periods exceeds the limit of {MAX_PERIODS}"),
        ));
    }
    Ok(())
}

fn validate_solver(config: &BisectionConfig, periods_per_year: u32) -> CalcResult<()> {
    if config.monotonicity != Monotonicity::Decreasing {
        return Err(CalcError::invalid(
            "solver.monotonicity",
            "Bond price is decreasing in yield",
        ));
    }
    if config.low / f64::from(periods_per_year) <= -1.0 {
        return Err(CalcError::invalid(
            "solver.low",
            "Bracket must keep the periodic rate above -100%",
        ));
    }
    Ok(())
}

fn is_whole(n: f64) -> bool {
    (n - n.round()).abs() < WHOLE_PERIOD_EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn par_bond() -> BondParams {
        BondParams {
            face_value: 1000.0,
            coupon_rate: 5.0,
            periods_per_year: 1,
            years_to_maturity: 10.0,
            current_price: 1000.0,
            solver: None,
        }
    }

    #[test]
    fn test_bond_price_at_coupon_rate_is_par() {
        let p = bond_price(1000.0, 5.0, 1, 10.0, 0.05);
        assert_abs_diff_eq!(p, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bond_price_zero_rate_is_sum_of_cash_flows() {
        // 10 coupons of 50 plus 1000 face
        let p = bond_price(1000.0, 5.0, 1, 10.0, 0.0);
        assert_abs_diff_eq!(p, 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bond_price_minus_one_periodic_is_not_finite() {
        let p = bond_price(1000.0, 5.0, 2, 10.0, -2.0);
        assert!(!p.is_finite());
    }

    #[test]
    fn test_whole_periods_absorbs_float_noise() {
        assert_eq!(whole_periods(9.999_999_999_99), 10);
        assert_eq!(whole_periods(10.5), 10);
        assert_eq!(whole_periods(0.0), 0);
        assert_eq!(whole_periods(f64::NAN), 0);
    }

    #[test]
    fn test_ytm_par_bond() {
        let out = compute_yield_to_maturity(&par_bond()).unwrap();
        assert_abs_diff_eq!(out.result.rate, 5.0, epsilon = 0.001);
        assert_eq!(out.result.classification, "par");
        assert_eq!(out.result.iterations, 100);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_ytm_discount_bond_above_coupon() {
        let mut params = par_bond();
        params.current_price = 900.0;
        let out = compute_yield_to_maturity(&params).unwrap();
        assert!(out.result.rate > 5.0);
        assert_eq!(out.result.classification, "discount");
        assert_abs_diff_eq!(out.result.price_at_yield, 900.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ytm_premium_bond_below_coupon() {
        let mut params = par_bond();
        params.current_price = 1100.0;
        let out = compute_yield_to_maturity(&params).unwrap();
        assert!(out.result.rate < 5.0);
        assert_eq!(out.result.classification, "premium");
    }

    #[test]
    fn test_ytm_semi_annual_par() {
        let mut params = par_bond();
        params.periods_per_year = 2;
        let out = compute_yield_to_maturity(&params).unwrap();
        assert_abs_diff_eq!(out.result.rate, 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out.result.periodic_rate, 2.5, epsilon = 1e-6);
        // (1.025)^2 - 1 = 5.0625%
        assert_abs_diff_eq!(out.result.effective_annual_rate, 5.0625, epsilon = 1e-6);
    }

    #[test]
    fn test_ytm_negative_yield_outside_default_bracket() {
        let mut params = par_bond();
        params.current_price = 1600.0;
        let err = compute_yield_to_maturity(&params).unwrap_err();
        assert!(matches!(err, CalcError::NoRootInBracket { .. }));
    }

    #[test]
    fn test_ytm_negative_yield_with_widened_bracket() {
        let mut params = par_bond();
        params.current_price = 1600.0;
        params.solver = Some(BisectionConfig::new(-0.5, 1.0));
        let out = compute_yield_to_maturity(&params).unwrap();
        assert!(out.result.rate < 0.0);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_ytm_rejects_zero_face_value() {
        let mut params = par_bond();
        params.face_value = 0.0;
        let err = compute_yield_to_maturity(&params).unwrap_err();
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "face_value"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_ytm_rejects_zero_periods() {
        let mut params = par_bond();
        params.periods_per_year = 0;
        assert!(matches!(
            compute_yield_to_maturity(&params),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_ytm_rejects_bracket_reaching_minus_100_pct() {
        let mut params = par_bond();
        params.solver = Some(BisectionConfig::new(-1.0, 1.0));
        let err = compute_yield_to_maturity(&params).unwrap_err();
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "solver.low"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_ytm_rejects_unbounded_term() {
        let mut params = par_bond();
        params.years_to_maturity = 1e12;
        let err = compute_yield_to_maturity(&params).unwrap_err();
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "years_to_maturity"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_ytm_rejects_excessive_solver_iterations() {
        let mut params = par_bond();
        params.solver = Some(BisectionConfig::default().with_max_iterations(4_000_000_000));
        assert!(matches!(
            compute_yield_to_maturity(&params),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_ytm_fractional_periods_warns() {
        let mut params = par_bond();
        params.years_to_maturity = 10.5;
        let out = compute_yield_to_maturity(&params).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_bond_price_forward() {
        let input = BondPriceInput {
            face_value: 1000.0,
            coupon_rate: 5.0,
            periods_per_year: 1,
            years_to_maturity: 10.0,
            annual_rate: 6.0,
        };
        let out = compute_bond_price(&input).unwrap();
        assert!(out.result.price < 1000.0);
        assert_eq!(out.result.classification, "discount");
        assert_abs_diff_eq!(out.result.periodic_coupon, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bond_price_rejects_minus_100_pct() {
        let input = BondPriceInput {
            face_value: 1000.0,
            coupon_rate: 5.0,
            periods_per_year: 1,
            years_to_maturity: 10.0,
            annual_rate: -100.0,
        };
        assert!(matches!(
            compute_bond_price(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }
}
