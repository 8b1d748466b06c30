use approx::assert_abs_diff_eq;
use calckit_core::finance::bond::bond_price;
use calckit_core::solvers::{bisect, bisect_unchecked, BisectionConfig};
use calckit_core::CalcError;
use proptest::prelude::*;

// ===========================================================================
// Pricing function shape
// ===========================================================================

proptest! {
    #[test]
    fn prop_bond_price_strictly_decreasing(
        face in 1.0f64..1_000_000.0,
        coupon in 0.0f64..20.0,
        ppy in prop::sample::select(vec![1u32, 2, 4, 12]),
        years in 1u32..40,
        r1 in -0.5f64..1.5,
        gap in 1e-4f64..1.0,
    ) {
        let r2 = r1 + gap;
        let p1 = bond_price(face, coupon, ppy, f64::from(years), r1);
        let p2 = bond_price(face, coupon, ppy, f64::from(years), r2);
        prop_assert!(p1 > p2, "price({r1}) = {p1} not above price({r2}) = {p2}");
    }

    #[test]
    fn prop_bisection_recovers_rate(
        face in 100.0f64..10_000.0,
        coupon in 0.0f64..15.0,
        ppy in prop::sample::select(vec![1u32, 2, 4, 12]),
        years in 1u32..30,
        rate in 0.0f64..1.0,
    ) {
        let years = f64::from(years);
        let f = |r: f64| bond_price(face, coupon, ppy, years, r);
        let target = f(rate);
        let res = bisect(target, f, &BisectionConfig::default()).unwrap();
        // Bracket width 2^-100 is below f64 resolution; what remains is the
        // flatness of the price curve around the root.
        prop_assert!((res.estimate - rate).abs() < 1e-8,
            "estimate {} vs rate {}", res.estimate, rate);
    }
}

// ===========================================================================
// Bracket boundaries
// ===========================================================================

#[test]
fn test_target_at_low_returns_low() {
    let f = |r: f64| bond_price(1000.0, 5.0, 1, 10.0, r);
    let res = bisect(f(0.0), f, &BisectionConfig::default()).unwrap();
    assert_eq!(res.estimate, 0.0);
}

#[test]
fn test_target_at_high_returns_high() {
    let f = |r: f64| bond_price(1000.0, 5.0, 1, 10.0, r);
    let res = bisect(f(1.0), f, &BisectionConfig::default()).unwrap();
    assert_eq!(res.estimate, 1.0);
}

#[test]
fn test_unchecked_target_at_high_converges_to_high() {
    let f = |r: f64| bond_price(1000.0, 5.0, 1, 10.0, r);
    let est = bisect_unchecked(f(1.0), f, &BisectionConfig::default());
    assert_abs_diff_eq!(est, 1.0, epsilon = 1e-12);
}

#[test]
fn test_price_above_zero_rate_value_has_no_root() {
    let f = |r: f64| bond_price(1000.0, 5.0, 1, 10.0, r);
    let err = bisect(1500.01, f, &BisectionConfig::default()).unwrap_err();
    assert!(matches!(err, CalcError::NoRootInBracket { .. }));
}

#[test]
fn test_error_message_names_bracket() {
    let f = |r: f64| bond_price(1000.0, 5.0, 1, 10.0, r);
    let err = bisect(2000.0, f, &BisectionConfig::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("[0, 1]"), "unexpected message: {msg}");
}
