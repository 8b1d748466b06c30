use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Precision};
use crate::CalcResult;

const HUNDRED: Decimal = dec!(100);

/// Longest schedule accepted: 100 years of daily periods.
pub const MAX_PERIODS: u64 = 36_500;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleInterestInput {
    pub principal: Money,
    /// Annual rate in percent.
    pub annual_rate: Decimal,
    /// Term in years; fractions allowed.
    pub years: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleInterestOutput {
    pub interest: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundInterestInput {
    pub principal: Money,
    /// Nominal annual rate in percent.
    pub annual_rate: Decimal,
    pub years: u32,
    /// 1 = annual, 4 = quarterly, 12 = monthly, 365 = daily.
    pub compounds_per_year: u32,
    /// Deposit added at the end of every compounding period.
    #[serde(default)]
    pub periodic_contribution: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundInterestOutput {
    pub future_value: Money,
    pub total_contributions: Money,
    pub total_interest: Money,
    /// Effective annual rate in percent.
    pub effective_annual_rate: Decimal,
}

fn default_payments_per_year() -> u32 {
    12
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    pub principal: Money,
    /// Nominal annual rate in percent.
    pub annual_rate: Decimal,
    pub years: u32,
    #[serde(default = "default_payments_per_year")]
    pub payments_per_year: u32,
    /// Return every period of the amortisation table.
    #[serde(default)]
    pub include_schedule: bool,
}

/// One row of an amortisation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOutput {
    pub payment: Money,
    pub total_paid: Money,
    pub total_interest: Money,
    pub first_period: AmortizationRow,
    pub last_period: AmortizationRow,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Public API — Simple interest
// ---------------------------------------------------------------------------

/// Interest = principal × rate × years.
pub fn simple_interest(
    input: &SimpleInterestInput,
) -> CalcResult<ComputationOutput<SimpleInterestOutput>> {
    let start = Instant::now();

    validate_principal(input.principal)?;
    validate_rate(input.annual_rate)?;
    if input.years <= Decimal::ZERO {
        return Err(CalcError::invalid("years", "Term must be positive"));
    }

    let rate = input.annual_rate / HUNDRED;
    let per_year = checked(input.principal.checked_mul(rate), "principal")?;
    let interest = cents(checked(per_year.checked_mul(input.years), "years")?);
    let output = SimpleInterestOutput {
        interest,
        total: cents(checked(input.principal.checked_add(interest), "principal")?),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Simple interest",
        &serde_json::json!({ "rounding": "cents, midpoint away from zero" }),
        Vec::new(),
        elapsed,
        Precision::Decimal128,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Public API — Compound interest
// ---------------------------------------------------------------------------

/// Future value with periodic compounding and optional end-of-period deposits.
pub fn compound_interest(
    input: &CompoundInterestInput,
) -> CalcResult<ComputationOutput<CompoundInterestOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_principal(input.principal)?;
    validate_rate(input.annual_rate)?;
    if input.years == 0 {
        return Err(CalcError::invalid("years", "Term must be at least one year"));
    }
    if input.compounds_per_year == 0 {
        return Err(CalcError::invalid(
            "compounds_per_year",
            "Compounding frequency must be at least 1",
        ));
    }
    if input.periodic_contribution < Decimal::ZERO {
        return Err(CalcError::invalid(
            "periodic_contribution",
            "Contribution cannot be negative",
        ));
    }

    let m = Decimal::from(input.compounds_per_year);
    let n = u64::from(input.years) * u64::from(input.compounds_per_year);
    check_periods(n)?;
    let i = input.annual_rate / HUNDRED / m;
    let growth = checked_growth(i, n)?;

    let fv_principal = checked(input.principal.checked_mul(growth), "principal")?;
    let deposits = checked(
        input.periodic_contribution.checked_mul(Decimal::from(n)),
        "periodic_contribution",
    )?;
    let fv_contrib = if i.is_zero() {
        deposits
    } else {
        let grown = input
            .periodic_contribution
            .checked_mul(growth - Decimal::ONE)
            .and_then(|x| x.checked_div(i));
        checked(grown, "periodic_contribution")?
    };

    let total_contributions = checked(input.principal.checked_add(deposits), "principal")?;
    let future_value = checked(fv_principal.checked_add(fv_contrib), "principal")?;
    let effective = checked_growth(i, u64::from(input.compounds_per_year))? - Decimal::ONE;

    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: future value equals contributions".into());
    }

    let output = CompoundInterestOutput {
        future_value: cents(future_value),
        total_contributions: cents(total_contributions),
        total_interest: cents(future_value - total_contributions),
        effective_annual_rate: checked(effective.checked_mul(HUNDRED), "annual_rate")?.round_dp(6),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "compounds_per_year": input.compounds_per_year,
        "contribution_timing": "end of period",
        "rounding": "cents, midpoint away from zero",
    });

    Ok(with_metadata(
        "Compound interest",
        &assumptions,
        warnings,
        elapsed,
        Precision::Decimal128,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Public API — Loan payment
// ---------------------------------------------------------------------------

/// Level payment of a fully amortising loan, with its amortisation table.
pub fn loan_payment(input: &LoanInput) -> CalcResult<ComputationOutput<LoanOutput>> {
    let start = Instant::now();

    validate_principal(input.principal)?;
    validate_rate(input.annual_rate)?;
    if input.years == 0 {
        return Err(CalcError::invalid("years", "Term must be at least one year"));
    }
    if input.payments_per_year == 0 {
        return Err(CalcError::invalid(
            "payments_per_year",
            "Payments per year must be at least 1",
        ));
    }

    let n = input
        .years
        .checked_mul(input.payments_per_year)
        .ok_or_else(|| CalcError::invalid("years", "Too many payments for this term"))?;
    check_periods(u64::from(n))?;
    let i = input.annual_rate / HUNDRED / Decimal::from(input.payments_per_year);

    let payment = if i.is_zero() {
        cents(input.principal / Decimal::from(n))
    } else {
        let growth = checked_growth(i, u64::from(n))?;
        let denom = checked(i.checked_mul(growth), "annual_rate")?;
        let annuity = checked((growth - Decimal::ONE).checked_div(denom), "annual_rate")?;
        if annuity.is_zero() {
            return Err(CalcError::DivisionByZero {
                context: "loan annuity factor".into(),
            });
        }
        cents(checked(input.principal.checked_div(annuity), "principal")?)
    };

    let schedule = amortize(input.principal, i, payment, n)?;
    let total_paid = schedule
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.payment));
    let total_paid: Money = checked(total_paid, "principal")?;
    let first_period = schedule[0].clone();
    let last_period = schedule[schedule.len() - 1].clone();

    let output = LoanOutput {
        payment,
        total_paid,
        total_interest: total_paid - input.principal,
        first_period,
        last_period,
        schedule: if input.include_schedule {
            schedule
        } else {
            Vec::new()
        },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "payments": n,
        "final_payment": "adjusted to clear the balance",
        "rounding": "cents, midpoint away from zero",
    });

    Ok(with_metadata(
        "Loan amortisation (level payment)",
        &assumptions,
        Vec::new(),
        elapsed,
        Precision::Decimal128,
        output,
    ))
}

/// Amortisation table; the last payment absorbs rounding so the balance ends at zero.
/// `n` is at least 1 and at most [`MAX_PERIODS`], so the table is never empty.
fn amortize(
    principal: Money,
    i: Decimal,
    payment: Money,
    n: u32,
) -> CalcResult<Vec<AmortizationRow>> {
    let mut balance = principal;
    let mut rows = Vec::with_capacity(n as usize);

    for period in 1..=n {
        let interest = cents(checked(balance.checked_mul(i), "annual_rate")?);
        let due = checked(balance.checked_add(interest), "annual_rate")?;
        let mut pay = payment;
        if period == n || pay > due {
            pay = due;
        }
        let principal_part = pay - interest;
        balance -= principal_part;

        rows.push(AmortizationRow {
            period,
            payment: pay,
            interest,
            principal: principal_part,
            balance,
        });
        if balance.is_zero() {
            break;
        }
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn cents(x: Decimal) -> Money {
    x.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Unwrap a checked Decimal operation, reporting overflow against `field`.
fn checked(value: Option<Decimal>, field: &str) -> CalcResult<Decimal> {
    value.ok_or_else(|| CalcError::invalid(field, "Result overflows for these inputs"))
}

fn check_periods(n: u64) -> CalcResult<()> {
    if n > MAX_PERIODS {
        return Err(CalcError::invalid(
            "years",
            format!("{n} periods exceeds the limit of {MAX_PERIODS}"),
        ));
    }
    Ok(())
}

/// (1 + i)^n, surfacing Decimal overflow as an input error.
fn checked_growth(i: Decimal, n: u64) -> CalcResult<Decimal> {
    (Decimal::ONE + i).checked_powu(n).ok_or_else(|| {
        CalcError::invalid("annual_rate", "Growth factor overflows for this rate and term")
    })
}

fn validate_principal(principal: Money) -> CalcResult<()> {
    if principal <= Decimal::ZERO {
        return Err(CalcError::invalid("principal", "Principal must be positive"));
    }
    Ok(())
}

fn validate_rate(rate: Decimal) -> CalcResult<()> {
    if rate < Decimal::ZERO {
        return Err(CalcError::invalid("annual_rate", "Rate cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_interest() {
        let input = SimpleInterestInput {
            principal: dec!(1000),
            annual_rate: dec!(5),
            years: dec!(3),
        };
        let out = simple_interest(&input).unwrap();
        assert_eq!(
            out.result,
            SimpleInterestOutput {
                interest: dec!(150.00),
                total: dec!(1150.00),
            }
        );
    }

    #[test]
    fn test_compound_interest_annual() {
        // 1000 * 1.05^10 = 1628.894627
        let input = CompoundInterestInput {
            principal: dec!(1000),
            annual_rate: dec!(5),
            years: 10,
            compounds_per_year: 1,
            periodic_contribution: Decimal::ZERO,
        };
        let out = compound_interest(&input).unwrap();
        assert_eq!(out.result.future_value, dec!(1628.89));
        assert_eq!(out.result.total_interest, dec!(628.89));
        assert_eq!(out.result.effective_annual_rate, dec!(5));
    }

    #[test]
    fn test_compound_interest_monthly_effective_rate() {
        let input = CompoundInterestInput {
            principal: dec!(1000),
            annual_rate: dec!(12),
            years: 1,
            compounds_per_year: 12,
            periodic_contribution: Decimal::ZERO,
        };
        let out = compound_interest(&input).unwrap();
        // 1.01^12 - 1 = 12.682503%
        assert_eq!(out.result.effective_annual_rate, dec!(12.682503));
        assert_eq!(out.result.future_value, dec!(1126.83));
    }

    #[test]
    fn test_compound_interest_zero_rate_with_contributions() {
        let input = CompoundInterestInput {
            principal: dec!(100),
            annual_rate: Decimal::ZERO,
            years: 2,
            compounds_per_year: 12,
            periodic_contribution: dec!(10),
        };
        let out = compound_interest(&input).unwrap();
        assert_eq!(out.result.future_value, dec!(340));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_loan_payment_standard_mortgage() {
        // 200k, 6%, 30y monthly => 1199.10
        let input = LoanInput {
            principal: dec!(200000),
            annual_rate: dec!(6),
            years: 30,
            payments_per_year: 12,
            include_schedule: false,
        };
        let out = loan_payment(&input).unwrap();
        assert_eq!(out.result.payment, dec!(1199.10));
        assert_eq!(out.result.first_period.interest, dec!(1000.00));
        assert_eq!(out.result.last_period.balance, Decimal::ZERO);
        assert!(out.result.schedule.is_empty());
    }

    #[test]
    fn test_loan_schedule_clears_balance() {
        let input = LoanInput {
            principal: dec!(10000),
            annual_rate: dec!(7.5),
            years: 3,
            payments_per_year: 12,
            include_schedule: true,
        };
        let out = loan_payment(&input).unwrap();
        let sched = &out.result.schedule;
        assert_eq!(sched.len(), 36);
        let repaid: Decimal = sched.iter().map(|r| r.principal).sum();
        assert_eq!(repaid, dec!(10000));
        assert_eq!(out.result.total_interest, out.result.total_paid - dec!(10000));
    }

    #[test]
    fn test_loan_zero_rate_straight_line() {
        let input = LoanInput {
            principal: dec!(1200),
            annual_rate: Decimal::ZERO,
            years: 1,
            payments_per_year: 12,
            include_schedule: false,
        };
        let out = loan_payment(&input).unwrap();
        assert_eq!(out.result.payment, dec!(100));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
    }

    #[test]
    fn test_loan_rejects_zero_principal() {
        let input = LoanInput {
            principal: Decimal::ZERO,
            annual_rate: dec!(5),
            years: 1,
            payments_per_year: 12,
            include_schedule: false,
        };
        assert!(matches!(
            loan_payment(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_loan_period_count_overflow_is_rejected() {
        let input = LoanInput {
            principal: dec!(1000),
            annual_rate: Decimal::ZERO,
            years: 70_000,
            payments_per_year: 70_000,
            include_schedule: false,
        };
        match loan_payment(&input) {
            Err(CalcError::InvalidInput { field, .. }) => assert_eq!(field, "years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_loan_schedule_length_is_capped() {
        let input = LoanInput {
            principal: dec!(1000),
            annual_rate: dec!(5),
            years: 1_000,
            payments_per_year: 365,
            include_schedule: true,
        };
        assert!(matches!(
            loan_payment(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_loan_longest_daily_schedule_is_accepted() {
        let input = LoanInput {
            principal: dec!(1000),
            annual_rate: Decimal::ZERO,
            years: 100,
            payments_per_year: 365,
            include_schedule: false,
        };
        let out = loan_payment(&input).unwrap();
        assert_eq!(out.result.total_paid, dec!(1000));
    }

    #[test]
    fn test_compound_interest_overflowing_product() {
        let input = CompoundInterestInput {
            principal: dec!(100000000000000000000),
            annual_rate: dec!(100),
            years: 34,
            compounds_per_year: 1,
            periodic_contribution: Decimal::ZERO,
        };
        assert!(matches!(
            compound_interest(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_compound_interest_overflowing_contributions() {
        let input = CompoundInterestInput {
            principal: dec!(1),
            annual_rate: dec!(100),
            years: 30,
            compounds_per_year: 1,
            periodic_contribution: dec!(10000000000000000000000000),
        };
        assert!(matches!(
            compound_interest(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_simple_interest_overflow() {
        let input = SimpleInterestInput {
            principal: dec!(10000000000000000000000000),
            annual_rate: dec!(100000),
            years: dec!(1000),
        };
        assert!(matches!(
            simple_interest(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }
}
