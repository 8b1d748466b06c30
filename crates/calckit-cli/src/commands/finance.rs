use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use calckit_core::finance::bond::{self, BondParams, BondPriceInput};
use calckit_core::finance::interest::{
    self, CompoundInterestInput, LoanInput, SimpleInterestInput,
};
use calckit_core::finance::options::{self, ImpliedVolInput, OptionInput, OptionKind};
use calckit_core::solvers::{BisectionConfig, DEFAULT_MAX_ITERATIONS};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Call,
    Put,
}

impl From<KindArg> for OptionKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Call => OptionKind::Call,
            KindArg::Put => OptionKind::Put,
        }
    }
}

/// Bisection bracket flags shared by the solving commands.
#[derive(Args)]
pub struct SolverArgs {
    /// Lower end of the search bracket, as a decimal (0.0 = 0%)
    #[arg(long)]
    pub bracket_low: Option<f64>,

    /// Upper end of the search bracket, as a decimal (1.0 = 100%)
    #[arg(long)]
    pub bracket_high: Option<f64>,

    /// Number of halvings
    #[arg(long)]
    pub iterations: Option<u32>,
}

impl SolverArgs {
    /// `None` when no flag was given so the calculator applies its own default.
    fn to_config(&self, default_low: f64, default_high: f64) -> Option<BisectionConfig> {
        if self.bracket_low.is_none() && self.bracket_high.is_none() && self.iterations.is_none() {
            return None;
        }
        Some(
            BisectionConfig::new(
                self.bracket_low.unwrap_or(default_low),
                self.bracket_high.unwrap_or(default_high),
            )
            .with_max_iterations(self.iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)),
        )
    }
}

// ---------------------------------------------------------------------------
// Bonds
// ---------------------------------------------------------------------------

/// Arguments for yield to maturity
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct YtmArgs {
    /// Face (par) value
    #[arg(long, default_value = "1000")]
    pub face_value: f64,

    /// Annual coupon rate in percent (5 = 5%)
    #[arg(long)]
    pub coupon_rate: Option<f64>,

    /// Coupon payments per year
    #[arg(long, default_value = "2")]
    pub frequency: u32,

    /// Years to maturity
    #[arg(long)]
    pub years: Option<f64>,

    /// Current market price
    #[arg(long)]
    pub price: Option<f64>,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_ytm(args: YtmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: BondParams = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        BondParams {
            face_value: args.face_value,
            coupon_rate: args
                .coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            periods_per_year: args.frequency,
            years_to_maturity: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            current_price: args
                .price
                .ok_or("--price is required (or provide --input)")?,
            solver: args.solver.to_config(0.0, 1.0),
        }
    };
    let result = bond::compute_yield_to_maturity(&params)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for bond pricing at a known yield
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BondPriceArgs {
    /// Face (par) value
    #[arg(long, default_value = "1000")]
    pub face_value: f64,

    /// Annual coupon rate in percent
    #[arg(long)]
    pub coupon_rate: Option<f64>,

    /// Coupon payments per year
    #[arg(long, default_value = "2")]
    pub frequency: u32,

    /// Years to maturity
    #[arg(long)]
    pub years: Option<f64>,

    /// Annual yield in percent
    #[arg(long, alias = "yield")]
    pub rate: Option<f64>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_bond_price(args: BondPriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let price_input: BondPriceInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        BondPriceInput {
            face_value: args.face_value,
            coupon_rate: args
                .coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            periods_per_year: args.frequency,
            years_to_maturity: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
        }
    };
    let result = bond::compute_bond_price(&price_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Arguments for Black-Scholes option pricing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct OptionPriceArgs {
    /// Call or put
    #[arg(long, value_enum, default_value = "call")]
    pub kind: KindArg,

    /// Spot price of the underlying
    #[arg(long)]
    pub spot: Option<f64>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<f64>,

    /// Time to expiry in years
    #[arg(long)]
    pub years: Option<f64>,

    /// Risk-free rate in percent
    #[arg(long, default_value = "0")]
    pub risk_free_rate: f64,

    /// Volatility in percent
    #[arg(long, alias = "vol")]
    pub volatility: Option<f64>,

    /// Dividend yield in percent
    #[arg(long, default_value = "0")]
    pub dividend_yield: f64,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_option_price(args: OptionPriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let option_input: OptionInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        OptionInput {
            kind: args.kind.into(),
            spot: args.spot.ok_or("--spot is required (or provide --input)")?,
            strike: args.strike.ok_or("--strike is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            risk_free_rate: args.risk_free_rate,
            volatility: args
                .volatility
                .ok_or("--volatility is required (or provide --input)")?,
            dividend_yield: args.dividend_yield,
        }
    };
    let result = options::price_option(&option_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for implied volatility
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ImpliedVolArgs {
    /// Call or put
    #[arg(long, value_enum, default_value = "call")]
    pub kind: KindArg,

    /// Spot price of the underlying
    #[arg(long)]
    pub spot: Option<f64>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<f64>,

    /// Time to expiry in years
    #[arg(long)]
    pub years: Option<f64>,

    /// Risk-free rate in percent
    #[arg(long, default_value = "0")]
    pub risk_free_rate: f64,

    /// Dividend yield in percent
    #[arg(long, default_value = "0")]
    pub dividend_yield: f64,

    /// Observed option premium
    #[arg(long)]
    pub price: Option<f64>,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_implied_vol(args: ImpliedVolArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let iv_input: ImpliedVolInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        ImpliedVolInput {
            kind: args.kind.into(),
            spot: args.spot.ok_or("--spot is required (or provide --input)")?,
            strike: args.strike.ok_or("--strike is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            risk_free_rate: args.risk_free_rate,
            dividend_yield: args.dividend_yield,
            market_price: args.price.ok_or("--price is required (or provide --input)")?,
            solver: args.solver.to_config(0.0001, 5.0),
        }
    };
    let result = options::implied_volatility(&iv_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// Interest and loans
// ---------------------------------------------------------------------------

/// Arguments for simple interest
#[derive(Args)]
pub struct SimpleInterestArgs {
    /// Principal amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_simple_interest(args: SimpleInterestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let si_input: SimpleInterestInput =
        if let Some(p) = input::read_input(args.input.as_deref())? {
            p
        } else {
            SimpleInterestInput {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
                years: args.years.ok_or("--years is required (or provide --input)")?,
            }
        };
    let result = interest::simple_interest(&si_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for compound interest
#[derive(Args)]
pub struct CompoundInterestArgs {
    /// Starting principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in whole years
    #[arg(long)]
    pub years: Option<u32>,

    /// Compounding periods per year
    #[arg(long, default_value = "12")]
    pub compounds_per_year: u32,

    /// Deposit at the end of each compounding period
    #[arg(long)]
    pub contribution: Option<Decimal>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_compound_interest(
    args: CompoundInterestArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let ci_input: CompoundInterestInput =
        if let Some(p) = input::read_input(args.input.as_deref())? {
            p
        } else {
            CompoundInterestInput {
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
                years: args.years.ok_or("--years is required (or provide --input)")?,
                compounds_per_year: args.compounds_per_year,
                periodic_contribution: args.contribution.unwrap_or(dec!(0)),
            }
        };
    let result = interest::compound_interest(&ci_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for loan payment
#[derive(Args)]
pub struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in whole years
    #[arg(long)]
    pub years: Option<u32>,

    /// Payments per year
    #[arg(long, default_value = "12")]
    pub payments_per_year: u32,

    /// Include the full amortisation schedule
    #[arg(long)]
    pub schedule: bool,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input: LoanInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        LoanInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            payments_per_year: args.payments_per_year,
            include_schedule: args.schedule,
        }
    };
    let result = interest::loan_payment(&loan_input)?;
    Ok(serde_json::to_value(result)?)
}
