//! Catalogue of calculators and JSON dispatch by calculator id.
//!
//! Front ends (CLI, Node bindings) mount calculators by id and pass the form
//! as JSON; they never call one calculator from another.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::CalcError;
use crate::CalcResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Finance,
    Health,
    Conversions,
    Technology,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculatorInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub description: &'static str,
}

const fn info(
    id: &'static str,
    name: &'static str,
    category: Category,
    description: &'static str,
) -> CalculatorInfo {
    CalculatorInfo {
        id,
        name,
        category,
        description,
    }
}

/// Calculators compiled into this build, in display order.
pub fn catalogue() -> Vec<CalculatorInfo> {
    #[allow(unused_mut)]
    let mut list = Vec::new();

    #[cfg(feature = "finance")]
    list.extend([
        info("ytm", "Yield to Maturity", Category::Finance, "Annual yield that prices a fixed-coupon bond at its market price"),
        info("bond-price", "Bond Price", Category::Finance, "Present value of a fixed-coupon bond at a given yield"),
        info("option-price", "Option Price", Category::Finance, "Black-Scholes price and delta of a European option"),
        info("implied-vol", "Implied Volatility", Category::Finance, "Volatility implied by an option's market price"),
        info("simple-interest", "Simple Interest", Category::Finance, "Interest on a principal without compounding"),
        info("compound-interest", "Compound Interest", Category::Finance, "Future value with periodic compounding and deposits"),
        info("loan", "Loan Payment", Category::Finance, "Level payment and amortisation of a loan"),
    ]);

    #[cfg(feature = "health")]
    list.extend([
        info("bmi", "BMI", Category::Health, "Body mass index with WHO category"),
        info("bmr", "BMR", Category::Health, "Basal metabolic rate and daily energy needs"),
    ]);

    #[cfg(feature = "conversions")]
    list.extend([
        info("convert", "Unit Converter", Category::Conversions, "Area, length, mass, volume and data units"),
        info("temperature", "Temperature Converter", Category::Conversions, "Celsius, Fahrenheit and Kelvin"),
        info("lookup", "Size Chart Converter", Category::Conversions, "Shoe and ring sizes between sizing systems"),
    ]);

    #[cfg(feature = "technology")]
    list.push(info(
        "download-time",
        "Download Time",
        Category::Technology,
        "Time to transfer a file at a given bandwidth",
    ));

    list
}

/// Calculators of one category.
pub fn by_category(category: Category) -> Vec<CalculatorInfo> {
    catalogue()
        .into_iter()
        .filter(|c| c.category == category)
        .collect()
}

/// Run calculator `id` on a JSON input and return its JSON envelope.
pub fn run_calculator(id: &str, input: Value) -> CalcResult<Value> {
    debug!(calculator = id, "dispatch");
    match id {
        #[cfg(feature = "finance")]
        "ytm" => run(input, crate::finance::bond::compute_yield_to_maturity),
        #[cfg(feature = "finance")]
        "bond-price" => run(input, crate::finance::bond::compute_bond_price),
        #[cfg(feature = "finance")]
        "option-price" => run(input, crate::finance::options::price_option),
        #[cfg(feature = "finance")]
        "implied-vol" => run(input, crate::finance::options::implied_volatility),
        #[cfg(feature = "finance")]
        "simple-interest" => run(input, crate::finance::interest::simple_interest),
        #[cfg(feature = "finance")]
        "compound-interest" => run(input, crate::finance::interest::compound_interest),
        #[cfg(feature = "finance")]
        "loan" => run(input, crate::finance::interest::loan_payment),
        #[cfg(feature = "health")]
        "bmi" => run(input, crate::health::bmi::bmi),
        #[cfg(feature = "health")]
        "bmr" => run(input, crate::health::bmr::bmr),
        #[cfg(feature = "conversions")]
        "convert" => run(input, crate::conversions::units::convert),
        #[cfg(feature = "conversions")]
        "temperature" => run(input, crate::conversions::units::convert_temperature),
        #[cfg(feature = "conversions")]
        "lookup" => run(input, crate::conversions::lookup::lookup),
        #[cfg(feature = "technology")]
        "download-time" => run(input, crate::technology::download_time::download_time),
        _ => Err(CalcError::UnknownCalculator(id.to_string())),
    }
}

#[allow(dead_code)]
fn run<I, O>(input: Value, f: impl Fn(&I) -> CalcResult<O>) -> CalcResult<Value>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let parsed: I = serde_json::from_value(input)?;
    let output = f(&parsed)?;
    Ok(serde_json::to_value(output)?)
}
