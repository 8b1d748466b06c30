use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use calckit_core::CalcResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse `input_json`, run `f`, and serialise its envelope.
fn call<I, O>(input_json: &str, f: impl Fn(&I) -> CalcResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = f(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Finance
// ---------------------------------------------------------------------------

#[napi]
pub fn yield_to_maturity(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::finance::bond::compute_yield_to_maturity)
}

#[napi]
pub fn bond_price(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::finance::bond::compute_bond_price)
}

#[napi]
pub fn option_price(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::finance::options::price_option)
}

#[napi]
pub fn implied_volatility(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::finance::options::implied_volatility)
}

#[napi]
pub fn simple_interest(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::finance::interest::simple_interest)
}

#[napi]
pub fn compound_interest(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::finance::interest::compound_interest)
}

#[napi]
pub fn loan_payment(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::finance::interest::loan_payment)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[napi]
pub fn body_mass_index(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::health::bmi::bmi)
}

#[napi]
pub fn basal_metabolic_rate(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::health::bmr::bmr)
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

#[napi]
pub fn convert_units(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::conversions::units::convert)
}

#[napi]
pub fn convert_temperature(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::conversions::units::convert_temperature)
}

#[napi]
pub fn lookup_size(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::conversions::lookup::lookup)
}

/// Plain hectare to acre factor conversion, for the live-updating form field.
#[napi]
pub fn hectares_to_acres(hectares: f64) -> f64 {
    calckit_core::conversions::units::hectares_to_acres(hectares)
}

#[napi]
pub fn acres_to_hectares(acres: f64) -> f64 {
    calckit_core::conversions::units::acres_to_hectares(acres)
}

// ---------------------------------------------------------------------------
// Technology
// ---------------------------------------------------------------------------

#[napi]
pub fn download_time(input_json: String) -> NapiResult<String> {
    call(&input_json, calckit_core::technology::download_time::download_time)
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[napi]
pub fn list_calculators() -> NapiResult<String> {
    serde_json::to_string(&calckit_core::registry::catalogue()).map_err(to_napi_error)
}

#[napi]
pub fn run_calculator(id: String, input_json: String) -> NapiResult<String> {
    let input: serde_json::Value = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calckit_core::registry::run_calculator(&id, input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
