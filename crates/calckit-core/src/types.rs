use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amounts in the interest calculators. Decimal to keep cents exact.
pub type Money = Decimal;

/// Rates as the forms collect them: 5.0 means 5%.
pub type Percent = f64;

/// Arithmetic the calculator ran in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "ieee754_f64")]
    Float64,
    #[serde(rename = "rust_decimal_128bit")]
    Decimal128,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: Precision,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    precision: Precision,
    result: T,
) -> ComputationOutput<T> {
    for w in &warnings {
        tracing::warn!(methodology, "{w}");
    }
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision,
        },
    }
}

/// Reject NaN and infinities in a float input field.
pub(crate) fn require_finite(field: &str, value: f64) -> crate::CalcResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(crate::CalcError::invalid(field, "Value must be a finite number"))
    }
}

/// Reject non-positive (or non-finite) float input.
pub(crate) fn require_positive(field: &str, value: f64) -> crate::CalcResult<()> {
    require_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(crate::CalcError::invalid(field, "Value must be positive"))
    }
}
