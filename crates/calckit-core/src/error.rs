use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "No root in bracket [{low}, {high}]: f(low) = {price_low}, f(high) = {price_high}, target = {target}"
    )]
    NoRootInBracket {
        low: f64,
        high: f64,
        price_low: f64,
        price_high: f64,
        target: f64,
    },

    #[error("Non-finite value in {context}: {value}")]
    NonFiniteValue { context: String, value: f64 },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Unknown calculator: {0}")]
    UnknownCalculator(String),

    #[error("No row in table '{table}' has {column} = {value}")]
    LookupMiss {
        table: String,
        column: String,
        value: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CalcError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError(e.to_string())
    }
}
