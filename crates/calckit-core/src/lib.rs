pub mod classify;
pub mod error;
pub mod registry;
pub mod solvers;
pub mod types;

#[cfg(feature = "finance")]
pub mod finance;

#[cfg(feature = "health")]
pub mod health;

#[cfg(feature = "conversions")]
pub mod conversions;

#[cfg(feature = "technology")]
pub mod technology;

pub use error::CalcError;
pub use types::*;

/// Standard result type for all calculator operations
pub type CalcResult<T> = Result<T, CalcError>;
