//! Unit conversions and table-driven converters.

pub mod lookup;
pub mod units;
