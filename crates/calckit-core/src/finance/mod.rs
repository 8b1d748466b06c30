//! Finance calculators: bond yield, option pricing and interest/loan math.

pub mod bond;
pub mod interest;
pub mod options;
