//! Health calculators.

pub mod bmi;
pub mod bmr;
