//! Technology calculators.

pub mod download_time;
