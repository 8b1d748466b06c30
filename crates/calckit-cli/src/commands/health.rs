use clap::{Args, ValueEnum};
use serde_json::Value;

use calckit_core::health::bmi::{self, BmiInput, MeasurementSystem};
use calckit_core::health::bmr::{self, ActivityLevel, BmrInput, Sex};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SystemArg {
    Metric,
    Imperial,
}

impl From<SystemArg> for MeasurementSystem {
    fn from(s: SystemArg) -> Self {
        match s {
            SystemArg::Metric => MeasurementSystem::Metric,
            SystemArg::Imperial => MeasurementSystem::Imperial,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SexArg {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ActivityArg {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl From<ActivityArg> for ActivityLevel {
    fn from(a: ActivityArg) -> Self {
        match a {
            ActivityArg::Sedentary => ActivityLevel::Sedentary,
            ActivityArg::Light => ActivityLevel::Light,
            ActivityArg::Moderate => ActivityLevel::Moderate,
            ActivityArg::Active => ActivityLevel::Active,
            ActivityArg::VeryActive => ActivityLevel::VeryActive,
        }
    }
}

/// Arguments for body mass index
#[derive(Args)]
pub struct BmiArgs {
    /// Weight (kg metric, lb imperial)
    #[arg(long)]
    pub weight: Option<f64>,

    /// Height (cm metric, inches imperial)
    #[arg(long)]
    pub height: Option<f64>,

    /// Measurement system
    #[arg(long, value_enum, default_value = "metric")]
    pub system: SystemArg,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_bmi(args: BmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bmi_input: BmiInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        BmiInput {
            weight: args.weight.ok_or("--weight is required (or provide --input)")?,
            height: args.height.ok_or("--height is required (or provide --input)")?,
            system: args.system.into(),
        }
    };
    let result = bmi::bmi(&bmi_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for basal metabolic rate
#[derive(Args)]
pub struct BmrArgs {
    /// Sex used by the Mifflin-St Jeor constant
    #[arg(long, value_enum)]
    pub sex: Option<SexArg>,

    /// Weight in kg
    #[arg(long)]
    pub weight: Option<f64>,

    /// Height in cm
    #[arg(long)]
    pub height: Option<f64>,

    /// Age in years
    #[arg(long)]
    pub age: Option<f64>,

    /// Activity level
    #[arg(long, value_enum, default_value = "sedentary")]
    pub activity: ActivityArg,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_bmr(args: BmrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bmr_input: BmrInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        let sex = match args.sex.ok_or("--sex is required (or provide --input)")? {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        };
        BmrInput {
            sex,
            weight_kg: args.weight.ok_or("--weight is required (or provide --input)")?,
            height_cm: args.height.ok_or("--height is required (or provide --input)")?,
            age_years: args.age.ok_or("--age is required (or provide --input)")?,
            activity: args.activity.into(),
        }
    };
    let result = bmr::bmr(&bmr_input)?;
    Ok(serde_json::to_value(result)?)
}
