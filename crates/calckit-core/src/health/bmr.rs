use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::health::bmi::round_to;
use crate::types::{require_positive, with_metadata, ComputationOutput, Precision};
use crate::CalcResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Harris-Benedict activity multiplier.
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmrInput {
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: f64,
    #[serde(default)]
    pub activity: ActivityLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmrOutput {
    /// Basal metabolic rate, kcal/day.
    pub bmr: f64,
    /// Total daily energy expenditure, kcal/day.
    pub tdee: f64,
    pub activity_multiplier: f64,
}

/// Mifflin-St Jeor basal metabolic rate and activity-scaled daily energy.
pub fn bmr(input: &BmrInput) -> CalcResult<ComputationOutput<BmrOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_positive("weight_kg", input.weight_kg)?;
    require_positive("height_cm", input.height_cm)?;
    require_positive("age_years", input.age_years)?;

    if input.age_years < 18.0 {
        warnings.push("Mifflin-St Jeor is calibrated on adults".into());
    }

    let sex_term = match input.sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };
    let base = 10.0 * input.weight_kg + 6.25 * input.height_cm - 5.0 * input.age_years + sex_term;
    let multiplier = input.activity.multiplier();

    let output = BmrOutput {
        bmr: round_to(base, 0),
        tdee: round_to(base * multiplier, 0),
        activity_multiplier: multiplier,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mifflin-St Jeor BMR",
        &serde_json::json!({ "activity": input.activity }),
        warnings,
        elapsed,
        Precision::Float64,
        output,
    ))
}
