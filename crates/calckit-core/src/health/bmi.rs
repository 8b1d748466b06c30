use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::classify::{classify, Band};
use crate::types::{require_positive, with_metadata, ComputationOutput, Precision};
use crate::CalcResult;

/// kg per lb
const KG_PER_LB: f64 = 0.453_592_37;
/// m per inch
const M_PER_IN: f64 = 0.0254;

const HEALTHY_MIN: f64 = 18.5;
const HEALTHY_MAX: f64 = 24.9;

/// WHO adult BMI categories.
const WHO_BANDS: [Band; 5] = [
    Band::new(18.5, "Underweight"),
    Band::new(25.0, "Normal weight"),
    Band::new(30.0, "Overweight"),
    Band::new(35.0, "Obesity class I"),
    Band::new(40.0, "Obesity class II"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Weight in kg, height in cm.
    #[default]
    Metric,
    /// Weight in lb, height in inches.
    Imperial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiInput {
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub system: MeasurementSystem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiOutput {
    pub bmi: f64,
    pub category: String,
    /// Healthy weight range for this height, in the input's weight unit.
    pub healthy_weight_min: f64,
    pub healthy_weight_max: f64,
}

/// Body mass index = kg / m².
pub fn bmi(input: &BmiInput) -> CalcResult<ComputationOutput<BmiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    require_positive("weight", input.weight)?;
    require_positive("height", input.height)?;

    let (kg, m, to_input_weight) = match input.system {
        MeasurementSystem::Metric => (input.weight, input.height / 100.0, 1.0),
        MeasurementSystem::Imperial => (
            input.weight * KG_PER_LB,
            input.height * M_PER_IN,
            1.0 / KG_PER_LB,
        ),
    };

    if !(0.5..=2.75).contains(&m) {
        warnings.push(format!(
            "Height of {m:.2} m is outside the adult range; check the units"
        ));
    }

    let value = kg / (m * m);
    let output = BmiOutput {
        bmi: round_to(value, 1),
        category: classify(value, &WHO_BANDS, "Obesity class III").to_string(),
        healthy_weight_min: round_to(HEALTHY_MIN * m * m * to_input_weight, 1),
        healthy_weight_max: round_to(HEALTHY_MAX * m * m * to_input_weight, 1),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "categories": "WHO adult",
        "system": input.system,
    });

    Ok(with_metadata(
        "Body mass index",
        &assumptions,
        warnings,
        elapsed,
        Precision::Float64,
        output,
    ))
}

pub(crate) fn round_to(x: f64, dp: i32) -> f64 {
    let f = 10f64.powi(dp);
    (x * f).round() / f
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bmi_metric_normal() {
        let out = bmi(&BmiInput {
            weight: 70.0,
            height: 175.0,
            system: MeasurementSystem::Metric,
        })
        .unwrap();
        // 70 / 1.75^2 = 22.857
        assert_abs_diff_eq!(out.result.bmi, 22.9, epsilon = 1e-9);
        assert_eq!(out.result.category, "Normal weight");
        assert_abs_diff_eq!(out.result.healthy_weight_min, 56.7, epsilon = 1e-9);
        assert_abs_diff_eq!(out.result.healthy_weight_max, 76.3, epsilon = 1e-9);
    }

    #[test]
    fn test_bmi_imperial_matches_metric() {
        let out = bmi(&BmiInput {
            weight: 154.324,
            height: 68.8976,
            system: MeasurementSystem::Imperial,
        })
        .unwrap();
        assert_abs_diff_eq!(out.result.bmi, 22.9, epsilon = 1e-9);
    }

    #[test]
    fn test_bmi_categories() {
        let cat = |kg: f64| {
            bmi(&BmiInput {
                weight: kg,
                height: 100.0,
                system: MeasurementSystem::Metric,
            })
            .unwrap()
            .result
            .category
        };
        assert_eq!(cat(18.0), "Underweight");
        assert_eq!(cat(18.5), "Normal weight");
        assert_eq!(cat(27.0), "Overweight");
        assert_eq!(cat(32.0), "Obesity class I");
        assert_eq!(cat(38.0), "Obesity class II");
        assert_eq!(cat(45.0), "Obesity class III");
    }

    #[test]
    fn test_bmi_rejects_zero_height() {
        let res = bmi(&BmiInput {
            weight: 70.0,
            height: 0.0,
            system: MeasurementSystem::Metric,
        });
        assert!(res.is_err());
    }
}
