//! Threshold bands that turn a scalar result into an interpretation label.

/// One band of a classification scale: values below `upper` get `label`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub label: &'static str,
}

impl Band {
    pub const fn new(upper: f64, label: &'static str) -> Self {
        Band { upper, label }
    }
}

/// Label of the first band whose upper bound exceeds `value`.
///
/// Bands must be sorted ascending by `upper`. Values at or above the last
/// bound, and NaN, fall through to `fallback`.
pub fn classify(value: f64, bands: &[Band], fallback: &'static str) -> &'static str {
    bands
        .iter()
        .find(|b| value < b.upper)
        .map(|b| b.label)
        .unwrap_or(fallback)
}

/// "premium", "discount" or "par" for a price against a reference value,
/// treating prices within `tolerance` of the reference as par.
pub fn premium_or_discount(price: f64, reference: f64, tolerance: f64) -> &'static str {
    if (price - reference).abs() <= tolerance {
        "par"
    } else if price > reference {
        "premium"
    } else {
        "discount"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALE: [Band; 3] = [
        Band::new(10.0, "low"),
        Band::new(20.0, "mid"),
        Band::new(30.0, "high"),
    ];

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(5.0, &SCALE, "extreme"), "low");
        assert_eq!(classify(10.0, &SCALE, "extreme"), "mid");
        assert_eq!(classify(29.999, &SCALE, "extreme"), "high");
        assert_eq!(classify(30.0, &SCALE, "extreme"), "extreme");
    }

    #[test]
    fn test_classify_nan_falls_through() {
        assert_eq!(classify(f64::NAN, &SCALE, "unknown"), "unknown");
    }

    #[test]
    fn test_premium_or_discount() {
        assert_eq!(premium_or_discount(1000.0, 1000.0, 1e-9), "par");
        assert_eq!(premium_or_discount(1010.0, 1000.0, 1e-9), "premium");
        assert_eq!(premium_or_discount(990.0, 1000.0, 1e-9), "discount");
    }
}
