use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::types::{require_finite, with_metadata, ComputationOutput, Precision};
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Unit catalogue
// ---------------------------------------------------------------------------

/// Acres per hectare as published on the area converter.
pub const ACRES_PER_HECTARE: f64 = 2.47105;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Base unit: square meter.
    Area,
    /// Base unit: meter.
    Length,
    /// Base unit: kilogram.
    Mass,
    /// Base unit: liter.
    Volume,
    /// Base unit: byte.
    Data,
}

/// A unit and its size in the base unit of its dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Unit {
    pub id: &'static str,
    pub symbol: &'static str,
    pub dimension: Dimension,
    pub to_base: f64,
    #[serde(skip)]
    aliases: &'static [&'static str],
}

const fn unit(
    id: &'static str,
    symbol: &'static str,
    dimension: Dimension,
    to_base: f64,
    aliases: &'static [&'static str],
) -> Unit {
    Unit {
        id,
        symbol,
        dimension,
        to_base,
        aliases,
    }
}

use Dimension::{Area, Data, Length, Mass, Volume};

static UNITS: &[Unit] = &[
    // Area
    unit("square_meter", "m²", Area, 1.0, &["m2", "sq_m", "square_metre", "square_meters", "square_metres"]),
    unit("square_kilometer", "km²", Area, 1.0e6, &["km2", "sq_km", "square_kilometre"]),
    unit("hectare", "ha", Area, 1.0e4, &["ha"]),
    unit("acre", "ac", Area, 4_046.856_422_4, &["ac"]),
    unit("square_foot", "ft²", Area, 0.092_903_04, &["ft2", "sq_ft", "square_feet"]),
    unit("square_yard", "yd²", Area, 0.836_127_36, &["yd2", "sq_yd"]),
    unit("square_mile", "mi²", Area, 2_589_988.110_336, &["mi2", "sq_mi"]),
    // Length
    unit("millimeter", "mm", Length, 0.001, &["mm", "millimetre"]),
    unit("centimeter", "cm", Length, 0.01, &["cm", "centimetre"]),
    unit("meter", "m", Length, 1.0, &["m", "metre"]),
    unit("kilometer", "km", Length, 1_000.0, &["km", "kilometre"]),
    unit("inch", "in", Length, 0.0254, &["in", "inches"]),
    unit("foot", "ft", Length, 0.3048, &["ft", "feet"]),
    unit("yard", "yd", Length, 0.9144, &["yd"]),
    unit("mile", "mi", Length, 1_609.344, &["mi"]),
    unit("nautical_mile", "nmi", Length, 1_852.0, &["nmi"]),
    // Mass
    unit("milligram", "mg", Mass, 1.0e-6, &["mg"]),
    unit("gram", "g", Mass, 0.001, &["g"]),
    unit("kilogram", "kg", Mass, 1.0, &["kg", "kilo"]),
    unit("tonne", "t", Mass, 1_000.0, &["t", "metric_ton"]),
    unit("ounce", "oz", Mass, 0.028_349_523_125, &["oz"]),
    unit("pound", "lb", Mass, 0.453_592_37, &["lb", "lbs"]),
    unit("stone", "st", Mass, 6.350_293_18, &["st"]),
    // Volume
    unit("milliliter", "ml", Volume, 0.001, &["ml", "millilitre"]),
    unit("liter", "L", Volume, 1.0, &["l", "litre"]),
    unit("cubic_meter", "m³", Volume, 1_000.0, &["m3", "cubic_metre"]),
    unit("teaspoon", "tsp", Volume, 0.004_928_921_593_75, &["tsp"]),
    unit("tablespoon", "tbsp", Volume, 0.014_786_764_781_25, &["tbsp"]),
    unit("cup", "cup", Volume, 0.236_588_236_5, &[]),
    unit("pint", "pt", Volume, 0.473_176_473, &["pt"]),
    unit("quart", "qt", Volume, 0.946_352_946, &["qt"]),
    unit("gallon", "gal", Volume, 3.785_411_784, &["gal"]),
    // Data
    // Case of the trailing b/B in a symbol picks bit or byte; see `data_symbol`.
    unit("bit", "b", Data, 0.125, &[]),
    unit("kilobit", "kb", Data, 125.0, &["kbit"]),
    unit("megabit", "Mb", Data, 1.25e5, &["mbit"]),
    unit("gigabit", "Gb", Data, 1.25e8, &["gbit"]),
    unit("byte", "B", Data, 1.0, &[]),
    unit("kilobyte", "kB", Data, 1.0e3, &[]),
    unit("megabyte", "MB", Data, 1.0e6, &[]),
    unit("gigabyte", "GB", Data, 1.0e9, &[]),
    unit("terabyte", "TB", Data, 1.0e12, &[]),
    unit("kibibyte", "KiB", Data, 1_024.0, &["kib"]),
    unit("mebibyte", "MiB", Data, 1_048_576.0, &["mib"]),
    unit("gibibyte", "GiB", Data, 1_073_741_824.0, &["gib"]),
    unit("tebibyte", "TiB", Data, 1_099_511_627_776.0, &["tib"]),
];

/// Published direct factors: `value_in_to = value_in_from * factor`.
///
/// These take precedence over the base-unit pivot so results match the
/// constants printed on the converter pages.
static PAIR_FACTORS: &[(&str, &str, f64)] = &[
    ("hectare", "acre", ACRES_PER_HECTARE),
    ("kilogram", "pound", 2.20462),
    ("kilometer", "mile", 0.621371),
    ("meter", "foot", 3.28084),
    ("liter", "gallon", 0.264172),
];

/// All units of one dimension.
pub fn units(dimension: Dimension) -> impl Iterator<Item = &'static Unit> {
    UNITS.iter().filter(move |u| u.dimension == dimension)
}

/// Resolve a unit by id, symbol or alias, ignoring case and plural "s".
///
/// Data symbols are the exception: "MB" is a megabyte and "Mb" a megabit.
pub fn find_unit(name: &str) -> CalcResult<&'static Unit> {
    if let Some(unit) = data_symbol(name.trim()) {
        return Ok(unit);
    }
    let key = name.trim().to_lowercase().replace([' ', '-'], "_");
    lookup_key(&key)
        .or_else(|| key.strip_suffix('s').and_then(lookup_key))
        .ok_or_else(|| CalcError::UnknownUnit(name.to_string()))
}

/// Data symbol match where only the prefix ignores case: "KB" is a kilobyte,
/// "kb" a kilobit.
fn data_symbol(name: &str) -> Option<&'static Unit> {
    let last = name.chars().last().filter(|c| matches!(c, 'b' | 'B'))?;
    UNITS.iter().find(|u| {
        u.dimension == Dimension::Data
            && u.symbol.ends_with(last)
            && u.symbol.eq_ignore_ascii_case(name)
    })
}

fn lookup_key(key: &str) -> Option<&'static Unit> {
    UNITS
        .iter()
        .find(|u| u.id == key)
        .or_else(|| UNITS.iter().find(|u| u.aliases.contains(&key)))
}

// ---------------------------------------------------------------------------
// Factor conversion
// ---------------------------------------------------------------------------

/// How a factor was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorSource {
    Identity,
    Direct,
    Inverse,
    BaseUnit,
}

/// Multiplier taking a value in `from` to `to`.
pub fn conversion_factor(from: &Unit, to: &Unit) -> CalcResult<(f64, FactorSource)> {
    if from.dimension != to.dimension {
        return Err(CalcError::invalid(
            "to",
            format!(
                "Cannot convert {:?} unit '{}' to {:?} unit '{}'",
                from.dimension, from.id, to.dimension, to.id
            ),
        ));
    }
    if from.id == to.id {
        return Ok((1.0, FactorSource::Identity));
    }
    for &(a, b, f) in PAIR_FACTORS {
        if a == from.id && b == to.id {
            return Ok((f, FactorSource::Direct));
        }
        if a == to.id && b == from.id {
            return Ok((1.0 / f, FactorSource::Inverse));
        }
    }
    Ok((from.to_base / to.to_base, FactorSource::BaseUnit))
}

/// Convert `value` between two named units.
pub fn convert_value(value: f64, from: &str, to: &str) -> CalcResult<f64> {
    let (factor, _) = conversion_factor(find_unit(from)?, find_unit(to)?)?;
    Ok(value * factor)
}

pub fn hectares_to_acres(hectares: f64) -> f64 {
    hectares * ACRES_PER_HECTARE
}

pub fn acres_to_hectares(acres: f64) -> f64 {
    acres / ACRES_PER_HECTARE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInput {
    pub value: f64,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub value: f64,
    pub from: String,
    pub to: String,
    pub factor: f64,
    pub factor_source: FactorSource,
}

/// Unit conversion calculator.
pub fn convert(input: &ConversionInput) -> CalcResult<ComputationOutput<ConversionOutput>> {
    let start = Instant::now();
    require_finite("value", input.value)?;

    let from = find_unit(&input.from)?;
    let to = find_unit(&input.to)?;
    let (factor, factor_source) = conversion_factor(from, to)?;

    let output = ConversionOutput {
        value: input.value * factor,
        from: from.id.to_string(),
        to: to.id.to_string(),
        factor,
        factor_source,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Unit conversion",
        &serde_json::json!({ "dimension": from.dimension }),
        Vec::new(),
        elapsed,
        Precision::Float64,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub fn parse(name: &str) -> CalcResult<Self> {
        match name.trim().trim_start_matches('°').to_lowercase().as_str() {
            "c" | "celsius" | "centigrade" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            "k" | "kelvin" => Ok(TemperatureUnit::Kelvin),
            _ => Err(CalcError::UnknownUnit(name.to_string())),
        }
    }

    fn to_kelvin(self, v: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => v + 273.15,
            TemperatureUnit::Fahrenheit => (v - 32.0) * 5.0 / 9.0 + 273.15,
            TemperatureUnit::Kelvin => v,
        }
    }

    fn from_kelvin(self, k: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => k - 273.15,
            TemperatureUnit::Fahrenheit => (k - 273.15) * 9.0 / 5.0 + 32.0,
            TemperatureUnit::Kelvin => k,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureInput {
    pub value: f64,
    pub from: TemperatureUnit,
    pub to: TemperatureUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureOutput {
    pub value: f64,
    pub kelvin: f64,
}

/// Affine temperature conversion through Kelvin.
pub fn convert_temperature(
    input: &TemperatureInput,
) -> CalcResult<ComputationOutput<TemperatureOutput>> {
    let start = Instant::now();
    require_finite("value", input.value)?;

    let kelvin = input.from.to_kelvin(input.value);
    if kelvin < 0.0 {
        return Err(CalcError::invalid("value", "Temperature is below absolute zero"));
    }

    let output = TemperatureOutput {
        value: if input.from == input.to {
            input.value
        } else {
            input.to.from_kelvin(kelvin)
        },
        kelvin,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Temperature conversion",
        &serde_json::json!({ "pivot": "kelvin" }),
        Vec::new(),
        elapsed,
        Precision::Float64,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_ten_hectares_in_acres() {
        assert_abs_diff_eq!(hectares_to_acres(10.0), 24.7105, epsilon = 1e-12);
        let via_table = convert_value(10.0, "hectares", "acres").unwrap();
        assert_abs_diff_eq!(via_table, 24.7105, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_pair_factor() {
        let v = convert_value(24.7105, "ac", "ha").unwrap();
        assert_relative_eq!(v, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_base_unit_pivot() {
        let feet = convert_value(1.0, "mile", "feet").unwrap();
        assert_relative_eq!(feet, 5280.0, max_relative = 1e-12);
        let mib = convert_value(1.0, "gib", "mib").unwrap();
        assert_relative_eq!(mib, 1024.0, max_relative = 1e-12);
        let lb = convert_value(16.0, "oz", "lb").unwrap();
        assert_relative_eq!(lb, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_find_unit_case_and_plural() {
        assert_eq!(find_unit("Kilometers").unwrap().id, "kilometer");
        assert_eq!(find_unit("square feet").unwrap().id, "square_foot");
        assert_eq!(find_unit("bit").unwrap().id, "bit");
        assert_eq!(find_unit("B").unwrap().id, "byte");
        assert!(matches!(find_unit("furlongs"), Err(CalcError::UnknownUnit(_))));
    }

    #[test]
    fn test_data_symbol_case_picks_bit_or_byte() {
        assert_eq!(find_unit("MB").unwrap().id, "megabyte");
        assert_eq!(find_unit("Mb").unwrap().id, "megabit");
        assert_eq!(find_unit("KB").unwrap().id, "kilobyte");
        assert_eq!(find_unit("kb").unwrap().id, "kilobit");
        assert_eq!(find_unit("b").unwrap().id, "bit");
        assert_eq!(find_unit("GiB").unwrap().id, "gibibyte");
        assert_eq!(find_unit("lb").unwrap().id, "pound");
        assert_relative_eq!(convert_value(1.0, "MB", "Mb").unwrap(), 8.0, max_relative = 1e-12);
    }

    #[test]
    fn test_cross_dimension_is_rejected() {
        let err = convert_value(1.0, "kg", "m").unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_convert_envelope() {
        let out = convert(&ConversionInput {
            value: 2.0,
            from: "kg".into(),
            to: "lb".into(),
        })
        .unwrap();
        assert_abs_diff_eq!(out.result.value, 4.40924, epsilon = 1e-12);
        assert_eq!(out.result.factor_source, FactorSource::Direct);
    }

    #[test]
    fn test_convert_rejects_nan() {
        let res = convert(&ConversionInput {
            value: f64::NAN,
            from: "kg".into(),
            to: "lb".into(),
        });
        assert!(matches!(res, Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_temperature() {
        let out = convert_temperature(&TemperatureInput {
            value: 100.0,
            from: TemperatureUnit::Celsius,
            to: TemperatureUnit::Fahrenheit,
        })
        .unwrap();
        assert_abs_diff_eq!(out.result.value, 212.0, epsilon = 1e-9);

        let out = convert_temperature(&TemperatureInput {
            value: -40.0,
            from: TemperatureUnit::Fahrenheit,
            to: TemperatureUnit::Celsius,
        })
        .unwrap();
        assert_abs_diff_eq!(out.result.value, -40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_temperature_below_absolute_zero() {
        let res = convert_temperature(&TemperatureInput {
            value: -300.0,
            from: TemperatureUnit::Celsius,
            to: TemperatureUnit::Kelvin,
        });
        assert!(matches!(res, Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_temperature_parse() {
        assert_eq!(TemperatureUnit::parse("°F").unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!(TemperatureUnit::parse("kelvin").unwrap(), TemperatureUnit::Kelvin);
        assert!(TemperatureUnit::parse("rankine").is_err());
    }
}
