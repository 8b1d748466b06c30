use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::conversions::units::{conversion_factor, find_unit, Dimension};
use crate::error::CalcError;
use crate::types::{
    require_finite, require_positive, with_metadata, ComputationOutput, Percent, Precision,
};
use crate::CalcResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandwidthUnit {
    Bps,
    Kbps,
    #[default]
    Mbps,
    Gbps,
}

impl BandwidthUnit {
    fn bits_per_second(self) -> f64 {
        match self {
            BandwidthUnit::Bps => 1.0,
            BandwidthUnit::Kbps => 1.0e3,
            BandwidthUnit::Mbps => 1.0e6,
            BandwidthUnit::Gbps => 1.0e9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadInput {
    pub size: f64,
    /// Any data unit from the conversions table ("MB", "GiB", ...).
    pub size_unit: String,
    pub bandwidth: f64,
    #[serde(default)]
    pub bandwidth_unit: BandwidthUnit,
    /// Share of the line lost to protocol overhead, percent.
    #[serde(default)]
    pub overhead_pct: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutput {
    pub seconds: f64,
    /// "1h 02m 03s"
    pub human: String,
    pub size_bits: f64,
    pub effective_bits_per_second: f64,
}

/// Time to transfer a file over a link of the given speed.
pub fn download_time(input: &DownloadInput) -> CalcResult<ComputationOutput<DownloadOutput>> {
    let start = Instant::now();

    require_positive("size", input.size)?;
    require_positive("bandwidth", input.bandwidth)?;
    require_finite("overhead_pct", input.overhead_pct)?;
    if !(0.0..100.0).contains(&input.overhead_pct) {
        return Err(CalcError::invalid(
            "overhead_pct",
            "Overhead must be at least 0% and below 100%",
        ));
    }

    let unit = find_unit(&input.size_unit)?;
    if unit.dimension != Dimension::Data {
        return Err(CalcError::invalid(
            "size_unit",
            format!("'{}' is not a data size unit", input.size_unit),
        ));
    }
    let bit = find_unit("bit")?;
    let (to_bits, _) = conversion_factor(unit, bit)?;

    let size_bits = input.size * to_bits;
    let line_rate = input.bandwidth * input.bandwidth_unit.bits_per_second();
    let effective = line_rate * (1.0 - input.overhead_pct / 100.0);
    let seconds = size_bits / effective;

    let output = DownloadOutput {
        seconds,
        human: format_duration(seconds),
        size_bits,
        effective_bits_per_second: effective,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "bandwidth_prefixes": "decimal (1 Mbps = 10^6 bit/s)",
        "overhead_pct": input.overhead_pct,
    });

    Ok(with_metadata(
        "Download time",
        &assumptions,
        Vec::new(),
        elapsed,
        Precision::Float64,
        output,
    ))
}

/// Whole seconds, rounded up, as "Xd Yh ZZm WWs" with leading zero units dropped.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.ceil().max(0.0) as u64;
    let (d, rem) = (total / 86_400, total % 86_400);
    let (h, rem) = (rem / 3_600, rem % 3_600);
    let (m, s) = (rem / 60, rem % 60);

    if d > 0 {
        format!("{d}d {h}h {m:02}m {s:02}s")
    } else if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_one_gigabyte_at_100_mbps() {
        // 8e9 bits / 1e8 bit/s = 80 s
        let out = download_time(&DownloadInput {
            size: 1.0,
            size_unit: "GB".into(),
            bandwidth: 100.0,
            bandwidth_unit: BandwidthUnit::Mbps,
            overhead_pct: 0.0,
        })
        .unwrap();
        assert_relative_eq!(out.result.seconds, 80.0, max_relative = 1e-12);
        assert_eq!(out.result.human, "1m 20s");
    }

    #[test]
    fn test_overhead_slows_transfer() {
        let out = download_time(&DownloadInput {
            size: 1.0,
            size_unit: "GB".into(),
            bandwidth: 100.0,
            bandwidth_unit: BandwidthUnit::Mbps,
            overhead_pct: 20.0,
        })
        .unwrap();
        assert_relative_eq!(out.result.seconds, 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_non_data_unit() {
        let res = download_time(&DownloadInput {
            size: 1.0,
            size_unit: "kg".into(),
            bandwidth: 100.0,
            bandwidth_unit: BandwidthUnit::Mbps,
            overhead_pct: 0.0,
        });
        assert!(matches!(res, Err(CalcError::InvalidInput { .. })));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.2), "1s");
        assert_eq!(format_duration(3_723.0), "1h 02m 03s");
        assert_eq!(format_duration(90_061.0), "1d 1h 01m 01s");
    }
}
