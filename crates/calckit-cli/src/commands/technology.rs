use clap::{Args, ValueEnum};
use serde_json::Value;

use calckit_core::technology::download_time::{self, BandwidthUnit, DownloadInput};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BandwidthArg {
    Bps,
    Kbps,
    Mbps,
    Gbps,
}

impl From<BandwidthArg> for BandwidthUnit {
    fn from(b: BandwidthArg) -> Self {
        match b {
            BandwidthArg::Bps => BandwidthUnit::Bps,
            BandwidthArg::Kbps => BandwidthUnit::Kbps,
            BandwidthArg::Mbps => BandwidthUnit::Mbps,
            BandwidthArg::Gbps => BandwidthUnit::Gbps,
        }
    }
}

/// Arguments for download time
#[derive(Args)]
pub struct DownloadTimeArgs {
    /// File size
    #[arg(long)]
    pub size: Option<f64>,

    /// Unit of --size (MB, GB, GiB, ...)
    #[arg(long, default_value = "MB")]
    pub size_unit: String,

    /// Line speed
    #[arg(long)]
    pub bandwidth: Option<f64>,

    /// Unit of --bandwidth
    #[arg(long, value_enum, default_value = "mbps")]
    pub bandwidth_unit: BandwidthArg,

    /// Protocol overhead in percent
    #[arg(long, default_value = "0")]
    pub overhead: f64,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_download_time(args: DownloadTimeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dl_input: DownloadInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        DownloadInput {
            size: args.size.ok_or("--size is required (or provide --input)")?,
            size_unit: args.size_unit,
            bandwidth: args
                .bandwidth
                .ok_or("--bandwidth is required (or provide --input)")?,
            bandwidth_unit: args.bandwidth_unit.into(),
            overhead_pct: args.overhead,
        }
    };
    let result = download_time::download_time(&dl_input)?;
    Ok(serde_json::to_value(result)?)
}
