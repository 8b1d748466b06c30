use clap::Args;
use serde_json::Value;

use calckit_core::conversions::lookup::{self, LookupInput, TableRef};
use calckit_core::conversions::units::{self, ConversionInput, TemperatureInput, TemperatureUnit};

use crate::input;

/// Arguments for unit conversion
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ConvertArgs {
    /// Value to convert
    pub value: Option<f64>,

    /// Source unit (id, symbol or alias: ha, acre, km, lb, GiB, ...)
    #[arg(long)]
    pub from: Option<String>,

    /// Target unit
    #[arg(long)]
    pub to: Option<String>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let conv_input: ConversionInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        ConversionInput {
            value: args.value.ok_or("a value is required (or provide --input)")?,
            from: args.from.ok_or("--from is required (or provide --input)")?,
            to: args.to.ok_or("--to is required (or provide --input)")?,
        }
    };
    let result = units::convert(&conv_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for temperature conversion
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct TemperatureArgs {
    /// Temperature to convert
    pub value: Option<f64>,

    /// Source scale (C, F, K)
    #[arg(long)]
    pub from: Option<String>,

    /// Target scale (C, F, K)
    #[arg(long)]
    pub to: Option<String>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_temperature(args: TemperatureArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let temp_input: TemperatureInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        let from = args.from.ok_or("--from is required (or provide --input)")?;
        let to = args.to.ok_or("--to is required (or provide --input)")?;
        TemperatureInput {
            value: args.value.ok_or("a value is required (or provide --input)")?,
            from: TemperatureUnit::parse(&from)?,
            to: TemperatureUnit::parse(&to)?,
        }
    };
    let result = units::convert_temperature(&temp_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for size-chart lookups
#[derive(Args)]
pub struct LookupArgs {
    /// Built-in table id (womens_shoe_sizes, mens_shoe_sizes, ring_sizes)
    #[arg(long)]
    pub table: Option<String>,

    /// Column to match, e.g. US
    #[arg(long)]
    pub from: Option<String>,

    /// Value to find in the --from column
    #[arg(long)]
    pub value: Option<String>,

    /// Column to read, e.g. EU
    #[arg(long)]
    pub to: Option<String>,

    /// List the built-in tables instead of converting
    #[arg(long)]
    pub tables: bool,

    /// Path to JSON/YAML input file; may carry an inline table
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_lookup(args: LookupArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.tables {
        let tables: Vec<Value> = lookup::builtin_tables()?
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "name": t.name,
                    "columns": t.columns.join(", "),
                    "rows": t.rows.len(),
                })
            })
            .collect();
        return Ok(Value::Array(tables));
    }

    let lookup_input: LookupInput = if let Some(p) = input::read_input(args.input.as_deref())? {
        p
    } else {
        LookupInput {
            table: TableRef::Builtin(args.table.ok_or("--table is required (or provide --input)")?),
            from: args.from.ok_or("--from is required (or provide --input)")?,
            value: args.value.ok_or("--value is required (or provide --input)")?,
            to: args.to.ok_or("--to is required (or provide --input)")?,
        }
    };
    let result = lookup::lookup(&lookup_input)?;
    Ok(serde_json::to_value(result)?)
}
