use clap::{Args, ValueEnum};
use serde_json::Value;

use calckit_core::registry::{self, Category};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Finance,
    Health,
    Conversions,
    Technology,
}

impl From<CategoryArg> for Category {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Finance => Category::Finance,
            CategoryArg::Health => Category::Health,
            CategoryArg::Conversions => Category::Conversions,
            CategoryArg::Technology => Category::Technology,
        }
    }
}

/// Arguments for listing calculators
#[derive(Args)]
pub struct ListArgs {
    /// Only show one category
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,
}

pub fn run_list(args: ListArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let list = match args.category {
        Some(c) => registry::by_category(c.into()),
        None => registry::catalogue(),
    };
    Ok(serde_json::to_value(list)?)
}

/// Arguments for running a calculator by id
#[derive(Args)]
pub struct RunArgs {
    /// Calculator id, as shown by `calckit list`
    pub id: String,

    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_by_id(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err(format!("--input <file> or stdin required to run '{}'", args.id).into());
    };
    Ok(registry::run_calculator(&args.id, data)?)
}
