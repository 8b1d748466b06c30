mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::catalogue::{ListArgs, RunArgs};
use commands::conversions::{ConvertArgs, LookupArgs, TemperatureArgs};
use commands::finance::{
    BondPriceArgs, CompoundInterestArgs, ImpliedVolArgs, LoanArgs, OptionPriceArgs,
    SimpleInterestArgs, YtmArgs,
};
use commands::health::{BmiArgs, BmrArgs};
use commands::technology::DownloadTimeArgs;

/// Everyday calculators: finance, health, unit conversions and more
#[derive(Parser)]
#[command(
    name = "calckit",
    version,
    about = "Everyday calculators from the command line",
    long_about = "Runs the calckit calculators from the command line. Inputs come from \
                  flags, a JSON or YAML file given with --input, or JSON piped on stdin. \
                  Rates are entered in percent (5 means 5%)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", env = "CALCKIT_OUTPUT", global = true)]
    output: OutputFormat,

    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", env = "CALCKIT_LOG", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Yield to maturity of a fixed-coupon bond
    Ytm(YtmArgs),
    /// Price a fixed-coupon bond at a given yield
    BondPrice(BondPriceArgs),
    /// Black-Scholes price of a European option
    OptionPrice(OptionPriceArgs),
    /// Implied volatility from an option's market price
    ImpliedVol(ImpliedVolArgs),
    /// Simple (non-compounding) interest
    SimpleInterest(SimpleInterestArgs),
    /// Compound interest with optional periodic deposits
    CompoundInterest(CompoundInterestArgs),
    /// Loan payment and amortisation
    Loan(LoanArgs),
    /// Body mass index
    Bmi(BmiArgs),
    /// Basal metabolic rate and daily energy needs
    Bmr(BmrArgs),
    /// Convert between area, length, mass, volume and data units
    Convert(ConvertArgs),
    /// Convert between Celsius, Fahrenheit and Kelvin
    Temperature(TemperatureArgs),
    /// Size-chart conversion through a lookup table
    Lookup(LookupArgs),
    /// Time to download a file at a given bandwidth
    DownloadTime(DownloadTimeArgs),
    /// List available calculators
    List(ListArgs),
    /// Run any calculator by id with a JSON input
    Run(RunArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Log to stderr so stdout carries only the calculator output.
fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Ytm(args) => commands::finance::run_ytm(args),
        Commands::BondPrice(args) => commands::finance::run_bond_price(args),
        Commands::OptionPrice(args) => commands::finance::run_option_price(args),
        Commands::ImpliedVol(args) => commands::finance::run_implied_vol(args),
        Commands::SimpleInterest(args) => commands::finance::run_simple_interest(args),
        Commands::CompoundInterest(args) => commands::finance::run_compound_interest(args),
        Commands::Loan(args) => commands::finance::run_loan(args),
        Commands::Bmi(args) => commands::health::run_bmi(args),
        Commands::Bmr(args) => commands::health::run_bmr(args),
        Commands::Convert(args) => commands::conversions::run_convert(args),
        Commands::Temperature(args) => commands::conversions::run_temperature(args),
        Commands::Lookup(args) => commands::conversions::run_lookup(args),
        Commands::DownloadTime(args) => commands::technology::run_download_time(args),
        Commands::List(args) => commands::catalogue::run_list(args),
        Commands::Run(args) => commands::catalogue::run_by_id(args),
        Commands::Version => {
            println!("calckit {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "calculator failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
