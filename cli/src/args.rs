//! Command-line arguments for `lpw`

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

const EXAMPLES: &str = "\
Examples:
  lpw captable.csv
  lpw captable.csv --exit-values 15M 25M 50M 100M
  lpw captable.csv --summary --detailed
  lpw captable.csv --exit-values 1.5B --format markdown

Exit value formats:
  15M, 15m      = 15 million
  1.5B, 1.5b    = 1.5 billion
  500K, 500k    = 500 thousand
  25000000      = 25 million (raw dollars)";

/// Liquidation Preference Waterfall
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "lpw", after_help = EXAMPLES)]
pub struct Cli {
    /// Path to cap table CSV file
    pub csv_file: PathBuf,

    /// Exit values to analyze (15M, 1.5B, 500K or raw dollars)
    #[arg(
        long,
        num_args = 1..,
        value_delimiter = ',',
        default_values = ["15M", "25M", "50M", "100M"],
        env = "LPW_EXIT_VALUES"
    )]
    pub exit_values: Vec<String>,

    /// Show the cap table summary
    #[arg(long)]
    pub summary: bool,

    /// Show a step-by-step analysis for each exit value
    #[arg(long)]
    pub detailed: bool,

    /// Show only the conversion analysis
    #[arg(long)]
    pub conversion_only: bool,

    /// Output format for the waterfall table
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, env = "LPW_FORMAT")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(short, long, env = "LPW_VERBOSE")]
    pub verbose: bool,
}

/// Rendering of the waterfall table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Markdown,
    Html,
    Json,
}
