//! Command-line parsing for the promotion sales explorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the derivation/aggregation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Environment variable holding the default input CSV path.
pub const ENV_SALES_CSV: &str = "PROMO_SALES_CSV";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "promo", version, about = "Weekly sales promotion explorer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Derive features, print the exploratory report, and optionally plot/export.
    Report(ReportArgs),
    /// Write the augmented rows (sales, calendar fields, promotion code) to CSV.
    Derive(DeriveArgs),
    /// Print ECDF checkpoints and an ASCII ECDF chart for one column.
    Ecdf(EcdfArgs),
    /// Write a reproducible synthetic sales CSV.
    Generate(GenerateArgs),
}

/// Input options shared by every command that reads sales data.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Weekly sales CSV (falls back to $PROMO_SALES_CSV).
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Fail on the first bad row instead of skipping and reporting it.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Render ASCII charts (units ECDF and monthly profile).
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the report to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output CSV for the augmented rows.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

/// Column an ECDF is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EcdfColumn {
    /// Weekly units sold.
    Units,
    /// Weekly sales amount.
    Sales,
}

#[derive(Debug, Args, Clone)]
pub struct EcdfArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_enum, default_value_t = EcdfColumn::Units)]
    pub column: EcdfColumn,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output CSV path.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 9)]
    pub stores: usize,

    #[arg(long, default_value_t = 3)]
    pub products: usize,

    #[arg(long, default_value_t = 156)]
    pub weeks: usize,

    /// Random seed; the same seed always produces the same file.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
