//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the ingest/derive/aggregate pipeline
//! - prints reports/plots and writes optional exports
//! - generates synthetic samples

use std::path::{Path, PathBuf};

use clap::Parser;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{
    Command, DeriveArgs, ENV_SALES_CSV, EcdfArgs, EcdfColumn, GenerateArgs, InputArgs, ReportArgs,
};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::stats::Ecdf;

pub mod pipeline;

const DEFAULT_LOG_FILTER: &str = "promo_eda=info";

/// Entry point for the `promo` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    // We want `promo` and `promo --csv x.csv` to behave like `promo report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Derive(args) => handle_derive(args),
        Command::Ecdf(args) => handle_ecdf(args),
        Command::Generate(args) => handle_generate(args),
    }
}

/// Log to stderr so report output on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AnalysisConfig {
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        export_json: args.export_json.clone(),
        ..analysis_config_from_input(&args.input)?
    };
    let run = pipeline::run_analysis(&config)?;

    println!("{}", crate::report::format_report(&run.report));

    if config.plot {
        let units: Vec<f64> = run
            .records
            .iter()
            .map(|r| r.record().weekly_units_sold as f64)
            .collect();
        let ecdf = Ecdf::from_values(&units);
        println!(
            "{}",
            crate::plot::render_ecdf_plot(
                &ecdf,
                "Weekly_Units_Sold",
                config.plot_width,
                config.plot_height,
            )
        );
        println!(
            "{}",
            crate::plot::render_month_profile(
                &run.report.units_by_month,
                "Weekly_Units_Sold",
                config.plot_width,
                config.plot_height,
            )
        );
    }

    if let Some(path) = &config.export_json {
        crate::io::export::write_report_json(path, &run.report)?;
    }
    Ok(())
}

fn handle_derive(args: DeriveArgs) -> Result<(), AppError> {
    let config = AnalysisConfig {
        export_csv: Some(args.out.clone()),
        ..analysis_config_from_input(&args.input)?
    };
    let ingest = crate::io::ingest::load_sales(&config.csv_path, config.strict)?;
    let records = crate::features::derive_all(&ingest.records);

    if let Some(path) = &config.export_csv {
        crate::io::export::write_derived_csv(path, &records)?;
        println!("{}", derive_summary(records.len(), path, ingest.row_errors.len()));
    }
    Ok(())
}

/// One line per run; skipped rows are already logged individually by ingest.
fn derive_summary(rows: usize, path: &Path, skipped: usize) -> String {
    format!("Wrote {rows} derived rows to {} ({skipped} skipped)", path.display())
}

fn handle_ecdf(args: EcdfArgs) -> Result<(), AppError> {
    let config = analysis_config_from_input(&args.input)?;
    let ingest = crate::io::ingest::load_sales(&config.csv_path, config.strict)?;
    let records = crate::features::derive_all(&ingest.records);

    let (label, values): (&str, Vec<f64>) = match args.column {
        EcdfColumn::Units => (
            "Weekly_Units_Sold",
            records.iter().map(|r| r.record().weekly_units_sold as f64).collect(),
        ),
        EcdfColumn::Sales => (
            "Weekly_Sales",
            records
                .iter()
                .map(|r| r.weekly_sales().to_f64().unwrap_or(f64::NAN))
                .collect(),
        ),
    };
    let ecdf = Ecdf::from_values(&values);

    let mut out = format!("ECDF checkpoints: {label} (n={})\n", ecdf.len());
    for cp in ecdf.checkpoints(&crate::report::ECDF_CHECKPOINTS) {
        out.push_str(&format!("  p={:>4.2}  {:>12.2}\n", cp.p, cp.value));
    }
    println!("{out}");
    println!("{}", crate::plot::render_ecdf_plot(&ecdf, label, args.width, args.height));
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        stores: args.stores,
        products: args.products,
        weeks: args.weeks,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let records = generate_sample(&config)?;
    crate::io::export::write_sales_csv(&args.out, &records)?;
    println!("Wrote {} synthetic rows to {}", records.len(), args.out.display());
    Ok(())
}

/// Build the base analysis config from shared input flags.
///
/// `--csv` wins; otherwise `$PROMO_SALES_CSV` (possibly set via `.env`) is used.
pub fn analysis_config_from_input(input: &InputArgs) -> Result<AnalysisConfig, AppError> {
    let csv_path = resolve_csv_path(input.csv.clone(), std::env::var(ENV_SALES_CSV).ok())?;
    info!(path = %csv_path.display(), strict = input.strict, "input resolved");
    Ok(AnalysisConfig {
        csv_path,
        strict: input.strict,
        plot: false,
        plot_width: 72,
        plot_height: 16,
        export_json: None,
        export_csv: None,
    })
}

fn resolve_csv_path(flag: Option<PathBuf>, env: Option<String>) -> Result<PathBuf, AppError> {
    flag.or_else(|| env.filter(|s| !s.trim().is_empty()).map(PathBuf::from))
        .ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "No input CSV. Pass --csv PATH or set {ENV_SALES_CSV} (a .env file is read)."
                ),
            )
        })
}

/// Rewrite argv so `promo` defaults to `promo report`.
///
/// Rules:
/// - `promo`                      -> `promo report`
/// - `promo --csv x.csv ...`      -> `promo report --csv x.csv ...`
/// - `promo --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "derive" | "ecdf" | "generate");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_report() {
        assert_eq!(rewrite_args(argv(&["promo"])), argv(&["promo", "report"]));
        assert_eq!(
            rewrite_args(argv(&["promo", "--csv", "a.csv", "--plot"])),
            argv(&["promo", "report", "--csv", "a.csv", "--plot"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        for args in [
            argv(&["promo", "derive", "--csv", "a.csv", "--out", "b.csv"]),
            argv(&["promo", "generate", "--out", "b.csv"]),
            argv(&["promo", "--help"]),
            argv(&["promo", "-V"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn derive_summary_is_a_single_line() {
        let line = derive_summary(120, Path::new("out.csv"), 3);
        assert_eq!(line, "Wrote 120 derived rows to out.csv (3 skipped)");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn csv_flag_wins_over_env() {
        let p = resolve_csv_path(Some(PathBuf::from("flag.csv")), Some("env.csv".into())).unwrap();
        assert_eq!(p, PathBuf::from("flag.csv"));

        let p = resolve_csv_path(None, Some("env.csv".into())).unwrap();
        assert_eq!(p, PathBuf::from("env.csv"));
    }

    #[test]
    fn missing_csv_is_usage_error() {
        let err = resolve_csv_path(None, None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains(ENV_SALES_CSV));

        assert!(resolve_csv_path(None, Some("  ".into())).is_err());
    }
}
