//! Shared analysis pipeline used by every subcommand that reads sales data.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> derive -> aggregate -> report
//!
//! Each stage returns a new value; nothing is mutated in place.

use tracing::{debug, info};

use crate::domain::{AnalysisConfig, DerivedRecord};
use crate::error::AppError;
use crate::features::derive_all;
use crate::io::ingest::{IngestedData, load_sales};
use crate::report::{Report, build_report};

/// All computed outputs of a single analysis run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub records: Vec<DerivedRecord>,
    pub report: Report,
}

/// Load the configured CSV and run the full pipeline.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    let ingest = load_sales(&config.csv_path, config.strict)?;
    run_with_ingest(ingest)
}

/// Run derivation and aggregation over already-ingested data.
pub fn run_with_ingest(ingest: IngestedData) -> Result<RunOutput, AppError> {
    let records = derive_all(&ingest.records);
    debug!(records = records.len(), "derived features");

    let report = build_report(&ingest, &records)?;
    info!(
        records = records.len(),
        stores = report.dataset.stores.len(),
        products = report.dataset.products.len(),
        "analysis complete"
    );

    Ok(RunOutput {
        ingest,
        records,
        report,
    })
}
