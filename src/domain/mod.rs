//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw input rows (`SalesRecord`) and their augmented form (`DerivedRecord`)
//! - the promotion label (`PromotionState`) and calendar fields
//! - grouping dimensions/metrics for aggregation
//! - the run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
