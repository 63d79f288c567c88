//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - derived CSV, report JSON and sales CSV exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
