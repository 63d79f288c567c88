//! `promo-eda` library crate.
//!
//! The binary (`promo`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pure derivation functions can be reused outside the CLI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod stats;
