//! Aggregations over derived records.
//!
//! - describe-style summaries (`describe`)
//! - group-by totals/means (`group`)
//! - empirical CDF (`ecdf`)
//! - price levels and price/units fit line (`response`)

pub mod describe;
pub mod ecdf;
pub mod group;
pub mod response;

pub use describe::*;
pub use ecdf::*;
pub use group::*;
pub use response::*;
