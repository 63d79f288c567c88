//! Reporting: assemble every descriptive table for one run.
//!
//! `build_report` only computes; `format` turns the result into terminal text
//! and `io::export` writes it as JSON.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::domain::{DerivedRecord, Dimension, Metric};
use crate::error::AggregateError;
use crate::io::ingest::IngestedData;
use crate::stats::{
    Ecdf, EcdfCheckpoint, GroupDescribe, GroupMean, GroupTotal, PriceLevels, PriceResponse,
    group_describe, group_means, group_totals, price_levels, price_response,
};

pub mod format;

pub use format::*;

/// Probabilities reported for the units/sales distributions.
pub const ECDF_CHECKPOINTS: [f64; 4] = [0.5, 0.8, 0.9, 1.0];

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
    pub stores: Vec<u32>,
    pub products: Vec<u32>,
    pub date_min: NaiveDate,
    pub date_max: NaiveDate,
}

/// All tables of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub dataset: DatasetSummary,
    /// Messages for rows that were skipped during ingest.
    pub row_errors: Vec<String>,

    pub units_distribution: Vec<EcdfCheckpoint>,
    pub sales_distribution: Vec<EcdfCheckpoint>,

    pub sales_by_store: Vec<GroupDescribe>,
    pub totals_by_store: Vec<GroupTotal>,
    pub totals_by_product: Vec<GroupTotal>,

    pub price_by_product_holiday: Vec<GroupMean>,
    pub units_by_product_holiday: Vec<GroupMean>,
    pub units_by_store_holiday: Vec<GroupMean>,

    pub units_by_month: Vec<GroupMean>,
    pub units_by_store_month: Vec<GroupMean>,
    pub units_by_product_month: Vec<GroupMean>,

    pub totals_by_promotion: Vec<GroupTotal>,
    pub units_by_store_promotion: Vec<GroupMean>,
    pub units_by_product_promotion: Vec<GroupMean>,

    pub price_levels: Vec<PriceLevels>,
    pub price_response: Vec<PriceResponse>,
}

/// Compute every report table from derived records.
pub fn build_report(
    ingest: &IngestedData,
    records: &[DerivedRecord],
) -> Result<Report, AggregateError> {
    use Dimension::{Holiday, Month, Product, Promotion, Store};

    let units: Vec<f64> = records
        .iter()
        .map(|r| r.record().weekly_units_sold as f64)
        .collect();
    let sales: Vec<f64> = records
        .iter()
        .map(|r| r.weekly_sales().to_f64().unwrap_or(f64::NAN))
        .collect();

    Ok(Report {
        dataset: DatasetSummary {
            rows_read: ingest.rows_read,
            rows_used: ingest.rows_used,
            rows_skipped: ingest.row_errors.len(),
            stores: ingest.stats.stores.iter().copied().collect(),
            products: ingest.stats.products.iter().copied().collect(),
            date_min: ingest.stats.date_min,
            date_max: ingest.stats.date_max,
        },
        row_errors: ingest.row_errors.iter().map(ToString::to_string).collect(),

        units_distribution: Ecdf::from_values(&units).checkpoints(&ECDF_CHECKPOINTS),
        sales_distribution: Ecdf::from_values(&sales).checkpoints(&ECDF_CHECKPOINTS),

        sales_by_store: group_describe(records, &[Store], Metric::SalesAmount),
        totals_by_store: group_totals(records, &[Store])?,
        totals_by_product: group_totals(records, &[Product])?,

        price_by_product_holiday: group_means(records, &[Product, Holiday], Metric::Price),
        units_by_product_holiday: group_means(records, &[Product, Holiday], Metric::UnitsSold),
        units_by_store_holiday: group_means(records, &[Store, Holiday], Metric::UnitsSold),

        units_by_month: group_means(records, &[Month], Metric::UnitsSold),
        units_by_store_month: group_means(records, &[Store, Month], Metric::UnitsSold),
        units_by_product_month: group_means(records, &[Product, Month], Metric::UnitsSold),

        totals_by_promotion: group_totals(records, &[Promotion])?,
        units_by_store_promotion: group_means(records, &[Store, Promotion], Metric::UnitsSold),
        units_by_product_promotion: group_means(records, &[Product, Promotion], Metric::UnitsSold),

        price_levels: price_levels(records),
        price_response: price_response(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_all;
    use crate::io::ingest::read_sales;

    const CSV: &str = "Store,Product,Date,Is_Holiday,Base Price,Price,Weekly_Units_Sold\n\
        1,1,2010-02-05,0,10,10,100\n\
        1,1,2010-02-12,1,10,8,160\n\
        1,2,2010-02-05,0,4,4,300\n\
        2,1,2010-03-05,0,10,10,80\n\
        2,2,2010-03-12,0,4,3.5,420\n\
        2,2,2010-03-19,0,4,oops,1\n";

    #[test]
    fn report_covers_dataset() {
        let ingest = read_sales(CSV.as_bytes(), false).unwrap();
        let records = derive_all(&ingest.records);
        let report = build_report(&ingest, &records).unwrap();

        assert_eq!(report.dataset.rows_read, 6);
        assert_eq!(report.dataset.rows_used, 5);
        assert_eq!(report.dataset.rows_skipped, 1);
        assert_eq!(report.row_errors.len(), 1);
        assert!(report.row_errors[0].contains("line 7"));

        assert_eq!(report.dataset.stores, vec![1, 2]);
        assert_eq!(report.totals_by_store[0].units, 560);
        assert_eq!(report.totals_by_promotion.len(), 2);
        assert_eq!(report.units_by_month.len(), 2);
        assert_eq!(report.units_distribution.last().map(|c| c.value), Some(420.0));
        assert_eq!(report.price_response.len(), 2);
    }
}
