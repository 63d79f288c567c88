//! Export derived records (CSV), the report (JSON) and raw sales (CSV).
//!
//! Exports are meant to be easy to consume in spreadsheets or downstream scripts.
//! The promotion state leaves the crate only here, as its numeric code.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::domain::{DerivedRecord, SalesRecord};
use crate::error::AppError;
use crate::io::ingest::{
    COL_BASE_PRICE, COL_DATE, COL_IS_HOLIDAY, COL_PRICE, COL_PRODUCT, COL_STORE, COL_UNITS,
};
use crate::report::Report;

#[derive(Debug, Serialize)]
struct DerivedRow {
    store: u32,
    product: u32,
    date: NaiveDate,
    is_holiday: u8,
    base_price: Decimal,
    price: Decimal,
    weekly_units_sold: u64,
    weekly_sales: Decimal,
    year: i32,
    month: u32,
    day: u32,
    week_of_year: u32,
    promotion: i8,
}

impl From<&DerivedRecord> for DerivedRow {
    fn from(d: &DerivedRecord) -> Self {
        let r = d.record();
        let cal = d.calendar();
        Self {
            store: r.store,
            product: r.product,
            date: r.date,
            is_holiday: u8::from(r.is_holiday),
            base_price: r.base_price,
            price: r.price,
            weekly_units_sold: r.weekly_units_sold,
            weekly_sales: d.weekly_sales(),
            year: cal.year,
            month: cal.month,
            day: cal.day_of_month,
            week_of_year: cal.week_of_year,
            promotion: d.promotion().code(),
        }
    }
}

/// Write augmented records to a CSV file.
pub fn write_derived_csv(path: &Path, records: &[DerivedRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| create_error("export CSV", path, e))?;
    write_derived(file, records)?;
    info!(path = %path.display(), rows = records.len(), "wrote derived CSV");
    Ok(())
}

/// Write augmented records as CSV to any writer.
pub fn write_derived<W: Write>(out: W, records: &[DerivedRecord]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(out);
    for d in records {
        wtr.serialize(DerivedRow::from(d))
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the report as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &Report) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| create_error("report JSON", path, e))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(4, format!("Failed to write report JSON: {e}")))?;
    info!(path = %path.display(), "wrote report JSON");
    Ok(())
}

/// Write raw sales records using the input schema, so the file can be read back
/// with `load_sales`.
pub fn write_sales_csv(path: &Path, records: &[SalesRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| create_error("sales CSV", path, e))?;
    write_sales(file, records)?;
    info!(path = %path.display(), rows = records.len(), "wrote sales CSV");
    Ok(())
}

pub fn write_sales<W: Write>(out: W, records: &[SalesRecord]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(out);
    let to_err = |e: csv::Error| AppError::new(4, format!("Failed to write sales CSV: {e}"));

    wtr.write_record([
        COL_STORE,
        COL_PRODUCT,
        COL_DATE,
        COL_IS_HOLIDAY,
        COL_BASE_PRICE,
        COL_PRICE,
        COL_UNITS,
    ])
    .map_err(to_err)?;

    for r in records {
        wtr.write_record([
            r.store.to_string(),
            r.product.to_string(),
            r.date.format("%Y-%m-%d").to_string(),
            u8::from(r.is_holiday).to_string(),
            r.base_price.to_string(),
            r.price.to_string(),
            r.weekly_units_sold.to_string(),
        ])
        .map_err(to_err)?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush sales CSV: {e}")))?;
    Ok(())
}

fn create_error(what: &str, path: &Path, e: std::io::Error) -> AppError {
    AppError::new(4, format!("Failed to create {what} '{}': {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive_record;
    use crate::io::ingest::read_sales;
    use rust_decimal_macros::dec;

    fn record(price: Decimal, units: u64) -> SalesRecord {
        SalesRecord {
            store: 3,
            product: 2,
            date: NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            is_holiday: true,
            base_price: dec!(10.00),
            price,
            weekly_units_sold: units,
        }
    }

    #[test]
    fn derived_csv_has_expected_columns_and_codes() {
        let rows = vec![
            derive_record(record(dec!(10.00), 4)),
            derive_record(record(dec!(7.50), 10)),
            derive_record(record(dec!(12.00), 1)),
        ];
        let mut buf = Vec::new();
        write_derived(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            concat!(
                "store,product,date,is_holiday,base_price,price,weekly_units_sold,",
                "weekly_sales,year,month,day,week_of_year,promotion"
            )
        );
        assert_eq!(lines[1], "3,2,2021-12-31,1,10.00,10.00,4,40.00,2021,12,31,52,0");
        assert_eq!(lines[2], "3,2,2021-12-31,1,10.00,7.50,10,75.00,2021,12,31,52,1");
        assert_eq!(lines[3], "3,2,2021-12-31,1,10.00,12.00,1,12.00,2021,12,31,52,-1");
    }

    #[test]
    fn sales_csv_reads_back() {
        let records = vec![record(dec!(8.99), 12), record(dec!(10.00), 0)];
        let mut buf = Vec::new();
        write_sales(&mut buf, &records).unwrap();

        let ingest = read_sales(buf.as_slice(), true).unwrap();
        assert!(ingest.row_errors.is_empty());
        assert_eq!(ingest.records, records);
    }
}
