//! CSV ingest and validation.
//!
//! This module is responsible for turning a weekly sales CSV into clean
//! `SalesRecord`s that are safe to derive features from.
//!
//! Design goals:
//! - **Strict schema** for required columns (the batch fails with exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened),
//!   unless strict mode turns any row error into a failure
//! - **No silent defaults**: a cell that does not parse is an error, never a zero
//! - **Separation of concerns**: no derivation logic here

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ByteRecord, StringRecord};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};

use crate::domain::SalesRecord;
use crate::error::{AppError, FeatureError};
use crate::features::checked_weekly_sales;

pub const COL_STORE: &str = "Store";
pub const COL_PRODUCT: &str = "Product";
pub const COL_DATE: &str = "Date";
pub const COL_IS_HOLIDAY: &str = "Is_Holiday";
pub const COL_BASE_PRICE: &str = "Base Price";
pub const COL_PRICE: &str = "Price";
pub const COL_UNITS: &str = "Weekly_Units_Sold";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_STORE,
    COL_PRODUCT,
    COL_DATE,
    COL_IS_HOLIDAY,
    COL_BASE_PRICE,
    COL_PRICE,
    COL_UNITS,
];

/// Summary of what was loaded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DatasetStats {
    pub n_records: usize,
    pub stores: BTreeSet<u32>,
    pub products: BTreeSet<u32>,
    pub date_min: NaiveDate,
    pub date_max: NaiveDate,
}

/// Ingest output: validated records + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<SalesRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<FeatureError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and validate a sales CSV from disk.
pub fn load_sales(path: &Path, strict: bool) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    info!(path = %path.display(), strict, "loading sales CSV");
    read_sales(file, strict)
}

/// Load and validate sales rows from any reader.
pub fn read_sales<R: Read>(input: R, strict: bool) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.byte_records().enumerate() {
        // +2 because:
        // - byte_records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = result
            .map_err(|e| AppError::new(2, format!("line {line}: CSV parse error: {e}")))?;

        match parse_row(&record, &header_map, line) {
            Ok(r) => records.push(r),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(line, error = %e, "skipping row");
                row_errors.push(e);
            }
        }
    }

    if strict {
        if let Some(first) = row_errors.first() {
            return Err(AppError::new(
                2,
                format!(
                    "{first} ({} row error(s) in total; strict mode rejects the batch)",
                    row_errors.len()
                ),
            ));
        }
    }

    let rows_used = records.len();
    let stats = compute_stats(&records)
        .ok_or_else(|| AppError::new(3, "No valid rows remain after validation."))?;

    info!(rows_read, rows_used, skipped = row_errors.len(), "ingest complete");
    debug!(stores = ?stats.stores, products = ?stats.products, "dataset coverage");

    Ok(IngestedData {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for col in REQUIRED_COLUMNS {
        if !header_map.contains_key(&normalize_header_name(col)) {
            return Err(FeatureError::MissingField { field: col, line: 1 }.into());
        }
    }
    Ok(())
}

fn parse_row(
    record: &ByteRecord,
    header_map: &HashMap<String, usize>,
    line: usize,
) -> Result<SalesRecord, FeatureError> {
    // Pull every required cell first so an absent value always wins over a
    // malformed one: missing data fails the batch, bad data only the row.
    let store = get_required(record, header_map, COL_STORE, line)?;
    let product = get_required(record, header_map, COL_PRODUCT, line)?;
    let date = get_required(record, header_map, COL_DATE, line)?;
    let is_holiday = get_required(record, header_map, COL_IS_HOLIDAY, line)?;
    let base_price = get_required(record, header_map, COL_BASE_PRICE, line)?;
    let price = get_required(record, header_map, COL_PRICE, line)?;
    let units = get_required(record, header_map, COL_UNITS, line)?;

    let record = SalesRecord {
        store: parse_code(store, COL_STORE, line)?,
        product: parse_code(product, COL_PRODUCT, line)?,
        date: parse_date(date, line)?,
        is_holiday: parse_flag(is_holiday, COL_IS_HOLIDAY, line)?,
        base_price: parse_price(base_price, COL_BASE_PRICE, line)?,
        price: parse_price(price, COL_PRICE, line)?,
        weekly_units_sold: parse_units(units, COL_UNITS, line)?,
    };

    // Weekly sales must be representable, otherwise derivation cannot be exact.
    if checked_weekly_sales(record.price, record.weekly_units_sold).is_none() {
        return Err(FeatureError::InvalidNumber {
            field: COL_PRICE,
            value: price.to_string(),
            line,
        });
    }
    Ok(record)
}

/// Decode one required cell. Only required cells are decoded, so stray bytes
/// in an ignored column never affect the row.
fn get_required<'a>(
    record: &'a ByteRecord,
    header_map: &HashMap<String, usize>,
    field: &'static str,
    line: usize,
) -> Result<&'a str, FeatureError> {
    let bytes = header_map
        .get(&normalize_header_name(field))
        .and_then(|idx| record.get(*idx))
        .ok_or(FeatureError::MissingField { field, line })?;
    let cell = std::str::from_utf8(bytes)
        .map_err(|_| {
            let value = String::from_utf8_lossy(bytes).into_owned();
            if field == COL_DATE {
                FeatureError::InvalidDate { value, line }
            } else {
                FeatureError::InvalidNumber { field, value, line }
            }
        })?
        .trim();
    if cell.is_empty() {
        return Err(FeatureError::MissingField { field, line });
    }
    Ok(cell)
}

fn parse_code(s: &str, field: &'static str, line: usize) -> Result<u32, FeatureError> {
    if s.starts_with('-') {
        return Err(FeatureError::NegativeValue {
            field,
            value: s.to_string(),
            line,
        });
    }
    s.parse::<u32>().map_err(|_| FeatureError::InvalidNumber {
        field,
        value: s.to_string(),
        line,
    })
}

fn parse_date(s: &str, line: usize) -> Result<NaiveDate, FeatureError> {
    // ISO dates are preferred; the US-style month-first forms are what most
    // retail exports (and the reference dataset) use.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(FeatureError::InvalidDate {
        value: s.to_string(),
        line,
    })
}

fn parse_flag(s: &str, field: &'static str, line: usize) -> Result<bool, FeatureError> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(FeatureError::InvalidNumber {
            field,
            value: s.to_string(),
            line,
        }),
    }
}

fn parse_price(s: &str, field: &'static str, line: usize) -> Result<Decimal, FeatureError> {
    let value = Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| FeatureError::InvalidNumber {
            field,
            value: s.to_string(),
            line,
        })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FeatureError::NegativeValue {
            field,
            value: s.to_string(),
            line,
        });
    }
    Ok(value)
}

fn parse_units(s: &str, field: &'static str, line: usize) -> Result<u64, FeatureError> {
    // Spreadsheet round-trips occasionally turn counts into `120.0`; accept an
    // integral decimal but never truncate a fractional one.
    let value = Decimal::from_str(s).map_err(|_| FeatureError::InvalidNumber {
        field,
        value: s.to_string(),
        line,
    })?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(FeatureError::NegativeValue {
            field,
            value: s.to_string(),
            line,
        });
    }
    if !value.fract().is_zero() {
        return Err(FeatureError::InvalidNumber {
            field,
            value: s.to_string(),
            line,
        });
    }
    value.to_u64().ok_or_else(|| FeatureError::InvalidNumber {
        field,
        value: s.to_string(),
        line,
    })
}

fn compute_stats(records: &[SalesRecord]) -> Option<DatasetStats> {
    let date_min = records.iter().map(|r| r.date).min()?;
    let date_max = records.iter().map(|r| r.date).max()?;
    Some(DatasetStats {
        n_records: records.len(),
        stores: records.iter().map(|r| r.store).collect(),
        products: records.iter().map(|r| r.product).collect(),
        date_min,
        date_max,
    })
}
