//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during derivation and aggregation
//! - exported to JSON/CSV
//! - compared directly in tests

use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One weekly observation for a (store, product) pair, as read from input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub store: u32,
    pub product: u32,
    pub date: NaiveDate,
    pub is_holiday: bool,
    /// Everyday (non-promotional) unit price.
    pub base_price: Decimal,
    /// Price actually charged that week.
    pub price: Decimal,
    pub weekly_units_sold: u64,
}

/// Price position of a week relative to the everyday price.
///
/// Variant order is the display/grouping order used by reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionState {
    /// `price == base_price`.
    NoChange,
    /// `price < base_price`.
    Discount,
    /// `price > base_price`. Not expected for regular promotions but still a valid label.
    Markup,
}

impl PromotionState {
    /// Numeric code used in exported tables (`0`, `1`, `-1`).
    pub fn code(self) -> i8 {
        match self {
            PromotionState::NoChange => 0,
            PromotionState::Discount => 1,
            PromotionState::Markup => -1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PromotionState::NoChange => "no_change",
            PromotionState::Discount => "discount",
            PromotionState::Markup => "markup",
        }
    }
}

/// Calendar decomposition of a record's date.
///
/// `year` is the calendar year; `week_of_year` is the ISO 8601 week number,
/// which can belong to the neighbouring ISO year near January 1st.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub day_of_month: u32,
    pub week_of_year: u32,
}

/// A sales record together with every field derived from it.
///
/// Fields are private: the only way to obtain one is through
/// `features::derive_record`, so derived values always agree with the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedRecord {
    record: SalesRecord,
    weekly_sales: Decimal,
    calendar: CalendarFields,
    promotion: PromotionState,
}

impl DerivedRecord {
    pub(crate) fn from_parts(
        record: SalesRecord,
        weekly_sales: Decimal,
        calendar: CalendarFields,
        promotion: PromotionState,
    ) -> Self {
        Self {
            record,
            weekly_sales,
            calendar,
            promotion,
        }
    }

    pub fn record(&self) -> &SalesRecord {
        &self.record
    }

    /// `price * weekly_units_sold`.
    pub fn weekly_sales(&self) -> Decimal {
        self.weekly_sales
    }

    pub fn calendar(&self) -> CalendarFields {
        self.calendar
    }

    pub fn promotion(&self) -> PromotionState {
        self.promotion
    }

    /// `1 - price / base_price`; `None` when the base price is zero.
    pub fn discount_depth(&self) -> Option<Decimal> {
        let r = &self.record;
        if r.base_price.is_zero() {
            return None;
        }
        r.price
            .checked_div(r.base_price)
            .map(|ratio| Decimal::ONE - ratio)
    }
}

/// A grouping dimension for aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Store,
    Product,
    Holiday,
    Promotion,
    Month,
}

impl Dimension {
    /// Extract this dimension's key part from a record.
    pub fn key_of(self, r: &DerivedRecord) -> KeyPart {
        match self {
            Dimension::Store => KeyPart::Store(r.record().store),
            Dimension::Product => KeyPart::Product(r.record().product),
            Dimension::Holiday => KeyPart::Holiday(r.record().is_holiday),
            Dimension::Promotion => KeyPart::Promotion(r.promotion()),
            Dimension::Month => KeyPart::Month(r.calendar().month),
        }
    }
}

/// One component of a group key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPart {
    Store(u32),
    Product(u32),
    Holiday(bool),
    Promotion(PromotionState),
    Month(u32),
}

impl std::fmt::Display for KeyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyPart::Store(s) => write!(f, "{s}"),
            KeyPart::Product(p) => write!(f, "{p}"),
            KeyPart::Holiday(h) => write!(f, "{}", u8::from(*h)),
            KeyPart::Promotion(p) => write!(f, "{}", p.label()),
            KeyPart::Month(m) => write!(f, "{m}"),
        }
    }
}

/// Composite group key, ordered component-wise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey(pub Vec<KeyPart>);

impl GroupKey {
    pub fn of(r: &DerivedRecord, dims: &[Dimension]) -> Self {
        GroupKey(dims.iter().map(|d| d.key_of(r)).collect())
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

/// Which numeric column an aggregation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// `weekly_units_sold`.
    UnitsSold,
    /// `weekly_sales` (price × units).
    SalesAmount,
    /// Charged price.
    Price,
}

impl Metric {
    /// Exact value of this metric for a record.
    pub fn value_of(self, r: &DerivedRecord) -> Decimal {
        match self {
            Metric::UnitsSold => Decimal::from(r.record().weekly_units_sold),
            Metric::SalesAmount => r.weekly_sales(),
            Metric::Price => r.record().price,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / environment defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    /// Fail the batch on any row-level error instead of skipping the row.
    pub strict: bool,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}
