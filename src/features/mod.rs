//! Feature derivation: calendar fields, weekly sales amount, promotion label.
//!
//! Every function here is pure and works on one record at a time, so a batch
//! can be derived in parallel without coordination.

use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{CalendarFields, DerivedRecord, PromotionState, SalesRecord};

/// Split a date into year, month, day of month and ISO 8601 week number.
pub fn derive_calendar_fields(date: NaiveDate) -> CalendarFields {
    CalendarFields {
        year: date.year(),
        month: date.month(),
        day_of_month: date.day(),
        week_of_year: date.iso_week().week(),
    }
}

/// `price * units`, exact.
///
/// # Panics
///
/// If the product does not fit in a `Decimal`. Ingest rejects such rows, see
/// [`checked_weekly_sales`].
pub fn derive_weekly_sales(price: Decimal, weekly_units_sold: u64) -> Decimal {
    price * Decimal::from(weekly_units_sold)
}

/// `price * units`, or `None` when the product is not representable.
pub fn checked_weekly_sales(price: Decimal, weekly_units_sold: u64) -> Option<Decimal> {
    price.checked_mul(Decimal::from(weekly_units_sold))
}

/// Classify the charged price against the everyday price.
///
/// Comparison is exact decimal comparison, so `10.0` and `10.00` are equal.
pub fn classify_promotion(base_price: Decimal, price: Decimal) -> PromotionState {
    match base_price.cmp(&price) {
        std::cmp::Ordering::Equal => PromotionState::NoChange,
        std::cmp::Ordering::Greater => PromotionState::Discount,
        std::cmp::Ordering::Less => PromotionState::Markup,
    }
}

/// Attach all derived fields to one record.
pub fn derive_record(record: SalesRecord) -> DerivedRecord {
    let weekly_sales = derive_weekly_sales(record.price, record.weekly_units_sold);
    let calendar = derive_calendar_fields(record.date);
    let promotion = classify_promotion(record.base_price, record.price);
    DerivedRecord::from_parts(record, weekly_sales, calendar, promotion)
}

/// Derive a whole batch (parallel). Output order matches input order.
pub fn derive_all(records: &[SalesRecord]) -> Vec<DerivedRecord> {
    records.par_iter().cloned().map(derive_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(date: NaiveDate, base_price: Decimal, price: Decimal, units: u64) -> SalesRecord {
        SalesRecord {
            store: 1,
            product: 1,
            date,
            is_holiday: false,
            base_price,
            price,
            weekly_units_sold: units,
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn classify_promotion_three_way() {
        assert_eq!(classify_promotion(dec!(10.00), dec!(10.00)), PromotionState::NoChange);
        assert_eq!(classify_promotion(dec!(10.00), dec!(7.50)), PromotionState::Discount);
        assert_eq!(classify_promotion(dec!(10.00), dec!(12.00)), PromotionState::Markup);
    }

    #[test]
    fn classify_promotion_ignores_decimal_scale() {
        assert_eq!(classify_promotion(dec!(10.0), dec!(10.00)), PromotionState::NoChange);
        assert_eq!(classify_promotion(dec!(0.30), dec!(0.3)), PromotionState::NoChange);
        // 0.1 + 0.2 is exactly 0.3 in decimal arithmetic.
        assert_eq!(classify_promotion(dec!(0.1) + dec!(0.2), dec!(0.3)), PromotionState::NoChange);
    }

    #[test]
    fn classify_promotion_is_deterministic() {
        let pairs = [(dec!(3.99), dec!(3.49)), (dec!(5), dec!(5)), (dec!(1.25), dec!(1.5))];
        for (base, price) in pairs {
            assert_eq!(classify_promotion(base, price), classify_promotion(base, price));
        }
    }

    #[test]
    fn calendar_fields_year_end() {
        let c = derive_calendar_fields(ymd(2021, 12, 31));
        assert_eq!((c.year, c.month, c.day_of_month), (2021, 12, 31));
        assert_eq!(c.week_of_year, 52);
    }

    #[test]
    fn calendar_fields_iso_week_boundaries() {
        // Jan 1st 2021 is a Friday: it belongs to ISO week 53 of 2020.
        let c = derive_calendar_fields(ymd(2021, 1, 1));
        assert_eq!(c.year, 2021);
        assert_eq!(c.week_of_year, 53);

        let c = derive_calendar_fields(ymd(2021, 1, 4));
        assert_eq!(c.week_of_year, 1);

        // Dec 31st 2019 is a Tuesday: ISO week 1 of 2020.
        let c = derive_calendar_fields(ymd(2019, 12, 31));
        assert_eq!(c.year, 2019);
        assert_eq!(c.week_of_year, 1);
    }

    #[test]
    fn weekly_sales_is_exact_product() {
        assert_eq!(derive_weekly_sales(dec!(9.99), 3), dec!(29.97));
        assert_eq!(derive_weekly_sales(dec!(0.01), 1_000_000), dec!(10000.00));
        assert_eq!(derive_weekly_sales(dec!(12.5), 0), Decimal::ZERO);
    }

    #[test]
    fn derive_record_attaches_all_fields() {
        let d = derive_record(record(ymd(2010, 2, 5), dec!(10), dec!(8), 120));
        assert_eq!(d.weekly_sales(), dec!(960));
        assert_eq!(d.promotion(), PromotionState::Discount);
        assert_eq!(d.calendar().month, 2);
        assert_eq!(d.discount_depth(), Some(dec!(0.2)));
    }

    #[test]
    fn discount_depth_undefined_for_zero_base_price() {
        let d = derive_record(record(ymd(2010, 2, 5), Decimal::ZERO, Decimal::ZERO, 1));
        assert_eq!(d.discount_depth(), None);
        assert_eq!(d.promotion(), PromotionState::NoChange);
    }

    #[test]
    fn derive_all_promotion_sequence_and_discount_units() {
        let raws = vec![
            record(ymd(2011, 3, 4), dec!(10), dec!(10), 100),
            record(ymd(2011, 3, 11), dec!(10), dec!(8), 175),
            record(ymd(2011, 3, 18), dec!(10), dec!(10), 90),
        ];
        let derived = derive_all(&raws);
        let states: Vec<PromotionState> = derived.iter().map(|d| d.promotion()).collect();
        assert_eq!(
            states,
            vec![PromotionState::NoChange, PromotionState::Discount, PromotionState::NoChange]
        );

        let discount_units: u64 = derived
            .iter()
            .filter(|d| d.promotion() == PromotionState::Discount)
            .map(|d| d.record().weekly_units_sold)
            .sum();
        assert_eq!(discount_units, 175);

        for d in &derived {
            let r = d.record();
            assert_eq!(d.weekly_sales(), r.price * Decimal::from(r.weekly_units_sold));
        }
    }
}
