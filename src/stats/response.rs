//! Price levels and the price/units fit line per product.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::domain::{DerivedRecord, Dimension, KeyPart, PromotionState};
use crate::math::fit_line;
use crate::stats::group::group_records;

/// Least squares line `units = intercept + slope * price` for one product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceResponse {
    pub product: u32,
    pub n: usize,
    pub intercept: f64,
    /// Change in weekly units per one unit of price (usually negative).
    pub slope: f64,
}

/// Everyday vs promotional price points for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceLevels {
    pub product: u32,
    pub base_prices: BTreeSet<Decimal>,
    pub promo_prices: BTreeSet<Decimal>,
    pub discount_weeks: usize,
    pub markup_weeks: usize,
    /// Largest `1 - price / base_price` seen for the product.
    pub max_discount_depth: Option<Decimal>,
}

fn by_product(records: &[DerivedRecord]) -> Vec<(u32, Vec<&DerivedRecord>)> {
    group_records(records, &[Dimension::Product])
        .into_iter()
        .filter_map(|(key, members)| match key.parts() {
            [KeyPart::Product(p)] => Some((*p, members)),
            _ => None,
        })
        .collect()
}

/// Fit the price/units line per product. Products whose weeks all share
/// one price have no line and are omitted.
pub fn price_response(records: &[DerivedRecord]) -> Vec<PriceResponse> {
    by_product(records)
        .into_iter()
        .filter_map(|(product, members)| {
            let (xs, ys): (Vec<f64>, Vec<f64>) = members
                .iter()
                .filter_map(|r| {
                    let price = r.record().price.to_f64()?;
                    Some((price, r.record().weekly_units_sold as f64))
                })
                .unzip();
            let (intercept, slope) = fit_line(&xs, &ys)?;
            Some(PriceResponse {
                product,
                n: xs.len(),
                intercept,
                slope,
            })
        })
        .collect()
}

pub fn price_levels(records: &[DerivedRecord]) -> Vec<PriceLevels> {
    by_product(records)
        .into_iter()
        .map(|(product, members)| {
            let base_prices = members.iter().map(|r| r.record().base_price).collect();
            let promo_prices = members
                .iter()
                .filter(|r| r.promotion() != PromotionState::NoChange)
                .map(|r| r.record().price)
                .collect();
            let count = |state: PromotionState| {
                members.iter().filter(|r| r.promotion() == state).count()
            };
            let max_discount_depth = members
                .iter()
                .filter(|r| r.promotion() == PromotionState::Discount)
                .filter_map(|r| r.discount_depth())
                .max();
            PriceLevels {
                product,
                base_prices,
                promo_prices,
                discount_weeks: count(PromotionState::Discount),
                markup_weeks: count(PromotionState::Markup),
                max_discount_depth,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::domain::SalesRecord;
    use crate::features::derive_all;

    fn raw(product: u32, base: Decimal, price: Decimal, units: u64) -> SalesRecord {
        SalesRecord {
            store: 1,
            product,
            date: NaiveDate::from_ymd_opt(2012, 7, 6).unwrap(),
            is_holiday: false,
            base_price: base,
            price,
            weekly_units_sold: units,
        }
    }

    #[test]
    fn response_slope_per_product() {
        let records = derive_all(&[
            raw(1, dec!(10), dec!(10), 100),
            raw(1, dec!(10), dec!(8), 140),
            raw(1, dec!(10), dec!(6), 180),
            raw(2, dec!(4), dec!(4), 50),
            raw(2, dec!(4), dec!(4), 55),
        ]);
        let fits = price_response(&records);
        assert_eq!(fits.len(), 1, "constant-price product has no line");
        assert_eq!(fits[0].product, 1);
        assert_eq!(fits[0].n, 3);
        assert!((fits[0].slope + 20.0).abs() < 1e-9);
        assert!((fits[0].intercept - 300.0).abs() < 1e-8);
    }

    #[test]
    fn levels_report_half_price_cut() {
        let records = derive_all(&[
            raw(3, dec!(21.99), dec!(21.99), 40),
            raw(3, dec!(21.99), dec!(10.995), 300),
            raw(3, dec!(21.99), dec!(16.49), 120),
            raw(3, dec!(21.99), dec!(22.49), 30),
        ]);
        let levels = price_levels(&records);
        assert_eq!(levels.len(), 1);
        let l = &levels[0];
        assert_eq!(l.base_prices.len(), 1);
        assert_eq!(l.promo_prices.len(), 3);
        assert_eq!(l.discount_weeks, 2);
        assert_eq!(l.markup_weeks, 1);
        assert_eq!(l.max_discount_depth, Some(dec!(0.5)));
    }
}
