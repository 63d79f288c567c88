//! Synthetic weekly sales generation.
//!
//! Produces a reproducible dataset with the same shape as the reference data:
//! every store carries every product, each product has one everyday price and
//! an occasional promotional price, a handful of weeks per year are flagged as
//! holidays, and units respond to season and promotions.

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::SalesRecord;
use crate::error::AppError;

/// Everyday prices (cents) for the first products; later products reuse the
/// list with a one-dollar step per cycle.
const BASE_PRICE_CENTS: [i64; 3] = [1099, 499, 2199];

/// Promotional discount depth (percent) per product, same cycling rule.
const DISCOUNT_PCT: [i64; 3] = [10, 12, 50];

/// Typical weekly units per product at an average store.
const BASE_UNITS: [f64; 3] = [80.0, 260.0, 60.0];

/// ISO weeks flagged as holiday weeks (mid-February, early September,
/// late November, late December).
const HOLIDAY_WEEKS: [u32; 4] = [6, 36, 47, 52];

/// Share of weeks that run a promotion.
const PROMO_PROB: f64 = 0.15;

/// Log-scale noise on units.
const UNITS_NOISE: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub stores: usize,
    pub products: usize,
    pub weeks: usize,
    pub start: NaiveDate,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            stores: 9,
            products: 3,
            weeks: 156,
            start: NaiveDate::from_ymd_opt(2010, 2, 5).unwrap_or_default(),
            seed: 42,
        }
    }
}

/// Generate `stores × products × weeks` records, ordered by week, store, product.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SalesRecord>, AppError> {
    if config.stores == 0 || config.products == 0 || config.weeks == 0 {
        return Err(AppError::new(2, "Sample stores, products and weeks must all be > 0."));
    }
    let stores = u32::try_from(config.stores)
        .map_err(|_| AppError::new(2, "Sample store count is too large."))?;
    let products = u32::try_from(config.products)
        .map_err(|_| AppError::new(2, "Sample product count is too large."))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, UNITS_NOISE)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(config.stores * config.products * config.weeks);

    for week in 0..config.weeks {
        let offset = i64::try_from(week * 7)
            .map_err(|_| AppError::new(2, "Sample week count is too large."))?;
        let date = config
            .start
            .checked_add_signed(Duration::days(offset))
            .ok_or_else(|| AppError::new(2, "Sample dates overflow the calendar."))?;
        let iso_week = date.iso_week().week();
        let is_holiday = HOLIDAY_WEEKS.contains(&iso_week);
        let season = seasonal_factor(iso_week);

        for store in 1..=stores {
            let store_factor = 0.7 + 0.1 * f64::from(store % 7);

            for product in 1..=products {
                let base_price = base_price(product);
                let on_promo = rng.gen_bool(PROMO_PROB);
                let price = if on_promo {
                    promo_price(base_price, product)
                } else {
                    base_price
                };

                let lift = if on_promo {
                    1.0 + 2.0 * discount_fraction(product)
                } else {
                    1.0
                };
                let level = base_units(product) * store_factor * season * lift;
                let units = (level * normal.sample(&mut rng).exp()).round().max(0.0) as u64;

                records.push(SalesRecord {
                    store,
                    product,
                    date,
                    is_holiday,
                    base_price,
                    price,
                    weekly_units_sold: units,
                });
            }
        }
    }

    info!(
        records = records.len(),
        stores = config.stores,
        products = config.products,
        weeks = config.weeks,
        seed = config.seed,
        "generated synthetic sample"
    );
    Ok(records)
}

fn cycle_index(product: u32) -> (usize, i64) {
    let idx = (product - 1) as usize;
    (idx % BASE_PRICE_CENTS.len(), (idx / BASE_PRICE_CENTS.len()) as i64)
}

fn base_price(product: u32) -> Decimal {
    let (i, cycle) = cycle_index(product);
    Decimal::new(BASE_PRICE_CENTS[i] + 100 * cycle, 2)
}

fn discount_pct(product: u32) -> i64 {
    let (i, _) = cycle_index(product);
    DISCOUNT_PCT[i]
}

fn discount_fraction(product: u32) -> f64 {
    discount_pct(product) as f64 / 100.0
}

fn promo_price(base: Decimal, product: u32) -> Decimal {
    let keep = Decimal::new(100 - discount_pct(product), 2);
    (base * keep).round_dp(2)
}

fn base_units(product: u32) -> f64 {
    let (i, _) = cycle_index(product);
    BASE_UNITS[i]
}

/// Two peaks a year (spring and mid-summer), amplitude ±25%.
fn seasonal_factor(iso_week: u32) -> f64 {
    let phase = 2.0 * PI * f64::from(iso_week) / 52.0;
    1.0 + 0.25 * (2.0 * phase - PI / 2.0).sin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PromotionState;
    use crate::features::classify_promotion;
    use rust_decimal_macros::dec;

    #[test]
    fn sample_is_reproducible_for_seed() {
        let config = SampleConfig {
            weeks: 20,
            ..SampleConfig::default()
        };
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 9 * 3 * 20);

        let c = generate_sample(&SampleConfig { seed: 43, ..config }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn sample_prices_are_everyday_or_discounted() {
        let records = generate_sample(&SampleConfig::default()).unwrap();
        for r in &records {
            let state = classify_promotion(r.base_price, r.price);
            assert_ne!(state, PromotionState::Markup);
            assert!(r.price > Decimal::ZERO);
        }
        assert!(records.iter().any(|r| r.price < r.base_price));
        assert!(records.iter().any(|r| r.is_holiday));
    }

    #[test]
    fn promo_prices_round_to_cents() {
        assert_eq!(promo_price(dec!(21.99), 3), dec!(11.00));
        assert_eq!(promo_price(dec!(10.99), 1), dec!(9.89));
        assert_eq!(base_price(4), dec!(11.99));
    }

    #[test]
    fn zero_sized_sample_is_rejected() {
        let config = SampleConfig {
            weeks: 0,
            ..SampleConfig::default()
        };
        let err = generate_sample(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
