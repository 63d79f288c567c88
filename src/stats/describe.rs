//! Describe-style summary of one numeric column.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// count / mean / std / min / quartiles / max.
///
/// `std` is the sample standard deviation (n - 1 denominator) and is `NaN`
/// for fewer than two values. Quartiles interpolate linearly between the
/// closest ranks. An empty input yields `count = 0` and `NaN` elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    /// Summarize exact decimal values.
    ///
    /// The mean is taken from the exact decimal sum, so it does not depend on
    /// the order of `values`.
    pub fn from_decimals(values: &[Decimal]) -> Self {
        if values.is_empty() {
            return Self::empty();
        }
        let floats: Vec<f64> = values
            .iter()
            .map(|v| v.to_f64().unwrap_or(f64::NAN))
            .collect();
        let mut out = Self::from_f64(&floats);
        out.mean = exact_mean(values).unwrap_or(out.mean);
        out
    }

    /// Summarize float values. Non-finite values are ignored.
    pub fn from_f64(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Self::empty();
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count as f64 - 1.0)).sqrt()
        };

        Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile_sorted(&sorted, 0.25),
            q50: quantile_sorted(&sorted, 0.50),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }

    fn empty() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            q50: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Mean of exact decimals, computed from their exact sum.
pub fn exact_mean(values: &[Decimal]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    sum.checked_div(Decimal::from(values.len()))?.to_f64()
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
