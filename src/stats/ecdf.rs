//! Empirical cumulative distribution function.
//!
//! For n values, `ECDF(x) = (number of values <= x) / n`. Used for the
//! "x% of weeks sold at most N units" style observations and the ASCII chart.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Ecdf {
    /// Finite input values, ascending.
    values: Vec<f64>,
}

/// One `(p, value)` checkpoint of the distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EcdfCheckpoint {
    pub p: f64,
    pub value: f64,
}

impl Ecdf {
    /// Build from raw values; non-finite values are dropped.
    pub fn from_values(values: &[f64]) -> Self {
        let mut values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        values.sort_by(|a, b| a.total_cmp(b));
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sorted values (the x positions of the step function).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Share of values `<= x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let at_or_below = self.values.partition_point(|v| *v <= x);
        at_or_below as f64 / self.values.len() as f64
    }

    /// Smallest value whose ECDF is `>= p`.
    pub fn quantile(&self, p: f64) -> Option<f64> {
        if self.values.is_empty() || !(0.0..=1.0).contains(&p) {
            return None;
        }
        let n = self.values.len();
        let rank = (p * n as f64).ceil() as usize;
        Some(self.values[rank.clamp(1, n) - 1])
    }

    pub fn checkpoints(&self, ps: &[f64]) -> Vec<EcdfCheckpoint> {
        ps.iter()
            .filter_map(|&p| self.quantile(p).map(|value| EcdfCheckpoint { p, value }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_counts_ties() {
        let e = Ecdf::from_values(&[3.0, 1.0, 2.0, 2.0, f64::NAN]);
        assert_eq!(e.len(), 4);
        assert_eq!(e.evaluate(0.5), 0.0);
        assert_eq!(e.evaluate(1.0), 0.25);
        assert_eq!(e.evaluate(2.0), 0.75);
        assert_eq!(e.evaluate(2.5), 0.75);
        assert_eq!(e.evaluate(10.0), 1.0);
    }

    #[test]
    fn quantile_is_smallest_value_reaching_p() {
        let e = Ecdf::from_values(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(e.quantile(0.0), Some(10.0));
        assert_eq!(e.quantile(0.2), Some(10.0));
        assert_eq!(e.quantile(0.5), Some(30.0));
        assert_eq!(e.quantile(0.8), Some(40.0));
        assert_eq!(e.quantile(1.0), Some(50.0));
        assert_eq!(e.quantile(1.5), None);
    }

    #[test]
    fn empty_ecdf() {
        let e = Ecdf::from_values(&[]);
        assert!(e.is_empty());
        assert_eq!(e.evaluate(1.0), 0.0);
        assert!(e.checkpoints(&[0.5]).is_empty());
    }
}
