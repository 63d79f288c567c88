//! Group-by reductions over derived records.
//!
//! Groups are collected into a `BTreeMap`, so every result is ordered by key
//! and independent of the order records arrive in.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{DerivedRecord, Dimension, GroupKey, Metric};
use crate::error::AggregateError;
use crate::stats::describe::{Describe, exact_mean};

/// `Describe` of one metric within one group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupDescribe {
    pub key: GroupKey,
    pub stats: Describe,
}

/// Mean of one metric within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: GroupKey,
    pub count: usize,
    pub mean: f64,
}

/// Totals within one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub key: GroupKey,
    pub count: usize,
    pub units: u64,
    pub sales: Decimal,
}

/// Partition records by the given dimensions.
pub fn group_records<'a>(
    records: &'a [DerivedRecord],
    dims: &[Dimension],
) -> BTreeMap<GroupKey, Vec<&'a DerivedRecord>> {
    let mut groups: BTreeMap<GroupKey, Vec<&DerivedRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(GroupKey::of(r, dims)).or_default().push(r);
    }
    groups
}

pub fn group_describe(
    records: &[DerivedRecord],
    dims: &[Dimension],
    metric: Metric,
) -> Vec<GroupDescribe> {
    group_records(records, dims)
        .into_iter()
        .map(|(key, members)| {
            let values: Vec<Decimal> = members.iter().map(|r| metric.value_of(r)).collect();
            GroupDescribe {
                key,
                stats: Describe::from_decimals(&values),
            }
        })
        .collect()
}

pub fn group_means(
    records: &[DerivedRecord],
    dims: &[Dimension],
    metric: Metric,
) -> Vec<GroupMean> {
    group_records(records, dims)
        .into_iter()
        .map(|(key, members)| {
            let values: Vec<Decimal> = members.iter().map(|r| metric.value_of(r)).collect();
            GroupMean {
                key,
                count: values.len(),
                mean: exact_mean(&values).unwrap_or(f64::NAN),
            }
        })
        .collect()
}

/// Unit and sales totals per group. Sums are checked; a total that does not
/// fit is reported instead of wrapping.
pub fn group_totals(
    records: &[DerivedRecord],
    dims: &[Dimension],
) -> Result<Vec<GroupTotal>, AggregateError> {
    group_records(records, dims)
        .into_iter()
        .map(|(key, members)| {
            let overflow = |metric: &'static str| AggregateError::TotalOverflow {
                metric,
                group: key_text(&key),
            };
            let units = members
                .iter()
                .try_fold(0u64, |acc, r| acc.checked_add(r.record().weekly_units_sold))
                .ok_or_else(|| overflow("units"))?;
            let sales = members
                .iter()
                .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(r.weekly_sales()))
                .ok_or_else(|| overflow("sales"))?;
            Ok::<_, AggregateError>(GroupTotal {
                count: members.len(),
                key,
                units,
                sales,
            })
        })
        .collect()
}

fn key_text(key: &GroupKey) -> String {
    key.parts()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}
