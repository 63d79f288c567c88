//! Formatted terminal output for a `Report`.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::domain::{KeyPart, PromotionState};
use crate::report::Report;
use crate::stats::{
    EcdfCheckpoint, GroupDescribe, GroupMean, GroupTotal, PriceLevels, PriceResponse,
};

/// Maximum number of skipped-row messages echoed in the summary.
const MAX_ROW_ERRORS_SHOWN: usize = 10;

const PIVOT_CELL_WIDTH: usize = 10;

/// Format the full report.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str(&format_dataset_summary(report));

    out.push_str("\nDistribution (ECDF checkpoints):\n");
    out.push_str(&format_checkpoints("Weekly_Units_Sold", &report.units_distribution));
    out.push_str(&format_checkpoints("weekly_sales", &report.sales_distribution));

    out.push_str("\nweekly_sales by store:\n");
    out.push_str(&format_describe_table("store", &report.sales_by_store));

    out.push_str("\nTotals by store:\n");
    out.push_str(&format_totals_table("store", &report.totals_by_store));
    out.push_str("\nTotals by product:\n");
    out.push_str(&format_totals_table("product", &report.totals_by_product));

    out.push_str("\nMean Price by product x Is_Holiday:\n");
    out.push_str(&format_pivot("product", &report.price_by_product_holiday, 2));
    out.push_str("\nMean Weekly_Units_Sold by product x Is_Holiday:\n");
    out.push_str(&format_pivot("product", &report.units_by_product_holiday, 1));
    out.push_str("\nMean Weekly_Units_Sold by store x Is_Holiday:\n");
    out.push_str(&format_pivot("store", &report.units_by_store_holiday, 1));

    out.push_str("\nMean Weekly_Units_Sold by store x month:\n");
    out.push_str(&format_pivot("store", &report.units_by_store_month, 0));
    out.push_str("\nMean Weekly_Units_Sold by product x month:\n");
    out.push_str(&format_pivot("product", &report.units_by_product_month, 0));

    out.push_str("\nWeeks by promotion:\n");
    out.push_str(&format_totals_table("promotion", &report.totals_by_promotion));
    out.push_str("\nMean Weekly_Units_Sold by store x promotion:\n");
    out.push_str(&format_pivot("store", &report.units_by_store_promotion, 1));
    out.push_str("\nMean Weekly_Units_Sold by product x promotion:\n");
    out.push_str(&format_pivot("product", &report.units_by_product_promotion, 1));

    out.push_str("\nPrice levels by product:\n");
    out.push_str(&format_price_levels(&report.price_levels));

    out.push_str("\nPrice response (units = a + b * price):\n");
    out.push_str(&format_price_response(&report.price_response));

    out
}

fn format_dataset_summary(report: &Report) -> String {
    let d = &report.dataset;
    let mut out = String::new();
    out.push_str("=== promo - Weekly Sales & Promotion Analysis ===\n");
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped={}\n",
        d.rows_read, d.rows_used, d.rows_skipped
    ));
    out.push_str(&format!("Dates: {} .. {}\n", d.date_min, d.date_max));
    out.push_str(&format!("Stores ({}): {}\n", d.stores.len(), join(&d.stores)));
    out.push_str(&format!("Products ({}): {}\n", d.products.len(), join(&d.products)));

    for msg in report.row_errors.iter().take(MAX_ROW_ERRORS_SHOWN) {
        out.push_str(&format!("  skipped: {msg}\n"));
    }
    if report.row_errors.len() > MAX_ROW_ERRORS_SHOWN {
        out.push_str(&format!(
            "  ... and {} more skipped row(s)\n",
            report.row_errors.len() - MAX_ROW_ERRORS_SHOWN
        ));
    }
    out
}

fn format_checkpoints(label: &str, checkpoints: &[EcdfCheckpoint]) -> String {
    let parts: Vec<String> = checkpoints
        .iter()
        .map(|c| format!("p{:.0}<={:.2}", c.p * 100.0, c.value))
        .collect();
    format!("- {label:<18} {}\n", parts.join("  "))
}

fn format_describe_table(key_label: &str, rows: &[GroupDescribe]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<10} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            key_label, "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        ),
    );
    push_rule(&mut out, &[10, 6, 10, 10, 10, 10, 10, 10, 10]);
    for r in rows {
        let s = &r.stats;
        push_line(
            &mut out,
            format!(
                "{:<10} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
                key_label_of(&r.key.0),
                s.count,
                fmt_f(s.mean, 2),
                fmt_f(s.std, 2),
                fmt_f(s.min, 2),
                fmt_f(s.q25, 2),
                fmt_f(s.q50, 2),
                fmt_f(s.q75, 2),
                fmt_f(s.max, 2),
            ),
        );
    }
    out
}

fn format_totals_table(key_label: &str, rows: &[GroupTotal]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<10} {:>8} {:>14} {:>16}", key_label, "weeks", "units", "sales"),
    );
    push_rule(&mut out, &[10, 8, 14, 16]);
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{:<10} {:>8} {:>14} {:>16}",
                key_label_of(&r.key.0),
                r.count,
                r.units,
                fmt_money(r.sales),
            ),
        );
    }
    out
}

/// Two-dimensional table: first key part per row, second key part per column.
fn format_pivot(row_label: &str, means: &[GroupMean], decimals: usize) -> String {
    let mut columns: BTreeSet<KeyPart> = BTreeSet::new();
    let mut cells: BTreeMap<KeyPart, BTreeMap<KeyPart, f64>> = BTreeMap::new();
    for m in means {
        let [row, col] = m.key.0.as_slice() else {
            continue;
        };
        columns.insert(*col);
        cells.entry(*row).or_default().insert(*col, m.mean);
    }

    let width = PIVOT_CELL_WIDTH;
    let mut out = String::new();

    let mut header = format!("{row_label:<10}");
    for c in &columns {
        header.push_str(&format!(" {:>width$}", column_label(c)));
    }
    push_line(&mut out, header);

    let mut widths = vec![10];
    widths.extend(std::iter::repeat(width).take(columns.len()));
    push_rule(&mut out, &widths);

    for (row, row_cells) in &cells {
        let mut line = format!("{:<10}", row.to_string());
        for c in &columns {
            let cell = row_cells
                .get(c)
                .map(|v| fmt_f(*v, decimals))
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {cell:>width$}"));
        }
        push_line(&mut out, line);
    }
    out
}

fn format_price_levels(levels: &[PriceLevels]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<8} {:<20} {:<28} {:>9} {:>7} {:>10}",
            "product", "base prices", "promo prices", "discounts", "markups", "max depth"
        ),
    );
    push_rule(&mut out, &[8, 20, 28, 9, 7, 10]);
    for l in levels {
        let depth = l
            .max_discount_depth
            .map(|d| format!("{:.1}%", d * Decimal::ONE_HUNDRED))
            .unwrap_or_else(|| "-".to_string());
        push_line(
            &mut out,
            format!(
                "{:<8} {:<20} {:<28} {:>9} {:>7} {:>10}",
                l.product,
                truncate(&join_prices(&l.base_prices), 20),
                truncate(&join_prices(&l.promo_prices), 28),
                l.discount_weeks,
                l.markup_weeks,
                depth,
            ),
        );
    }
    out
}

fn format_price_response(fits: &[PriceResponse]) -> String {
    if fits.is_empty() {
        return "(no product has more than one price)\n".to_string();
    }
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:<8} {:>6} {:>12} {:>12}", "product", "n", "a", "b"),
    );
    push_rule(&mut out, &[8, 6, 12, 12]);
    for f in fits {
        push_line(
            &mut out,
            format!(
                "{:<8} {:>6} {:>12.2} {:>12.2}",
                f.product, f.n, f.intercept, f.slope
            ),
        );
    }
    out
}

fn key_label_of(parts: &[KeyPart]) -> String {
    parts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

fn column_label(part: &KeyPart) -> String {
    match part {
        KeyPart::Holiday(h) => format!("holiday={}", u8::from(*h)),
        KeyPart::Month(m) => format!("m{m:02}"),
        KeyPart::Promotion(p) => match p {
            PromotionState::NoChange => "no_change".to_string(),
            PromotionState::Discount => "discount".to_string(),
            PromotionState::Markup => "markup".to_string(),
        },
        other => other.to_string(),
    }
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn push_rule(out: &mut String, widths: &[usize]) {
    let parts: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(out, parts.join(" "));
}

fn fmt_f(v: f64, decimals: usize) -> String {
    if v.is_finite() {
        format!("{v:.decimals$}")
    } else {
        "-".to_string()
    }
}

fn fmt_money(v: Decimal) -> String {
    format!("{:.2}", v)
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_prices(prices: &BTreeSet<Decimal>) -> String {
    prices
        .iter()
        .map(|p| p.normalize().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GroupKey;
    use crate::stats::Describe;
    use rust_decimal_macros::dec;

    fn mean(parts: Vec<KeyPart>, value: f64) -> GroupMean {
        GroupMean {
            key: GroupKey(parts),
            count: 1,
            mean: value,
        }
    }

    #[test]
    fn pivot_fills_missing_cells() {
        let means = vec![
            mean(vec![KeyPart::Store(1), KeyPart::Promotion(PromotionState::NoChange)], 95.0),
            mean(vec![KeyPart::Store(1), KeyPart::Promotion(PromotionState::Discount)], 175.0),
            mean(vec![KeyPart::Store(10), KeyPart::Promotion(PromotionState::Discount)], 333.3),
        ];
        let txt = format_pivot("store", &means, 1);
        let expected = concat!(
            "store       no_change   discount\n",
            "---------- ---------- ----------\n",
            "1                95.0      175.0\n",
            "10                  -      333.3\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn totals_table_keeps_exact_money() {
        let rows = vec![GroupTotal {
            key: GroupKey(vec![KeyPart::Product(3)]),
            count: 2,
            units: 41,
            sales: dec!(300.05) + dec!(0.1),
        }];
        let txt = format_totals_table("product", &rows);
        assert!(txt.lines().nth(2).unwrap().ends_with("300.15"));
    }

    #[test]
    fn describe_table_renders_nan_as_dash() {
        let rows = vec![GroupDescribe {
            key: GroupKey(vec![KeyPart::Store(5)]),
            stats: Describe::from_f64(&[12.0]),
        }];
        let txt = format_describe_table("store", &rows);
        let row = txt.lines().nth(2).unwrap();
        assert!(row.starts_with("5 "));
        assert!(row.contains(" - "));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
