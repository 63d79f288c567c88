use promo_eda::{
    app::pipeline::run_with_ingest,
    data::{SampleConfig, generate_sample},
    domain::{Dimension, GroupKey, KeyPart, Metric, PromotionState},
    io::{ingest::read_sales, export::write_sales},
    stats::{group_means, group_totals},
};
use rust_decimal::Decimal;

const SALES: &str = "\u{feff}Store,Product,Date,Is_Holiday,Base Price,Price,Weekly_Units_Sold,Notes\n\
1,1,2021-12-17,0,10.00,10.00,5,\n\
1,1,2021-12-24,1,10.00,8.00,9,xmas\n\
1,1,2021-12-31,0,10.00,10.00,4,\n\
2,1,2021-12-17,0,10.00,12.00,2,\n\
2,1,2021-12-24,1,10.00,10.00,6,\n\
2,1,13/45/2021,0,10.00,10.00,1,\n\
2,1,2021-12-31,0,10.00,-1,1,\n";

#[test]
fn csv_through_report() {
    let ingest = read_sales(SALES.as_bytes(), false).expect("ingest");
    assert_eq!(ingest.rows_read, 7);
    assert_eq!(ingest.rows_used, 5);
    let lines: Vec<usize> = ingest.row_errors.iter().map(|e| e.line()).collect();
    assert_eq!(lines, vec![7, 8]);

    let run = run_with_ingest(ingest).expect("pipeline");
    assert_eq!(run.records.len(), 5);

    // Store 1: [10, 8, 10] against base 10.
    let store1: Vec<PromotionState> = run
        .records
        .iter()
        .filter(|r| r.record().store == 1)
        .map(|r| r.promotion())
        .collect();
    assert_eq!(
        store1,
        vec![PromotionState::NoChange, PromotionState::Discount, PromotionState::NoChange]
    );

    for r in &run.records {
        let expected = r.record().price * Decimal::from(r.record().weekly_units_sold);
        assert_eq!(r.weekly_sales(), expected);
    }
    let last = run.records.iter().find(|r| r.record().date.to_string() == "2021-12-31").unwrap();
    let cal = last.calendar();
    assert_eq!((cal.year, cal.month, cal.day_of_month), (2021, 12, 31));

    let by_promo = group_totals(&run.records, &[Dimension::Promotion]).expect("totals");
    let keys: Vec<&GroupKey> = by_promo.iter().map(|g| &g.key).collect();
    assert_eq!(
        keys,
        vec![
            &GroupKey(vec![KeyPart::Promotion(PromotionState::NoChange)]),
            &GroupKey(vec![KeyPart::Promotion(PromotionState::Discount)]),
            &GroupKey(vec![KeyPart::Promotion(PromotionState::Markup)]),
        ]
    );
    assert_eq!(by_promo[1].units, 9);
    assert_eq!(by_promo[2].units, 2);

    assert_eq!(run.report.dataset.stores, vec![1, 2]);
    assert_eq!(run.report.row_errors.len(), 2);
}

#[test]
fn shuffled_input_keeps_store_means() {
    let forward = read_sales(SALES.as_bytes(), false).unwrap();
    let mut lines: Vec<&str> = SALES.lines().collect();
    let header = lines.remove(0);
    lines.reverse();
    let reversed_csv = std::iter::once(header).chain(lines).collect::<Vec<_>>().join("\n");
    let reversed = read_sales(reversed_csv.as_bytes(), false).unwrap();

    let a = run_with_ingest(forward).unwrap();
    let b = run_with_ingest(reversed).unwrap();
    assert_eq!(
        group_means(&a.records, &[Dimension::Store], Metric::SalesAmount),
        group_means(&b.records, &[Dimension::Store], Metric::SalesAmount)
    );
}

#[test]
fn generated_sample_reads_back_cleanly() {
    let config = SampleConfig {
        stores: 2,
        products: 3,
        weeks: 60,
        ..SampleConfig::default()
    };
    let records = generate_sample(&config).expect("generate");

    let mut buf = Vec::new();
    write_sales(&mut buf, &records).expect("write");
    let ingest = read_sales(buf.as_slice(), true).expect("strict ingest");

    assert!(ingest.row_errors.is_empty());
    assert_eq!(ingest.records, records);
    assert_eq!(ingest.stats.products.len(), 3);

    let run = run_with_ingest(ingest).unwrap();
    assert_eq!(run.report.units_by_month.len(), 12);
}

#[test]
fn oversized_rows_are_rejected_before_derivation() {
    let csv = "Store,Product,Date,Is_Holiday,Base Price,Price,Weekly_Units_Sold\n\
1,1,2021-01-01,0,1e10,1e10,10000000000000000000\n";
    let err = read_sales(csv.as_bytes(), true).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("`Price`"));
}
