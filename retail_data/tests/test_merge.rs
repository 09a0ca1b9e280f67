use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use retail_data::sample::{generate, write_csv_dir, SampleConfig};
use retail_data::{
    load_dir, merge, DataError, MarketRecord, SalesRecord, StoreRecord, StoreType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sales(store: u32, dept: u32, day: u32, value: f64) -> SalesRecord {
    SalesRecord {
        store,
        dept,
        date: date(2010, 2, day),
        weekly_sales: value,
        is_holiday: false,
    }
}

#[test]
fn merge_joins_market_and_store_fields() {
    let sales_rows = vec![sales(1, 1, 5, 100.0), sales(1, 1, 12, 110.0)];
    let market_rows = vec![MarketRecord {
        store: 1,
        date: date(2010, 2, 5),
        temperature: Some(42.3),
        fuel_price: Some(2.57),
        markdown1: Some(5.0),
        markdown2: None,
        markdown3: None,
        markdown4: None,
        markdown5: None,
        cpi: Some(211.0),
        unemployment: Some(8.1),
        is_holiday: false,
    }];
    let store_rows = vec![StoreRecord {
        store: 1,
        store_type: StoreType::A,
        size: 151_315,
    }];

    let merged = merge(&sales_rows, &market_rows, &store_rows).unwrap();

    assert_eq!(merged.len(), 2);
    // The first week has a market row, the second does not.
    assert_eq!(merged[0].temperature, Some(42.3));
    assert_eq!(merged[0].markdowns[0], Some(5.0));
    assert_eq!(merged[0].store_type, Some(StoreType::A));
    assert_eq!(merged[1].temperature, None);
    assert_eq!(merged[1].store_type, Some(StoreType::A));
}

#[test]
fn merge_tolerates_unknown_stores() {
    let merged = merge(&[sales(7, 1, 5, 50.0)], &[], &[]).unwrap();
    assert_eq!(merged[0].store_type, None);
    assert_eq!(merged[0].store_size, None);
    assert_eq!(merged[0].markdowns, [None; 5]);
}

#[test]
fn merge_sorts_by_store_dept_date() {
    let rows = vec![
        sales(2, 1, 5, 1.0),
        sales(1, 2, 5, 2.0),
        sales(1, 1, 12, 3.0),
        sales(1, 1, 5, 4.0),
    ];
    let merged = merge(&rows, &[], &[]).unwrap();
    let order: Vec<(u32, u32, NaiveDate)> =
        merged.iter().map(|r| (r.store, r.dept, r.date)).collect();
    assert_eq!(
        order,
        vec![
            (1, 1, date(2010, 2, 5)),
            (1, 1, date(2010, 2, 12)),
            (1, 2, date(2010, 2, 5)),
            (2, 1, date(2010, 2, 5)),
        ]
    );
}

#[test]
fn merge_rejects_empty_sales() {
    assert!(matches!(
        merge(&[], &[], &[]),
        Err(DataError::EmptyInput(_))
    ));
}

#[test]
fn sample_generation_is_deterministic() {
    let config = SampleConfig::default();
    let first = generate(&config).unwrap();
    let second = generate(&config).unwrap();

    assert_eq!(first.sales, second.sales);
    assert_eq!(first.market, second.market);
    assert_eq!(first.stores, second.stores);

    let expected_series = (config.stores * config.depts_per_store) as usize;
    assert_eq!(first.sales.len(), expected_series * config.weeks);
}

#[test]
fn sample_csvs_round_trip_through_the_loader() {
    let config = SampleConfig {
        stores: 1,
        depts_per_store: 1,
        weeks: 10,
        ..SampleConfig::default()
    };
    let data = generate(&config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write_csv_dir(dir.path(), &data).unwrap();
    let merged = load_dir(dir.path()).unwrap();

    assert_eq!(merged.len(), 10);
    assert_eq!(merged[0].weekly_sales, data.sales[0].weekly_sales);
    assert_eq!(merged[0].store_type, Some(data.stores[0].store_type));
    assert_eq!(merged[0].temperature, data.market[0].temperature);
}

#[test]
fn sample_rejects_degenerate_configs() {
    let config = SampleConfig {
        stores: 0,
        ..SampleConfig::default()
    };
    assert!(generate(&config).is_err());
}
