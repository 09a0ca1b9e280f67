use chrono::{Datelike, Duration, NaiveDate};
use pretty_assertions::assert_eq;
use retail_data::{MergedRecord, SeriesKey, StoreType};
use retail_forecast::features::{
    build_features, feature_column_order, FeatureConfig,
};
use rstest::rstest;

fn record(store: u32, dept: u32, date: NaiveDate, sales: f64) -> MergedRecord {
    MergedRecord {
        store,
        dept,
        date,
        weekly_sales: sales,
        is_holiday: false,
        store_type: Some(StoreType::B),
        store_size: Some(120_000),
        temperature: Some(55.0),
        fuel_price: Some(3.1),
        markdowns: [None; 5],
        cpi: Some(212.5),
        unemployment: Some(7.8),
    }
}

fn weekly_records(store: u32, dept: u32, values: &[f64]) -> Vec<MergedRecord> {
    let start = NaiveDate::from_ymd_opt(2011, 1, 7).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(k, &v)| record(store, dept, start + Duration::weeks(k as i64), v))
        .collect()
}

fn short_config() -> FeatureConfig {
    FeatureConfig {
        lags: vec![1, 2],
        roll_windows: vec![2],
        include_price: true,
        include_markdowns: true,
        add_interactions: true,
    }
}

#[test]
fn column_order_is_stable_and_complete() {
    let order = feature_column_order(&FeatureConfig::default());
    assert_eq!(
        order[..7],
        [
            "is_holiday".to_string(),
            "week".to_string(),
            "month".to_string(),
            "year".to_string(),
            "type_a".to_string(),
            "type_b".to_string(),
            "type_c".to_string(),
        ]
    );
    assert!(order.contains(&"weekly_sales_lag52".to_string()));
    assert!(order.contains(&"weekly_sales_roll4".to_string()));
    assert!(order.contains(&"markdown5".to_string()));
    assert!(order.contains(&"is_holiday_x_type_c".to_string()));
    // Deterministic: building twice gives the same order.
    assert_eq!(order, feature_column_order(&FeatureConfig::default()));
}

#[test]
fn lags_and_rolls_on_a_short_series() {
    let records = weekly_records(1, 1, &[10.0, 20.0, 30.0, 40.0]);
    let set = build_features(&records, &short_config()).unwrap();
    let frame = set.frame(&SeriesKey::new(1, 1)).unwrap();

    // No lag-52 column configured, so nothing is trimmed.
    assert_eq!(frame.len(), 4);

    let lag1 = frame.column_as_f64("weekly_sales_lag1").unwrap();
    assert!(lag1[0].is_nan());
    assert_eq!(&lag1[1..], &[10.0, 20.0, 30.0]);

    let lag2 = frame.column_as_f64("weekly_sales_lag2").unwrap();
    assert!(lag2[0].is_nan() && lag2[1].is_nan());
    assert_eq!(&lag2[2..], &[10.0, 20.0]);

    // Rolling mean with a minimum of one observation.
    let roll2 = frame.column_as_f64("weekly_sales_roll2").unwrap();
    assert_eq!(roll2, vec![10.0, 15.0, 25.0, 35.0]);
}

#[test]
fn calendar_fields_use_iso_weeks() {
    let date = NaiveDate::from_ymd_opt(2011, 1, 7).unwrap();
    let records = weekly_records(1, 1, &[10.0, 20.0]);
    let set = build_features(&records, &short_config()).unwrap();
    let frame = set.frame(&SeriesKey::new(1, 1)).unwrap();

    let week = frame.column_as_f64("week").unwrap();
    let month = frame.column_as_f64("month").unwrap();
    let year = frame.column_as_f64("year").unwrap();
    assert_eq!(week[0], f64::from(date.iso_week().week()));
    assert_eq!(month[0], 1.0);
    assert_eq!(year[0], 2011.0);
}

#[test]
fn store_type_dummies_and_interactions() {
    let mut records = weekly_records(1, 1, &[10.0, 20.0, 30.0]);
    records[1].is_holiday = true;
    let set = build_features(&records, &short_config()).unwrap();
    let frame = set.frame(&SeriesKey::new(1, 1)).unwrap();

    assert_eq!(frame.column_as_f64("type_a").unwrap(), vec![0.0, 0.0, 0.0]);
    assert_eq!(frame.column_as_f64("type_b").unwrap(), vec![1.0, 1.0, 1.0]);
    assert_eq!(
        frame.column_as_f64("is_holiday_x_type_b").unwrap(),
        vec![0.0, 1.0, 0.0]
    );
    assert_eq!(
        frame.column_as_f64("is_holiday_x_type_a").unwrap(),
        vec![0.0, 0.0, 0.0]
    );
}

#[test]
fn warmup_rows_are_trimmed_with_lag52() {
    let values: Vec<f64> = (0..60).map(f64::from).collect();
    let records = weekly_records(2, 3, &values);
    let set = build_features(&records, &FeatureConfig::default()).unwrap();
    let frame = set.frame(&SeriesKey::new(2, 3)).unwrap();

    // The first 52 rows have no year-ago value and disappear.
    assert_eq!(frame.len(), 8);
    let lag52 = frame.column_as_f64("weekly_sales_lag52").unwrap();
    assert_eq!(lag52, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
}

#[test]
fn training_matrix_aligns_to_column_order() {
    let records = weekly_records(1, 1, &[10.0, 20.0, 30.0, 40.0]);
    let set = build_features(&records, &short_config()).unwrap();
    let matrix = set.training_matrix().unwrap();

    assert_eq!(matrix.x.len(), 4);
    assert_eq!(matrix.y, vec![10.0, 20.0, 30.0, 40.0]);
    for row in &matrix.x {
        assert_eq!(row.len(), set.feature_columns.len());
    }
    assert_eq!(matrix.keys[0], SeriesKey::new(1, 1));
}

#[test]
fn series_are_kept_apart() {
    let mut records = weekly_records(1, 1, &[10.0, 20.0, 30.0]);
    records.extend(weekly_records(1, 2, &[100.0, 200.0, 300.0]));
    let set = build_features(&records, &short_config()).unwrap();

    let lag1_a = set
        .frame(&SeriesKey::new(1, 1))
        .unwrap()
        .column_as_f64("weekly_sales_lag1")
        .unwrap();
    let lag1_b = set
        .frame(&SeriesKey::new(1, 2))
        .unwrap()
        .column_as_f64("weekly_sales_lag1")
        .unwrap();

    // Lags never leak across series boundaries.
    assert!(lag1_a[0].is_nan());
    assert!(lag1_b[0].is_nan());
    assert_eq!(lag1_b[1], 100.0);
}

#[rstest]
#[case(2, vec![10.0, 15.0, 25.0, 35.0])]
#[case(3, vec![10.0, 15.0, 20.0, 30.0])]
#[case(4, vec![10.0, 15.0, 20.0, 25.0])]
fn rolling_window_sizes(#[case] window: usize, #[case] expected: Vec<f64>) {
    let config = FeatureConfig {
        lags: vec![1],
        roll_windows: vec![window],
        include_price: false,
        include_markdowns: false,
        add_interactions: false,
    };
    let records = weekly_records(1, 1, &[10.0, 20.0, 30.0, 40.0]);
    let set = build_features(&records, &config).unwrap();
    let frame = set.frame(&SeriesKey::new(1, 1)).unwrap();
    let roll = frame
        .column_as_f64(&format!("weekly_sales_roll{window}"))
        .unwrap();
    assert_eq!(roll, expected);
}
