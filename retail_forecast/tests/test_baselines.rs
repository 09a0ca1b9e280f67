use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate};
use retail_data::MergedRecord;
use retail_forecast::baselines::{evaluate_naives, holdout_cutoff};

fn record(store: u32, dept: u32, date: NaiveDate, sales: f64) -> MergedRecord {
    MergedRecord {
        store,
        dept,
        date,
        weekly_sales: sales,
        is_holiday: false,
        store_type: None,
        store_size: None,
        temperature: None,
        fuel_price: None,
        markdowns: [None; 5],
        cpi: None,
        unemployment: None,
    }
}

fn weekly_records(store: u32, dept: u32, values: &[f64]) -> Vec<MergedRecord> {
    let start = NaiveDate::from_ymd_opt(2010, 2, 5).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(k, &v)| record(store, dept, start + Duration::weeks(k as i64), v))
        .collect()
}

#[test]
fn cutoff_is_measured_from_the_latest_date() {
    let records = weekly_records(1, 1, &[1.0, 2.0, 3.0, 4.0]);
    let cutoff = holdout_cutoff(&records, 2).unwrap();
    assert_eq!(cutoff, records[3].date - Duration::weeks(2));
}

#[test]
fn naive_one_week_error_on_a_linear_series() {
    // Sales climb by 10 a week, so last week's value is always off by 10.
    let values: Vec<f64> = (0..20).map(|k| 100.0 + 10.0 * f64::from(k)).collect();
    let records = weekly_records(1, 1, &values);

    let reports = evaluate_naives(&records, 4).unwrap();
    let naive = reports.iter().find(|r| r.name == "naive (1w)").unwrap();
    assert_eq!(naive.rows, 4);
    assert_approx_eq!(naive.mae, 10.0);
    assert_approx_eq!(naive.wmae, 10.0);
}

#[test]
fn seasonal_baseline_needs_a_year_of_history() {
    let values: Vec<f64> = (0..20).map(f64::from).collect();
    let records = weekly_records(1, 1, &values);

    let reports = evaluate_naives(&records, 4).unwrap();
    // Twenty weeks cannot score a 52-week lag.
    assert!(reports.iter().all(|r| r.name != "seasonal naive (52w)"));
}

#[test]
fn seasonal_baseline_scores_on_long_series() {
    // Two identical years: the year-ago value is a perfect forecast.
    let values: Vec<f64> = (0..104)
        .map(|k| 1_000.0 + f64::from(k % 52))
        .collect();
    let records = weekly_records(1, 1, &values);

    let reports = evaluate_naives(&records, 8).unwrap();
    let seasonal = reports
        .iter()
        .find(|r| r.name == "seasonal naive (52w)")
        .unwrap();
    assert_eq!(seasonal.rows, 8);
    assert_approx_eq!(seasonal.mae, 0.0);
}

#[test]
fn empty_input_is_an_error() {
    assert!(evaluate_naives(&[], 4).is_err());
    assert!(holdout_cutoff(&[], 4).is_err());
}
