use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate};
use retail_forecast::data::SalesSeries;
use retail_forecast::models::random_forest::{ForestConfig, RandomForest};
use retail_forecast::models::sarima::Sarima;
use retail_forecast::models::seasonal_naive::SeasonalNaive;
use retail_forecast::models::seasonal_trend::SeasonalTrend;
use retail_forecast::models::{ForecastResult, Regressor, SeriesModel, TrainedSeriesModel};
use std::f64::consts::TAU;

fn weekly_series(values: Vec<f64>) -> SalesSeries {
    let start = NaiveDate::from_ymd_opt(2010, 2, 5).unwrap();
    let dates = (0..values.len())
        .map(|k| start + Duration::weeks(k as i64))
        .collect();
    SalesSeries::new(dates, values).unwrap()
}

fn small_forest_config() -> ForestConfig {
    ForestConfig {
        trees: 25,
        max_depth: Some(6),
        min_samples_leaf: 1,
        max_features: None,
        seed: 7,
    }
}

fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
    let x: Vec<Vec<f64>> = (0..20).map(|k| vec![f64::from(k)]).collect();
    let y: Vec<f64> = (0..20).map(|k| if k < 10 { 0.0 } else { 10.0 }).collect();
    (x, y)
}

#[test]
fn forest_learns_a_step_function() {
    let (x, y) = step_data();
    let forest = RandomForest::new(small_forest_config()).fit(&x, &y).unwrap();

    let low = forest.predict_row(&[2.0]).unwrap();
    let high = forest.predict_row(&[17.0]).unwrap();
    assert!(low < 1.0, "expected ~0, got {low}");
    assert!(high > 9.0, "expected ~10, got {high}");
}

#[test]
fn forest_is_deterministic_for_a_seed() {
    let (x, y) = step_data();
    let first = RandomForest::new(small_forest_config()).fit(&x, &y).unwrap();
    let second = RandomForest::new(small_forest_config()).fit(&x, &y).unwrap();

    for probe in [0.0, 4.5, 9.5, 12.0, 19.0] {
        assert_eq!(
            first.predict_row(&[probe]).unwrap(),
            second.predict_row(&[probe]).unwrap()
        );
    }
}

#[test]
fn forest_json_roundtrip_preserves_predictions() {
    let (x, y) = step_data();
    let forest = RandomForest::new(small_forest_config()).fit(&x, &y).unwrap();
    let restored =
        retail_forecast::models::random_forest::TrainedForest::from_json(
            &forest.to_json().unwrap(),
        )
        .unwrap();

    for probe in [1.0, 8.0, 13.0] {
        assert_eq!(
            forest.predict_row(&[probe]).unwrap(),
            restored.predict_row(&[probe]).unwrap()
        );
    }
    assert_eq!(forest.n_trees(), restored.n_trees());
}

#[test]
fn forest_routes_nan_without_failing() {
    let (x, y) = step_data();
    let forest = RandomForest::new(small_forest_config()).fit(&x, &y).unwrap();
    let prediction = forest.predict_row(&[f64::NAN]).unwrap();
    assert!(prediction.is_finite());
}

#[test]
fn forest_rejects_wrong_row_width() {
    let (x, y) = step_data();
    let forest = RandomForest::new(small_forest_config()).fit(&x, &y).unwrap();
    assert!(forest.predict_row(&[1.0, 2.0]).is_err());
}

#[test]
fn forest_rejects_degenerate_training_input() {
    let forest = RandomForest::new(small_forest_config());
    assert!(forest.fit(&[], &[]).is_err());
    assert!(forest.fit(&[vec![1.0]], &[1.0, 2.0]).is_err());
}

#[test]
fn seasonal_naive_repeats_the_year_ago_value() {
    let mut values: Vec<f64> = (0..53).map(f64::from).collect();
    values[0] = 123.0;
    let series = weekly_series(values);
    let trained = SeasonalNaive::weekly().train(&series).unwrap();
    let forecast = trained.forecast(3).unwrap();

    // 53 observations: the latest row's year-ago value is the first one.
    assert_eq!(forecast.values(), &[123.0, 123.0, 123.0]);
}

#[test]
fn seasonal_naive_needs_a_full_period() {
    let series = weekly_series((0..52).map(f64::from).collect());
    assert!(SeasonalNaive::weekly().train(&series).is_err());
}

#[test]
fn sarima_produces_a_finite_horizon() {
    let values: Vec<f64> = (0..120)
        .map(|k| {
            20_000.0 + 40.0 * f64::from(k) + 4_000.0 * (TAU * f64::from(k) / 52.0).sin()
        })
        .collect();
    let series = weekly_series(values);
    let trained = Sarima::weekly_default().train(&series).unwrap();
    let forecast = trained.forecast(8).unwrap();

    assert_eq!(forecast.values().len(), 8);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn sarima_rejects_short_series() {
    let series = weekly_series((0..40).map(f64::from).collect());
    assert!(Sarima::weekly_default().train(&series).is_err());
}

#[test]
fn seasonal_trend_tracks_a_clean_sinusoid() {
    let signal = |t: f64| 1_000.0 + 5.0 * t + 200.0 * (TAU * t / 52.0).sin();
    let values: Vec<f64> = (0..156).map(|k| signal(f64::from(k))).collect();
    let series = weekly_series(values);

    let trained = SeasonalTrend::weekly().train(&series).unwrap();
    let forecast = trained.forecast(8).unwrap();

    for (step, value) in forecast.values().iter().enumerate() {
        let expected = signal((155 + step + 1) as f64);
        assert!(
            (value - expected).abs() < 1.0,
            "step {step}: {value} vs {expected}"
        );
    }
}

#[test]
fn seasonal_trend_intervals_bracket_the_point_forecast() {
    let values: Vec<f64> = (0..60)
        .map(|k| 500.0 + 10.0 * (TAU * f64::from(k) / 52.0).cos())
        .collect();
    let series = weekly_series(values);
    let forecast = SeasonalTrend::weekly()
        .train(&series)
        .unwrap()
        .forecast(4)
        .unwrap();

    let intervals = forecast.intervals().unwrap();
    assert_eq!(intervals.len(), 4);
    for ((lower, upper), value) in intervals.iter().zip(forecast.values()) {
        assert!(lower <= value && value <= upper);
    }
}

#[test]
fn seasonal_trend_rejects_tiny_series() {
    let series = weekly_series((0..10).map(f64::from).collect());
    assert!(SeasonalTrend::weekly().train(&series).is_err());
}

#[test]
fn forecast_result_validates_lengths() {
    assert!(ForecastResult::new(vec![1.0, 2.0], 3).is_err());

    let result = ForecastResult::new(vec![1.0, 2.0, 3.0], 3).unwrap();
    assert!(result.clone().with_intervals(vec![(0.0, 2.0)]).is_err());
    assert!(result
        .clone()
        .with_dates(vec![NaiveDate::from_ymd_opt(2012, 1, 6).unwrap()])
        .is_err());

    let error = result.mean_absolute_error(&[2.0, 3.0, 4.0]).unwrap();
    assert_approx_eq!(error, 1.0);

    let json = result.to_json().unwrap();
    assert!(json.contains("values"));
}

#[test]
fn invalid_model_parameters_are_rejected() {
    assert!(SeasonalNaive::new(0).is_err());
    assert!(SeasonalTrend::new(0, 52.0).is_err());
    assert!(SeasonalTrend::new(3, 1.0).is_err());
    assert!(SeasonalTrend::weekly().with_confidence(1.5).is_err());
}
