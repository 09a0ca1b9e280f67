//! End-to-end orchestration: training the global model and serving
//! forecasts by mode

use crate::artifacts::TrainedArtifacts;
use crate::baselines::holdout_cutoff;
use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::features::{build_features, FeatureConfig};
use crate::forecasting::recursive_forecast;
use crate::metrics::{mean_absolute_error, wmae};
use crate::models::random_forest::{ForestConfig, RandomForest};
use crate::models::sarima::Sarima;
use crate::models::seasonal_naive::SeasonalNaive;
use crate::models::seasonal_trend::SeasonalTrend;
use crate::models::{ForecastResult, Regressor, SeriesModel, TrainedSeriesModel};
use crate::utils::weekly_timestamps;
use retail_data::{MergedRecord, SeriesKey};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Which model serves a forecast request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastMode {
    /// The global random forest, driven through the recursive forecaster
    GlobalForest,
    /// Per-series repeat of the year-ago value
    SeasonalNaive,
    /// Per-series seasonal ARIMA
    Sarima,
    /// Per-series additive seasonal-trend decomposition
    SeasonalTrend,
}

impl ForecastMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMode::GlobalForest => "global_forest",
            ForecastMode::SeasonalNaive => "seasonal_naive",
            ForecastMode::Sarima => "sarima",
            ForecastMode::SeasonalTrend => "seasonal_trend",
        }
    }
}

impl fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ForecastMode {
    type Err = ForecastError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "global_forest" => Ok(ForecastMode::GlobalForest),
            "seasonal_naive" => Ok(ForecastMode::SeasonalNaive),
            "sarima" => Ok(ForecastMode::Sarima),
            "seasonal_trend" => Ok(ForecastMode::SeasonalTrend),
            other => Err(ForecastError::InvalidParameter(format!(
                "unknown forecast mode: {other}"
            ))),
        }
    }
}

/// One forecast request for a single series
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    pub key: SeriesKey,
    pub mode: ForecastMode,
    pub horizon: usize,
}

/// Configuration for global model training
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Weeks held out at the end of the data for scoring
    pub holdout_weeks: i64,
    pub features: FeatureConfig,
    pub forest: ForestConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            holdout_weeks: 8,
            features: FeatureConfig::default(),
            forest: ForestConfig::default(),
        }
    }
}

/// A trained global model plus its holdout scores
#[derive(Debug)]
pub struct TrainOutcome {
    pub artifacts: TrainedArtifacts,
    pub holdout_rows: usize,
    pub holdout_mae: f64,
    pub holdout_wmae: f64,
}

/// Fit the global forest on everything before the holdout cutoff and
/// score it on the rows after. No hyperparameter search happens here; the
/// config is taken as given.
pub fn train_global_forest(
    records: &[MergedRecord],
    config: &TrainConfig,
) -> Result<TrainOutcome> {
    let cutoff = holdout_cutoff(records, config.holdout_weeks)?;
    let features = build_features(records, &config.features)?;
    let matrix = features.training_matrix()?;

    let mut x_train = Vec::new();
    let mut y_train = Vec::new();
    let mut train_sums: HashMap<SeriesKey, (f64, usize)> = HashMap::new();
    let mut x_test = Vec::new();
    let mut y_test = Vec::new();
    let mut test_keys = Vec::new();
    for i in 0..matrix.x.len() {
        if matrix.dates[i] <= cutoff {
            let entry = train_sums.entry(matrix.keys[i]).or_insert((0.0, 0));
            entry.0 += matrix.y[i];
            entry.1 += 1;
            x_train.push(matrix.x[i].clone());
            y_train.push(matrix.y[i]);
        } else {
            x_test.push(matrix.x[i].clone());
            y_test.push(matrix.y[i]);
            test_keys.push(matrix.keys[i]);
        }
    }
    if x_train.is_empty() {
        return Err(ForecastError::DataError(
            "no training rows before the holdout cutoff".to_string(),
        ));
    }

    let forest = RandomForest::new(config.forest.clone()).fit(&x_train, &y_train)?;

    let (holdout_mae, holdout_wmae) = if x_test.is_empty() {
        (f64::NAN, f64::NAN)
    } else {
        let mut forecast = Vec::with_capacity(x_test.len());
        for row in &x_test {
            forecast.push(forest.predict_row(row)?);
        }
        let train_mean = y_train.iter().sum::<f64>() / y_train.len() as f64;
        let weights: Vec<f64> = test_keys
            .iter()
            .map(|key| {
                train_sums
                    .get(key)
                    .map(|(sum, count)| sum / (*count).max(1) as f64)
                    .unwrap_or(train_mean)
            })
            .collect();
        (
            mean_absolute_error(&y_test, &forecast)?,
            wmae(&y_test, &forecast, &weights)?,
        )
    };

    info!(
        train_rows = x_train.len(),
        holdout_rows = y_test.len(),
        holdout_mae,
        "trained global forest"
    );
    Ok(TrainOutcome {
        artifacts: TrainedArtifacts {
            forest,
            feature_columns: features.feature_columns,
        },
        holdout_rows: y_test.len(),
        holdout_mae,
        holdout_wmae,
    })
}

/// Serve one forecast request as a library call: the dispatch an HTTP
/// endpoint or batch job sits on top of.
///
/// `artifacts` is only consulted for [`ForecastMode::GlobalForest`]; the
/// per-series modes train on the raw series in place.
pub fn forecast_series(
    records: &[MergedRecord],
    request: &ForecastRequest,
    artifacts: Option<&TrainedArtifacts>,
    features: &FeatureConfig,
) -> Result<ForecastResult> {
    if request.horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be at least 1".to_string(),
        ));
    }

    match request.mode {
        ForecastMode::GlobalForest => {
            let artifacts = artifacts.ok_or_else(|| {
                ForecastError::ModelError(
                    "global forest mode needs trained artifacts".to_string(),
                )
            })?;
            let feature_set = build_features(records, features)?;
            let frame = feature_set.frame(&request.key).ok_or_else(|| {
                ForecastError::DataError(format!(
                    "no feature rows for {} after warm-up trimming",
                    request.key
                ))
            })?;
            recursive_forecast(
                frame,
                &artifacts.feature_columns,
                &artifacts.forest,
                request.horizon,
            )
        }
        ForecastMode::SeasonalNaive => {
            per_series_forecast(records, request, &SeasonalNaive::weekly())
        }
        ForecastMode::Sarima => {
            per_series_forecast(records, request, &Sarima::weekly_default())
        }
        ForecastMode::SeasonalTrend => {
            per_series_forecast(records, request, &SeasonalTrend::weekly())
        }
    }
}

fn per_series_forecast<M: SeriesModel>(
    records: &[MergedRecord],
    request: &ForecastRequest,
    model: &M,
) -> Result<ForecastResult> {
    let series = SalesSeries::from_records(records, request.key)?;
    let last_date = series.last_date().ok_or_else(|| {
        ForecastError::DataError(format!("no dated rows for {}", request.key))
    })?;
    let result = model.train(&series)?.forecast(request.horizon)?;
    result.with_dates(weekly_timestamps(last_date, request.horizon))
}
