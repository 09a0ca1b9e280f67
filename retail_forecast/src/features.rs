//! Feature-matrix construction: lags, rolling means, calendar and dummy
//! columns
//!
//! Every frame built here shares one column vocabulary, fixed by
//! [`feature_column_order`]; recursion and training both align rows onto
//! that order.

use crate::data::SeriesFrame;
use crate::error::Result;
use crate::utils::nan_mean;
use chrono::{Datelike, NaiveDate};
use retail_data::{MergedRecord, SeriesKey, StoreType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Prefix of autoregressive lag columns (`weekly_sales_lag1`, ...)
pub const LAG_PREFIX: &str = "weekly_sales_lag";
/// Prefix of rolling-mean columns (`weekly_sales_roll4`, ...)
pub const ROLL_PREFIX: &str = "weekly_sales_roll";

const PRICE_COLUMNS: [&str; 4] = ["fuel_price", "cpi", "unemployment", "temperature"];
const MARKDOWN_COLUMNS: [&str; 5] = [
    "markdown1", "markdown2", "markdown3", "markdown4", "markdown5",
];
const TYPE_DUMMIES: [(StoreType, &str); 3] = [
    (StoreType::A, "type_a"),
    (StoreType::B, "type_b"),
    (StoreType::C, "type_c"),
];

/// Configuration for feature construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Lag periods for the target column
    pub lags: Vec<usize>,
    /// Rolling-mean window sizes for the target column
    pub roll_windows: Vec<usize>,
    /// Include price/market covariates
    pub include_price: bool,
    /// Include markdown covariates (missing filled with zero)
    pub include_markdowns: bool,
    /// Include holiday-by-store-type interaction columns
    pub add_interactions: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lags: vec![1, 2, 52],
            roll_windows: vec![4, 12],
            include_price: true,
            include_markdowns: true,
            add_interactions: true,
        }
    }
}

/// The canonical training column order for a configuration.
pub fn feature_column_order(config: &FeatureConfig) -> Vec<String> {
    let mut columns = vec![
        "is_holiday".to_string(),
        "week".to_string(),
        "month".to_string(),
        "year".to_string(),
    ];
    columns.extend(TYPE_DUMMIES.iter().map(|(_, name)| name.to_string()));
    for lag in &config.lags {
        columns.push(format!("{LAG_PREFIX}{lag}"));
    }
    for window in &config.roll_windows {
        columns.push(format!("{ROLL_PREFIX}{window}"));
    }
    if config.include_price {
        columns.extend(PRICE_COLUMNS.iter().map(|name| name.to_string()));
    }
    if config.include_markdowns {
        columns.extend(MARKDOWN_COLUMNS.iter().map(|name| name.to_string()));
    }
    if config.add_interactions {
        for (_, name) in &TYPE_DUMMIES {
            columns.push(format!("is_holiday_x_{name}"));
        }
    }
    columns
}

/// Feature-prepared frames for every series, plus the shared column order
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub frames: BTreeMap<SeriesKey, SeriesFrame>,
    pub feature_columns: Vec<String>,
}

/// Flattened training rows across all series, aligned to the column order
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub keys: Vec<SeriesKey>,
    pub dates: Vec<NaiveDate>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<f64>,
}

impl FeatureSet {
    pub fn frame(&self, key: &SeriesKey) -> Option<&SeriesFrame> {
        self.frames.get(key)
    }

    /// Assemble the training matrix: one row per frame row, reindexed onto
    /// `feature_columns` with absent columns filled as zero. NaN values in
    /// present columns pass through.
    pub fn training_matrix(&self) -> Result<FeatureMatrix> {
        let mut keys = Vec::new();
        let mut dates = Vec::new();
        let mut x = Vec::new();
        let mut y = Vec::new();
        for (key, frame) in &self.frames {
            let frame_dates = frame.dates();
            let target = frame.target_values();
            let columns: Vec<Vec<f64>> = self
                .feature_columns
                .iter()
                .map(|name| {
                    frame
                        .column_as_f64(name)
                        .unwrap_or_else(|_| vec![0.0; frame.len()])
                })
                .collect();
            for i in 0..frame.len() {
                keys.push(*key);
                dates.push(frame_dates[i]);
                x.push(columns.iter().map(|col| col[i]).collect());
                y.push(target[i]);
            }
        }
        Ok(FeatureMatrix { keys, dates, x, y })
    }
}

/// Build feature frames for every (store, dept) series in the records.
///
/// Rows inside the warm-up window of the longest-lag column
/// (`weekly_sales_lag52` when configured) are trimmed, matching how the
/// regressor is trained.
pub fn build_features(
    records: &[MergedRecord],
    config: &FeatureConfig,
) -> Result<FeatureSet> {
    let feature_columns = feature_column_order(config);

    let mut groups: BTreeMap<SeriesKey, Vec<&MergedRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.key()).or_default().push(record);
    }

    let mut frames = BTreeMap::new();
    for (key, mut rows) in groups {
        rows.sort_by_key(|r| r.date);
        let frame = build_series_frame(&rows, config)?;
        if frame.is_empty() {
            // Entire series consumed by warm-up trimming.
            continue;
        }
        frames.insert(key, frame);
    }

    debug!(
        series = frames.len(),
        columns = feature_columns.len(),
        "built feature frames"
    );
    Ok(FeatureSet {
        frames,
        feature_columns,
    })
}

fn build_series_frame(
    rows: &[&MergedRecord],
    config: &FeatureConfig,
) -> Result<SeriesFrame> {
    let n = rows.len();
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    let target: Vec<f64> = rows.iter().map(|r| r.weekly_sales).collect();
    let holiday: Vec<f64> = rows
        .iter()
        .map(|r| if r.is_holiday { 1.0 } else { 0.0 })
        .collect();

    let mut columns: Vec<(String, Vec<f64>)> = Vec::new();
    columns.push((SeriesFrame::TARGET_COLUMN.to_string(), target.clone()));
    columns.push(("is_holiday".to_string(), holiday.clone()));
    columns.push((
        "week".to_string(),
        dates.iter().map(|d| f64::from(d.iso_week().week())).collect(),
    ));
    columns.push((
        "month".to_string(),
        dates.iter().map(|d| f64::from(d.month())).collect(),
    ));
    columns.push((
        "year".to_string(),
        dates.iter().map(|d| d.year() as f64).collect(),
    ));

    let mut dummies: Vec<Vec<f64>> = Vec::with_capacity(TYPE_DUMMIES.len());
    for (variant, name) in &TYPE_DUMMIES {
        let values: Vec<f64> = rows
            .iter()
            .map(|r| {
                if r.store_type == Some(*variant) {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        dummies.push(values.clone());
        columns.push((name.to_string(), values));
    }

    for &lag in &config.lags {
        let values: Vec<f64> = (0..n)
            .map(|i| if i >= lag { target[i - lag] } else { f64::NAN })
            .collect();
        columns.push((format!("{LAG_PREFIX}{lag}"), values));
    }

    for &window in &config.roll_windows {
        let values: Vec<f64> = (0..n)
            .map(|i| {
                let start = (i + 1).saturating_sub(window.max(1));
                nan_mean(&target[start..=i]).unwrap_or(f64::NAN)
            })
            .collect();
        columns.push((format!("{ROLL_PREFIX}{window}"), values));
    }

    if config.include_price {
        let covariates: [Vec<f64>; 4] = [
            rows.iter().map(|r| opt_to_nan(r.fuel_price)).collect(),
            rows.iter().map(|r| opt_to_nan(r.cpi)).collect(),
            rows.iter().map(|r| opt_to_nan(r.unemployment)).collect(),
            rows.iter().map(|r| opt_to_nan(r.temperature)).collect(),
        ];
        for (name, values) in PRICE_COLUMNS.iter().zip(covariates) {
            columns.push((name.to_string(), values));
        }
    }

    if config.include_markdowns {
        for (slot, name) in MARKDOWN_COLUMNS.iter().enumerate() {
            // Missing markdowns mean "no promotion", hence zero not NaN.
            let values: Vec<f64> = rows
                .iter()
                .map(|r| r.markdowns[slot].unwrap_or(0.0))
                .collect();
            columns.push((name.to_string(), values));
        }
    }

    if config.add_interactions {
        for ((_, name), dummy) in TYPE_DUMMIES.iter().zip(&dummies) {
            let values: Vec<f64> = holiday
                .iter()
                .zip(dummy.iter())
                .map(|(h, d)| h * d)
                .collect();
            columns.push((format!("is_holiday_x_{name}"), values));
        }
    }

    // Warm-up trimming: the longest lag leaves a NaN prefix no regressor
    // was trained on.
    let lag52_name = format!("{LAG_PREFIX}52");
    let keep: Vec<usize> = match columns.iter().find(|(name, _)| *name == lag52_name) {
        Some((_, lag52)) => (0..n).filter(|&i| !lag52[i].is_nan()).collect(),
        None => (0..n).collect(),
    };

    let kept_dates: Vec<NaiveDate> = keep.iter().map(|&i| dates[i]).collect();
    let kept_columns: Vec<(String, Vec<f64>)> = columns
        .into_iter()
        .map(|(name, values)| {
            (name, keep.iter().map(|&i| values[i]).collect())
        })
        .collect();

    SeriesFrame::from_columns(&kept_dates, kept_columns)
}

fn opt_to_nan(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::NAN)
}
