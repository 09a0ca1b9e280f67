//! Per-series data containers for forecasting

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveTime};
use polars::prelude::*;
use retail_data::{MergedRecord, SeriesKey};

pub(crate) fn date_to_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

pub(crate) fn millis_to_date(millis: i64) -> NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.date_naive())
        .unwrap_or(NaiveDate::MIN)
}

/// Feature-prepared rows for a single (store, dept) series.
///
/// Wraps a polars `DataFrame` with a fixed layout: an `Int64`
/// epoch-millisecond time column, a `Float64` target column, and `Float64`
/// feature columns. Missing values are encoded as NaN rather than nulls so
/// window math follows nan-aware semantics. The column set is decided at
/// construction and never changes afterwards.
#[derive(Debug, Clone)]
pub struct SeriesFrame {
    /// Data frame containing the series rows
    df: DataFrame,
    /// Name of the time column
    time_column: String,
    /// Name of the target column
    target_column: String,
}

impl SeriesFrame {
    pub const TIME_COLUMN: &'static str = "date";
    pub const TARGET_COLUMN: &'static str = "weekly_sales";

    /// Wrap an existing DataFrame. The time column must exist; the target
    /// column may be absent (downstream code falls back to lag features).
    pub fn new(
        df: DataFrame,
        time_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Result<Self> {
        let time_column = time_column.into();
        let target_column = target_column.into();
        if df.column(&time_column).is_err() {
            return Err(ForecastError::DataError(format!(
                "time column '{}' not found in frame",
                time_column
            )));
        }
        Ok(Self {
            df,
            time_column,
            target_column,
        })
    }

    /// Build a frame from dates plus named `Float64` columns of equal length.
    pub fn from_columns(
        dates: &[NaiveDate],
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self> {
        let mut series: Vec<Series> = Vec::with_capacity(columns.len() + 1);
        series.push(Series::new(
            Self::TIME_COLUMN,
            dates.iter().map(|d| date_to_millis(*d)).collect::<Vec<i64>>(),
        ));
        for (name, values) in columns {
            if values.len() != dates.len() {
                return Err(ForecastError::DataError(format!(
                    "column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    dates.len()
                )));
            }
            series.push(Series::new(&name, values));
        }
        let df = DataFrame::new(series)?;
        Self::new(df, Self::TIME_COLUMN, Self::TARGET_COLUMN)
    }

    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the time column name
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    /// Get the target column name
    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    /// Number of rows in the series
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check whether the series has no rows
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Whether a column is present
    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Row timestamps in frame order
    pub fn dates(&self) -> Vec<NaiveDate> {
        let Ok(col) = self.df.column(&self.time_column) else {
            return Vec::new();
        };
        let Ok(ca) = col.i64() else {
            return Vec::new();
        };
        ca.into_iter()
            .map(|v| millis_to_date(v.unwrap_or(0)))
            .collect()
    }

    /// The most recent timestamp
    pub fn last_date(&self) -> Result<NaiveDate> {
        self.dates()
            .last()
            .copied()
            .ok_or_else(|| ForecastError::DataError("series has no rows".to_string()))
    }

    /// Column values with row alignment preserved; nulls come back as NaN.
    pub fn column_as_f64(&self, name: &str) -> Result<Vec<f64>> {
        let col = self.df.column(name)?;
        let values = match col.dtype() {
            DataType::Float64 => col
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect(),
            DataType::Float32 => col
                .f32()?
                .into_iter()
                .map(|v| v.map(f64::from).unwrap_or(f64::NAN))
                .collect(),
            DataType::Int64 => col
                .i64()?
                .into_iter()
                .map(|v| v.map(|x| x as f64).unwrap_or(f64::NAN))
                .collect(),
            DataType::Int32 => col
                .i32()?
                .into_iter()
                .map(|v| v.map(f64::from).unwrap_or(f64::NAN))
                .collect(),
            other => {
                return Err(ForecastError::DataError(format!(
                    "column '{}' has non-numeric dtype {:?}",
                    name, other
                )))
            }
        };
        Ok(values)
    }

    /// Target values in row order; empty when the target column is absent.
    pub fn target_values(&self) -> Vec<f64> {
        self.column_as_f64(&self.target_column).unwrap_or_default()
    }

    /// All non-time column names in frame order
    pub fn feature_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .filter(|name| **name != self.time_column)
            .map(|name| name.to_string())
            .collect()
    }

    /// Every non-time column of the most recent row, in frame order.
    pub fn last_row(&self) -> Result<Vec<(String, f64)>> {
        if self.is_empty() {
            return Err(ForecastError::DataError(
                "series has no rows".to_string(),
            ));
        }
        let idx = self.len() - 1;
        let names = self.feature_names();
        let mut row = Vec::with_capacity(names.len());
        for name in names {
            let values = self.column_as_f64(&name)?;
            row.push((name, values[idx]));
        }
        Ok(row)
    }
}

/// A raw (date, sales) series for the per-series classical models
#[derive(Debug, Clone)]
pub struct SalesSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl SalesSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::ValidationError(format!(
                "dates ({}) and values ({}) must have the same length",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self { dates, values })
    }

    /// Extract one series from merged records: NaN targets dropped, rows
    /// sorted by date. Errors when the key has no usable rows.
    pub fn from_records(records: &[MergedRecord], key: SeriesKey) -> Result<Self> {
        let mut rows: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter(|r| r.key() == key && !r.weekly_sales.is_nan())
            .map(|r| (r.date, r.weekly_sales))
            .collect();
        if rows.is_empty() {
            return Err(ForecastError::DataError(format!(
                "no sales rows for {}",
                key
            )));
        }
        rows.sort_by_key(|(date, _)| *date);
        Ok(Self {
            dates: rows.iter().map(|(d, _)| *d).collect(),
            values: rows.iter().map(|(_, v)| *v).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}
