//! Forecasting models: the regressor interface, per-series models, and
//! forecast results

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Debug;

pub mod random_forest;
pub mod sarima;
pub mod seasonal_naive;
pub mod seasonal_trend;

/// A fitted single-step regressor: one feature row in training column
/// order in, one scalar out.
///
/// Implementations are stateless and thread-safe; concurrent forecasts for
/// different series may share one regressor. A prediction failure means
/// the model and the feature row disagree and is surfaced to the caller
/// rather than masked.
pub trait Regressor: Debug + Send + Sync {
    /// Predict a single value from a feature row
    fn predict_row(&self, features: &[f64]) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast result containing predicted values
#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizon: usize,
    /// Confidence intervals (optional)
    intervals: Option<Vec<(f64, f64)>>,
    /// Weekly timestamps aligned with the values (optional)
    dates: Option<Vec<NaiveDate>>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::ValidationError(format!(
                "values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }
        Ok(Self {
            values,
            horizon,
            intervals: None,
            dates: None,
        })
    }

    /// Attach confidence intervals
    pub fn with_intervals(mut self, intervals: Vec<(f64, f64)>) -> Result<Self> {
        if intervals.len() != self.horizon {
            return Err(ForecastError::ValidationError(format!(
                "intervals length ({}) doesn't match horizon ({})",
                intervals.len(),
                self.horizon
            )));
        }
        self.intervals = Some(intervals);
        Ok(self)
    }

    /// Attach forecast timestamps
    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Result<Self> {
        if dates.len() != self.horizon {
            return Err(ForecastError::ValidationError(format!(
                "dates length ({}) doesn't match horizon ({})",
                dates.len(),
                self.horizon
            )));
        }
        self.dates = Some(dates);
        Ok(self)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Get the confidence intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Get the forecast timestamps, if available
    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        if self.values.len() != actual.len() || actual.is_empty() {
            return Err(ForecastError::ValidationError(format!(
                "forecast length ({}) doesn't match actual length ({})",
                self.values.len(),
                actual.len()
            )));
        }
        let sum: f64 = self
            .values
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).abs())
            .sum();
        Ok(sum / self.values.len() as f64)
    }

    /// Serialize to JSON (ISO dates, plain float values)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Forecast model that can be trained on a single sales series
pub trait SeriesModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedSeriesModel;

    /// Train the model on a sales series
    fn train(&self, series: &SalesSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Trained per-series forecast model
pub trait TrainedSeriesModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}
