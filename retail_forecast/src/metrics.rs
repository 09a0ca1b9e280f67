//! Accuracy metrics for forecast evaluation

use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Forecast accuracy metrics
#[derive(Debug, Clone, Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

/// Calculate accuracy metrics for a forecast against actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::ValidationError(
            "forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let mape = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .sum::<f64>()
        / n;

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Mean absolute error between actual and forecast values
pub fn mean_absolute_error(actual: &[f64], forecast: &[f64]) -> Result<f64> {
    if actual.len() != forecast.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "actual and forecast values must have the same non-zero length".to_string(),
        ));
    }
    let sum: f64 = actual
        .iter()
        .zip(forecast.iter())
        .map(|(a, f)| (a - f).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Weighted mean absolute error. Weights typically come from per-series
/// average sales so large series dominate the score the way they dominate
/// the business.
pub fn wmae(actual: &[f64], forecast: &[f64], weights: &[f64]) -> Result<f64> {
    if actual.len() != forecast.len() || actual.len() != weights.len() || actual.is_empty() {
        return Err(ForecastError::ValidationError(
            "actual, forecast and weights must have the same non-zero length".to_string(),
        ));
    }
    let denominator: f64 = weights.iter().sum();
    if denominator == 0.0 {
        return Err(ForecastError::ValidationError(
            "weights sum to zero".to_string(),
        ));
    }
    let numerator: f64 = actual
        .iter()
        .zip(forecast.iter())
        .zip(weights.iter())
        .map(|((a, f), w)| w * (a - f).abs())
        .sum();
    Ok(numerator / denominator)
}
