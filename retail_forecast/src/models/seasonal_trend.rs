//! Additive trend plus Fourier seasonality, fitted by least squares
//!
//! A Prophet-class decomposition for weekly series: linear trend over the
//! observation index and sine/cosine pairs at harmonics of the annual
//! period. Intervals come from the in-sample residual spread and a normal
//! quantile at the configured confidence level.

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastResult, SeriesModel, TrainedSeriesModel};
use crate::utils::lstsq;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::TAU;

/// Additive seasonal-trend model
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    name: String,
    fourier_order: usize,
    period: f64,
    confidence: f64,
}

/// Trained additive seasonal-trend model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalTrend {
    name: String,
    coefficients: Vec<f64>,
    fourier_order: usize,
    period: f64,
    confidence: f64,
    residual_std: f64,
    n_observations: usize,
}

impl SeasonalTrend {
    /// Minimum observations before a fit is attempted
    pub const MIN_OBSERVATIONS: usize = 20;

    /// Create a new seasonal-trend model
    pub fn new(fourier_order: usize, period: f64) -> Result<Self> {
        if fourier_order == 0 {
            return Err(ForecastError::InvalidParameter(
                "fourier order must be at least 1".to_string(),
            ));
        }
        if !period.is_finite() || period <= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be a finite value above 1".to_string(),
            ));
        }
        Ok(Self {
            name: format!("seasonal trend (k={fourier_order}, period={period})"),
            fourier_order,
            period,
            confidence: 0.95,
        })
    }

    /// The annual weekly-cadence model (3 harmonics over 52 weeks)
    pub fn weekly() -> Self {
        Self {
            name: "seasonal trend (k=3, period=52)".to_string(),
            fourier_order: 3,
            period: 52.0,
            confidence: 0.95,
        }
    }

    /// Override the interval confidence level (exclusive 0..1)
    pub fn with_confidence(mut self, level: f64) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "confidence level must be between 0 and 1".to_string(),
            ));
        }
        self.confidence = level;
        Ok(self)
    }

    fn design_row(&self, t: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(2 + 2 * self.fourier_order);
        row.push(1.0);
        row.push(t);
        for k in 1..=self.fourier_order {
            let angle = TAU * k as f64 * t / self.period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
        row
    }
}

impl SeriesModel for SeasonalTrend {
    type Trained = TrainedSeasonalTrend;

    fn train(&self, series: &SalesSeries) -> Result<TrainedSeasonalTrend> {
        if series.len() < Self::MIN_OBSERVATIONS {
            return Err(ForecastError::ModelError(format!(
                "not enough history for {}: need at least {} observations, got {}",
                self.name,
                Self::MIN_OBSERVATIONS,
                series.len()
            )));
        }

        let rows: Vec<Vec<f64>> = (0..series.len())
            .map(|t| self.design_row(t as f64))
            .collect();
        let coefficients = lstsq(&rows, &series.values)?;

        let n_params = coefficients.len();
        let residual_sq: f64 = rows
            .iter()
            .zip(&series.values)
            .map(|(row, &actual)| {
                let fitted: f64 =
                    row.iter().zip(&coefficients).map(|(r, c)| r * c).sum();
                (actual - fitted).powi(2)
            })
            .sum();
        let dof = series.len().saturating_sub(n_params).max(1);
        let residual_std = (residual_sq / dof as f64).sqrt();

        Ok(TrainedSeasonalTrend {
            name: self.name.clone(),
            coefficients,
            fourier_order: self.fourier_order,
            period: self.period,
            confidence: self.confidence,
            residual_std,
            n_observations: series.len(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeriesModel for TrainedSeasonalTrend {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let normal = Normal::new(0.0, 1.0).map_err(|e| {
            ForecastError::ModelError(format!("normal quantile unavailable: {e}"))
        })?;
        let z = normal.inverse_cdf(0.5 + self.confidence / 2.0);

        let mut values = Vec::with_capacity(horizon);
        let mut intervals = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let t = (self.n_observations - 1 + step) as f64;
            let mut row = Vec::with_capacity(self.coefficients.len());
            row.push(1.0);
            row.push(t);
            for k in 1..=self.fourier_order {
                let angle = TAU * k as f64 * t / self.period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
            let value: f64 = row
                .iter()
                .zip(&self.coefficients)
                .map(|(r, c)| r * c)
                .sum();
            let margin = z * self.residual_std;
            values.push(value);
            intervals.push((value - margin, value + margin));
        }

        ForecastResult::new(values, horizon)?.with_intervals(intervals)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
