//! Seasonal naive forecasting: repeat the latest year-ago observation

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastResult, SeriesModel, TrainedSeriesModel};

/// Seasonal naive model with a fixed period
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    name: String,
    period: usize,
}

/// Trained seasonal naive model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalNaive {
    name: String,
    reference: f64,
}

impl SeasonalNaive {
    /// Create a new seasonal naive model
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be positive".to_string(),
            ));
        }
        Ok(Self {
            name: format!("seasonal naive ({period}w)"),
            period,
        })
    }

    /// The 52-week model used for weekly retail series
    pub fn weekly() -> Self {
        Self {
            name: "seasonal naive (52w)".to_string(),
            period: 52,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl SeriesModel for SeasonalNaive {
    type Trained = TrainedSeasonalNaive;

    fn train(&self, series: &SalesSeries) -> Result<TrainedSeasonalNaive> {
        // The most recent row must have a value one full period back.
        if series.len() <= self.period {
            return Err(ForecastError::ModelError(format!(
                "not enough history for {}: need more than {} observations, got {}",
                self.name,
                self.period,
                series.len()
            )));
        }
        let reference = series.values[series.len() - 1 - self.period];
        Ok(TrainedSeasonalNaive {
            name: self.name.clone(),
            reference,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeriesModel for TrainedSeasonalNaive {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        ForecastResult::new(vec![self.reference; horizon], horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
