//! Seasonal ARIMA fitted by two-stage conditional least squares
//!
//! Differencing (regular then seasonal) is applied up front. AR/MA terms
//! are estimated Hannan-Rissanen style: a long autoregression supplies
//! residual estimates, then one least-squares pass regresses the
//! differenced series on its own lags and those residual lags. Forecasts
//! run the ARMA recursion with zero future innovations before inverting
//! the differencing. Term groups whose lags reach past the available
//! differenced sample are dropped rather than failing the fit.

use crate::data::SalesSeries;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastResult, SeriesModel, TrainedSeriesModel};
use crate::utils::lstsq;
use tracing::warn;

/// Non-seasonal (p, d, q) order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

/// Seasonal (P, D, Q) order with its period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub period: usize,
}

/// One ARMA regressor: a lag of the differenced series or of the residuals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Ar(usize),
    Ma(usize),
}

impl Term {
    fn lag(&self) -> usize {
        match self {
            Term::Ar(lag) | Term::Ma(lag) => *lag,
        }
    }
}

/// Seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct Sarima {
    name: String,
    order: SarimaOrder,
    seasonal: SeasonalOrder,
}

/// Trained seasonal ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedSarima {
    name: String,
    d: usize,
    period: usize,
    terms: Vec<Term>,
    coefficients: Vec<f64>,
    /// Differencing chain: levels[0] is the raw series, each next level
    /// one more difference (regular first, then seasonal); the last level
    /// is the series the ARMA terms were fitted on.
    levels: Vec<Vec<f64>>,
    residuals: Vec<f64>,
}

impl Sarima {
    /// Minimum observations before a fit is attempted
    pub const MIN_OBSERVATIONS: usize = 60;

    /// Create a new seasonal ARIMA model
    pub fn new(order: SarimaOrder, seasonal: SeasonalOrder) -> Result<Self> {
        let seasonal_used = seasonal.p + seasonal.d + seasonal.q > 0;
        if seasonal_used && seasonal.period < 2 {
            return Err(ForecastError::InvalidParameter(
                "seasonal period must be at least 2 when seasonal orders are set"
                    .to_string(),
            ));
        }
        if order.p + order.q + seasonal.p + seasonal.q == 0 {
            return Err(ForecastError::InvalidParameter(
                "at least one AR or MA term is required".to_string(),
            ));
        }
        Ok(Self {
            name: format!(
                "SARIMA({},{},{})({},{},{})[{}]",
                order.p,
                order.d,
                order.q,
                seasonal.p,
                seasonal.d,
                seasonal.q,
                seasonal.period
            ),
            order,
            seasonal,
        })
    }

    /// The (1,1,1)(1,1,1)[52] model used for weekly retail series
    pub fn weekly_default() -> Self {
        Self {
            name: "SARIMA(1,1,1)(1,1,1)[52]".to_string(),
            order: SarimaOrder { p: 1, d: 1, q: 1 },
            seasonal: SeasonalOrder {
                p: 1,
                d: 1,
                q: 1,
                period: 52,
            },
        }
    }

    /// Candidate ARMA terms, dropping any whose lag exceeds what the
    /// differenced sample can support.
    fn usable_terms(&self, len: usize) -> Vec<Term> {
        let mut candidates: Vec<(Term, &'static str)> = Vec::new();
        for lag in 1..=self.order.p {
            candidates.push((Term::Ar(lag), "AR"));
        }
        for k in 1..=self.seasonal.p {
            candidates.push((Term::Ar(k * self.seasonal.period), "seasonal AR"));
        }
        for lag in 1..=self.order.q {
            candidates.push((Term::Ma(lag), "MA"));
        }
        for k in 1..=self.seasonal.q {
            candidates.push((Term::Ma(k * self.seasonal.period), "seasonal MA"));
        }

        let mut terms = Vec::with_capacity(candidates.len());
        for (term, label) in candidates {
            if len > term.lag() + 4 {
                terms.push(term);
            } else {
                warn!(
                    lag = term.lag(),
                    available = len,
                    "dropping {} term: lag exceeds differenced sample",
                    label
                );
            }
        }
        terms
    }
}

impl SeriesModel for Sarima {
    type Trained = TrainedSarima;

    fn train(&self, series: &SalesSeries) -> Result<TrainedSarima> {
        if series.len() < Self::MIN_OBSERVATIONS {
            return Err(ForecastError::ModelError(format!(
                "not enough history for {}: need at least {} observations, got {}",
                self.name,
                Self::MIN_OBSERVATIONS,
                series.len()
            )));
        }

        // Differencing chain: regular first, then seasonal.
        let mut levels: Vec<Vec<f64>> = vec![series.values.clone()];
        for _ in 0..self.order.d {
            let next = difference(&levels[levels.len() - 1], 1);
            levels.push(next);
        }
        for _ in 0..self.seasonal.d {
            let next = difference(&levels[levels.len() - 1], self.seasonal.period);
            levels.push(next);
        }
        let w = levels[levels.len() - 1].clone();
        if w.len() < 8 {
            return Err(ForecastError::ModelError(format!(
                "differencing leaves only {} observations for {}",
                w.len(),
                self.name
            )));
        }

        let terms = self.usable_terms(w.len());
        if terms.is_empty() {
            return Err(ForecastError::ModelError(format!(
                "series too short for any ARMA term of {}",
                self.name
            )));
        }

        // Stage 1: residual estimates from a long autoregression.
        let residuals_stage1 = long_ar_residuals(&w)?;

        // Stage 2: regress w on its own lags and lagged residuals.
        let max_lag = terms.iter().map(Term::lag).max().unwrap_or(0);
        let mut rows = Vec::new();
        let mut targets = Vec::new();
        for t in max_lag..w.len() {
            let row: Vec<f64> = terms
                .iter()
                .map(|term| match term {
                    Term::Ar(lag) => w[t - lag],
                    Term::Ma(lag) => residuals_stage1[t - lag],
                })
                .collect();
            rows.push(row);
            targets.push(w[t]);
        }
        let coefficients = lstsq(&rows, &targets)?;

        // Final in-sample residuals under the fitted coefficients;
        // pre-sample entries stay zero (conditional least squares).
        let mut residuals = vec![0.0; w.len()];
        for t in max_lag..w.len() {
            let fitted: f64 = terms
                .iter()
                .zip(&coefficients)
                .map(|(term, c)| {
                    c * match term {
                        Term::Ar(lag) => w[t - lag],
                        Term::Ma(lag) => residuals[t - lag],
                    }
                })
                .sum();
            residuals[t] = w[t] - fitted;
        }

        Ok(TrainedSarima {
            name: self.name.clone(),
            d: self.order.d,
            period: self.seasonal.period,
            terms,
            coefficients,
            levels,
            residuals,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSeriesModel for TrainedSarima {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let depth = self.levels.len() - 1;
        let mut levels_ext = self.levels.clone();
        let mut w_ext = levels_ext[depth].clone();
        let mut residuals_ext = self.residuals.clone();
        let mut predictions = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let t = w_ext.len();
            let next: f64 = self
                .terms
                .iter()
                .zip(&self.coefficients)
                .map(|(term, c)| {
                    c * match term {
                        Term::Ar(lag) => w_ext[t - lag],
                        Term::Ma(lag) => {
                            if t - lag < residuals_ext.len() {
                                residuals_ext[t - lag]
                            } else {
                                0.0
                            }
                        }
                    }
                })
                .sum();
            w_ext.push(next);
            residuals_ext.push(0.0);

            // Invert the differencing chain one step: seasonal levels sit
            // above the regular ones, so their inversion runs first.
            let mut value = next;
            for j in (0..depth).rev() {
                let back = if j >= self.d { self.period } else { 1 };
                value += levels_ext[j][levels_ext[j].len() - back];
                levels_ext[j].push(value);
            }
            predictions.push(value);
        }

        ForecastResult::new(predictions, horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn difference(values: &[f64], lag: usize) -> Vec<f64> {
    if values.len() <= lag {
        return Vec::new();
    }
    (lag..values.len())
        .map(|i| values[i] - values[i - lag])
        .collect()
}

/// Stage-1 long autoregression; returns residual estimates with a zero
/// prefix where lags are unavailable.
fn long_ar_residuals(w: &[f64]) -> Result<Vec<f64>> {
    let m = (w.len() / 4).clamp(2, 10);
    let mut rows = Vec::new();
    let mut targets = Vec::new();
    for t in m..w.len() {
        rows.push((1..=m).map(|lag| w[t - lag]).collect::<Vec<f64>>());
        targets.push(w[t]);
    }
    let coefficients = lstsq(&rows, &targets)?;
    let mut residuals = vec![0.0; w.len()];
    for t in m..w.len() {
        let fitted: f64 = (1..=m).map(|lag| coefficients[lag - 1] * w[t - lag]).sum();
        residuals[t] = w[t] - fitted;
    }
    Ok(residuals)
}
