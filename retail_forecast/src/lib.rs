//! # Retail Forecast
//!
//! A Rust library for forecasting weekly retail sales per (store,
//! department) series.
//!
//! ## Features
//!
//! - Feature-matrix construction (lags, rolling means, calendar fields,
//!   store-type dummies, interaction terms) over merged retail records
//! - A model zoo: a global random-forest regressor, per-series seasonal
//!   naive, seasonal ARIMA, and an additive seasonal-trend model
//! - Recursive multi-step forecasting that feeds a single-step regressor's
//!   own predictions back into its lag and rolling features
//! - Naive baselines, WMAE/MAE scoring and a model leaderboard
//! - Artifact persistence: forest as JSON, feature column order as a
//!   newline-delimited text file
//!
//! ## Quick Start
//!
//! ```no_run
//! use retail_data::sample::{generate, SampleConfig};
//! use retail_forecast::features::FeatureConfig;
//! use retail_forecast::pipeline::{
//!     forecast_series, train_global_forest, ForecastMode, ForecastRequest, TrainConfig,
//! };
//! use retail_data::SeriesKey;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Build a dataset and train the global model
//! let data = generate(&SampleConfig::default())?;
//! let records = retail_data::merge(&data.sales, &data.market, &data.stores)?;
//! let outcome = train_global_forest(&records, &TrainConfig::default())?;
//!
//! // Forecast 8 weeks ahead for one series
//! let request = ForecastRequest {
//!     key: SeriesKey::new(1, 1),
//!     mode: ForecastMode::GlobalForest,
//!     horizon: 8,
//! };
//! let forecast = forecast_series(
//!     &records,
//!     &request,
//!     Some(&outcome.artifacts),
//!     &FeatureConfig::default(),
//! )?;
//! println!("{}", forecast.to_json()?);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod baselines;
pub mod data;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod forecasting;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{SalesSeries, SeriesFrame};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{build_features, FeatureConfig, FeatureSet};
pub use crate::forecasting::recursive_forecast;
pub use crate::models::{ForecastResult, Regressor};
pub use crate::pipeline::{forecast_series, ForecastMode, ForecastRequest};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
