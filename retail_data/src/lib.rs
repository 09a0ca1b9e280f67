//! # Retail Data
//!
//! `retail_data` provides the typed record layer for weekly retail sales
//! data: loading the raw CSV sources, merging them into one frame keyed by
//! store and date, and generating seeded synthetic sample datasets for
//! demos and tests.
//!
//! ## Sources
//!
//! Three CSV files make up a dataset, in the canonical Walmart-style layout:
//!
//! - `train.csv` holds weekly sales per (store, department): `Store`,
//!   `Dept`, `Date`, `Weekly_Sales`, `IsHoliday`
//! - `features.csv` holds per-store market covariates: `Store`, `Date`,
//!   `Temperature`, `Fuel_Price`, `MarkDown1`..`MarkDown5`, `CPI`,
//!   `Unemployment`, `IsHoliday`
//! - `stores.csv` holds store metadata: `Store`, `Type`, `Size`
//!
//! ## Usage Example
//!
//! ```
//! use retail_data::sample::{generate, SampleConfig};
//! use retail_data::merge;
//!
//! let data = generate(&SampleConfig::default()).unwrap();
//! let records = merge(&data.sales, &data.market, &data.stores).unwrap();
//! assert!(!records.is_empty());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod loader;
pub mod merge;
pub mod sample;

pub use loader::{load_dir, load_market, load_sales, load_stores};
pub use merge::merge;

/// Errors that can occur while loading or merging retail data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("empty input: {0}")]
    EmptyInput(String),
}

/// Result type for retail data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Store format classification carried by `stores.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreType {
    A,
    B,
    C,
}

impl StoreType {
    /// Single-letter form used in the CSV sources.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::A => "A",
            StoreType::B => "B",
            StoreType::C => "C",
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weekly sales observation from `train.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Store")]
    pub store: u32,
    #[serde(rename = "Dept")]
    pub dept: u32,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Weekly_Sales")]
    pub weekly_sales: f64,
    #[serde(rename = "IsHoliday", with = "loader::flexible_bool")]
    pub is_holiday: bool,
}

/// One row of per-store market covariates from `features.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    #[serde(rename = "Store")]
    pub store: u32,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Temperature", with = "loader::na_f64")]
    pub temperature: Option<f64>,
    #[serde(rename = "Fuel_Price", with = "loader::na_f64")]
    pub fuel_price: Option<f64>,
    #[serde(rename = "MarkDown1", with = "loader::na_f64")]
    pub markdown1: Option<f64>,
    #[serde(rename = "MarkDown2", with = "loader::na_f64")]
    pub markdown2: Option<f64>,
    #[serde(rename = "MarkDown3", with = "loader::na_f64")]
    pub markdown3: Option<f64>,
    #[serde(rename = "MarkDown4", with = "loader::na_f64")]
    pub markdown4: Option<f64>,
    #[serde(rename = "MarkDown5", with = "loader::na_f64")]
    pub markdown5: Option<f64>,
    #[serde(rename = "CPI", with = "loader::na_f64")]
    pub cpi: Option<f64>,
    #[serde(rename = "Unemployment", with = "loader::na_f64")]
    pub unemployment: Option<f64>,
    #[serde(rename = "IsHoliday", with = "loader::flexible_bool")]
    pub is_holiday: bool,
}

impl MarketRecord {
    /// The five markdown columns in order.
    pub fn markdowns(&self) -> [Option<f64>; 5] {
        [
            self.markdown1,
            self.markdown2,
            self.markdown3,
            self.markdown4,
            self.markdown5,
        ]
    }
}

/// Store metadata from `stores.csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    #[serde(rename = "Store")]
    pub store: u32,
    #[serde(rename = "Type")]
    pub store_type: StoreType,
    #[serde(rename = "Size")]
    pub size: u32,
}

/// Identifier for one (store, department) sales series
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SeriesKey {
    pub store: u32,
    pub dept: u32,
}

impl SeriesKey {
    pub fn new(store: u32, dept: u32) -> Self {
        Self { store, dept }
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store {} dept {}", self.store, self.dept)
    }
}

/// One row of the merged frame: a sales observation joined with its store
/// metadata and market covariates. Fields absent from the joined sources
/// stay `None`; the join never fails on them.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub store: u32,
    pub dept: u32,
    pub date: NaiveDate,
    pub weekly_sales: f64,
    pub is_holiday: bool,
    pub store_type: Option<StoreType>,
    pub store_size: Option<u32>,
    pub temperature: Option<f64>,
    pub fuel_price: Option<f64>,
    pub markdowns: [Option<f64>; 5],
    pub cpi: Option<f64>,
    pub unemployment: Option<f64>,
}

impl MergedRecord {
    pub fn key(&self) -> SeriesKey {
        SeriesKey::new(self.store, self.dept)
    }
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
