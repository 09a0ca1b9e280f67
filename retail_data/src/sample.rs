//! Seeded synthetic sample data in the canonical CSV layout
//!
//! Mirrors the shape of the real sources closely enough that the full
//! pipeline (load, merge, feature building, model training) runs on it:
//! weekly Friday cadence, annual seasonality, holiday uplift on the usual
//! retail weeks, and sparse markdown covariates.

use crate::{
    DataError, MarketRecord, Result, SalesRecord, StoreRecord, StoreType,
};
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;
use std::path::Path;
use tracing::debug;

/// ISO weeks that get a holiday uplift (Super Bowl, Labor Day,
/// Thanksgiving, Christmas).
const HOLIDAY_WEEKS: [u32; 4] = [6, 36, 47, 52];

/// Configuration for the synthetic dataset
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Number of stores
    pub stores: u32,
    /// Number of departments per store
    pub depts_per_store: u32,
    /// Number of weekly observations per series
    pub weeks: usize,
    /// Baseline weekly sales level
    pub base_sales: f64,
    /// Amplitude of the annual seasonal cycle
    pub seasonal_amplitude: f64,
    /// Standard deviation of the additive noise
    pub noise_std: f64,
    /// First observation date (a Friday, like the real files)
    pub start: NaiveDate,
    /// RNG seed; identical seeds produce identical datasets
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            stores: 2,
            depts_per_store: 2,
            weeks: 120,
            base_sales: 20_000.0,
            seasonal_amplitude: 5_000.0,
            noise_std: 800.0,
            start: NaiveDate::from_ymd_opt(2010, 2, 5).unwrap_or(NaiveDate::MIN),
            seed: 42,
        }
    }
}

/// A generated dataset in the three-source layout
#[derive(Debug, Clone)]
pub struct SampleData {
    pub sales: Vec<SalesRecord>,
    pub market: Vec<MarketRecord>,
    pub stores: Vec<StoreRecord>,
}

/// Generate a synthetic dataset. Deterministic for a fixed config.
pub fn generate(config: &SampleConfig) -> Result<SampleData> {
    if config.stores == 0 || config.depts_per_store == 0 || config.weeks == 0 {
        return Err(DataError::InvalidRecord(
            "sample config needs at least one store, dept and week".to_string(),
        ));
    }
    let noise = Normal::new(0.0, config.noise_std).map_err(|e| {
        DataError::InvalidRecord(format!("invalid noise distribution: {e}"))
    })?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let dates: Vec<NaiveDate> = (0..config.weeks)
        .map(|k| config.start + Duration::weeks(k as i64))
        .collect();

    let store_types = [StoreType::A, StoreType::B, StoreType::C];
    let mut stores = Vec::with_capacity(config.stores as usize);
    let mut market = Vec::new();
    let mut sales = Vec::new();

    for store in 1..=config.stores {
        let store_type = store_types[(store as usize - 1) % store_types.len()];
        stores.push(StoreRecord {
            store,
            store_type,
            size: 100_000 + 25_000 * store,
        });

        for (k, &date) in dates.iter().enumerate() {
            let is_holiday = HOLIDAY_WEEKS.contains(&date.iso_week().week());
            let phase = TAU * k as f64 / 52.0;
            market.push(MarketRecord {
                store,
                date,
                temperature: Some(60.0 - 20.0 * phase.cos() + rng.gen_range(-3.0..3.0)),
                fuel_price: Some(2.75 + 0.01 * k as f64 + rng.gen_range(-0.05..0.05)),
                markdown1: sparse_markdown(&mut rng),
                markdown2: sparse_markdown(&mut rng),
                markdown3: sparse_markdown(&mut rng),
                markdown4: sparse_markdown(&mut rng),
                markdown5: sparse_markdown(&mut rng),
                cpi: Some(211.0 + 0.05 * k as f64),
                unemployment: Some(8.1 - 0.005 * k as f64),
                is_holiday,
            });
        }

        for dept in 1..=config.depts_per_store {
            // Each series gets its own level so forecasts are tellable apart.
            let base = config.base_sales * (1.0 + 0.25 * (dept as f64 - 1.0))
                + 2_000.0 * (store as f64 - 1.0);
            for (k, &date) in dates.iter().enumerate() {
                let is_holiday = HOLIDAY_WEEKS.contains(&date.iso_week().week());
                let seasonal =
                    config.seasonal_amplitude * (TAU * k as f64 / 52.0).sin();
                let uplift = if is_holiday { 0.15 * base } else { 0.0 };
                let value = base + seasonal + uplift + noise.sample(&mut rng);
                sales.push(SalesRecord {
                    store,
                    dept,
                    date,
                    weekly_sales: value.max(0.0),
                    is_holiday,
                });
            }
        }
    }

    debug!(
        sales = sales.len(),
        market = market.len(),
        stores = stores.len(),
        "generated sample dataset"
    );
    Ok(SampleData {
        sales,
        market,
        stores,
    })
}

fn sparse_markdown(rng: &mut StdRng) -> Option<f64> {
    if rng.gen_bool(0.25) {
        Some(rng.gen_range(100.0..5_000.0))
    } else {
        None
    }
}

/// Write a dataset to `train.csv`, `features.csv` and `stores.csv` under
/// `dir`, in the canonical header format the loader reads back.
pub fn write_csv_dir<P: AsRef<Path>>(dir: P, data: &SampleData) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let mut writer = csv::Writer::from_path(dir.join("train.csv"))?;
    for row in &data.sales {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(dir.join("features.csv"))?;
    for row in &data.market {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(dir.join("stores.csv"))?;
    for row in &data.stores {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
