//! Typed CSV loading for the raw retail sources

use crate::{MarketRecord, MergedRecord, Result, SalesRecord, StoreRecord};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Load weekly sales observations from a `train.csv`-style file.
pub fn load_sales<P: AsRef<Path>>(path: P) -> Result<Vec<SalesRecord>> {
    let rows = load_records(path.as_ref())?;
    debug!(rows = rows.len(), "loaded sales records");
    Ok(rows)
}

/// Load per-store market covariates from a `features.csv`-style file.
pub fn load_market<P: AsRef<Path>>(path: P) -> Result<Vec<MarketRecord>> {
    let rows = load_records(path.as_ref())?;
    debug!(rows = rows.len(), "loaded market records");
    Ok(rows)
}

/// Load store metadata from a `stores.csv`-style file.
pub fn load_stores<P: AsRef<Path>>(path: P) -> Result<Vec<StoreRecord>> {
    let rows = load_records(path.as_ref())?;
    debug!(rows = rows.len(), "loaded store records");
    Ok(rows)
}

/// Load `train.csv`, `features.csv` and `stores.csv` from a directory and
/// merge them into one sorted frame.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<MergedRecord>> {
    let dir = dir.as_ref();
    let sales = load_sales(dir.join("train.csv"))?;
    let market = load_market(dir.join("features.csv"))?;
    let stores = load_stores(dir.join("stores.csv"))?;
    crate::merge(&sales, &market, &stores)
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = canonical_headers(reader.headers()?);
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.deserialize(Some(&headers))?);
    }
    Ok(rows)
}

/// Map raw headers onto the canonical column names, ignoring case and
/// punctuation, so `weekly_sales` and `Weekly_Sales` both load.
fn canonical_headers(raw: &StringRecord) -> StringRecord {
    let mut headers = StringRecord::new();
    for field in raw.iter() {
        headers.push_field(canonical_name(field));
    }
    headers
}

fn canonical_name(raw: &str) -> &str {
    let key: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match key.as_str() {
        "store" => "Store",
        "dept" => "Dept",
        "date" => "Date",
        "weeklysales" => "Weekly_Sales",
        "isholiday" => "IsHoliday",
        "temperature" => "Temperature",
        "fuelprice" => "Fuel_Price",
        "markdown1" => "MarkDown1",
        "markdown2" => "MarkDown2",
        "markdown3" => "MarkDown3",
        "markdown4" => "MarkDown4",
        "markdown5" => "MarkDown5",
        "cpi" => "CPI",
        "unemployment" => "Unemployment",
        "type" => "Type",
        "size" => "Size",
        _ => raw,
    }
}

/// Boolean fields as the sources actually write them: `TRUE`/`FALSE`,
/// `True`/`False`, `1`/`0`, or empty (treated as false).
pub mod flexible_bool {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" => Ok(true),
            "false" | "f" | "0" | "no" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean value: {other}"
            ))),
        }
    }
}

/// Optional floats where the sources write `NA` (or nothing) for missing.
pub mod na_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_f64(*v),
            None => serializer.serialize_str("NA"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("na") || trimmed.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        trimmed
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number: {trimmed}")))
    }
}
