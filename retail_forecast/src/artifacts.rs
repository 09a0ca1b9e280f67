//! Persistence for trained artifacts
//!
//! The forest travels as JSON; the feature column order travels as a
//! newline-delimited text file, because that list is the contract between
//! training time and forecast time and has to stay greppable.

use crate::error::{ForecastError, Result};
use crate::models::random_forest::TrainedForest;
use std::fs;
use std::path::Path;
use tracing::info;

/// File name of the persisted forest
pub const FOREST_FILE: &str = "forest.json";
/// File name of the persisted feature column order
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.txt";

/// A trained global regressor together with the column order it expects
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub forest: TrainedForest,
    pub feature_columns: Vec<String>,
}

/// Write the feature column order, one name per line.
pub fn save_feature_columns<P: AsRef<Path>>(path: P, columns: &[String]) -> Result<()> {
    if columns.is_empty() {
        return Err(ForecastError::ValidationError(
            "feature column list is empty".to_string(),
        ));
    }
    let mut text = columns.join("\n");
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// Read a feature column order written by [`save_feature_columns`].
pub fn load_feature_columns<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let columns: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if columns.is_empty() {
        return Err(ForecastError::ValidationError(
            "feature column file contains no columns".to_string(),
        ));
    }
    Ok(columns)
}

/// Persist a trained forest and its column order under `dir`.
pub fn save_artifacts<P: AsRef<Path>>(dir: P, artifacts: &TrainedArtifacts) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    artifacts.forest.save(dir.join(FOREST_FILE))?;
    save_feature_columns(dir.join(FEATURE_COLUMNS_FILE), &artifacts.feature_columns)?;
    info!(dir = %dir.display(), "saved trained artifacts");
    Ok(())
}

/// Load artifacts persisted by [`save_artifacts`].
pub fn load_artifacts<P: AsRef<Path>>(dir: P) -> Result<TrainedArtifacts> {
    let dir = dir.as_ref();
    let forest = TrainedForest::load(dir.join(FOREST_FILE))?;
    let feature_columns = load_feature_columns(dir.join(FEATURE_COLUMNS_FILE))?;
    Ok(TrainedArtifacts {
        forest,
        feature_columns,
    })
}
