//! Random-forest regression trained and evaluated in-process
//!
//! Trees are stored as flat node arrays: `feature == -1` marks a leaf, and
//! a NaN feature value routes left at every split, so rows with missing
//! covariates predict without special-casing. Persisted forests serialize
//! the same flat layout as JSON.

use crate::error::{ForecastError, Result};
use crate::models::Regressor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One node of a regression tree. `feature == -1` marks a leaf whose
/// `value` is the prediction; internal nodes route `<= threshold` (or NaN)
/// left and the rest right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature: i32,
    pub threshold: f64,
    pub left: i32,
    pub right: i32,
    pub value: f64,
}

/// Hyperparameters for forest training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub trees: usize,
    /// Maximum tree depth; `None` grows until leaves are pure or small
    pub max_depth: Option<usize>,
    /// Minimum samples in each child of a split
    pub min_samples_leaf: usize,
    /// Features considered per split; `None` considers all
    pub max_features: Option<usize>,
    /// Seed for bootstrap and feature sampling
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            trees: 400,
            max_depth: None,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

/// Untrained random forest regression model
#[derive(Debug, Clone)]
pub struct RandomForest {
    name: String,
    config: ForestConfig,
}

/// Trained random forest regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedForest {
    name: String,
    n_features: usize,
    config: ForestConfig,
    trees: Vec<Vec<TreeNode>>,
}

impl RandomForest {
    /// Create a new random forest model
    pub fn new(config: ForestConfig) -> Self {
        Self {
            name: format!("random forest ({} trees)", config.trees),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fit the forest on a row-major feature matrix and targets.
    /// Deterministic for a fixed config seed.
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64]) -> Result<TrainedForest> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ForecastError::ValidationError(format!(
                "training needs equally many non-zero rows ({}) and targets ({})",
                x.len(),
                y.len()
            )));
        }
        if self.config.trees == 0 || self.config.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "forest needs at least one tree and a positive leaf size".to_string(),
            ));
        }
        let n_features = x[0].len();
        for row in x {
            if row.len() != n_features {
                return Err(ForecastError::ValidationError(format!(
                    "ragged feature matrix: expected {} columns, got {}",
                    n_features,
                    row.len()
                )));
            }
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.trees);
        for _ in 0..self.config.trees {
            let indices: Vec<usize> =
                (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();
            let tree_seed = rng.gen::<u64>();
            let mut builder = TreeBuilder {
                x,
                y,
                n_features,
                max_depth: self.config.max_depth,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: self
                    .config
                    .max_features
                    .map(|m| m.clamp(1, n_features))
                    .unwrap_or(n_features),
                rng: StdRng::seed_from_u64(tree_seed),
                nodes: Vec::new(),
            };
            builder.build(indices, 0);
            trees.push(builder.nodes);
        }

        debug!(
            trees = trees.len(),
            rows = x.len(),
            features = n_features,
            "fitted random forest"
        );
        Ok(TrainedForest {
            name: self.name.clone(),
            n_features,
            config: self.config.clone(),
            trees,
        })
    }
}

impl TrainedForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let forest: TrainedForest = serde_json::from_str(json)?;
        if forest.trees.is_empty() {
            return Err(ForecastError::ModelError(
                "persisted forest has no trees".to_string(),
            ));
        }
        Ok(forest)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl Regressor for TrainedForest {
    fn predict_row(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features {
            return Err(ForecastError::ModelError(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }
        if self.trees.is_empty() {
            return Err(ForecastError::ModelError(
                "forest has no trees".to_string(),
            ));
        }
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| traverse(tree, features))
            .sum();
        Ok(sum / self.trees.len() as f64)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn traverse(nodes: &[TreeNode], features: &[f64]) -> f64 {
    let mut idx = 0usize;
    loop {
        let node = &nodes[idx];
        if node.feature < 0 {
            return node.value;
        }
        let value = features
            .get(node.feature as usize)
            .copied()
            .unwrap_or(f64::NAN);
        idx = if value.is_nan() || value <= node.threshold {
            node.left as usize
        } else {
            node.right as usize
        };
    }
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    n_features: usize,
    max_depth: Option<usize>,
    min_samples_leaf: usize,
    max_features: usize,
    rng: StdRng,
    nodes: Vec<TreeNode>,
}

struct Split {
    feature: usize,
    threshold: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> i32 {
        let node_idx = self.nodes.len() as i32;
        let mean = indices.iter().map(|&i| self.y[i]).sum::<f64>()
            / indices.len().max(1) as f64;
        self.nodes.push(TreeNode {
            feature: -1,
            threshold: 0.0,
            left: -1,
            right: -1,
            value: mean,
        });

        let depth_exhausted = self.max_depth.map(|d| depth >= d).unwrap_or(false);
        if depth_exhausted || indices.len() < 2 * self.min_samples_leaf {
            return node_idx;
        }

        if let Some(split) = self.best_split(&indices) {
            let left = self.build(split.left, depth + 1);
            let right = self.build(split.right, depth + 1);
            let node = &mut self.nodes[node_idx as usize];
            node.feature = split.feature as i32;
            node.threshold = split.threshold;
            node.left = left;
            node.right = right;
        }
        node_idx
    }

    /// Best (feature, threshold) by SSE reduction over the sampled feature
    /// subset, via a sorted sweep with running sums. NaN feature values
    /// sort below every number so they always fall in the left child,
    /// consistent with prediction-time routing.
    fn best_split(&mut self, indices: &[usize]) -> Option<Split> {
        let features = self.sample_features();
        let total_sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.y[i] * self.y[i]).sum();
        let n = indices.len() as f64;
        let parent_sse = total_sq - total_sum * total_sum / n;
        if parent_sse <= 1e-12 {
            return None;
        }

        let mut best: Option<(f64, usize, f64, usize)> = None; // (sse, feature, threshold, split_at)
        let mut best_order: Vec<usize> = Vec::new();

        for feature in features {
            let mut order: Vec<usize> = indices.to_vec();
            order.sort_by(|&a, &b| {
                key_value(self.x, a, feature)
                    .partial_cmp(&key_value(self.x, b, feature))
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 1..order.len() {
                let prev = key_value(self.x, order[pos - 1], feature);
                let curr = key_value(self.x, order[pos], feature);
                left_sum += self.y[order[pos - 1]];
                left_sq += self.y[order[pos - 1]] * self.y[order[pos - 1]];

                if curr <= prev {
                    continue;
                }
                if pos < self.min_samples_leaf
                    || order.len() - pos < self.min_samples_leaf
                {
                    continue;
                }

                let left_n = pos as f64;
                let right_n = (order.len() - pos) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n)
                    + (right_sq - right_sum * right_sum / right_n);

                if best.map(|(b, _, _, _)| sse < b).unwrap_or(true) {
                    let threshold = if prev == f64::NEG_INFINITY {
                        // NaN block boundary: any finite cut below the
                        // smallest real value keeps JSON-safe thresholds.
                        curr - 1.0
                    } else {
                        (prev + curr) / 2.0
                    };
                    best = Some((sse, feature, threshold, pos));
                    best_order = order.clone();
                }
            }
        }

        let (_, feature, threshold, split_at) = best?;
        Some(Split {
            feature,
            threshold,
            left: best_order[..split_at].to_vec(),
            right: best_order[split_at..].to_vec(),
        })
    }

    fn sample_features(&mut self) -> Vec<usize> {
        if self.max_features >= self.n_features {
            return (0..self.n_features).collect();
        }
        // Partial Fisher-Yates for a subset without replacement.
        let mut pool: Vec<usize> = (0..self.n_features).collect();
        for i in 0..self.max_features {
            let j = self.rng.gen_range(i..pool.len());
            pool.swap(i, j);
        }
        pool.truncate(self.max_features);
        pool
    }
}

fn key_value(x: &[Vec<f64>], row: usize, feature: usize) -> f64 {
    let value = x[row][feature];
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value
    }
}
