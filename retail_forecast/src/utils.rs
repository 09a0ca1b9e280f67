//! Utility functions for the retail_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use std::cmp::Ordering;

/// Future weekly timestamps: `horizon` dates at a strict 7-day cadence
/// starting one week after `last`.
pub fn weekly_timestamps(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon)
        .map(|k| last + Duration::weeks(k as i64))
        .collect()
}

/// Arithmetic mean ignoring NaN entries; `None` when nothing is left.
pub fn nan_mean(values: &[f64]) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &value in values {
        if !value.is_nan() {
            sum += value;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Least-squares solve of `rows * x ~= targets` via the normal equations.
///
/// A tiny Tikhonov term keeps near-collinear regressor sets solvable; a
/// genuinely singular system still errors.
pub fn lstsq(rows: &[Vec<f64>], targets: &[f64]) -> Result<Vec<f64>> {
    if rows.is_empty() || rows.len() != targets.len() {
        return Err(ForecastError::ValidationError(
            "least squares needs equally many non-zero rows and targets".to_string(),
        ));
    }
    let k = rows[0].len();
    if k == 0 {
        return Err(ForecastError::ValidationError(
            "least squares needs at least one regressor".to_string(),
        ));
    }
    for row in rows {
        if row.len() != k {
            return Err(ForecastError::ValidationError(format!(
                "ragged design matrix: expected {} columns, got {}",
                k,
                row.len()
            )));
        }
    }

    let mut ata = vec![vec![0.0f64; k]; k];
    let mut atb = vec![0.0f64; k];
    for (row, &target) in rows.iter().zip(targets.iter()) {
        for i in 0..k {
            atb[i] += row[i] * target;
            for j in 0..k {
                ata[i][j] += row[i] * row[j];
            }
        }
    }

    let trace: f64 = (0..k).map(|i| ata[i][i]).sum();
    let ridge = 1e-9 * (trace / k as f64).max(1.0);
    for (i, diag) in ata.iter_mut().enumerate() {
        diag[i] += ridge;
    }

    gaussian_solve(ata, atb)
}

/// Gaussian elimination with partial pivoting on a square system.
fn gaussian_solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let k = b.len();
    for col in 0..k {
        let mut pivot = col;
        for row in (col + 1)..k {
            if compare_abs(a[row][col], a[pivot][col]) == Ordering::Greater {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return Err(ForecastError::ModelError(
                "singular system in least squares solve".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..k {
            let factor = a[row][col] / a[col][col];
            if factor != 0.0 {
                for c in col..k {
                    a[row][c] -= factor * a[col][c];
                }
                b[row] -= factor * b[col];
            }
        }
    }

    let mut x = vec![0.0f64; k];
    for col in (0..k).rev() {
        let mut acc = b[col];
        for c in (col + 1)..k {
            acc -= a[col][c] * x[c];
        }
        x[col] = acc / a[col][col];
    }
    Ok(x)
}

fn compare_abs(lhs: f64, rhs: f64) -> Ordering {
    lhs.abs()
        .partial_cmp(&rhs.abs())
        .unwrap_or(Ordering::Equal)
}
