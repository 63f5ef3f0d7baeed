use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Held-out regression diagnostics reported after training.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub mse: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Compute mean absolute error, mean squared error and the coefficient of
    /// determination.
    ///
    /// When `y_true` is constant, R² is 1.0 for a perfect prediction and 0.0
    /// otherwise instead of dividing by zero.
    pub fn compute(y_true: &Array1<f32>, y_pred: &Array1<f32>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(PipelineError::FeatureLength {
                expected: y_true.len(),
                found: y_pred.len(),
            });
        }
        if y_true.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        let n = y_true.len() as f64;
        let y_true = y_true.mapv(|v| v as f64);
        let y_pred = y_pred.mapv(|v| v as f64);

        let residuals = &y_true - &y_pred;
        let mae = residuals.mapv(f64::abs).sum() / n;
        let ss_res = residuals.mapv(|r| r * r).sum();
        let mse = ss_res / n;

        let mean = y_true.sum() / n;
        let ss_tot = y_true.mapv(|v| (v - mean).powi(2)).sum();
        let r2 = if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        };

        Ok(RegressionMetrics { mae, mse, r2 })
    }

    pub fn log_summary(&self) {
        log::info!("----- Model Performance -----");
        log::info!("Mean Absolute Error (MAE): {:.4}", self.mae);
        log::info!("Mean Squared Error (MSE): {:.4}", self.mse);
        log::info!("R-Squared (R²): {:.4}", self.r2);
        log::info!("-----------------------------");
    }
}
