use std::path::Path;

use ndarray::{Array1, Array2};

use crate::error::Result;

/// Contract between the pipelines and the regression model.
///
/// The pipelines only ever hand the model feature vectors in schema order
/// and read back one real number per row; the model is opaque otherwise.
pub trait RegressorModel: Send + Sync {
    /// Fit the model on a design matrix and its targets.
    fn fit(&mut self, x: &Array2<f32>, y: &Array1<f32>) -> Result<()>;

    /// Predict one value per row of `x`.
    fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>>;

    /// Predict a single feature vector.
    fn predict_one(&self, features: &[f32]) -> Result<f32>;

    /// Number of features the fitted model expects.
    fn feature_size(&self) -> Option<usize>;

    /// Persist the fitted model.
    fn save(&self, path: &Path) -> Result<()>;

    fn name(&self) -> &str {
        "regressor"
    }
}
