use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelType};
use crate::error::{PipelineError, Result};
use crate::models::regressor_trait::RegressorModel;

const LOSS: &str = "SquaredError";

/// Squared-error tree regressor backed by `gbdt`.
///
/// `ModelType::DecisionTree` is trained as one boosting round with
/// shrinkage 1.0, i.e. a single regression tree.
pub struct GBDTRegressor {
    model: Option<GBDT>,
    feature_size: Option<usize>,
    params: ModelConfig,
}

/// On-disk layout of a fitted model.
#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    version: &'a str,
    created_at: DateTime<Utc>,
    model_type: &'a ModelType,
    feature_size: usize,
    model: &'a GBDT,
}

#[derive(Deserialize)]
struct ModelArtifact {
    version: String,
    model_type: ModelType,
    feature_size: usize,
    model: GBDT,
}

impl GBDTRegressor {
    pub fn new(params: ModelConfig) -> Self {
        GBDTRegressor {
            model: None,
            feature_size: None,
            params,
        }
    }

    fn build_config(&self, feature_size: usize) -> Config {
        let mut config = Config::new();

        config.set_feature_size(feature_size);
        config.set_loss(LOSS);
        config.set_debug(self.params.debug);
        config.set_training_optimization_level(self.params.training_optimization_level.min(2));

        match &self.params.model_type {
            ModelType::DecisionTree {
                max_depth,
                min_leaf_size,
            } => {
                config.set_max_depth(*max_depth);
                config.set_min_leaf_size(*min_leaf_size);
                config.set_iterations(1);
                config.set_shrinkage(1.0);
            }
            ModelType::GBDT {
                max_depth,
                min_leaf_size,
                num_boost_round,
                learning_rate,
            } => {
                config.set_max_depth(*max_depth);
                config.set_min_leaf_size(*min_leaf_size);
                config.set_iterations((*num_boost_round).max(1) as usize);
                config.set_shrinkage(*learning_rate);
            }
        }

        config
    }

    fn to_data_vec(x: &Array2<f32>) -> DataVec {
        x.rows()
            .into_iter()
            .map(|row| Data::new_training_data(row.to_vec(), 1.0, 0.0, None))
            .collect()
    }

    fn fitted(&self) -> Result<(&GBDT, usize)> {
        match (&self.model, self.feature_size) {
            (Some(model), Some(size)) => Ok((model, size)),
            _ => Err(PipelineError::ModelNotFitted),
        }
    }

    /// Load a fitted model, checking that it expects `expected_features` inputs.
    pub fn load<P: AsRef<Path>>(path: P, expected_features: usize) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;

        if artifact.feature_size != expected_features {
            return Err(PipelineError::FeatureLength {
                expected: expected_features,
                found: artifact.feature_size,
            });
        }

        log::info!(
            "Loaded {} model from {} (trained with v{})",
            artifact.model_type.name(),
            path.display(),
            artifact.version
        );

        Ok(GBDTRegressor {
            model: Some(artifact.model),
            feature_size: Some(artifact.feature_size),
            params: ModelConfig::new(artifact.model_type),
        })
    }
}

impl RegressorModel for GBDTRegressor {
    fn fit(&mut self, x: &Array2<f32>, y: &Array1<f32>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::FeatureLength {
                expected: x.nrows(),
                found: y.len(),
            });
        }
        if x.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let feature_size = x.ncols();
        let config = self.build_config(feature_size);
        let mut gbdt = GBDT::new(&config);

        let mut train_x: DataVec = x
            .rows()
            .into_iter()
            .zip(y.iter())
            .map(|(row, &label)| Data::new_training_data(row.to_vec(), 1.0, label, None))
            .collect();

        gbdt.fit(&mut train_x);

        self.model = Some(gbdt);
        self.feature_size = Some(feature_size);
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Array1<f32>> {
        let (model, feature_size) = self.fitted()?;
        if x.ncols() != feature_size {
            return Err(PipelineError::FeatureLength {
                expected: feature_size,
                found: x.ncols(),
            });
        }
        let test_x = Self::to_data_vec(x);
        Ok(Array1::from_vec(model.predict(&test_x)))
    }

    fn predict_one(&self, features: &[f32]) -> Result<f32> {
        let (model, feature_size) = self.fitted()?;
        if features.len() != feature_size {
            return Err(PipelineError::FeatureLength {
                expected: feature_size,
                found: features.len(),
            });
        }
        let test_x = vec![Data::new_training_data(features.to_vec(), 1.0, 0.0, None)];
        model
            .predict(&test_x)
            .first()
            .copied()
            .ok_or(PipelineError::ModelNotFitted)
    }

    fn feature_size(&self) -> Option<usize> {
        self.feature_size
    }

    fn save(&self, path: &Path) -> Result<()> {
        let (model, feature_size) = self.fitted()?;
        let artifact = ModelArtifactRef {
            version: env!("CARGO_PKG_VERSION"),
            created_at: Utc::now(),
            model_type: &self.params.model_type,
            feature_size,
            model,
        };
        let bytes = serde_json::to_vec(&artifact)?;
        fs::write(path, bytes).map_err(|e| PipelineError::io(path, e))?;
        log::info!("Model saved to: {}", path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        self.params.model_type.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Array2<f32>, Array1<f32>) {
        // Target is 1.0 when the first feature is above 5, else 4.0.
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..20 {
            x.push(i as f32 * 0.5);
            x.push((i % 3) as f32);
            y.push(if i as f32 * 0.5 > 5.0 { 1.0 } else { 4.0 });
        }
        (Array2::from_shape_vec((20, 2), x).unwrap(), Array1::from_vec(y))
    }

    #[test]
    fn single_tree_fits_a_step() {
        let (x, y) = step_data();
        let mut model = GBDTRegressor::new(ModelConfig::default());
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), 20);
        for (p, t) in preds.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-3, "prediction {p} differs from {t}");
        }
        assert_eq!(model.feature_size(), Some(2));
        assert_eq!(model.name(), "decision_tree");
    }

    #[test]
    fn unfitted_model_refuses_to_predict() {
        let model = GBDTRegressor::new(ModelConfig::default());
        assert!(matches!(
            model.predict_one(&[1.0, 2.0]),
            Err(PipelineError::ModelNotFitted)
        ));
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let (x, y) = step_data();
        let mut model = GBDTRegressor::new(ModelConfig::default());
        model.fit(&x, &y).unwrap();
        assert!(matches!(
            model.predict_one(&[1.0]),
            Err(PipelineError::FeatureLength { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn save_and_load_preserve_predictions() {
        let (x, y) = step_data();
        let mut model = GBDTRegressor::new(ModelConfig::default());
        model.fit(&x, &y).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        model.save(&path).unwrap();

        let loaded = GBDTRegressor::load(&path, 2).unwrap();
        assert_eq!(model.predict(&x).unwrap(), loaded.predict(&x).unwrap());
        assert!(GBDTRegressor::load(&path, 3).is_err());
    }
}
