use std::path::Path;

use crate::config::{ModelConfig, ModelType};
use crate::error::Result;
use crate::models::gbdt::GBDTRegressor;
use crate::models::regressor_trait::RegressorModel;

/// Build an untrained boxed regressor from a `ModelConfig`.
pub fn build_model(params: ModelConfig) -> Box<dyn RegressorModel> {
    match params.model_type {
        ModelType::DecisionTree { .. } | ModelType::GBDT { .. } => {
            Box::new(GBDTRegressor::new(params))
        }
    }
}

/// Load a persisted regressor that expects `expected_features` inputs.
pub fn load_model<P: AsRef<Path>>(path: P, expected_features: usize) -> Result<Box<dyn RegressorModel>> {
    Ok(Box::new(GBDTRegressor::load(path, expected_features)?))
}
