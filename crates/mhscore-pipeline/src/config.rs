use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::encoding::UnseenLabelPolicy;

/// Central configuration for the regression model.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,

    pub training_optimization_level: u8,

    pub debug: bool,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    /// A single squared-error regression tree.
    DecisionTree { max_depth: u32, min_leaf_size: usize },
    GBDT {
        max_depth: u32,
        min_leaf_size: usize,
        num_boost_round: u32,
        learning_rate: f32,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::DecisionTree {
            max_depth: 16,
            min_leaf_size: 1,
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::DecisionTree { .. } => "decision_tree",
            ModelType::GBDT { .. } => "gbdt",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "decision_tree" | "tree" => Ok(ModelType::default()),
            "gbdt" => Ok(ModelType::GBDT {
                max_depth: 6,
                min_leaf_size: 1,
                num_boost_round: 50,
                learning_rate: 0.1,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: decision_tree, gbdt",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self {
            model_type,
            ..Self::default()
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::default(),
            training_optimization_level: 2,
            debug: false,
        }
    }
}

/// How the raw model output is turned into the integer score.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRounding {
    /// Drop the fractional part (toward zero). Matches the legacy service.
    #[default]
    Truncate,
    /// Round half away from zero.
    Round,
}

impl ScoreRounding {
    pub fn apply(&self, raw: f32) -> i64 {
        match self {
            ScoreRounding::Truncate => raw.trunc() as i64,
            ScoreRounding::Round => raw.round() as i64,
        }
    }
}

/// Per-request defaulting and encoding rules.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct InferenceSettings {
    /// Substituted when AGE is absent or not a number.
    pub default_age: f64,
    /// Apply the column-name normalization rule to incoming record keys.
    pub normalize_keys: bool,
    pub unseen_labels: UnseenLabelPolicy,
    pub score_rounding: ScoreRounding,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            default_age: 25.0,
            normalize_keys: true,
            unseen_labels: UnseenLabelPolicy::Fallback,
            score_rounding: ScoreRounding::Truncate,
        }
    }
}
