use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use mhscore_pipeline::config::{InferenceSettings, ScoreRounding};

use crate::util::{load_or_default, read_partial_config, validate_tsv_or_csv_file};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictConfig {
    pub version: String,
    pub model_path: String,
    pub encoder_path: String,
    pub inference_data: String,
    pub output_file: String,
    pub inference: InferenceSettings,
}

impl Default for PredictConfig {
    fn default() -> Self {
        PredictConfig {
            version: clap::crate_version!().to_string(),
            model_path: String::from("model.json"),
            encoder_path: String::from("label_encoders.json"),
            inference_data: String::new(),
            output_file: String::from("mhscore_predictions.csv"),
            inference: InferenceSettings::default(),
        }
    }
}

impl PredictConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = PredictConfig::default();

        if let Some(config_path) = config_path {
            let partial = read_partial_config(config_path)?;
            load_or_default!(config, partial, model_path);
            load_or_default!(config, partial, encoder_path);
            load_or_default!(config, partial, inference_data);
            load_or_default!(config, partial, output_file);
            load_or_default!(config, partial, inference);
        }

        if let Some(model_path) = matches.get_one::<String>("model_path") {
            config.model_path = model_path.clone();
        }

        if let Some(encoder_path) = matches.get_one::<String>("encoder_path") {
            config.encoder_path = encoder_path.clone();
        }

        if let Some(inference_data) = matches.get_one::<String>("inference_data") {
            config.inference_data = inference_data.clone();
        }
        validate_tsv_or_csv_file(&config.inference_data)?;

        if let Some(output_file) = matches.get_one::<String>("output_file") {
            config.output_file = output_file.clone();
        }

        if matches.get_flag("round") {
            config.inference.score_rounding = ScoreRounding::Round;
        }

        Ok(config)
    }
}
