use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use mhscore_pipeline::config::{ModelConfig, ModelType};
use mhscore_pipeline::training::TrainingOptions;

use crate::util::{load_or_default, read_partial_config, validate_tsv_or_csv_file};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrainConfig {
    pub version: String,
    pub train_data: String,
    pub model_output: String,
    pub encoder_output: String,
    pub test_ratio: f64,
    pub seed: u64,
    pub model: ModelConfig,
    pub report: bool,
    pub report_path: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let options = TrainingOptions::default();
        TrainConfig {
            version: clap::crate_version!().to_string(),
            train_data: String::from("mental_health_data.csv"),
            model_output: String::from("model.json"),
            encoder_output: String::from("label_encoders.json"),
            test_ratio: options.test_ratio,
            seed: options.seed,
            model: options.model,
            report: true,
            report_path: String::from("mhscore_trainer_report.html"),
        }
    }
}

impl TrainConfig {
    /// Build the effective config: file values over defaults, then CLI overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = TrainConfig::default();

        if let Some(config_path) = config_path {
            let partial = read_partial_config(config_path)?;
            load_or_default!(config, partial, train_data);
            load_or_default!(config, partial, model_output);
            load_or_default!(config, partial, encoder_output);
            load_or_default!(config, partial, test_ratio);
            load_or_default!(config, partial, seed);
            load_or_default!(config, partial, model);
            load_or_default!(config, partial, report);
            load_or_default!(config, partial, report_path);
        }

        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        validate_tsv_or_csv_file(&config.train_data)?;

        if let Some(model_output) = matches.get_one::<String>("model_output") {
            config.model_output = model_output.clone();
        }

        if let Some(encoder_output) = matches.get_one::<String>("encoder_output") {
            config.encoder_output = encoder_output.clone();
        }

        if let Some(model_type) = matches.get_one::<String>("model_type") {
            config.model.model_type = ModelType::from_str(model_type).map_err(anyhow::Error::msg)?;
        }

        if let Some(seed) = matches.get_one::<u64>("seed") {
            config.seed = *seed;
        }

        if matches.get_flag("no_report") {
            config.report = false;
        }

        if !(config.test_ratio > 0.0 && config.test_ratio < 1.0) {
            anyhow::bail!("test_ratio must be in (0, 1), got {}", config.test_ratio);
        }

        Ok(config)
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            test_ratio: self.test_ratio,
            seed: self.seed,
            model: self.model.clone(),
        }
    }
}
