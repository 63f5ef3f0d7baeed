use anyhow::Result;
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use mhscore_pipeline::config::InferenceSettings;

use crate::util::{load_or_default, read_partial_config};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServeConfig {
    pub version: String,
    pub host: String,
    pub port: u16,
    pub model_path: String,
    pub encoder_path: String,
    pub inference: InferenceSettings,
}

impl Default for ServeConfig {
    fn default() -> Self {
        ServeConfig {
            version: clap::crate_version!().to_string(),
            host: String::from("127.0.0.1"),
            port: 5000,
            model_path: String::from("model.json"),
            encoder_path: String::from("label_encoders.json"),
            inference: InferenceSettings::default(),
        }
    }
}

impl ServeConfig {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = ServeConfig::default();

        if let Some(config_path) = config_path {
            let partial = read_partial_config(config_path)?;
            load_or_default!(config, partial, host);
            load_or_default!(config, partial, port);
            load_or_default!(config, partial, model_path);
            load_or_default!(config, partial, encoder_path);
            load_or_default!(config, partial, inference);
        }

        if let Some(host) = matches.get_one::<String>("host") {
            config.host = host.clone();
        }
        if let Some(port) = matches.get_one::<u16>("port") {
            config.port = *port;
        }
        if let Some(model_path) = matches.get_one::<String>("model_path") {
            config.model_path = model_path.clone();
        }
        if let Some(encoder_path) = matches.get_one::<String>("encoder_path") {
            config.encoder_path = encoder_path.clone();
        }

        Ok(config)
    }
}
