use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use mhscore_pipeline::training::{train_from_path, TrainingSummary};

use crate::train::input::TrainConfig;
use crate::train::report::TrainingReport;
use crate::util::write_bytes_to_file;

pub fn run_training(config: &TrainConfig) -> Result<TrainingSummary> {
    let artifacts = train_from_path(&config.train_data, &config.training_options())
        .with_context(|| format!("Training on {} failed", config.train_data))?;

    artifacts
        .save(Path::new(&config.model_output), Path::new(&config.encoder_output))
        .context("Failed to persist trained artifacts")?;
    log::info!(
        "Artifacts written: model={} encoders={}",
        config.model_output,
        config.encoder_output
    );

    if config.report {
        let report = TrainingReport::new(config, &artifacts.summary, &artifacts.encoders);
        let html = report.render()?;
        write_bytes_to_file(&config.report_path, html.as_bytes())
            .with_context(|| format!("Failed to write report: {}", config.report_path))?;
        log::info!("Report written to: {}", config.report_path);

        let config_path = config_dump_path(&config.report_path);
        let bytes = serde_json::to_vec_pretty(config)?;
        write_bytes_to_file(&config_path.to_string_lossy(), &bytes)
            .with_context(|| format!("Failed to write config: {:?}", config_path))?;
    }

    Ok(artifacts.summary)
}

/// `reports/run.html` -> `reports/run.config.json`.
fn config_dump_path(report_path: &str) -> PathBuf {
    let path = Path::new(report_path);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mhscore_trainer_report");
    path.with_file_name(format!("{}.config.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dump_sits_next_to_report() {
        assert_eq!(
            config_dump_path("out/report.html"),
            PathBuf::from("out/report.config.json")
        );
        assert_eq!(
            config_dump_path("report"),
            PathBuf::from("report.config.json")
        );
    }
}
