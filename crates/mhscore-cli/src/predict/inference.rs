use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::Value;

use mhscore_pipeline::dataset::RawDataset;
use mhscore_pipeline::inference::{InferenceContext, Prediction, RawRecord};

use crate::predict::input::PredictConfig;
use crate::predict::output::write_predictions;

/// Outcome for one input row. Failures carry the error text instead of
/// aborting the batch.
pub type RowResult = std::result::Result<Prediction, String>;

pub fn run_inference(config: &PredictConfig) -> Result<Vec<RowResult>> {
    let context = InferenceContext::load(
        &config.model_path,
        &config.encoder_path,
        config.inference.clone(),
    )
    .context("Failed to load model artifacts")?;
    log::info!("Loaded {} model from {}", context.model_name(), config.model_path);

    let dataset = RawDataset::from_path(&config.inference_data)
        .with_context(|| format!("Failed to read inference data: {}", config.inference_data))?;
    log::info!("Loaded {} records for inference", dataset.len());

    let start_time = std::time::Instant::now();
    let results = predict_dataset(&context, &dataset);
    log::info!("Inference completed in {:?}", start_time.elapsed());

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        log::warn!("{} of {} records could not be scored", failed, results.len());
    }

    write_predictions(&dataset, &results, &config.output_file)?;
    log::info!("Predictions written to: {}", config.output_file);

    Ok(results)
}

/// Score every row of `dataset` in parallel, preserving row order.
pub fn predict_dataset(context: &InferenceContext, dataset: &RawDataset) -> Vec<RowResult> {
    dataset
        .rows
        .par_iter()
        .enumerate()
        .map(|(i, row)| {
            context
                .predict_record(row_to_record(&dataset.headers, row))
                .map_err(|e| {
                    log::debug!("Row {}: {}", i, e);
                    e.to_string()
                })
        })
        .collect()
}

/// Missing cells are left out of the record so the usual defaulting rules
/// apply.
fn row_to_record(headers: &[String], row: &[Option<String>]) -> RawRecord {
    headers
        .iter()
        .zip(row)
        .filter_map(|(name, cell)| {
            cell.as_ref()
                .map(|value| (name.clone(), Value::String(value.clone())))
        })
        .collect()
}
