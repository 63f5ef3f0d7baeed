//! Training pipeline: raw dataset in, encoder set and fitted model out.
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::dataset::{train_test_split, RawDataset};
use crate::encoding::EncoderSet;
use crate::error::{PipelineError, Result};
use crate::models::factory::build_model;
use crate::models::RegressorModel;
use crate::stats::RegressionMetrics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingOptions {
    /// Fraction of rows held out for evaluation.
    pub test_ratio: f64,
    pub seed: u64,
    pub model: ModelConfig,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            test_ratio: 0.2,
            seed: 42,
            model: ModelConfig::default(),
        }
    }
}

/// Diagnostics collected while training. Never used to gate persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub model: String,
    pub metrics: RegressionMetrics,
    pub elapsed_ms: u128,
}

pub struct TrainedArtifacts {
    pub encoders: EncoderSet,
    pub model: Box<dyn RegressorModel>,
    pub summary: TrainingSummary,
}

impl TrainedArtifacts {
    /// Persist the model and the encoders as two independent files.
    pub fn save(&self, model_path: &Path, encoder_path: &Path) -> Result<()> {
        self.model.save(model_path)?;
        self.encoders.save(encoder_path)?;
        Ok(())
    }
}

/// Load a CSV/TSV dataset and train on it.
pub fn train_from_path<P: AsRef<Path>>(path: P, options: &TrainingOptions) -> Result<TrainedArtifacts> {
    let path = path.as_ref();
    log::info!("Loading training data from {}", path.display());
    let dataset = RawDataset::from_path(path)?;
    train(dataset, options)
}

/// Fit encoders and the regression model on a loaded dataset.
pub fn train(mut dataset: RawDataset, options: &TrainingOptions) -> Result<TrainedArtifacts> {
    let start_time = Instant::now();
    let rows_loaded = dataset.len();

    dataset.check_schema()?;

    let rows_dropped = dataset.drop_incomplete();
    if rows_dropped > 0 {
        log::warn!(
            "Dropped {} of {} rows with missing values",
            rows_dropped,
            rows_loaded
        );
    }
    if dataset.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }
    log::info!("Training on {} complete rows", dataset.len());

    let encoders = EncoderSet::fit(|spec| dataset.column_values(spec.name))?;
    for encoder in encoders.iter() {
        log::debug!("{}: {:?}", encoder.column(), encoder.classes());
    }

    let encoded = dataset.encode(&encoders)?;
    let split = train_test_split(encoded.nrows(), options.test_ratio, options.seed)?;
    let train_set = encoded.select(&split.train);
    let test_set = encoded.select(&split.test);
    log::info!(
        "Split {} rows into {} train / {} test (seed {})",
        encoded.nrows(),
        train_set.nrows(),
        test_set.nrows(),
        options.seed
    );

    let mut model = build_model(options.model.clone());
    log::trace!("Training started");
    model.fit(&train_set.x, &train_set.y)?;

    let y_pred = model.predict(&test_set.x)?;
    let metrics = RegressionMetrics::compute(&test_set.y, &y_pred)?;
    metrics.log_summary();

    let elapsed = start_time.elapsed();
    log::info!("Training completed in {:?}", elapsed);

    let summary = TrainingSummary {
        rows_loaded,
        rows_dropped,
        train_rows: train_set.nrows(),
        test_rows: test_set.nrows(),
        model: model.name().to_string(),
        metrics,
        elapsed_ms: elapsed.as_millis(),
    };

    Ok(TrainedArtifacts {
        encoders,
        model,
        summary,
    })
}
