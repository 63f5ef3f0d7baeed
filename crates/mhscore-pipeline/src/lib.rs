//! mhscore-pipeline: categorical encoding, training and inference for the
//! mental health score regressor.
//!
//! The crate owns every step that has to agree between training time and
//! inference time: the fixed feature schema, the per-column label encoders,
//! the dataset loader, the regression model wrapper and the inference
//! context that turns one raw record into one score.
//!
//! Front ends (CLI, HTTP) live in `mhscore-cli` and only talk to
//! [`training`] and [`inference`].
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod guidance;
pub mod inference;
pub mod models;
pub mod schema;
pub mod stats;
pub mod training;

pub use error::{PipelineError, Result};
