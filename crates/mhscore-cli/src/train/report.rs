//! Self-contained HTML summary of a training run.
use anyhow::Result;
use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use mhscore_pipeline::encoding::EncoderSet;
use mhscore_pipeline::training::TrainingSummary;

use crate::train::input::TrainConfig;

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em; color: #222; }
h1 { font-size: 1.6em; }
h2 { border-bottom: 1px solid #ddd; padding-bottom: 4px; margin-top: 1.6em; }
table { border-collapse: collapse; margin: 8px 0; }
th, td { border: 1px solid #ddd; padding: 4px 10px; text-align: left; }
th { background-color: #f5f5f5; }
.code-container {
    background-color: #f5f5f5;
    padding: 10px;
    border-radius: 5px;
    overflow-x: auto;
    font-family: monospace;
    white-space: pre-wrap;
}
";

pub struct TrainingReport<'a> {
    config: &'a TrainConfig,
    summary: &'a TrainingSummary,
    encoders: &'a EncoderSet,
}

impl<'a> TrainingReport<'a> {
    pub fn new(config: &'a TrainConfig, summary: &'a TrainingSummary, encoders: &'a EncoderSet) -> Self {
        TrainingReport {
            config,
            summary,
            encoders,
        }
    }

    pub fn render(&self) -> Result<String> {
        let config_json = serde_json::to_string_pretty(self.config)?;
        let markup = html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { "mhscore Trainer Report" }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    h1 { "mhscore " (self.summary.model) " Trainer Report" }
                    p {
                        "Version " (self.config.version) ", trained on "
                        code { (self.config.train_data) }
                        " at " (Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
                    }
                    (self.overview())
                    (self.metrics())
                    (self.encoder_classes())
                    h2 { "Configuration" }
                    div class="code-container" {
                        pre { code { (config_json) } }
                    }
                }
            }
        };
        Ok(markup.into_string())
    }

    fn overview(&self) -> Markup {
        let s = self.summary;
        html! {
            h2 { "Overview" }
            table {
                tr { th { "Rows loaded" } td { (s.rows_loaded) } }
                tr { th { "Rows dropped (missing values)" } td { (s.rows_dropped) } }
                tr { th { "Train rows" } td { (s.train_rows) } }
                tr { th { "Test rows" } td { (s.test_rows) } }
                tr { th { "Split seed" } td { (self.config.seed) } }
                tr { th { "Training time" } td { (s.elapsed_ms.to_string()) " ms" } }
            }
        }
    }

    fn metrics(&self) -> Markup {
        let m = &self.summary.metrics;
        html! {
            h2 { "Held-out metrics" }
            table {
                tr { th { "MAE" } td { (format!("{:.4}", m.mae)) } }
                tr { th { "MSE" } td { (format!("{:.4}", m.mse)) } }
                tr { th { "R²" } td { (format!("{:.4}", m.r2)) } }
            }
        }
    }

    fn encoder_classes(&self) -> Markup {
        html! {
            h2 { "Category encoders" }
            table {
                tr { th { "Column" } th { "Classes (code order)" } }
                @for encoder in self.encoders.iter() {
                    tr {
                        td { (encoder.column()) }
                        td { (encoder.classes().join(", ")) }
                    }
                }
            }
        }
    }
}
