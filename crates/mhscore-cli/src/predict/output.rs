use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use mhscore_pipeline::dataset::RawDataset;

use crate::predict::inference::RowResult;

pub const SCORE_COLUMN: &str = "PREDICTED_SCORE";
pub const BAND_COLUMN: &str = "RISK_BAND";
pub const GUIDANCE_COLUMN: &str = "GUIDANCE";
pub const ERROR_COLUMN: &str = "ERROR";

/// Write the input rows with the prediction columns appended, as CSV or TSV
/// depending on the file extension.
pub fn write_predictions<P: AsRef<Path>>(
    dataset: &RawDataset,
    results: &[RowResult],
    output_path: P,
) -> Result<()> {
    let path = output_path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("csv");
    let delimiter = match extension {
        "tsv" => b'\t',
        _ => b',',
    };

    let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(BufWriter::new(file));

    let mut header: Vec<&str> = dataset.headers.iter().map(String::as_str).collect();
    header.extend([SCORE_COLUMN, BAND_COLUMN, GUIDANCE_COLUMN, ERROR_COLUMN]);
    writer.write_record(&header)?;

    for (row, result) in dataset.rows.iter().zip(results) {
        let mut record: Vec<String> = row.iter().map(|cell| cell.clone().unwrap_or_default()).collect();
        match result {
            Ok(prediction) => {
                record.push(prediction.score.to_string());
                record.push(prediction.band.to_string());
                record.push(prediction.band.summary().to_string());
                record.push(String::new());
            }
            Err(message) => {
                record.push(String::new());
                record.push(String::new());
                record.push(String::new());
                record.push(message.clone());
            }
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
