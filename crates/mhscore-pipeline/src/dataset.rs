//! Loading raw tabular data and turning it into an encoded design matrix.
//!
//! This module defines `RawDataset`, the header-normalized string table read
//! from CSV/TSV, and `EncodedDataset`, the numeric matrix in schema order.
//! It also contains the seeded train/test split used by the trainer.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::encoding::EncoderSet;
use crate::error::{PipelineError, Result};
use crate::schema::{self, ColumnKind};

/// Cell values treated as missing, on top of empty / whitespace-only cells.
pub const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || NA_VALUES.contains(&trimmed)
}

/// Parse a cell as a finite number.
pub fn parse_numeric(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[derive(Debug, Clone)]
pub struct RawDataset {
    /// Normalized column names.
    pub headers: Vec<String>,
    /// Row-major cells; `None` marks a missing value.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawDataset {
    /// Read a CSV (or TSV, by extension) file and normalize its headers.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;

        let is_tsv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("tsv"))
            .unwrap_or(false);
        let delimiter = if is_tsv { b'\t' } else { b',' };

        Self::from_reader(BufReader::new(file), delimiter)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(schema::normalize_column_name)
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let row = record
                .iter()
                .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
                .collect();
            rows.push(row);
        }

        log::debug!("Normalized column names: {:?}", headers);
        Ok(RawDataset { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    /// Drop every row with a missing value in any column. Returns the number
    /// of rows removed.
    pub fn drop_incomplete(&mut self) -> usize {
        let width = self.headers.len();
        let before = self.rows.len();
        self.rows
            .retain(|row| row.len() == width && row.iter().all(Option::is_some));
        before - self.rows.len()
    }

    /// Values of one column, skipping missing cells.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .filter_map(move |row| row.get(idx).and_then(|c| c.as_deref())),
        )
    }

    /// Kind observed in the data: numeric when every present value parses as
    /// a finite number.
    pub fn observed_kind(&self, name: &str) -> Option<ColumnKind> {
        let mut values = self.column_values(name)?.peekable();
        values.peek()?;
        if values.all(|v| parse_numeric(v).is_some()) {
            Some(ColumnKind::Numeric)
        } else {
            Some(ColumnKind::Categorical)
        }
    }

    /// Check the loaded headers and column kinds against the schema.
    pub fn check_schema(&self) -> Result<()> {
        if self.column_index(schema::TARGET).is_none() {
            return Err(PipelineError::MissingTarget(schema::TARGET.to_string()));
        }

        for spec in schema::FEATURE_COLUMNS.iter() {
            let idx = self.require_column(spec.name)?;
            match (spec.kind, self.observed_kind(spec.name)) {
                (ColumnKind::Numeric, Some(ColumnKind::Categorical)) => {
                    let (row, value) = self
                        .rows
                        .iter()
                        .enumerate()
                        .find_map(|(i, row)| {
                            row[idx]
                                .as_deref()
                                .filter(|v| parse_numeric(v).is_none())
                                .map(|v| (i, v.to_string()))
                        })
                        .unwrap_or_default();
                    return Err(PipelineError::NonNumeric {
                        column: spec.name.to_string(),
                        row,
                        value,
                    });
                }
                (ColumnKind::Categorical, Some(ColumnKind::Numeric)) => {
                    log::debug!(
                        "Column {} only holds numeric values; encoding it as categorical",
                        spec.name
                    );
                }
                _ => {}
            }
        }

        let extra: Vec<&str> = self
            .headers
            .iter()
            .map(String::as_str)
            .filter(|h| *h != schema::TARGET && schema::column(h).is_none())
            .collect();
        if !extra.is_empty() {
            log::warn!("Ignoring columns outside the feature schema: {:?}", extra);
        }

        Ok(())
    }

    /// Encode every row into schema order using fitted encoders.
    ///
    /// Training data is encoded with the same encoders that will be persisted,
    /// so every label here is known.
    pub fn encode(&self, encoders: &EncoderSet) -> Result<EncodedDataset> {
        let target_idx = self
            .column_index(schema::TARGET)
            .ok_or_else(|| PipelineError::MissingTarget(schema::TARGET.to_string()))?;

        let mut feature_idx = Vec::with_capacity(schema::FEATURE_COLUMNS.len());
        for spec in schema::FEATURE_COLUMNS.iter() {
            let encoder = match spec.kind {
                ColumnKind::Categorical => Some(encoders.get(spec.name)?),
                ColumnKind::Numeric => None,
            };
            feature_idx.push((spec, self.require_column(spec.name)?, encoder));
        }

        let ncols = feature_idx.len();
        let mut x = Vec::with_capacity(self.rows.len() * ncols);
        let mut y = Vec::with_capacity(self.rows.len());

        for (row_nr, row) in self.rows.iter().enumerate() {
            for (spec, idx, encoder) in &feature_idx {
                let cell = cell_at(row, *idx, spec.name)?;
                let value = match encoder {
                    Some(encoder) => encoder.transform(cell).code as f32,
                    None => parse_numeric(cell).ok_or_else(|| PipelineError::NonNumeric {
                        column: spec.name.to_string(),
                        row: row_nr,
                        value: cell.to_string(),
                    })? as f32,
                };
                x.push(value);
            }

            let target = cell_at(row, target_idx, schema::TARGET)?;
            let target = parse_numeric(target).ok_or_else(|| PipelineError::NonNumeric {
                column: schema::TARGET.to_string(),
                row: row_nr,
                value: target.to_string(),
            })?;
            y.push(target as f32);
        }

        let x = Array2::from_shape_vec((self.rows.len(), ncols), x)
            .map_err(|e| PipelineError::MalformedRecord(e.to_string()))?;

        Ok(EncodedDataset {
            x,
            y: Array1::from_vec(y),
            feature_names: schema::feature_names(),
        })
    }
}

fn cell_at<'a>(row: &'a [Option<String>], idx: usize, column: &str) -> Result<&'a str> {
    row.get(idx)
        .and_then(|c| c.as_deref())
        .ok_or_else(|| PipelineError::MissingColumn(column.to_string()))
}

/// Numeric design matrix in schema column order plus the target vector.
#[derive(Debug, Clone)]
pub struct EncodedDataset {
    pub x: Array2<f32>,
    pub y: Array1<f32>,
    pub feature_names: Vec<String>,
}

impl EncodedDataset {
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn select(&self, indices: &[usize]) -> EncodedDataset {
        EncodedDataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }
}

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded RNG and cut it into train/test partitions.
///
/// The test partition holds `ceil(n * test_ratio)` rows. The same `n`,
/// ratio and seed always yield the same partition.
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> Result<Split> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(PipelineError::InvalidTestRatio(test_ratio));
    }

    let n_test = (n as f64 * test_ratio).ceil() as usize;
    if n < 2 || n_test >= n {
        return Err(PipelineError::NotEnoughRows {
            required: 2,
            found: n,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}
