//! Label encoders for the categorical feature columns.
//!
//! Each [`CategoryEncoder`] maps a frozen, sorted set of labels onto the
//! contiguous codes `0..K-1`. The [`EncoderSet`] groups one encoder per
//! categorical column and is persisted next to the model so inference encodes
//! exactly the way training did.
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::schema::{self, ColumnSpec};

/// What to do with a label the encoder has never seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnseenLabelPolicy {
    /// Encode as the default label (first in sorted order). Keeps
    /// compatibility with models trained on the legacy encoding, but the
    /// resulting code carries no meaning.
    #[default]
    Fallback,
    /// Refuse the record.
    Reject,
}

/// Result of encoding one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub code: u32,
    /// Set when the label was unknown and the default label's code was used.
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEncoder", into = "RawEncoder")]
pub struct CategoryEncoder {
    column: String,
    classes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct RawEncoder {
    column: String,
    classes: Vec<String>,
}

impl TryFrom<RawEncoder> for CategoryEncoder {
    type Error = PipelineError;

    fn try_from(raw: RawEncoder) -> Result<Self> {
        if raw.classes.is_empty() {
            return Err(PipelineError::EmptyEncoder(raw.column));
        }
        if raw.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PipelineError::InvalidEncoder {
                column: raw.column,
                reason: "classes must be sorted and unique".to_string(),
            });
        }
        Ok(CategoryEncoder {
            column: raw.column,
            classes: raw.classes,
        })
    }
}

impl From<CategoryEncoder> for RawEncoder {
    fn from(encoder: CategoryEncoder) -> Self {
        RawEncoder {
            column: encoder.column,
            classes: encoder.classes,
        }
    }
}

impl CategoryEncoder {
    /// Fit an encoder from the labels observed in training data plus the
    /// column's supplemental labels.
    ///
    /// The union is deduplicated and sorted, so the same input set always
    /// produces the same mapping regardless of observation order.
    pub fn fit<I, S>(column: &str, observed: I, supplemental: &[&str]) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = observed
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .chain(supplemental.iter().map(|label| label.to_string()))
            .collect();

        if classes.is_empty() {
            return Err(PipelineError::EmptyEncoder(column.to_string()));
        }

        Ok(CategoryEncoder {
            column: column.to_string(),
            classes: classes.into_iter().collect(),
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Labels in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Label used in place of unseen labels: the first one in sorted order.
    pub fn default_label(&self) -> &str {
        &self.classes[0]
    }

    pub fn contains(&self, label: &str) -> bool {
        self.lookup(label).is_some()
    }

    pub fn lookup(&self, label: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
            .map(|idx| idx as u32)
    }

    /// Encode a label, substituting the default label when it is unknown.
    pub fn transform(&self, label: &str) -> Encoded {
        match self.lookup(label) {
            Some(code) => Encoded {
                code,
                fallback: false,
            },
            None => Encoded {
                code: 0,
                fallback: true,
            },
        }
    }

    /// Encode a label under an explicit policy.
    pub fn encode(&self, label: &str, policy: UnseenLabelPolicy) -> Result<Encoded> {
        let encoded = self.transform(label);
        if encoded.fallback {
            match policy {
                UnseenLabelPolicy::Fallback => {
                    log::warn!(
                        "Unseen label '{}' for column {}; encoding as default label '{}'",
                        label,
                        self.column,
                        self.default_label()
                    );
                }
                UnseenLabelPolicy::Reject => {
                    return Err(PipelineError::UnseenLabel {
                        column: self.column.clone(),
                        label: label.to_string(),
                    });
                }
            }
        }
        Ok(encoded)
    }

    pub fn inverse_transform(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// One encoder per categorical column, stamped with the schema it was fit for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSet {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub feature_columns: Vec<String>,
    pub target: String,
    encoders: BTreeMap<String, CategoryEncoder>,
}

impl EncoderSet {
    /// Fit encoders for every categorical schema column.
    ///
    /// `observed` yields, per column name, the raw labels seen in training
    /// data. Columns without observations still get an encoder when the
    /// schema lists supplemental labels for them.
    pub fn fit<'a, F, I>(mut observed: F) -> Result<Self>
    where
        F: FnMut(&ColumnSpec) -> Option<I>,
        I: IntoIterator<Item = &'a str>,
    {
        let mut encoders = BTreeMap::new();
        for spec in schema::categorical_columns() {
            let labels: Vec<&str> = observed(spec)
                .map(|it| it.into_iter().collect())
                .unwrap_or_default();
            let encoder = CategoryEncoder::fit(spec.name, labels, spec.supplemental)?;
            log::debug!(
                "Fitted encoder for {}: {:?}",
                spec.name,
                encoder.classes()
            );
            encoders.insert(spec.name.to_string(), encoder);
        }

        Ok(EncoderSet {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            feature_columns: schema::feature_names(),
            target: schema::TARGET.to_string(),
            encoders,
        })
    }

    pub fn get(&self, column: &str) -> Result<&CategoryEncoder> {
        self.encoders
            .get(column)
            .ok_or_else(|| PipelineError::UnknownEncoder(column.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEncoder> {
        self.encoders.values()
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Check that this set was produced for the current schema.
    pub fn validate(&self) -> Result<()> {
        let expected = schema::feature_names();
        if self.feature_columns != expected {
            return Err(PipelineError::SchemaMismatch {
                expected,
                found: self.feature_columns.clone(),
            });
        }
        for spec in schema::categorical_columns() {
            self.get(spec.name)?;
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes).map_err(|e| PipelineError::io(path, e))?;
        log::info!("Encoders saved to: {}", path.display());
        Ok(())
    }

    /// Load and validate a persisted encoder set.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let set: EncoderSet = serde_json::from_str(&content)?;
        set.validate()?;
        log::info!(
            "Loaded {} encoders from {} (trained with v{})",
            set.len(),
            path.display(),
            set.version
        );
        Ok(set)
    }
}
