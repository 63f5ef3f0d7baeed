//! Inference pipeline: one raw record in, one score out.
//!
//! Artifacts are loaded once into an [`InferenceContext`], which is immutable
//! afterwards and can be shared across threads. Each call validates the
//! record into a [`PredictionRequest`], encodes it into a [`FeatureVector`]
//! in schema order and asks the model for a prediction.
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::config::InferenceSettings;
use crate::dataset::parse_numeric;
use crate::encoding::EncoderSet;
use crate::error::{PipelineError, Result};
use crate::guidance::RiskBand;
use crate::models::factory::load_model;
use crate::models::RegressorModel;
use crate::schema::{self, ColumnKind};

/// Unvalidated caller input: column name to JSON value.
pub type RawRecord = Map<String, Value>;

/// A validated record. Every field is optional at this stage; the defaulting
/// rules are applied when the feature vector is assembled:
///
/// * `age` absent or not a number: replaced by `InferenceSettings::default_age`.
/// * any categorical field absent: the request fails with `MissingField`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PredictionRequest {
    #[serde(default, deserialize_with = "lenient_number")]
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub anxiety: Option<String>,
    pub depression: Option<String>,
    pub sleep_issues: Option<String>,
    pub social_withdrawal: Option<String>,
    pub stress_level: Option<String>,
    pub work_study_pressure: Option<String>,
    pub family_history: Option<String>,
    pub physical_activity: Option<String>,
    pub social_support: Option<String>,
}

/// Accept numbers and numeric strings; anything else, including values too
/// large for the model's `f32` features, becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_numeric(&s),
            _ => None,
        })
        .filter(|v| v.is_finite() && v.abs() <= f32::MAX as f64))
}

impl PredictionRequest {
    /// Validate a raw record, optionally normalizing its keys first.
    pub fn from_record(record: RawRecord, normalize_keys: bool) -> Result<Self> {
        let record = if normalize_keys {
            let mut normalized = Map::with_capacity(record.len());
            for (key, value) in record {
                let name = schema::normalize_column_name(&key);
                if normalized.insert(name.clone(), value).is_some() {
                    return Err(PipelineError::MalformedRecord(format!(
                        "field '{}' given more than once",
                        name
                    )));
                }
            }
            normalized
        } else {
            record
        };

        for spec in schema::categorical_columns() {
            match record.get(spec.name) {
                None | Some(Value::Null) | Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(PipelineError::InvalidField {
                        field: spec.name.to_string(),
                        reason: format!("expected a text label, found {}", other),
                    })
                }
            }
        }

        let ignored: Vec<&str> = record
            .keys()
            .map(String::as_str)
            .filter(|k| schema::column(k).is_none())
            .collect();
        if !ignored.is_empty() {
            log::debug!("Ignoring fields outside the feature schema: {:?}", ignored);
        }

        serde_json::from_value(Value::Object(record))
            .map_err(|e| PipelineError::MalformedRecord(e.to_string()))
    }

    /// Value of a categorical column, by canonical column name.
    pub fn categorical(&self, column: &str) -> Option<&str> {
        let value = match column {
            schema::GENDER => &self.gender,
            schema::ANXIETY => &self.anxiety,
            schema::DEPRESSION => &self.depression,
            schema::SLEEP_ISSUES => &self.sleep_issues,
            schema::SOCIAL_WITHDRAWAL => &self.social_withdrawal,
            schema::STRESS_LEVEL => &self.stress_level,
            schema::WORK_STUDY_PRESSURE => &self.work_study_pressure,
            schema::FAMILY_HISTORY => &self.family_history,
            schema::PHYSICAL_ACTIVITY => &self.physical_activity,
            schema::SOCIAL_SUPPORT => &self.social_support,
            _ => return None,
        };
        value.as_deref()
    }

    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            schema::AGE => self.age,
            _ => None,
        }
    }
}

/// Encoded record in schema column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: Vec<f32>,
    /// Columns whose label was unseen and encoded as the default label.
    pub fallback_columns: Vec<String>,
    pub age_defaulted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Model output before rounding.
    pub raw: f32,
    pub score: i64,
    pub band: RiskBand,
    pub fallback_columns: Vec<String>,
    pub age_defaulted: bool,
}

/// Loaded artifacts plus the per-request rules. Read-only after construction.
pub struct InferenceContext {
    encoders: EncoderSet,
    model: Box<dyn RegressorModel>,
    settings: InferenceSettings,
}

impl InferenceContext {
    pub fn new(
        encoders: EncoderSet,
        model: Box<dyn RegressorModel>,
        settings: InferenceSettings,
    ) -> Result<Self> {
        encoders.validate()?;
        let expected = schema::FEATURE_COLUMNS.len();
        match model.feature_size() {
            Some(size) if size == expected => {}
            Some(size) => {
                return Err(PipelineError::FeatureLength {
                    expected,
                    found: size,
                })
            }
            None => return Err(PipelineError::ModelNotFitted),
        }
        Ok(InferenceContext {
            encoders,
            model,
            settings,
        })
    }

    /// Load both artifacts. Any failure here is a startup error.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        model_path: P,
        encoder_path: Q,
        settings: InferenceSettings,
    ) -> Result<Self> {
        let encoders = EncoderSet::load(encoder_path)?;
        let model = load_model(model_path, schema::FEATURE_COLUMNS.len())?;
        Self::new(encoders, model, settings)
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn feature_vector(&self, request: &PredictionRequest) -> Result<FeatureVector> {
        let mut values = Vec::with_capacity(schema::FEATURE_COLUMNS.len());
        let mut fallback_columns = Vec::new();
        let mut age_defaulted = false;

        for spec in schema::FEATURE_COLUMNS.iter() {
            let value = match spec.kind {
                ColumnKind::Numeric => match request.numeric(spec.name) {
                    Some(v) => v as f32,
                    None => {
                        age_defaulted = true;
                        self.settings.default_age as f32
                    }
                },
                ColumnKind::Categorical => {
                    let label = request
                        .categorical(spec.name)
                        .ok_or_else(|| PipelineError::MissingField(spec.name.to_string()))?;
                    let encoded = self
                        .encoders
                        .get(spec.name)?
                        .encode(label, self.settings.unseen_labels)?;
                    if encoded.fallback {
                        fallback_columns.push(spec.name.to_string());
                    }
                    encoded.code as f32
                }
            };
            values.push(value);
        }

        Ok(FeatureVector {
            values,
            fallback_columns,
            age_defaulted,
        })
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        let features = self.feature_vector(request)?;
        let raw = self.model.predict_one(&features.values)?;
        if !raw.is_finite() {
            return Err(PipelineError::NonFinitePrediction(raw));
        }
        let score = self.settings.score_rounding.apply(raw);

        Ok(Prediction {
            raw,
            score,
            band: RiskBand::from_score(score),
            fallback_columns: features.fallback_columns,
            age_defaulted: features.age_defaulted,
        })
    }

    pub fn predict_record(&self, record: RawRecord) -> Result<Prediction> {
        let request = PredictionRequest::from_record(record, self.settings.normalize_keys)?;
        self.predict(&request)
    }
}
