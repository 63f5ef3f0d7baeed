//! Train on a synthetic survey, persist both artifacts, reload them and run
//! the inference scenarios against the loaded context.

mod util;

use std::path::Path;

use serde_json::Value;

use mhscore_pipeline::config::{InferenceSettings, ScoreRounding};
use mhscore_pipeline::encoding::UnseenLabelPolicy;
use mhscore_pipeline::inference::{InferenceContext, RawRecord};
use mhscore_pipeline::training::{train_from_path, TrainingOptions};
use mhscore_pipeline::PipelineError;

use util::fixtures::{reference_record, write_survey};

fn as_record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

fn trained_context(dir: &Path, settings: InferenceSettings) -> InferenceContext {
    let data = write_survey(dir, 80);
    let artifacts = train_from_path(&data, &TrainingOptions::default()).unwrap();

    let model_path = dir.join("model.json");
    let encoder_path = dir.join("label_encoders.json");
    artifacts.save(&model_path, &encoder_path).unwrap();

    InferenceContext::load(&model_path, &encoder_path, settings).unwrap()
}

#[test]
fn reference_record_scores_within_training_range() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let prediction = ctx.predict_record(as_record(reference_record())).unwrap();
    assert!((0..=6).contains(&prediction.score), "score {}", prediction.score);
    assert!(prediction.fallback_columns.is_empty());
    assert!(!prediction.age_defaulted);
}

#[test]
fn missing_age_uses_default_age() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let mut record = as_record(reference_record());
    let with_age = ctx.predict_record(record.clone()).unwrap();
    record.remove("AGE");
    let without_age = ctx.predict_record(record).unwrap();

    assert!(without_age.age_defaulted);
    // The reference record's age equals the default age.
    assert_eq!(with_age.raw, without_age.raw);
}

#[test]
fn non_numeric_age_uses_default_age() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let mut record = as_record(reference_record());
    record.insert("AGE".into(), Value::from("unknown"));
    let prediction = ctx.predict_record(record).unwrap();
    assert!(prediction.age_defaulted);
}

#[test]
fn oversized_age_uses_default_age() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let mut record = as_record(reference_record());
    record.insert("AGE".into(), Value::from(1e300));
    let oversized = ctx.predict_record(record).unwrap();
    assert!(oversized.age_defaulted);

    let mut record = as_record(reference_record());
    record.insert("AGE".into(), Value::from(25.0));
    let default_age = ctx.predict_record(record).unwrap();
    assert_eq!(oversized.raw, default_age.raw);
}

#[test]
fn non_text_label_is_an_invalid_field() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let mut record = as_record(reference_record());
    record.insert("ANXIETY".into(), Value::from(true));
    let err = ctx.predict_record(record).unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(err, PipelineError::InvalidField { .. }));
}

#[test]
fn unseen_gender_falls_back_to_default_label() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let default_gender = ctx.encoders().get("GENDER").unwrap().default_label().to_string();

    let mut record = as_record(reference_record());
    record.insert("GENDER".into(), Value::from("NonBinary"));
    let unseen = ctx.predict_record(record.clone()).unwrap();
    assert_eq!(unseen.fallback_columns, vec!["GENDER".to_string()]);

    record.insert("GENDER".into(), Value::from(default_gender));
    let default = ctx.predict_record(record).unwrap();
    assert_eq!(unseen.raw, default.raw);
}

#[test]
fn reject_policy_turns_unseen_label_into_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = InferenceSettings {
        unseen_labels: UnseenLabelPolicy::Reject,
        ..InferenceSettings::default()
    };
    let ctx = trained_context(dir.path(), settings);

    let mut record = as_record(reference_record());
    record.insert("GENDER".into(), Value::from("NonBinary"));
    let err = ctx.predict_record(record).unwrap_err();
    assert!(matches!(err, PipelineError::UnseenLabel { .. }));
    assert!(err.is_client_error());
}

#[test]
fn missing_categorical_field_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let mut record = as_record(reference_record());
    record.remove("STRESS_LEVEL");
    let err = ctx.predict_record(record).unwrap_err();
    assert!(matches!(err, PipelineError::MissingField(ref f) if f == "STRESS_LEVEL"));
}

#[test]
fn lowercase_keys_are_accepted_when_normalizing() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = trained_context(dir.path(), InferenceSettings::default());

    let record: RawRecord = as_record(reference_record())
        .into_iter()
        .map(|(k, v)| (k.to_lowercase().replace('_', " "), v))
        .collect();
    let prediction = ctx.predict_record(record).unwrap();
    assert!((0..=6).contains(&prediction.score));
}

#[test]
fn rounding_policy_only_changes_the_integer_score() {
    let dir = tempfile::tempdir().unwrap();
    let truncating = trained_context(dir.path(), InferenceSettings::default());
    let rounding = trained_context(
        dir.path(),
        InferenceSettings {
            score_rounding: ScoreRounding::Round,
            ..InferenceSettings::default()
        },
    );

    let a = truncating.predict_record(as_record(reference_record())).unwrap();
    let b = rounding.predict_record(as_record(reference_record())).unwrap();
    assert_eq!(a.raw, b.raw);
    assert_eq!(a.score, a.raw.trunc() as i64);
    assert_eq!(b.score, b.raw.round() as i64);
}

#[test]
fn seeded_training_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_survey(dir.path(), 80);
    let a = train_from_path(&data, &TrainingOptions::default()).unwrap();
    let b = train_from_path(&data, &TrainingOptions::default()).unwrap();
    assert_eq!(a.summary.metrics, b.summary.metrics);
    assert_eq!(a.summary.test_rows, 16);
    assert_eq!(a.summary.train_rows, 64);
}

#[test]
fn missing_dataset_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = train_from_path(dir.path().join("absent.csv"), &TrainingOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, PipelineError::Io { .. }));
}

#[test]
fn missing_artifacts_fail_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let result = InferenceContext::load(
        dir.path().join("model.json"),
        dir.path().join("label_encoders.json"),
        InferenceSettings::default(),
    );
    assert!(matches!(result, Err(PipelineError::Io { .. })));
}
