//! Config parsing, CLI overrides and util helpers.

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

use mhscore_cli::predict::input::PredictConfig;
use mhscore_cli::serve::input::ServeConfig;
use mhscore_cli::train::input::TrainConfig;
use mhscore_cli::util::validate_tsv_or_csv_file;
use mhscore_pipeline::config::{ModelType, ScoreRounding};
use mhscore_pipeline::encoding::UnseenLabelPolicy;

// ---------------------------------------------------------------------------
// validate_tsv_or_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_csv_and_tsv_files_exist() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["data.csv", "data.TSV"] {
        let path = dir.path().join(name);
        std::fs::File::create(&path).unwrap();
        assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_ok());
    }
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.xlsx");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(path.to_str().unwrap()).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_tsv_or_csv_file("/nonexistent/path/data.csv").is_err());
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn train_config_defaults() {
    let cfg = TrainConfig::default();
    assert_eq!(cfg.test_ratio, 0.2);
    assert_eq!(cfg.seed, 42);
    assert!(cfg.report);
    assert!(matches!(cfg.model.model_type, ModelType::DecisionTree { .. }));
    assert_eq!(cfg.training_options().seed, 42);
}

#[test]
fn serve_config_defaults() {
    let cfg = ServeConfig::default();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.inference.default_age, 25.0);
    assert!(cfg.inference.normalize_keys);
}

#[test]
fn predict_config_roundtrips_through_json() {
    let cfg = PredictConfig::default();
    let json = serde_json::to_string_pretty(&cfg).unwrap();
    assert!(json.contains("\"unseen_labels\": \"fallback\""));
    assert!(json.contains("\"score_rounding\": \"truncate\""));
    let back: PredictConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, cfg);
}

// ---------------------------------------------------------------------------
// from_arguments
// ---------------------------------------------------------------------------

fn train_command() -> Command {
    Command::new("train")
        .arg(Arg::new("train_data").short('d'))
        .arg(Arg::new("model_output").short('o'))
        .arg(Arg::new("encoder_output").short('e'))
        .arg(Arg::new("model_type").short('m'))
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("no_report")
                .long("no-report")
                .action(ArgAction::SetTrue),
        )
}

#[test]
fn partial_train_config_falls_back_per_field() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("survey.csv");
    std::fs::write(&data, "Age\n1\n").unwrap();

    let config_path: PathBuf = dir.path().join("train.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "train_data": data,
            "seed": "not a number",
            "test_ratio": 0.25,
        })
        .to_string(),
    )
    .unwrap();

    let matches = train_command().get_matches_from(["train"]);
    let cfg = TrainConfig::from_arguments(Some(&config_path), &matches).unwrap();
    assert_eq!(cfg.test_ratio, 0.25);
    assert_eq!(cfg.seed, 42);
    assert_eq!(cfg.model_output, "model.json");
}

#[test]
fn cli_overrides_win_over_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("survey.tsv");
    std::fs::write(&data, "Age\n1\n").unwrap();

    let matches = train_command().get_matches_from([
        "train",
        "-d",
        data.to_str().unwrap(),
        "-m",
        "gbdt",
        "--seed",
        "7",
        "--no-report",
    ]);
    let cfg = TrainConfig::from_arguments(None, &matches).unwrap();
    assert_eq!(cfg.model.model_type.name(), "gbdt");
    assert_eq!(cfg.seed, 7);
    assert!(!cfg.report);
}

#[test]
fn missing_train_data_is_rejected() {
    let matches = train_command().get_matches_from(["train", "-d", "/nonexistent/survey.csv"]);
    assert!(TrainConfig::from_arguments(None, &matches).is_err());
}

#[test]
fn predict_config_reads_inference_settings() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("records.csv");
    std::fs::write(&data, "AGE\n30\n").unwrap();
    let config_path = dir.path().join("predict.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "inference_data": data,
            "inference": {"unseen_labels": "reject", "default_age": 30.0},
        })
        .to_string(),
    )
    .unwrap();

    let matches = Command::new("predict")
        .arg(Arg::new("model_path").short('m'))
        .arg(Arg::new("encoder_path").short('e'))
        .arg(Arg::new("inference_data").short('d'))
        .arg(Arg::new("output_file").short('o'))
        .arg(Arg::new("round").long("round").action(ArgAction::SetTrue))
        .get_matches_from(["predict", "--round"]);
    let cfg = PredictConfig::from_arguments(Some(&config_path), &matches).unwrap();
    assert_eq!(cfg.inference.unseen_labels, UnseenLabelPolicy::Reject);
    assert_eq!(cfg.inference.default_age, 30.0);
    assert_eq!(cfg.inference.score_rounding, ScoreRounding::Round);
    assert!(cfg.inference.normalize_keys);
}
