use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use mhscore_cli::encoders::print_encoders;
use mhscore_cli::predict::inference;
use mhscore_cli::predict::input::PredictConfig;
use mhscore_cli::serve;
use mhscore_cli::serve::input::ServeConfig;
use mhscore_cli::train::input::TrainConfig;
use mhscore_cli::train::trainer;
use mhscore_cli::util::print_config_template;

fn config_arg(help: &'static str) -> Arg {
    Arg::new("config")
        .help(help)
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn path_arg(id: &'static str, short: char, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(long)
        .help(help)
        .value_parser(clap::builder::NonEmptyStringValueParser::new())
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MHSCORE_LOG", "error,mhscore=info"))
        .init();

    let matches = Command::new("mhscore")
        .version(clap::crate_version!())
        .about("Mental health score regression: train, predict and serve")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Fit category encoders and a regression model on survey data")
                .arg(config_arg("Path to training configuration file"))
                .arg(path_arg(
                    "train_data",
                    'd',
                    "train_data",
                    "Path to training data (*.csv or *.tsv). Overrides the configuration file.",
                ))
                .arg(path_arg(
                    "model_output",
                    'o',
                    "model_output",
                    "File the trained model is written to. Overrides the configuration file.",
                ))
                .arg(path_arg(
                    "encoder_output",
                    'e',
                    "encoder_output",
                    "File the fitted encoders are written to. Overrides the configuration file.",
                ))
                .arg(
                    Arg::new("model_type")
                        .short('m')
                        .long("model_type")
                        .help("Model to train. Overrides the configuration file.")
                        .value_parser(["decision_tree", "gbdt"]),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the train/test split")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Score every record of a CSV/TSV file with a trained model")
                .arg(config_arg("Path to prediction configuration file"))
                .arg(path_arg("model_path", 'm', "model", "Path to the trained model file"))
                .arg(path_arg("encoder_path", 'e', "encoders", "Path to the encoder file"))
                .arg(path_arg(
                    "inference_data",
                    'd',
                    "inference_data",
                    "Path to the input records (*.csv or *.tsv)",
                ))
                .arg(path_arg(
                    "output_file",
                    'o',
                    "output_file",
                    "Path to the output file for predictions (*.csv or *.tsv)",
                ))
                .arg(
                    Arg::new("round")
                        .long("round")
                        .help("Round scores to the nearest integer instead of truncating.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("encoders")
                .about("Print the classes of a persisted encoder file in code order")
                .arg(
                    Arg::new("path")
                        .help("Path to the encoder file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve single-record predictions over HTTP")
                .arg(config_arg("Path to server configuration file"))
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Address to bind")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port to bind")
                        .value_parser(clap::value_parser!(u16)),
                )
                .arg(path_arg("model_path", 'm', "model", "Path to the trained model file"))
                .arg(path_arg("encoder_path", 'e', "encoders", "Path to the encoder file")),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        Some(("encoders", sub_m)) => handle_encoders(sub_m),
        Some(("serve", sub_m)) => handle_serve(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

/// True when nothing was given on the command line: no config file and no
/// override flag.
fn template_only(matches: &ArgMatches) -> bool {
    !matches
        .ids()
        .any(|id| matches.value_source(id.as_str()) == Some(ValueSource::CommandLine))
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    if template_only(matches) {
        return print_config_template(&TrainConfig::default());
    }
    let config_path = matches.get_one::<PathBuf>("config");
    log::info!("[mhscore::train] Training with config: {:?}", config_path);

    let params = TrainConfig::from_arguments(config_path, matches)?;

    match trainer::run_training(&params) {
        Ok(summary) => {
            eprintln!(
                "[mhscore::train] {} rows used, test MAE {:.4}, R² {:.4}",
                summary.train_rows + summary.test_rows,
                summary.metrics.mae,
                summary.metrics.r2
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    if template_only(matches) {
        return print_config_template(&PredictConfig::default());
    }
    let config_path = matches.get_one::<PathBuf>("config");
    log::info!("[mhscore::predict] Inference with config: {:?}", config_path);

    let params = PredictConfig::from_arguments(config_path, matches)?;

    match inference::run_inference(&params) {
        Ok(results) => {
            eprintln!(
                "[mhscore::predict] Scored {} records, output: {}",
                results.iter().filter(|r| r.is_ok()).count(),
                params.output_file
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Inference failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_encoders(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<PathBuf>("path")
        .context("Encoder path is required")?;
    let stdout = std::io::stdout();
    print_encoders(path, &mut stdout.lock())
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    if template_only(matches) {
        return print_config_template(&ServeConfig::default());
    }
    let config_path = matches.get_one::<PathBuf>("config");
    let params = ServeConfig::from_arguments(config_path, matches)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    match runtime.block_on(serve::run_server(params)) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Server failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
