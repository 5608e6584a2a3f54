#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use asote_eval::gold::DatasetRegistry;
use asote_eval::merge::merge_subtask_results;
use asote_eval::metrics::DegeneratePolicy;
use asote_eval::reader::{read_ate, read_tosc, read_towe};
use asote_eval::report::render_report_text;
use asote_eval::runner::{self, EvalConfig, DEFAULT_DATASET, DEFAULT_RUN_COUNT};

#[derive(Parser)]
#[command(name = "asote-eval", version, about = "ASOTE pipeline evaluation")]
struct Cli {
    /// Enable info-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge ATE / TOWE / TOSC predictions of repeated runs and score them
    Eval {
        /// Load the whole configuration from a JSON file (other flags ignored)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_DATASET)]
        current_dataset: String,

        /// Root directory of the registered datasets
        #[arg(long, default_value = "ASOTE-data/absa")]
        data_dir: PathBuf,

        /// Gold test file (overrides the dataset registry)
        #[arg(long)]
        gold: Option<PathBuf>,

        /// ATE result path; `%d` is replaced by the run index
        #[arg(
            long,
            default_value = "ASOTE-data/absa/ASOTE-prediction-result/ATE/%d/result_of_predicting_test.txt"
        )]
        ate_result_filepath_template: String,

        /// TOWE result path; `%d` is replaced by the run index
        #[arg(
            long,
            default_value = "ASOTE-data/absa/ASOTE-prediction-result/TOWE/%d/result_of_predicting_test.txt"
        )]
        towe_result_filepath_template: String,

        /// TOSC result path; `%d` is replaced by the run index
        #[arg(
            long,
            default_value = "ASOTE-data/absa/ASOTE-prediction-result/TOSC/%d/result_of_predicting_test.txt"
        )]
        tosc_result_filepath_template: String,

        /// Use the templates as literal paths for every run
        #[arg(long)]
        debug: bool,

        #[arg(long, default_value_t = DEFAULT_RUN_COUNT)]
        runs: usize,

        /// Fail on zero denominators instead of reporting 0
        #[arg(long)]
        strict_metrics: bool,

        /// Also write the aggregate report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Merge one run's predictions and write triplets as JSONL
    Merge {
        #[arg(long)]
        ate: PathBuf,
        #[arg(long)]
        towe: PathBuf,
        #[arg(long)]
        tosc: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// List registered dataset names
    Datasets,
}

#[derive(serde::Serialize)]
struct MergedLine<'a> {
    text: &'a str,
    triplets: Vec<&'a str>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Eval {
            config,
            current_dataset,
            data_dir,
            gold,
            ate_result_filepath_template,
            towe_result_filepath_template,
            tosc_result_filepath_template,
            debug,
            runs,
            strict_metrics,
            json,
        } => {
            let config = match config {
                Some(path) => EvalConfig::from_path(path)?,
                None => EvalConfig {
                    dataset_name: current_dataset,
                    data_dir,
                    gold_path: gold,
                    ate_template: ate_result_filepath_template,
                    towe_template: towe_result_filepath_template,
                    tosc_template: tosc_result_filepath_template,
                    debug,
                    run_count: runs,
                    degenerate_policy: if strict_metrics {
                        DegeneratePolicy::Fail
                    } else {
                        DegeneratePolicy::Zero
                    },
                },
            };

            let report = runner::run(&config)?;
            print!("{}", render_report_text(&report));
            if let Some(path) = json {
                write_json(&path, &report)?;
            }
        }
        Commands::Merge {
            ate,
            towe,
            tosc,
            out,
        } => {
            let ate = read_ate(ate)?;
            let towe = read_towe(towe)?;
            let tosc = read_tosc(tosc)?;
            let merged = merge_subtask_results(&ate, &tosc, &towe);

            let mut sentences: Vec<&str> = merged.sentences().collect();
            sentences.sort_unstable();
            let mut writer = BufWriter::new(File::create(out)?);
            for text in sentences {
                let line = MergedLine {
                    text,
                    triplets: merged.get(text).iter().map(|t| t.as_str()).collect(),
                };
                writeln!(writer, "{}", serde_json::to_string(&line)?)?;
            }
            writer.flush()?;
        }
        Commands::Datasets => {
            for name in DatasetRegistry::default().list() {
                println!("{name}");
            }
        }
    }

    Ok(())
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<(), io::Error> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    std::fs::write(path, json)
}
