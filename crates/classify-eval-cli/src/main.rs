//! classify-eval CLI - classification model accuracy evaluation

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Evaluate a classification model against a labeled image dataset.
#[derive(Parser)]
#[command(name = "classify-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a dataset.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Dataset root with one subdirectory per label
    #[arg(env = "FER2013_DATASET_PATH")]
    pub dataset: Option<PathBuf>,

    /// JSON configuration file (labels, label map, input contract)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an evaluation and print the accuracy report
    Run {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// CSV of recorded logits (file column, then one column per output label)
        #[arg(short, long)]
        scores: PathBuf,

        /// Run log that duplicates everything printed to the terminal
        #[arg(long, default_value = "test_emotion.log")]
        log_file: PathBuf,

        /// Directory for JSON and CSV reports
        #[arg(long)]
        report_dir: Option<PathBuf>,

        /// Progress line every N images within a label (0 disables)
        #[arg(long)]
        progress_interval: Option<usize>,
    },

    /// List label directories and image counts without running inference
    Discover {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { dataset, scores, log_file, report_dir, progress_interval } => {
            commands::run::run(&dataset, &scores, &log_file, report_dir, progress_interval)
        }
        Commands::Discover { dataset, json } => commands::discover::run(&dataset, json),
    }
}
