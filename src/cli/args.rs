//! CLI argument definitions.

use crate::cli::validators::{parse_threads, parse_top_k};
use crate::config::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Classify insects and bites in photographs with an on-device model.
#[derive(Debug, Parser)]
#[command(name = "insectiscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Image files or directories to classify.
    pub images: Vec<PathBuf>,

    /// Common options for classification.
    #[command(flatten)]
    pub classify: ClassifyArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print the active label table with output indices.
    Labels,
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for classification.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Asset bundle directory containing the model.
    #[arg(long, env = "INSECTISCAN_ASSETS", global = true)]
    pub assets: Option<PathBuf>,

    /// Logical name of the model asset inside the bundle.
    #[arg(long, env = "INSECTISCAN_MODEL_ASSET")]
    pub model_asset: Option<String>,

    /// Labels file, one class per line in output order (overrides config).
    #[arg(long, env = "INSECTISCAN_LABELS", global = true)]
    pub labels: Option<PathBuf>,

    /// Output format (text, json, csv).
    #[arg(short, long, env = "INSECTISCAN_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Ranked predictions to report per image.
    #[arg(short = 'k', long, value_parser = parse_top_k, env = "INSECTISCAN_TOP_K")]
    pub top_k: Option<usize>,

    /// Intra-op threads for each forward pass.
    #[arg(short = 't', long, value_parser = parse_threads, env = "INSECTISCAN_THREADS")]
    pub threads: Option<usize>,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress progress and informational output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace everything).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}
