//! Insectiscan - on-device insect and bite photo classifier.
//!
//! This crate turns photographs into fixed-shape tensors, runs them through
//! an embedded ONNX model and maps the scores onto a fixed label table.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod imaging;
pub mod inference;
pub mod output;
pub mod pipeline;

use clap::{CommandFactory, Parser};
use cli::{ClassifyArgs, Cli, Command};
use config::{Config, OutputFormat, config_file_path, load_default_config, save_default_config};
use constants::WORKER_QUEUE_CAPACITY;
use imaging::PreprocessOptions;
use inference::{AssetBundle, LabelTable, ModelSession, OnnxLoader, SessionOptions};
use output::{ImageResult, progress};
use pipeline::{CapturedImage, ViewLifetime, collect_input_files, spawn_file_source, spawn_worker};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub use error::{Error, ErrorKind, Result};

/// Main entry point for the insectiscan CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.classify.verbose, cli.classify.quiet);

    let config = load_default_config()?;

    if let Some(command) = cli.command {
        return handle_command(command, &cli.classify, &config);
    }

    if cli.images.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    classify_images(&cli.images, &cli.classify, &config)
}

/// Settings for one classification run, after merging CLI, env and config.
#[derive(Debug, Clone)]
struct ClassifySettings {
    assets_dir: PathBuf,
    intra_threads: usize,
    format: OutputFormat,
    session: SessionOptions,
}

impl ClassifySettings {
    fn resolve(args: &ClassifyArgs, config: &Config) -> Result<Self> {
        let assets_dir = match args.assets.clone().or_else(|| config.model.assets_dir.clone()) {
            Some(dir) => dir,
            None => config::default_assets_dir()?,
        };

        let labels = resolve_labels(args, config)?;

        Ok(Self {
            assets_dir,
            intra_threads: args.threads.unwrap_or(config.model.intra_threads),
            format: args.format.unwrap_or(config.output.format),
            session: SessionOptions {
                asset_name: args
                    .model_asset
                    .clone()
                    .unwrap_or_else(|| config.model.asset.clone()),
                labels,
                preprocess: PreprocessOptions {
                    filter: config.preprocess.filter,
                    ..PreprocessOptions::default()
                },
                top_k: args.top_k.unwrap_or(config.output.top_k),
            },
        })
    }
}

fn resolve_labels(args: &ClassifyArgs, config: &Config) -> Result<LabelTable> {
    match args.labels.as_ref().or(config.model.labels.as_ref()) {
        Some(path) => {
            let table = LabelTable::from_file(path)?;
            info!("Loaded {} labels from {}", table.len(), path.display());
            Ok(table)
        }
        None => Ok(LabelTable::insects()),
    }
}

/// Counters for a classification run.
#[derive(Debug, Default)]
struct RunSummary {
    classified: usize,
    failed: usize,
}

/// Classify every image under `inputs`.
fn classify_images(inputs: &[PathBuf], args: &ClassifyArgs, config: &Config) -> Result<()> {
    let total_start = Instant::now();

    let files = collect_input_files(inputs)?;
    info!("Found {} image(s) to classify", files.len());

    let settings = ClassifySettings::resolve(args, config)?;

    let bundle = AssetBundle::new(&settings.assets_dir);
    let mut session = ModelSession::new(settings.session.clone());
    info!(
        "Loading model '{}' from {}",
        settings.session.asset_name,
        bundle.root().display()
    );
    session.load(&bundle, &OnnxLoader::new(settings.intra_threads))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal {
            message: format!("failed to start async runtime: {e}"),
        })?;

    let progress_enabled = !args.quiet && !args.no_progress;
    let summary = runtime.block_on(run_pipeline(
        Arc::new(session),
        files,
        &settings,
        std::io::stdout(),
        progress_enabled,
        args.fail_fast,
    ))?;

    info!(
        "Complete: {} classified, {} failed in {:.2}s",
        summary.classified,
        summary.failed,
        total_start.elapsed().as_secs_f64()
    );
    if summary.failed > 0 {
        warn!("{} image(s) could not be classified", summary.failed);
    }

    Ok(())
}

/// Feed decoded images through the worker and write each result as it lands.
///
/// On fail-fast the failing image is still written and the writer finalized,
/// so buffered formats keep everything classified before the failure.
async fn run_pipeline<W: std::io::Write + 'static>(
    session: Arc<ModelSession>,
    files: Vec<PathBuf>,
    settings: &ClassifySettings,
    out: W,
    progress_enabled: bool,
    fail_fast: bool,
) -> Result<RunSummary> {
    let mut writer = output::create_writer(settings.format, out, &settings.session.asset_name);
    writer.write_header()?;

    let image_progress = progress::create_image_progress(files.len(), progress_enabled);
    let (worker, worker_join) = spawn_worker(session, WORKER_QUEUE_CAPACITY);
    let mut images = spawn_file_source(files, WORKER_QUEUE_CAPACITY);

    // The CLI is the only consumer and stays alive for the whole run.
    let view = ViewLifetime::new();
    let mut summary = RunSummary::default();

    while let Some(CapturedImage { source, bitmap }) = images.recv().await {
        let outcome = match bitmap {
            Ok(bitmap) => match worker.submit(bitmap, view.token()).await {
                Ok(pending) => pending.wait().await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        let (result, failure) = match outcome {
            Ok(classification) => {
                summary.classified += 1;
                (ImageResult::classified(source, classification), None)
            }
            Err(e) => {
                error!("Failed to classify {}: {}", source.display(), e);
                summary.failed += 1;
                (ImageResult::failed(source, &e), Some(e))
            }
        };

        writer.write_result(&result)?;
        progress::inc_progress(image_progress.as_ref(), &result.source_display());

        if fail_fast && let Some(e) = failure {
            progress::finish_progress(image_progress, "Failed");
            writer.finalize()?;
            return Err(e);
        }
    }

    progress::finish_progress(image_progress, "Complete");
    writer.finalize()?;

    drop(worker);
    let stats = worker_join.await.map_err(|e| Error::Internal {
        message: format!("classification worker panicked: {e}"),
    })?;
    debug!(
        "Worker delivered {} result(s), discarded {}",
        stats.delivered, stats.discarded
    );

    Ok(summary)
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT is silent unless asked for; -vvv lifts every filter.
    let filter_str = if quiet {
        "warn,ort=off"
    } else {
        match verbose {
            0 => "info,ort=off",
            1 => "debug,ort=warn",
            2 => "trace,ort=info",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // Results go to stdout, so diagnostics stay on stderr.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, args: &ClassifyArgs, config: &Config) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
        Command::Labels => {
            let labels = resolve_labels(args, config)?;
            for (index, label) in labels.iter().enumerate() {
                println!("{index}: {label}");
            }
            Ok(())
        }
    }
}

fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  Set [model] assets_dir to the directory holding insect_model.onnx");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let text = toml::to_string_pretty(&config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            print!("{text}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config_file_path()?.display());
            Ok(())
        }
    }
}
