use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use upi_sms_classifier::{
    create_runtime, service, smoke, training, AppState, ModelManager, RuntimeConfig, ScoringMode, TrainingConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the classifier on a labeled CSV and save the artifact
    Train(TrainArgs),
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Print predictions for a fixed set of sample messages
    Smoke(ModelArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Model artifact to load (defaults to the shared models directory)
    #[arg(long, env = "UPI_SMS_MODEL")]
    model: Option<PathBuf>,
}

#[derive(Args)]
struct TrainArgs {
    /// CSV with `text` and `label` columns
    #[arg(long, default_value = "data/upi_dataset.csv")]
    data: PathBuf,
    /// Where to write the artifact (defaults to the shared models directory)
    #[arg(long, env = "UPI_SMS_MODEL")]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Additive smoothing for naive Bayes
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,
    #[arg(long, default_value_t = 1)]
    min_df: usize,
    /// Longest word n-gram used as a feature
    #[arg(long, default_value_t = 2)]
    max_ngram: usize,
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[arg(long, env = "UPI_SMS_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "UPI_SMS_PORT", default_value_t = 8000)]
    port: u16,
    /// How categorize fills in confidence and alternatives
    #[arg(long, env = "UPI_SMS_SCORING", value_enum, default_value_t = ScoringMode::default())]
    scoring: ScoringMode,
    /// Tokio worker threads, 0 for one per core
    #[arg(long, env = "UPI_SMS_WORKERS", default_value_t = 0)]
    workers: usize,
}

fn resolve_model_path(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(ModelManager::new_default()
            .context("Failed to create models directory")?
            .default_model_path()),
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let config = TrainingConfig {
        data_path: args.data,
        output_path: resolve_model_path(args.output)?,
        test_size: args.test_size,
        seed: args.seed,
        alpha: args.alpha,
        ngram_range: (1, args.max_ngram),
        min_df: args.min_df,
    };

    let start_time = Instant::now();
    let outcome = training::train(&config)?;

    println!("Dataset shape: ({}, 2)", outcome.train_size + outcome.test_size);
    println!("Accuracy: {}", outcome.accuracy());
    println!("\nClassification Report:\n{}", outcome.report);
    println!("Model saved as {}", outcome.artifact_path.display());
    info!("Training finished in {:.2?}", start_time.elapsed());
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let model_path = resolve_model_path(args.model.model)?;
    // Load before binding so a bad artifact never gets a listening socket.
    let classifier = ModelManager::load(&model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;
    info!(
        "Loaded model {} ({} classes, scoring: {})",
        model_path.display(),
        classifier.labels().len(),
        args.scoring
    );

    let state = AppState::new(classifier, args.scoring, model_path);
    let addr = SocketAddr::new(args.host, args.port);
    let runtime = create_runtime(&RuntimeConfig {
        worker_threads: args.workers,
    })
    .context("Failed to start tokio runtime")?;

    runtime
        .block_on(service::serve(addr, state))
        .with_context(|| format!("Server on {} failed", addr))
}

fn run_smoke(args: ModelArgs) -> Result<()> {
    let model_path = resolve_model_path(args.model)?;
    let classifier = ModelManager::load(&model_path)
        .with_context(|| format!("Failed to load model from {}", model_path.display()))?;
    smoke::run_smoke(&classifier, &mut std::io::stdout().lock())?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Train(args) => run_train(args),
        Command::Serve(args) => run_serve(args),
        Command::Smoke(args) => run_smoke(args),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
