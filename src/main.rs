use std::io::{stderr, stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use fraud_scoring_engine::engine::write_scored_csv;
use fraud_scoring_engine::{FileArtifactStore, PipelineConfig, ScoringPipeline, TrainingPipeline};

#[derive(Parser, Debug)]
#[command(author, version, about = "Train and apply a fraud scoring model on transaction CSVs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file (defaults apply to absent keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact path, overriding the configuration
    #[arg(long, global = true)]
    artifact: Option<PathBuf>,

    /// Log level written to stderr: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "error")]
    log_level: String
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit the encoder and forest on a labelled CSV and persist the artifact
    Train {
        input: PathBuf
    },
    /// Score a CSV against the persisted artifact and write it to stdout with risk columns
    Score {
        input: PathBuf,

        /// Flag rows whose fraud risk is strictly above this probability
        #[arg(long)]
        threshold: Option<f64>
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(parse_log_level(&cli.log_level));

    run(cli).inspect_err(|failure| error!("{failure:#}"))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from_path(path)?,
        None => PipelineConfig::default()
    };

    if let Some(artifact) = cli.artifact {
        config.artifact_path = artifact;
    }

    if let Command::Score { threshold: Some(threshold), .. } = &cli.command {
        config.scoring.threshold = *threshold;
    }

    config.validate()?;

    match cli.command {
        Command::Train { input } => run_training(config, &input),
        Command::Score { input, .. } => run_scoring(config, &input)
    }
}

fn run_training(config: PipelineConfig, input: &Path) -> Result<()> {
    let store = FileArtifactStore::new(&config.artifact_path);
    let artifact_path = config.artifact_path.clone();

    let timer = Instant::now();
    let report = TrainingPipeline::new(config, store).run(input)?;
    info!("Trained model in: {:?}", timer.elapsed());

    for (feature, importance) in &report.top_features {
        info!("Feature importance {feature}: {importance:.4}");
    }

    let mut output = stdout().lock();
    writeln!(output, "{report}; saved to {}", artifact_path.display())?;

    Ok(())
}

fn run_scoring(config: PipelineConfig, input: &Path) -> Result<()> {
    let store = FileArtifactStore::new(&config.artifact_path);

    let timer = Instant::now();
    let scored = ScoringPipeline::new(config, store).run(input)?;
    info!("Scored transactions in: {:?}", timer.elapsed());

    let output = BufWriter::new(stdout().lock());
    write_scored_csv(&scored, output)?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Scored CSV goes to stdout, so logging has to use stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
