mod display;
mod repl;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use clausereview_ai::{OnnxReader, Reader, ReaderOptions};
use clausereview_core::{Answer, Document, ReviewConfig, find_category};
use clausereview_host::{AppContext, ReviewSession, RunOutcome, load_categories_and_questions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clausereview", version, about = "Contract clause review")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory uploaded contracts are saved to
    #[arg(long, global = true, env = "CLAUSEREVIEW_CONTRACTS_DIR")]
    contracts_dir: Option<PathBuf>,

    /// Directory holding model.onnx and tokenizer.json
    #[arg(long, global = true, env = "CLAUSEREVIEW_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the clause categories
    Questions {
        /// Also print each question
        #[arg(long)]
        full: bool,
    },
    /// Save a contract to the contracts directory and index it
    Ingest { file: PathBuf },
    /// Upload a contract and review the given clauses
    Review {
        file: PathBuf,
        /// Clause category, repeatable
        #[arg(long = "clause", required = true)]
        clauses: Vec<String>,
        /// Print predictions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive review session
    Session,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!("clausereview v{}", env!("CARGO_PKG_VERSION"));
    let config = build_config(&cli)?;

    match cli.command {
        Command::Questions { full } => {
            display::print_questions(load_categories_and_questions(), full);
        }
        Command::Ingest { file } => {
            let mut ctx = AppContext::open(config, IndexOnly)?;
            repl::upload(&mut ctx, &file)?;
        }
        Command::Review {
            file,
            clauses,
            json,
        } => {
            let mut ctx = open_with_model(config)?;
            review(&mut ctx, &file, &clauses, json)?;
        }
        Command::Session => {
            let mut ctx = open_with_model(config)?;
            repl::run_session(&mut ctx)?;
        }
    }
    Ok(())
}

/// Defaults, then the JSON file, then flags and environment.
fn build_config(cli: &Cli) -> anyhow::Result<ReviewConfig> {
    let mut config = match &cli.config {
        Some(path) => ReviewConfig::load(path)?,
        None => ReviewConfig::default(),
    };
    if let Some(dir) = &cli.contracts_dir {
        config.contracts_dir = dir.clone();
    }
    if let Some(dir) = &cli.model_dir {
        config.model_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn open_with_model(config: ReviewConfig) -> anyhow::Result<AppContext<OnnxReader>> {
    let reader = OnnxReader::load(&config.model_dir, ReaderOptions::from(&config))
        .with_context(|| format!("loading reader model from {}", config.model_dir.display()))?;
    Ok(AppContext::open(config, reader)?)
}

fn review<R: Reader>(
    ctx: &mut AppContext<R>,
    file: &Path,
    clauses: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let mut session = ReviewSession::new();
    for name in clauses {
        let question =
            find_category(name).with_context(|| format!("unknown clause category: {name}"))?;
        session.select(question);
    }

    let name = repl::upload(ctx, file)?;
    session.on_upload(&name);

    let params = ctx.params();
    let predictions = match session.on_run(&mut ctx.pipeline(), params)? {
        RunOutcome::Completed(predictions) => predictions,
        other => anyhow::bail!("review did not run: {other:?}"),
    };

    if json {
        display::print_predictions_json(&predictions)?;
    } else {
        display::print_predictions(&predictions);
    }
    Ok(())
}

/// Stands in for the model on commands that only index.
struct IndexOnly;

impl Reader for IndexOnly {
    fn predict(&mut self, _: &str, _: &[Document], _: usize) -> anyhow::Result<Vec<Answer>> {
        anyhow::bail!("no reader model loaded")
    }
}
