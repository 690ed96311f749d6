use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use qmatch::config::PrimoYamlConfig;
use qmatch::{
    run_fields, run_flat, DocumentProvider, MatchMode, QmatchConfig, ResponseFileProvider,
    RunOptions, RunSummary,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Match search queries against tables of contents or catalog records.
#[derive(Debug, Parser)]
#[command(name = "qmatch", version, about)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log filter (e.g. `debug`, `matcher=debug`). Overrides RUST_LOG and the config file.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Every query term must appear as a whole word in the document.
    Exact(ExactArgs),
    /// Token-set similarity strictly above a threshold.
    Fuzzy(FuzzyArgs),
    /// Find records of interest in search results and report matching fields.
    Fields(FieldsArgs),
}

#[derive(Debug, Args)]
struct ExactArgs {
    /// Query CSV: `id,text`.
    queries: PathBuf,
    /// Document CSV: `id,text`.
    documents: PathBuf,
    #[arg(long, value_name = "FILE")]
    stop_words: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// A query with no terms left after stop-word removal matches every document.
    #[arg(long, default_value_t = false)]
    match_empty: bool,
}

#[derive(Debug, Args)]
struct FuzzyArgs {
    /// Query CSV: `id,text`.
    queries: PathBuf,
    /// Document CSV: `id,text`.
    documents: PathBuf,
    /// Cutoff in 0..=100; falls back to `matching.threshold`.
    #[arg(long, value_parser = clap::value_parser!(u16).range(0..=100))]
    threshold: Option<u16>,
    #[arg(long, value_name = "FILE")]
    stop_words: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FieldsArgs {
    /// Query CSV: `id,text,tab,view`.
    queries: PathBuf,
    /// Identifier CSV; the first column of each row is a record id.
    identifiers: PathBuf,
    /// Cutoff in 0..=100; falls back to `matching.threshold`.
    #[arg(long, value_parser = clap::value_parser!(u16).range(0..=100))]
    threshold: Option<u16>,
    /// Recorded search responses (`{query_id: response}`) instead of live API calls.
    #[arg(long, value_name = "FILE")]
    responses: Option<PathBuf>,
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => QmatchConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => QmatchConfig::default(),
    };
    init_tracing(cli.log_level.as_deref(), cli.json_logs, &config);

    let summary = match cli.command {
        Command::Exact(args) => {
            let options = RunOptions {
                threshold: None,
                stop_words: args.stop_words,
                match_empty: args.match_empty,
                output: args.output,
            };
            run_flat(&config, MatchMode::Exact, &args.queries, &args.documents, &options)?
        }
        Command::Fuzzy(args) => {
            let options = RunOptions {
                threshold: args.threshold,
                stop_words: args.stop_words,
                match_empty: false,
                output: args.output,
            };
            run_flat(&config, MatchMode::Fuzzy, &args.queries, &args.documents, &options)?
        }
        Command::Fields(args) => {
            let provider = field_provider(&config.primo, args.responses.as_deref())?;
            let options = RunOptions {
                threshold: args.threshold,
                output: args.output,
                ..RunOptions::default()
            };
            run_fields(
                &config,
                &args.queries,
                &args.identifiers,
                provider.as_ref(),
                &options,
            )?
        }
    };

    report(&summary);
    Ok(())
}

fn init_tracing(flag: Option<&str>, json_flag: bool, config: &QmatchConfig) {
    let filter = match flag {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json_flag || config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn field_provider(
    primo: &PrimoYamlConfig,
    responses: Option<&Path>,
) -> Result<Box<dyn DocumentProvider>> {
    match responses {
        Some(path) => {
            let provider = ResponseFileProvider::load(path)
                .with_context(|| format!("loading recorded responses {}", path.display()))?;
            Ok(Box::new(provider))
        }
        None => live_provider(primo),
    }
}

#[cfg(feature = "primo")]
fn live_provider(primo: &PrimoYamlConfig) -> Result<Box<dyn DocumentProvider>> {
    let provider = qmatch::PrimoProvider::from_env(primo.clone())
        .context("starting the Primo search client")?;
    Ok(Box::new(provider))
}

#[cfg(not(feature = "primo"))]
fn live_provider(_primo: &PrimoYamlConfig) -> Result<Box<dyn DocumentProvider>> {
    anyhow::bail!("--responses is required: this build has no live Primo client (feature `primo`)")
}

fn report(summary: &RunSummary) {
    info!(
        mode = %summary.mode,
        queries = summary.queries,
        documents = summary.documents,
        results = summary.results,
        output = %summary.output.display(),
        "run_summary"
    );
    println!(
        "{} results for {} queries written to {}",
        summary.results,
        summary.queries,
        summary.output.display()
    );
}
