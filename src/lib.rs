//! Workspace umbrella crate for qmatch.
//!
//! qmatch decides whether a search query is satisfied by a document. This
//! crate stitches the normalizer (`canonical`) and the matching engine
//! (`matcher`) to the CSV inputs, the YAML configuration and the Primo
//! retrieval collaborator, so a whole run is one call:
//!
//! ```no_run
//! use std::path::Path;
//! use qmatch::{run_flat, MatchMode, QmatchConfig, RunOptions};
//!
//! let options = RunOptions {
//!     threshold: Some(50),
//!     ..RunOptions::default()
//! };
//! let summary = run_flat(
//!     &QmatchConfig::default(),
//!     MatchMode::Fuzzy,
//!     Path::new("queries.csv"),
//!     Path::new("toc.csv"),
//!     &options,
//! )?;
//! println!("{} results in {}", summary.results, summary.output.display());
//! # Ok::<(), qmatch::PipelineError>(())
//! ```

pub mod config;
pub mod io;
pub mod primo;

pub use canonical::{normalize, normalize_terms, CanonicalError, NormalizeConfig, StopWordSet};
pub use matcher::{
    attribute, token_set_ratio, DocumentProvider, DocumentSource, EmptyQueryPolicy, Evidence,
    FlatDocument, IdentifierSet, MatchConfig, MatchError, MatchMode, MatchResult, Matcher,
    ProviderError, Query, Retrieval, StaticProvider, StructuredDocument, Threshold,
};

pub use crate::config::{ConfigLoadError, QmatchConfig};
pub use crate::io::IoError;
#[cfg(feature = "primo")]
pub use crate::primo::PrimoProvider;
pub use crate::primo::ResponseFileProvider;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Errors that can stop a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error(transparent)]
    StopWords(#[from] CanonicalError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Per-run overrides, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Wins over `matching.threshold`.
    pub threshold: Option<u16>,
    /// Wins over `stop_words.path`.
    pub stop_words: Option<PathBuf>,
    /// Exact mode: a query left without terms matches every document.
    pub match_empty: bool,
    /// Defaults to [`default_output_path`].
    pub output: Option<PathBuf>,
}

/// What a finished run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: MatchMode,
    pub queries: usize,
    /// Flat documents read, or identifiers of interest in field mode.
    pub documents: usize,
    pub results: usize,
    pub output: PathBuf,
}

/// `<queries stem>_results.csv` next to the query file, or
/// `<queries stem>_search_matches.csv` in field mode.
pub fn default_output_path(queries: &Path, mode: MatchMode) -> PathBuf {
    let suffix = match mode {
        MatchMode::Fields => "_search_matches.csv",
        MatchMode::Exact | MatchMode::Fuzzy => "_results.csv",
    };
    let stem = queries
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "queries".to_string());
    queries.with_file_name(format!("{stem}{suffix}"))
}

/// Builds a [`Matcher`] from the file configuration and run overrides.
pub fn build_matcher(
    config: &QmatchConfig,
    mode: MatchMode,
    options: &RunOptions,
) -> Result<Matcher, PipelineError> {
    let mut match_config = config.match_config(mode, options.threshold)?;
    if options.match_empty {
        match_config.empty_query = EmptyQueryPolicy::MatchAll;
    }
    let stop_words = config.load_stop_words(options.stop_words.as_deref())?;
    info!(
        mode = %mode,
        threshold = ?match_config.threshold.map(Threshold::value),
        stop_words = stop_words.len(),
        "matcher_ready"
    );
    Ok(Matcher::new(match_config, config.normalize.clone(), stop_words)?)
}

/// Exact or fuzzy run: query CSV × document CSV → result CSV.
pub fn run_flat(
    config: &QmatchConfig,
    mode: MatchMode,
    queries_path: &Path,
    documents_path: &Path,
    options: &RunOptions,
) -> Result<RunSummary, PipelineError> {
    let matcher = build_matcher(config, mode, options)?;
    let queries = io::read_queries(queries_path)?;
    let documents = io::read_documents(documents_path)?;
    info!(queries = queries.len(), documents = documents.len(), "inputs_loaded");

    let results = matcher.run(&queries, DocumentSource::Flat(&documents))?;
    let output = finish(queries_path, mode, options, &results)?;

    Ok(RunSummary {
        mode,
        queries: queries.len(),
        documents: documents.len(),
        results: results.len(),
        output,
    })
}

/// Field-attribution run: each query is sent to `provider`, and retrieved
/// records listed in the identifier CSV are attributed.
pub fn run_fields(
    config: &QmatchConfig,
    queries_path: &Path,
    identifiers_path: &Path,
    provider: &dyn DocumentProvider,
    options: &RunOptions,
) -> Result<RunSummary, PipelineError> {
    let mode = MatchMode::Fields;
    let matcher = build_matcher(config, mode, options)?;
    let queries = io::read_queries(queries_path)?;
    let of_interest = io::read_identifiers(identifiers_path)?;
    info!(queries = queries.len(), identifiers = of_interest.len(), "inputs_loaded");

    let results = matcher.run(
        &queries,
        DocumentSource::Structured {
            provider,
            of_interest: &of_interest,
        },
    )?;
    let output = finish(queries_path, mode, options, &results)?;

    Ok(RunSummary {
        mode,
        queries: queries.len(),
        documents: of_interest.len(),
        results: results.len(),
        output,
    })
}

fn finish(
    queries_path: &Path,
    mode: MatchMode,
    options: &RunOptions,
    results: &[MatchResult],
) -> Result<PathBuf, PipelineError> {
    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(queries_path, mode));
    io::write_results(&output, results)?;
    Ok(output)
}
