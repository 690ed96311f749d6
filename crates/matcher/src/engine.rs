use std::sync::Arc;
use std::time::Instant;

use canonical::{normalize, NormalizeConfig, StopWordSet};
use tracing::{debug, info, warn};

use crate::attribution::attribute_terms;
use crate::exact::contains_all;
use crate::fuzzy::score_term_sets;
use crate::metrics::{metrics_recorder, MatchMetrics};
use crate::provider::DocumentProvider;
use crate::terms::TermSet;
use crate::types::{
    EmptyQueryPolicy, Evidence, FlatDocument, IdentifierSet, MatchConfig, MatchError, MatchMode,
    MatchResult, Query,
};


/// Documents a run is matched against.
#[derive(Clone, Copy)]
pub enum DocumentSource<'a> {
    /// Flat `(id, text)` documents, for exact and fuzzy modes.
    Flat(&'a [FlatDocument]),
    /// Structured records retrieved per query, joined against the identifiers
    /// of interest, for field-attribution mode.
    Structured {
        provider: &'a dyn DocumentProvider,
        of_interest: &'a IdentifierSet,
    },
}

impl DocumentSource<'_> {
    fn kind(&self) -> &'static str {
        match self {
            DocumentSource::Flat(_) => "flat",
            DocumentSource::Structured { .. } => "structured",
        }
    }
}

/// Runs a query set against a document set under one [`MatchMode`].
///
/// The matcher is read-only: queries and documents are borrowed, the
/// stop-word set is shared, and every (query, document) pair is scored
/// independently.
#[derive(Debug)]
pub struct Matcher {
    config: MatchConfig,
    normalize_cfg: NormalizeConfig,
    stop_words: Arc<StopWordSet>,
}

impl Matcher {
    /// Validates `config` and builds a matcher.
    pub fn new(
        config: MatchConfig,
        normalize_cfg: NormalizeConfig,
        stop_words: Arc<StopWordSet>,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self {
            config,
            normalize_cfg,
            stop_words,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn stop_words(&self) -> &StopWordSet {
        &self.stop_words
    }

    /// Runs every query against `source` using the configured mode.
    ///
    /// Results follow query order, then document order. A mode paired with
    /// the wrong kind of source is a configuration error.
    pub fn run(
        &self,
        queries: &[Query],
        source: DocumentSource<'_>,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let start = Instant::now();
        let results = match (self.config.mode, source) {
            (MatchMode::Exact, DocumentSource::Flat(documents)) => {
                self.match_exact(queries, documents)
            }
            (MatchMode::Fuzzy, DocumentSource::Flat(documents)) => {
                self.match_fuzzy(queries, documents)?
            }
            (
                MatchMode::Fields,
                DocumentSource::Structured {
                    provider,
                    of_interest,
                },
            ) => self.match_fields(queries, provider, of_interest)?,
            (mode, source) => {
                return Err(MatchError::InvalidConfig(format!(
                    "{mode} mode cannot run against {} documents",
                    source.kind()
                )))
            }
        };

        info!(
            mode = %self.config.mode,
            queries = queries.len(),
            results = results.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "run_complete"
        );
        Ok(results)
    }

    /// Normalized query terms with stop words removed.
    pub fn query_terms(&self, text: &str) -> Vec<String> {
        self.stop_words
            .filter_terms(normalize(text, &self.normalize_cfg).into_terms())
    }

    /// Exact mode: emits a result for every document containing all query
    /// terms. Documents are normalized once; stop words are only removed from
    /// the query side.
    pub fn match_exact(&self, queries: &[Query], documents: &[FlatDocument]) -> Vec<MatchResult> {
        let prepared = self.prepare(documents);
        let mut results = Vec::new();

        for query in queries {
            let timer = QueryTimer::start(MatchMode::Exact);
            let before = results.len();
            let terms = self.query_terms(&query.text);
            debug!(query_id = %query.id, terms = ?terms, "query_start");

            if terms.is_empty() && self.config.empty_query == EmptyQueryPolicy::MatchNone {
                info!(query_id = %query.id, "empty_query_skipped");
            } else {
                for (document, document_terms) in &prepared {
                    if contains_all(&terms, document_terms) {
                        debug!(query_id = %query.id, document_id = %document.id, "match_hit");
                        results.push(result(query, &document.id, Evidence::Exact));
                    }
                }
            }

            timer.finish(&query.id, results.len() - before);
        }

        results
    }

    /// Fuzzy mode: emits a result with the token-set score for every document
    /// scoring strictly above the threshold.
    ///
    /// Stop words are stripped from the raw query words before scoring. A
    /// query or document without terms never matches.
    pub fn match_fuzzy(
        &self,
        queries: &[Query],
        documents: &[FlatDocument],
    ) -> Result<Vec<MatchResult>, MatchError> {
        let threshold = self.config.required_threshold()?;
        let prepared = self.prepare(documents);
        let mut results = Vec::new();

        for query in queries {
            let timer = QueryTimer::start(MatchMode::Fuzzy);
            let before = results.len();
            let stripped = self.stop_words.strip_words(&query.text);
            let terms = TermSet::from_text(&stripped, &self.normalize_cfg);
            debug!(query_id = %query.id, query = %stripped, "query_start");

            if terms.is_empty() {
                info!(query_id = %query.id, "empty_query_skipped");
            } else {
                for (document, document_terms) in &prepared {
                    if document_terms.is_empty() {
                        continue;
                    }
                    let score = score_term_sets(&terms, document_terms);
                    if threshold.passes(score) {
                        debug!(
                            query_id = %query.id,
                            document_id = %document.id,
                            score,
                            "match_hit"
                        );
                        results.push(result(query, &document.id, Evidence::Score(score)));
                    }
                }
            }

            timer.finish(&query.id, results.len() - before);
        }

        Ok(results)
    }

    /// Field-attribution mode: retrieves each query's structured records,
    /// keeps those whose identifier is of interest, and reports which of
    /// their fields match the query.
    ///
    /// Unroutable queries and provider failures skip the query. Records
    /// without an identifier are skipped. Every record of interest yields a
    /// result, even when no single field passes the threshold.
    pub fn match_fields(
        &self,
        queries: &[Query],
        provider: &dyn DocumentProvider,
        of_interest: &IdentifierSet,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let threshold = self.config.required_threshold()?;
        let id_field = self.config.identifier_field.as_str();
        let mut results = Vec::new();

        for query in queries {
            let timer = QueryTimer::start(MatchMode::Fields);
            let before = results.len();
            debug!(query_id = %query.id, query = %query.text, "query_start");

            let retrieval = match provider.retrieve(query) {
                Ok(Some(retrieval)) => retrieval,
                Ok(None) => {
                    info!(query_id = %query.id, tab = ?query.tab, "retrieval_skipped");
                    timer.finish(&query.id, 0);
                    continue;
                }
                Err(err) => {
                    warn!(query_id = %query.id, error = %err, "retrieval_failed");
                    timer.finish(&query.id, 0);
                    continue;
                }
            };
            info!(
                query_id = %query.id,
                total = retrieval.total,
                returned = retrieval.documents.len(),
                "retrieval_total"
            );

            let query_terms = TermSet::from_text(&query.text, &self.normalize_cfg);
            for document in &retrieval.documents {
                let Some(document_id) = document.identifier(id_field) else {
                    debug!(query_id = %query.id, field = id_field, "document_without_identifier");
                    continue;
                };
                if !of_interest.contains(document_id) {
                    continue;
                }

                let attribution =
                    attribute_terms(document, &query_terms, threshold, &self.normalize_cfg);
                info!(
                    query_id = %query.id,
                    document_id,
                    fields = ?attribution.fields,
                    "match_hit"
                );
                results.push(result(query, document_id, Evidence::Fields(attribution.fields)));
            }

            timer.finish(&query.id, results.len() - before);
        }

        Ok(results)
    }

    fn prepare<'d>(&self, documents: &'d [FlatDocument]) -> Vec<(&'d FlatDocument, TermSet)> {
        documents
            .iter()
            .map(|document| {
                (
                    document,
                    TermSet::from_text(&document.text, &self.normalize_cfg),
                )
            })
            .collect()
    }
}

fn result(query: &Query, document_id: &str, evidence: Evidence) -> MatchResult {
    MatchResult {
        query_id: query.id.clone(),
        query_text: query.text.clone(),
        document_id: document_id.to_string(),
        evidence,
    }
}

/// Per-query latency reporting to the installed [`MatchMetrics`], if any.
struct QueryTimer {
    recorder: Option<Arc<dyn MatchMetrics>>,
    mode: MatchMode,
    start: Instant,
}

impl QueryTimer {
    fn start(mode: MatchMode) -> Self {
        Self {
            recorder: metrics_recorder(),
            mode,
            start: Instant::now(),
        }
    }

    fn finish(self, query_id: &str, hit_count: usize) {
        if let Some(recorder) = self.recorder {
            recorder.record_query(query_id, self.mode, self.start.elapsed(), hit_count);
        }
    }
}
