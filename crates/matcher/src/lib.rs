//! # qmatch Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` decides which (query, document) pairs match and why. It sits on
//! top of the text normalizer (`canonical`) and offers three strategies:
//!
//! - **Exact**: every stop-word-filtered query term appears as a whole
//!   token in the document.
//! - **Fuzzy**: the token-set similarity of query and document is strictly
//!   above a threshold.
//! - **Fields**: structured records retrieved per query are joined against a
//!   set of identifiers of interest, and every field whose value resembles the
//!   query is reported.
//!
//! ## Core Types
//!
//! - [`MatchConfig`]: mode, [`Threshold`], [`EmptyQueryPolicy`] and the
//!   identifier field of structured records.
//! - [`Query`], [`FlatDocument`], [`StructuredDocument`]: inputs.
//! - [`DocumentProvider`]: where structured records come from.
//! - [`MatchResult`] / [`Evidence`]: one qualifying pair and its evidence.
//! - [`Matcher`]: the driver that runs a query set against a document source.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use canonical::{NormalizeConfig, StopWordSet};
//! use matcher::{DocumentSource, FlatDocument, MatchConfig, Matcher, Query};
//!
//! let stop_words: StopWordSet = ["the", "of"].into_iter().collect();
//! let matcher = Matcher::new(
//!     MatchConfig::exact(),
//!     NormalizeConfig::default(),
//!     Arc::new(stop_words),
//! )
//! .expect("valid config");
//!
//! let docs = vec![
//!     FlatDocument::new("b1", "Annual whale migration patterns"),
//!     FlatDocument::new("b2", "Whale songs"),
//! ];
//! let queries = vec![Query::new("q1", "the migration of whales, whale patterns")];
//!
//! let results = matcher
//!     .run(&queries, DocumentSource::Flat(&docs))
//!     .expect("run");
//! assert!(results.is_empty()); // "whales" is not a token of either document
//!
//! let queries = vec![Query::new("q2", "whale migration")];
//! let results = matcher.run(&queries, DocumentSource::Flat(&docs)).expect("run");
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].document_id, "b1");
//! ```
//!
//! ## Observability
//!
//! Every run logs structured `tracing` events (`query_start`, `match_hit`,
//! `field_hit`, `retrieval_total`, `run_complete`, ...). Install a
//! [`MatchMetrics`] implementation via [`set_match_metrics`] to record
//! per-query latency and hit counts.

pub mod attribution;
pub mod engine;
pub mod exact;
pub mod fuzzy;
pub mod metrics;
pub mod provider;
pub mod terms;
pub mod types;

pub use crate::attribution::{attribute, attribute_terms};
pub use crate::engine::{DocumentSource, Matcher};
pub use crate::exact::contains_all;
pub use crate::fuzzy::{ratio, score_term_sets, token_set_ratio, token_set_ratio_with};
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::provider::{DocumentProvider, StaticProvider};
pub use crate::terms::TermSet;
pub use crate::types::{
    EmptyQueryPolicy, Evidence, FieldAttribution, FieldHit, FlatDocument, IdentifierSet,
    MatchConfig, MatchError, MatchMode, MatchResult, ProviderError, Query, Retrieval,
    StructuredDocument, Threshold, DEFAULT_IDENTIFIER_FIELD,
};
