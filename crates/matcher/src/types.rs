use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier field read from structured records when none is configured.
pub const DEFAULT_IDENTIFIER_FIELD: &str = "mms";

/// Matching strategy for one run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every query term must appear as a whole token in the document.
    Exact,
    /// Token-set similarity between query and document text.
    Fuzzy,
    /// Token-set similarity per field of a structured record.
    Fields,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Fuzzy => "fuzzy",
            MatchMode::Fields => "fields",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass/fail cutoff for similarity scores, in `[0, 100]`.
///
/// A score passes when it is strictly greater than the cutoff. There is no
/// default value: callers pick the cutoff explicitly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u16", into = "u8")]
pub struct Threshold(u8);

impl Threshold {
    pub const MAX: u8 = 100;

    pub fn new(cutoff: u16) -> Result<Self, MatchError> {
        if cutoff > u16::from(Self::MAX) {
            return Err(MatchError::InvalidThreshold(cutoff));
        }
        Ok(Self(cutoff as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn passes(self, score: u8) -> bool {
        score > self.0
    }
}

impl TryFrom<u16> for Threshold {
    type Error = MatchError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Threshold::new(value)
    }
}

impl From<Threshold> for u8 {
    fn from(value: Threshold) -> Self {
        value.0
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an exact-mode query with no terms left after stop-word filtering
/// matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyQueryPolicy {
    /// The query produces no results.
    #[default]
    MatchNone,
    /// The query matches every document (vacuous containment).
    MatchAll,
}

/// Configuration for a matching run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    pub mode: MatchMode,
    /// Required for [`MatchMode::Fuzzy`] and [`MatchMode::Fields`].
    #[serde(default)]
    pub threshold: Option<Threshold>,
    #[serde(default)]
    pub empty_query: EmptyQueryPolicy,
    /// Field holding a structured record's identifier; its first value is used.
    #[serde(default = "MatchConfig::default_identifier_field")]
    pub identifier_field: String,
}

impl MatchConfig {
    pub(crate) fn default_identifier_field() -> String {
        DEFAULT_IDENTIFIER_FIELD.to_string()
    }

    /// Exact containment with the default (match nothing) empty-query policy.
    pub fn exact() -> Self {
        Self {
            mode: MatchMode::Exact,
            threshold: None,
            empty_query: EmptyQueryPolicy::default(),
            identifier_field: Self::default_identifier_field(),
        }
    }

    pub fn fuzzy(threshold: Threshold) -> Self {
        Self {
            mode: MatchMode::Fuzzy,
            threshold: Some(threshold),
            ..Self::exact()
        }
    }

    pub fn fields(threshold: Threshold) -> Self {
        Self {
            mode: MatchMode::Fields,
            threshold: Some(threshold),
            ..Self::exact()
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if matches!(self.mode, MatchMode::Fuzzy | MatchMode::Fields) && self.threshold.is_none() {
            return Err(MatchError::InvalidConfig(format!(
                "{} mode requires a threshold",
                self.mode
            )));
        }
        if self.mode == MatchMode::Fields && self.identifier_field.trim().is_empty() {
            return Err(MatchError::InvalidConfig(
                "identifier_field must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn required_threshold(&self) -> Result<Threshold, MatchError> {
        self.threshold.ok_or_else(|| {
            MatchError::InvalidConfig(format!("{} mode requires a threshold", self.mode))
        })
    }
}

/// A search query as read from the query list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    /// Opaque label; not required to be unique.
    pub id: String,
    pub text: String,
    /// Search scope tab, used by retrieval-driven matching.
    #[serde(default)]
    pub tab: Option<String>,
    /// Target view / collection, used by retrieval-driven matching.
    #[serde(default)]
    pub view: Option<String>,
}

impl Query {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            tab: None,
            view: None,
        }
    }

    pub fn with_scope(mut self, tab: impl Into<String>, view: impl Into<String>) -> Self {
        self.tab = Some(tab.into());
        self.view = Some(view.into());
        self
    }
}

/// A document that is a single text blob (e.g. a table-of-contents note).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlatDocument {
    pub id: String,
    pub text: String,
}

impl FlatDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A record made of named fields, each holding an ordered list of values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredDocument {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl StructuredDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper; appends to an existing field.
    pub fn with_field<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// First value of `field`, if present and non-blank.
    pub fn identifier(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|values| values.first())
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }
}

/// What a document provider returned for one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Retrieval {
    /// Total hit count reported by the remote service (may exceed `documents.len()`).
    pub total: u64,
    pub documents: Vec<StructuredDocument>,
}

/// External list of document identifiers that are "of interest".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierSet {
    ids: HashSet<String>,
}

impl IdentifierSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// A field value that scored above the threshold during attribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldHit {
    pub field: String,
    pub value: String,
    pub score: u8,
}

/// Fields of one structured document that matched a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldAttribution {
    pub fields: BTreeSet<String>,
    /// Every passing `(field, value)` pair with its score, for threshold tuning.
    pub hits: Vec<FieldHit>,
}

/// Why a (query, document) pair matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Evidence {
    /// All query terms were found in the document.
    Exact,
    /// Token-set similarity score.
    Score(u8),
    /// Fields whose values scored above the threshold.
    Fields(BTreeSet<String>),
}

impl Evidence {
    /// Trailing columns for tabular output.
    pub fn columns(&self) -> Vec<String> {
        match self {
            Evidence::Exact => Vec::new(),
            Evidence::Score(score) => vec![score.to_string()],
            Evidence::Fields(fields) => fields.iter().cloned().collect(),
        }
    }
}

/// One qualifying (query, document) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    pub query_id: String,
    pub query_text: String,
    pub document_id: String,
    pub evidence: Evidence,
}

impl MatchResult {
    /// `(query_id, query_text, document_id, evidence...)`
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.query_id.clone(),
            self.query_text.clone(),
            self.document_id.clone(),
        ];
        row.extend(self.evidence.columns());
        row
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    #[error("threshold {0} is outside 0..=100")]
    InvalidThreshold(u16),
}

/// Failures reported by a document provider. The driver logs these and moves
/// on to the next query.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}
