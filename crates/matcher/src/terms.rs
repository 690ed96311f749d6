use std::collections::BTreeSet;

use canonical::{normalize, NormalizeConfig, NormalizedText};

/// Distinct normalized terms of one text, kept in lexicographic order.
///
/// This is the unit both exact containment and token-set scoring work on:
/// membership for the former, sorted set algebra for the latter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet {
    terms: BTreeSet<String>,
}

impl TermSet {
    pub fn from_text(text: &str, cfg: &NormalizeConfig) -> Self {
        Self::from(normalize(text, cfg))
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn insert(&mut self, term: impl Into<String>) -> bool {
        self.terms.insert(term.into())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(String::as_str)
    }

    pub(crate) fn as_set(&self) -> &BTreeSet<String> {
        &self.terms
    }
}

impl From<NormalizedText> for TermSet {
    fn from(text: NormalizedText) -> Self {
        text.into_terms().into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TermSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().map(Into::into).collect(),
        }
    }
}
