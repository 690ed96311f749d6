//! Output type of the normalizer.

use serde::{Deserialize, Serialize};

use crate::token::Token;

/// Normalized text plus the tokens it is made of.
///
/// `text` is exactly the tokens joined by single ASCII spaces, so feeding it
/// back through [`normalize`](crate::normalize) with the same configuration
/// reproduces the same tokens.
///
/// ```rust
/// use canonical::{normalize, NormalizeConfig};
///
/// let out = normalize("Whale-song: a STUDY", &NormalizeConfig::default());
/// assert_eq!(out.text, "whale song a study");
/// assert_eq!(out.terms().collect::<Vec<_>>(), ["whale", "song", "a", "study"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub tokens: Vec<Token>,
}

impl NormalizedText {
    /// Iterates over the token strings in order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.tokens.iter().map(Token::as_str)
    }

    pub fn into_terms(self) -> Vec<String> {
        self.tokens.into_iter().map(|t| t.text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}
