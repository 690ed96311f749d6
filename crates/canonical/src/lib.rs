//! qmatch text normalization layer.
//!
//! Turns raw query and document text into the token sequences every matching
//! mode compares, and provides the stop-word set used to drop function words
//! from queries.
//!
//! ## What we do
//!
//! - Lowercasing (locale-free Unicode rules)
//! - Punctuation becomes a token boundary, so `"deep-sea"` is two tokens
//! - Whitespace collapses to single spaces; tokens carry byte offsets
//! - Optional NFKC folding before everything else
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock, no locale. [`normalize`] never fails: input it cannot
//! make sense of ends up as an empty token sequence. Loading a
//! [`StopWordSet`] from disk is the only fallible operation in this crate.
//!
//! ## Invariants worth knowing
//!
//! - Tokens are never empty
//! - Normalization is idempotent: normalizing `out.text` again yields the
//!   same tokens
//! - Stop-word filtering never re-normalizes its input

mod config;
mod error;
mod pipeline;
mod stopwords;
mod text;
mod token;

pub use crate::config::NormalizeConfig;
pub use crate::error::CanonicalError;
pub use crate::pipeline::{is_boundary, normalize, normalize_terms};
pub use crate::stopwords::StopWordSet;
pub use crate::text::NormalizedText;
pub use crate::token::{tokenize, Token};
