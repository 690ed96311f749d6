//! Configuration for the text normalizer.
//!
//! [`NormalizeConfig`] controls the three transforms applied by
//! [`normalize`](crate::normalize). The defaults are what every matching mode
//! uses: lowercase, punctuation replaced by spaces, no Unicode compatibility
//! folding.
//!
//! ```rust
//! use canonical::NormalizeConfig;
//!
//! let config = NormalizeConfig::default();
//! assert!(config.lowercase);
//! assert!(config.strip_punctuation);
//! assert!(!config.normalize_unicode);
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for the text normalizer.
///
/// Cheap to clone and serde-friendly so it can be embedded in the YAML run
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Apply Unicode lowercasing (locale-free).
    pub lowercase: bool,

    /// Replace every punctuation character with a token boundary.
    ///
    /// Punctuation is ASCII punctuation plus the Unicode `P*` categories, so
    /// `"state-of-the-art"` becomes four tokens rather than one merged word.
    pub strip_punctuation: bool,

    /// Apply Unicode NFKC before the other transforms.
    ///
    /// Off by default: the query and document corpora are matched as they are
    /// written, and NFKC can turn a single compatibility character into
    /// several tokens.
    pub normalize_unicode: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_punctuation: true,
            normalize_unicode: false,
        }
    }
}

impl NormalizeConfig {
    /// Configuration that only splits on whitespace.
    pub fn whitespace_only() -> Self {
        Self {
            lowercase: false,
            strip_punctuation: false,
            normalize_unicode: false,
        }
    }
}
