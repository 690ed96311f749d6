use std::borrow::Cow;

use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::NormalizeConfig;
use crate::text::NormalizedText;
use crate::token::Token;

/// Main entry point. Lowercases, turns punctuation into token boundaries and
/// collapses whitespace in a single pass.
///
/// Never fails: empty or all-punctuation input yields an empty
/// [`NormalizedText`].
pub fn normalize(input: &str, cfg: &NormalizeConfig) -> NormalizedText {
    let folded: Cow<str> = if cfg.normalize_unicode {
        Cow::Owned(input.nfkc().collect::<String>())
    } else {
        Cow::Borrowed(input)
    };

    let mut builder = TextBuilder::with_capacity(folded.len());
    for grapheme in folded.graphemes(true) {
        // Lowercasing can expand one character into several (e.g. 'İ').
        if cfg.lowercase {
            for ch in grapheme.to_lowercase().chars() {
                builder.push(ch, cfg);
            }
        } else {
            for ch in grapheme.chars() {
                builder.push(ch, cfg);
            }
        }
    }
    builder.finish()
}

/// Normalizes `input` and returns only the term strings.
pub fn normalize_terms(input: &str, cfg: &NormalizeConfig) -> Vec<String> {
    normalize(input, cfg).into_terms()
}

/// Whether `ch` separates tokens under `cfg`.
pub fn is_boundary(ch: char, cfg: &NormalizeConfig) -> bool {
    ch.is_whitespace()
        || (cfg.strip_punctuation && (ch.is_ascii_punctuation() || ch.is_punctuation()))
}

/// Incremental writer for the normalized text and its token spans.
struct TextBuilder {
    text: String,
    tokens: Vec<Token>,
    token_start: Option<usize>,
    pending_space: bool,
}

impl TextBuilder {
    fn with_capacity(len: usize) -> Self {
        Self {
            text: String::with_capacity(len),
            tokens: Vec::with_capacity(len / 5 + 1),
            token_start: None,
            pending_space: false,
        }
    }

    fn push(&mut self, ch: char, cfg: &NormalizeConfig) {
        if is_boundary(ch, cfg) {
            self.close_token();
            self.pending_space = !self.text.is_empty();
            return;
        }

        if self.token_start.is_none() {
            if self.pending_space {
                self.text.push(' ');
                self.pending_space = false;
            }
            self.token_start = Some(self.text.len());
        }
        self.text.push(ch);
    }

    fn close_token(&mut self) {
        if let Some(start) = self.token_start.take() {
            let end = self.text.len();
            self.tokens.push(Token {
                text: self.text[start..end].to_string(),
                start,
                end,
            });
        }
    }

    fn finish(mut self) -> NormalizedText {
        self.close_token();
        NormalizedText {
            text: self.text,
            tokens: self.tokens,
        }
    }
}
