use serde::{Deserialize, Serialize};

/// A normalized term with its UTF-8 byte span in the normalized text.
///
/// Tokens produced by [`normalize`](crate::normalize) are never empty and,
/// under the default configuration, contain no punctuation or uppercase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Token {
    pub text: String,
    /// Byte offset (inclusive).
    pub start: usize,
    /// Byte offset (exclusive).
    pub end: usize,
}

impl Token {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        self.text.as_str()
    }
}

/// Splits already-normalized text on Unicode whitespace, keeping byte spans.
///
/// No case folding or punctuation handling happens here; use
/// [`normalize`](crate::normalize) for raw input.
pub fn tokenize(text: &str) -> Vec<Token> {
    let base = text.as_ptr() as usize;
    text.split_whitespace()
        .map(|word| {
            let start = word.as_ptr() as usize - base;
            Token {
                text: word.to_string(),
                start,
                end: start + word.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_point_back_into_source() {
        let text = "  whale\tmigration \u{00A0}routes ";
        let tokens = tokenize(text);
        let words: Vec<&str> = tokens.iter().map(Token::as_str).collect();
        assert_eq!(words, vec!["whale", "migration", "routes"]);
        for token in &tokens {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn blank_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t ").is_empty());
    }
}
