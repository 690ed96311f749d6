//! Stop-word set shared read-only by every comparison in a run.

use std::fs;
use std::path::Path;

use fxhash::FxHashSet;

use crate::error::CanonicalError;

/// Immutable set of stop words.
///
/// Built once per run and handed to the matcher explicitly; there is no
/// process-wide list. Entries are compared by exact string equality, so the
/// list is expected to hold already-normalized tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWordSet {
    words: FxHashSet<String>,
}

impl StopWordSet {
    /// A set that filters nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from newline-delimited text. Lines are trimmed and blank
    /// lines ignored.
    pub fn from_lines(text: &str) -> Self {
        text.lines().collect()
    }

    /// Reads a newline-delimited stop-word file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CanonicalError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| CanonicalError::StopWords {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_lines(&raw))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Drops every term that is a stop word, keeping the order of the rest.
    pub fn filter_terms<S: AsRef<str>>(&self, terms: Vec<S>) -> Vec<S> {
        if self.is_empty() {
            return terms;
        }
        terms
            .into_iter()
            .filter(|term| !self.contains(term.as_ref()))
            .collect()
    }

    /// Removes stop words from raw, unnormalized text.
    ///
    /// The text is split on whitespace only and the surviving words are
    /// re-joined with single spaces; case and punctuation are left alone.
    pub fn strip_words(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for word in raw.split_whitespace().filter(|w| !self.contains(w)) {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
        out
    }
}

impl<'a> FromIterator<&'a str> for StopWordSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_lines_trims_and_skips_blanks() {
        let set = StopWordSet::from_lines("the\r\nand\n\n  of  \n");
        assert_eq!(set.len(), 3);
        assert!(set.contains("the"));
        assert!(set.contains("of"));
        assert!(!set.contains(""));
    }

    #[test]
    fn filter_terms_preserves_order() {
        let set: StopWordSet = ["the", "of"].into_iter().collect();
        let terms = vec!["history", "of", "the", "world", "the"];
        assert_eq!(set.filter_terms(terms), vec!["history", "world"]);
    }

    #[test]
    fn empty_set_is_noop() {
        let set = StopWordSet::empty();
        let terms = vec!["a".to_string(), "the".to_string()];
        assert_eq!(set.filter_terms(terms.clone()), terms);
        assert_eq!(set.strip_words("  the   cat "), "the cat");
    }

    #[test]
    fn strip_words_is_case_sensitive_on_raw_text() {
        let set = StopWordSet::from_lines("the\nof");
        assert_eq!(set.strip_words("The history of the world"), "The history world");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "a\nan\nthe").expect("write");
        let set = StopWordSet::load(file.path()).expect("load");
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = StopWordSet::load("/definitely/not/here/stop_words.txt")
            .expect_err("missing file");
        let CanonicalError::StopWords { path, .. } = &err;
        assert!(path.ends_with("stop_words.txt"));
        assert!(err.to_string().contains("stop-word list"));
    }
}
