//! Token-set similarity scoring.
//!
//! The score compares the sorted intersection of two term sets against the
//! intersection extended with each side's leftover terms, and keeps the best
//! of the three edit-distance ratios. Word order and repeated words therefore
//! do not matter, and a short query fully contained in a long text scores 100.
//!
//! ```rust
//! use matcher::fuzzy::token_set_ratio;
//!
//! assert_eq!(token_set_ratio("algebra geometry", "geometry algebra"), 100);
//! assert_eq!(token_set_ratio("ocean climate", "Ocean currents and climate"), 100);
//! assert!(token_set_ratio("ocean climate", "Oceanography") < 50);
//! ```

use canonical::NormalizeConfig;
use strsim::levenshtein;

use crate::terms::TermSet;

/// Edit-distance similarity in `[0, 100]`.
///
/// `100 * (1 - distance / max_len)` rounded to the nearest integer, with
/// lengths counted in Unicode scalar values. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> u8 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let distance = levenshtein(a, b);
    let similarity = 1.0 - distance as f64 / max_len as f64;
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Token-set ratio of two raw strings under the default normalizer.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    token_set_ratio_with(a, b, &NormalizeConfig::default())
}

/// Token-set ratio of two raw strings under `cfg`.
pub fn token_set_ratio_with(a: &str, b: &str, cfg: &NormalizeConfig) -> u8 {
    score_term_sets(&TermSet::from_text(a, cfg), &TermSet::from_text(b, cfg))
}

/// Token-set ratio of two prepared term sets.
///
/// Two empty sets score 100; one empty set against a non-empty one scores 0.
/// Callers that must not treat two blank strings as a match check for
/// emptiness first.
pub fn score_term_sets(left: &TermSet, right: &TermSet) -> u8 {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => return 100,
        (true, false) | (false, true) => return 0,
        (false, false) => {}
    }

    let (left, right) = (left.as_set(), right.as_set());
    let sect = join(left.intersection(right));
    let with_left = extend(&sect, &join(left.difference(right)));
    let with_right = extend(&sect, &join(right.difference(left)));

    [
        ratio(&sect, &with_left),
        ratio(&sect, &with_right),
        ratio(&with_left, &with_right),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

fn join<'a>(terms: impl Iterator<Item = &'a String>) -> String {
    let mut out = String::new();
    for term in terms {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(term);
    }
    out
}

fn extend(sect: &str, rest: &str) -> String {
    match (sect.is_empty(), rest.is_empty()) {
        (_, true) => sect.to_string(),
        (true, false) => rest.to_string(),
        (false, false) => format!("{sect} {rest}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_basics() {
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("abc", ""), 0);
        assert_eq!(ratio("kitten", "sitting"), 57);
        assert_eq!(ratio("same", "same"), 100);
    }

    #[test]
    fn ratio_counts_characters_not_bytes() {
        // one substitution over four characters
        assert_eq!(ratio("café", "cafe"), 75);
    }

    #[test]
    fn contained_query_scores_full() {
        assert_eq!(
            token_set_ratio("marine biology research", "research into marine biology methods"),
            100
        );
        assert_eq!(token_set_ratio("deep sea", "Deep-sea creatures"), 100);
    }

    #[test]
    fn partial_overlap_scores() {
        assert_eq!(token_set_ratio("new york mets", "new york yankees"), 69);
        assert_eq!(token_set_ratio("climate change", "Climate Policy"), 57);
        assert_eq!(token_set_ratio("whale migration", "Whale habitats"), 47);
    }

    #[test]
    fn disjoint_sets_score_low() {
        assert_eq!(token_set_ratio("ocean climate", "Oceanography"), 8);
        assert_eq!(token_set_ratio("history of science", "Annual report"), 6);
    }

    #[test]
    fn order_and_repetition_do_not_matter() {
        assert_eq!(token_set_ratio("algebra geometry", "geometry algebra"), 100);
        assert_eq!(
            token_set_ratio("fuzzy wuzzy was a bear", "wuzzy fuzzy was a bear bear"),
            100
        );
    }

    #[test]
    fn symmetric_and_bounded() {
        let samples = [
            "",
            "ocean",
            "Ocean currents and climate",
            "new york mets",
            "new york yankees",
            "the history of the world",
            "Ωmega — αlpha",
        ];
        for a in samples {
            for b in samples {
                let ab = token_set_ratio(a, b);
                assert_eq!(ab, token_set_ratio(b, a), "{a:?} vs {b:?}");
                assert!(ab <= 100);
            }
            if !a.is_empty() {
                assert_eq!(token_set_ratio(a, a), 100);
            }
        }
    }

    #[test]
    fn empty_inputs_follow_convention() {
        assert_eq!(token_set_ratio("", ""), 100);
        assert_eq!(token_set_ratio("  ...  ", ""), 100);
        assert_eq!(token_set_ratio("", "anything"), 0);
        assert_eq!(token_set_ratio("anything", "!!"), 0);
    }
}
