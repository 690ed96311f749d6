//! Exact whole-term containment.

use crate::terms::TermSet;

/// True iff every query term is a member of `document_terms`.
///
/// Matching is on whole terms, so `"sea"` does not match a document that only
/// contains `"seashore"`. Repeated query terms need a single occurrence in
/// the document. An empty `query_terms` is vacuously contained; the driver
/// decides what that means through
/// [`EmptyQueryPolicy`](crate::EmptyQueryPolicy).
pub fn contains_all<Q: AsRef<str>>(query_terms: &[Q], document_terms: &TermSet) -> bool {
    query_terms
        .iter()
        .all(|term| document_terms.contains(term.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonical::NormalizeConfig;

    fn doc(text: &str) -> TermSet {
        TermSet::from_text(text, &NormalizeConfig::default())
    }

    #[test]
    fn whale_migration_scenario() {
        let query = ["whale", "migration"];
        assert!(contains_all(&query, &doc("Annual whale migration patterns")));
        assert!(!contains_all(&query, &doc("Whale habitats")));
    }

    #[test]
    fn substrings_do_not_count() {
        assert!(!contains_all(&["sea"], &doc("Seashore ecology")));
        assert!(contains_all(&["sea"], &doc("Deep-sea ecology")));
    }

    #[test]
    fn multiplicity_is_ignored() {
        assert!(contains_all(&["whale", "whale"], &doc("one whale")));
    }

    #[test]
    fn adding_terms_never_removes_a_match() {
        let query = ["ocean", "climate"];
        let mut terms = doc("ocean and climate");
        assert!(contains_all(&query, &terms));
        for extra in ["currents", "ocean", "zzz", "climate"] {
            terms.insert(extra);
            assert!(contains_all(&query, &terms));
        }
    }

    #[test]
    fn empty_query_is_vacuously_contained() {
        let empty: [&str; 0] = [];
        assert!(contains_all(&empty, &doc("anything")));
        assert!(contains_all(&empty, &TermSet::default()));
    }
}
