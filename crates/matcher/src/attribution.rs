//! Field-level provenance for structured records.

use canonical::NormalizeConfig;
use tracing::debug;

use crate::fuzzy::score_term_sets;
use crate::terms::TermSet;
use crate::types::{FieldAttribution, FieldHit, StructuredDocument, Threshold};

/// Scores `query_text` against every value of every field and reports the
/// fields with at least one value strictly above `threshold`.
pub fn attribute(
    document: &StructuredDocument,
    query_text: &str,
    threshold: Threshold,
) -> FieldAttribution {
    let cfg = NormalizeConfig::default();
    attribute_terms(document, &TermSet::from_text(query_text, &cfg), threshold, &cfg)
}

/// Same as [`attribute`] for an already-prepared query term set.
///
/// A query without terms attributes nothing, and blank field values are
/// skipped, so two empty strings never count as a match.
pub fn attribute_terms(
    document: &StructuredDocument,
    query: &TermSet,
    threshold: Threshold,
    cfg: &NormalizeConfig,
) -> FieldAttribution {
    let mut attribution = FieldAttribution::default();
    if query.is_empty() {
        return attribution;
    }

    for (field, values) in &document.fields {
        for value in values {
            let terms = TermSet::from_text(value, cfg);
            if terms.is_empty() {
                continue;
            }
            let score = score_term_sets(query, &terms);
            if !threshold.passes(score) {
                continue;
            }
            debug!(field = %field, score, threshold = threshold.value(), "field_hit");
            attribution.fields.insert(field.clone());
            attribution.hits.push(FieldHit {
                field: field.clone(),
                value: value.clone(),
                score,
            });
        }
    }

    attribution
}
