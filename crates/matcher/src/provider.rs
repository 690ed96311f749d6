//! Document-provider capability used by field-attribution matching.
//!
//! The driver never talks to a transport directly. It asks a
//! [`DocumentProvider`] for the structured records a query retrieves and
//! scores whatever comes back, so the same engine runs against a live search
//! API, recorded responses, or fixtures.

use std::collections::HashMap;

use crate::types::{ProviderError, Query, Retrieval};

/// Source of structured documents for a query.
pub trait DocumentProvider {
    /// Retrieves the documents for `query`.
    ///
    /// `Ok(None)` means the query cannot be routed (for example an unknown
    /// scope tab) and is skipped without a warning. Errors are logged by the
    /// driver and the query is skipped as well.
    fn retrieve(&self, query: &Query) -> Result<Option<Retrieval>, ProviderError>;
}

impl<P: DocumentProvider + ?Sized> DocumentProvider for &P {
    fn retrieve(&self, query: &Query) -> Result<Option<Retrieval>, ProviderError> {
        (**self).retrieve(query)
    }
}

/// In-memory provider keyed by query id.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    responses: HashMap<String, Result<Retrieval, ProviderError>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query_id: impl Into<String>, retrieval: Retrieval) {
        self.responses.insert(query_id.into(), Ok(retrieval));
    }

    /// Makes `retrieve` fail for `query_id`.
    pub fn insert_failure(&mut self, query_id: impl Into<String>, error: ProviderError) {
        self.responses.insert(query_id.into(), Err(error));
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl DocumentProvider for StaticProvider {
    fn retrieve(&self, query: &Query) -> Result<Option<Retrieval>, ProviderError> {
        match self.responses.get(&query.id) {
            Some(Ok(retrieval)) => Ok(Some(retrieval.clone())),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StructuredDocument;

    #[test]
    fn unknown_query_is_not_routable() {
        let provider = StaticProvider::new();
        assert_eq!(provider.retrieve(&Query::new("q", "text")), Ok(None));
    }

    #[test]
    fn returns_recorded_retrieval_and_failures() {
        let mut provider = StaticProvider::new();
        provider.insert(
            "q1",
            Retrieval {
                total: 3,
                documents: vec![StructuredDocument::new().with_field("mms", ["1"])],
            },
        );
        provider.insert_failure("q2", ProviderError::Timeout);

        let got = provider
            .retrieve(&Query::new("q1", "x"))
            .expect("ok")
            .expect("routable");
        assert_eq!(got.total, 3);
        assert_eq!(got.documents.len(), 1);
        assert_eq!(
            provider.retrieve(&Query::new("q2", "x")),
            Err(ProviderError::Timeout)
        );
    }
}
