//! Primo search API retrieval for field-attribution runs.
//!
//! Queries are routed by their search tab: each known tab maps to a search
//! scope, and a query on any other tab is not sent at all. Responses are
//! reduced to the `pnx.display` section of each record, which becomes a
//! [`StructuredDocument`].
//!
//! Two providers share the same decoding:
//!
//! - [`ResponseFileProvider`] replays recorded responses from a JSON file.
//! - `PrimoProvider` (feature `primo`) calls the live API, once per query,
//!   with the configured timeout.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use matcher::{DocumentProvider, ProviderError, Query, Retrieval, StructuredDocument};
use serde::Deserialize;
use serde_json::Value;

use crate::config::PrimoYamlConfig;
use crate::io::IoError;

/// Search endpoint, relative to the configured base URL.
pub const SEARCH_PATH: &str = "primo/v1/search";

/// Resource types excluded from every search.
pub const MULTI_FACETS: &str =
    "facet_rtype,exclude,newspaper_articles|,|facet_rtype,exclude,reviews";

/// Search scope for a tab, or `None` when the tab is not searchable.
pub fn scope_for_tab(tab: &str) -> Option<&'static str> {
    match tab {
        "Everything" => Some("MyInst_and_CI"),
        "LibraryCatalog" => Some("MyInstitution"),
        "SpecCol" => Some("SpecCol"),
        "CourseReserves" => Some("CourseReserves"),
        _ => None,
    }
}

/// The `q` parameter: a keyword search over any field, with a space forced
/// after every comma.
pub fn search_expression(text: &str) -> String {
    format!("any,contains,{}", text.replace(',', ", "))
}

/// Query-string parameters for one search, or `None` when the query has no
/// routable tab or no view.
pub fn search_params(
    query: &Query,
    config: &PrimoYamlConfig,
    api_key: &str,
) -> Option<Vec<(&'static str, String)>> {
    let tab = query.tab.as_deref()?;
    let scope = scope_for_tab(tab)?;
    let vid = query.view.as_deref()?;

    Some(vec![
        ("vid", vid.to_string()),
        ("tab", tab.to_string()),
        ("scope", scope.to_string()),
        ("q", search_expression(&query.text)),
        ("multiFacets", MULTI_FACETS.to_string()),
        ("pcAvailability", "false".to_string()),
        ("lang", "eng".to_string()),
        ("offset", "0".to_string()),
        ("limit", config.limit.to_string()),
        ("sort", "rank".to_string()),
        ("getMore", "0".to_string()),
        ("conVoc", "true".to_string()),
        ("inst", config.institution.clone()),
        ("skipDelivery", "true".to_string()),
        ("disableSplitFacets", "false".to_string()),
        ("apikey", api_key.to_string()),
    ])
}

/// The parts of a search response that matching reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub info: SearchInfo,
    #[serde(default)]
    pub docs: Vec<PnxRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchInfo {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PnxRecord {
    #[serde(default)]
    pub pnx: Pnx,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pnx {
    #[serde(default)]
    pub display: BTreeMap<String, Value>,
}

impl SearchResponse {
    pub fn into_retrieval(self) -> Retrieval {
        Retrieval {
            total: self.info.total,
            documents: self
                .docs
                .into_iter()
                .map(|record| display_document(record.pnx.display))
                .collect(),
        }
    }
}

/// Converts a `pnx.display` map into a structured document.
///
/// Only string values survive; numbers, objects and nulls are dropped, and a
/// field left without values is omitted.
pub fn display_document(display: BTreeMap<String, Value>) -> StructuredDocument {
    let mut document = StructuredDocument::new();
    for (field, value) in display {
        let values: Vec<String> = match value {
            Value::String(s) => vec![s],
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        if !values.is_empty() {
            document.fields.insert(field, values);
        }
    }
    document
}

/// Decodes one raw search response.
pub fn decode_response(value: Value) -> Result<Retrieval, ProviderError> {
    serde_json::from_value::<SearchResponse>(value)
        .map(SearchResponse::into_retrieval)
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

/// Recorded search responses, keyed by query id.
///
/// The file is a JSON object mapping each query id to the response the
/// search API returned for it. Queries without a recorded response are not
/// routable.
#[derive(Debug, Clone, Default)]
pub struct ResponseFileProvider {
    responses: HashMap<String, Retrieval>,
}

impl ResponseFileProvider {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref();
        let raw = fs::read(path).map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let recorded: HashMap<String, SearchResponse> =
            serde_json::from_slice(&raw).map_err(|source| IoError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_responses(recorded))
    }

    pub fn from_responses(recorded: HashMap<String, SearchResponse>) -> Self {
        let responses = recorded
            .into_iter()
            .map(|(id, response)| (id, response.into_retrieval()))
            .collect();
        Self { responses }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

impl DocumentProvider for ResponseFileProvider {
    fn retrieve(&self, query: &Query) -> Result<Option<Retrieval>, ProviderError> {
        Ok(self.responses.get(&query.id).cloned())
    }
}

#[cfg(feature = "primo")]
pub use live::PrimoProvider;

#[cfg(feature = "primo")]
mod live {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use tracing::debug;

    use super::{search_params, SearchResponse, SEARCH_PATH};
    use crate::config::PrimoYamlConfig;
    use matcher::{DocumentProvider, ProviderError, Query, Retrieval};

    /// Blocking client for the Primo search API. One attempt per query.
    #[derive(Clone)]
    pub struct PrimoProvider {
        config: PrimoYamlConfig,
        api_key: String,
        http: Client,
    }

    impl std::fmt::Debug for PrimoProvider {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("PrimoProvider")
                .field("base_url", &self.config.base_url)
                .field("institution", &self.config.institution)
                .finish_non_exhaustive()
        }
    }

    impl PrimoProvider {
        pub fn new(config: PrimoYamlConfig, api_key: impl Into<String>) -> Result<Self, ProviderError> {
            let http = Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
            Ok(Self {
                config,
                api_key: api_key.into(),
                http,
            })
        }

        /// Reads the API key from the environment variable named by
        /// `config.api_key_env`.
        pub fn from_env(config: PrimoYamlConfig) -> Result<Self, ProviderError> {
            let api_key = std::env::var(&config.api_key_env)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| {
                    ProviderError::Unavailable(format!("{} is not set", config.api_key_env))
                })?;
            Self::new(config, api_key)
        }

        pub fn search_url(&self) -> String {
            format!("{}/{}", self.config.base_url.trim_end_matches('/'), SEARCH_PATH)
        }
    }

    impl DocumentProvider for PrimoProvider {
        fn retrieve(&self, query: &Query) -> Result<Option<Retrieval>, ProviderError> {
            let Some(params) = search_params(query, &self.config, &self.api_key) else {
                return Ok(None);
            };
            debug!(query_id = %query.id, url = %self.search_url(), "primo_request");

            let response = self
                .http
                .get(self.search_url())
                .query(&params)
                .send()
                .and_then(|response| response.error_for_status())
                .map_err(transport_error)?;
            let body: SearchResponse = response.json().map_err(transport_error)?;
            Ok(Some(body.into_retrieval()))
        }
    }

    fn transport_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn param<'a>(params: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn tabs_map_to_scopes() {
        assert_eq!(scope_for_tab("Everything"), Some("MyInst_and_CI"));
        assert_eq!(scope_for_tab("LibraryCatalog"), Some("MyInstitution"));
        assert_eq!(scope_for_tab("SpecCol"), Some("SpecCol"));
        assert_eq!(scope_for_tab("CourseReserves"), Some("CourseReserves"));
        assert_eq!(scope_for_tab("everything"), None);
        assert_eq!(scope_for_tab(""), None);
    }

    #[test]
    fn search_params_follow_query_scope() {
        let query = Query::new("q1", "whale,migration, patterns")
            .with_scope("LibraryCatalog", "01UTXSANT_INST:SAU");
        let params = search_params(&query, &PrimoYamlConfig::default(), "secret").unwrap();

        assert_eq!(param(&params, "vid"), Some("01UTXSANT_INST:SAU"));
        assert_eq!(param(&params, "tab"), Some("LibraryCatalog"));
        assert_eq!(param(&params, "scope"), Some("MyInstitution"));
        assert_eq!(
            param(&params, "q"),
            Some("any,contains,whale, migration,  patterns")
        );
        assert_eq!(param(&params, "limit"), Some("50"));
        assert_eq!(param(&params, "inst"), Some("01UTXSANT_INST"));
        assert_eq!(param(&params, "apikey"), Some("secret"));
        assert_eq!(param(&params, "multiFacets"), Some(MULTI_FACETS));
    }

    #[test]
    fn unroutable_queries_have_no_params() {
        let config = PrimoYamlConfig::default();
        let no_scope = Query::new("q1", "ocean");
        assert!(search_params(&no_scope, &config, "k").is_none());
        let bad_tab = Query::new("q2", "ocean").with_scope("Articles", "VID");
        assert!(search_params(&bad_tab, &config, "k").is_none());
        let mut no_view = Query::new("q3", "ocean").with_scope("Everything", "VID");
        no_view.view = None;
        assert!(search_params(&no_view, &config, "k").is_none());
    }

    #[test]
    fn display_keeps_only_string_values() {
        let retrieval = decode_response(json!({
            "info": {"total": 1234},
            "docs": [
                {"pnx": {"display": {
                    "mms": ["991000"],
                    "title": ["Ocean currents and climate"],
                    "subject": ["Oceanography", 42, null, "Climatology"],
                    "weird": [{"nested": true}],
                    "single": "plain"
                }}},
                {"pnx": {}},
                {"context": "PC"}
            ]
        }))
        .unwrap();

        assert_eq!(retrieval.total, 1234);
        assert_eq!(retrieval.documents.len(), 3);
        let first = &retrieval.documents[0];
        assert_eq!(first.identifier("mms"), Some("991000"));
        assert_eq!(
            first.fields.get("subject").unwrap(),
            &vec!["Oceanography".to_string(), "Climatology".to_string()]
        );
        assert_eq!(first.fields.get("single").unwrap(), &vec!["plain".to_string()]);
        assert!(!first.fields.contains_key("weird"));
        assert!(retrieval.documents[1].fields.is_empty());
        assert!(retrieval.documents[2].identifier("mms").is_none());
    }

    #[test]
    fn malformed_response_is_a_decode_error() {
        let err = decode_response(json!({"info": {"total": "many"}})).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn response_file_provider_replays_by_query_id() {
        let mut file = NamedTempFile::new().unwrap();
        let recorded = json!({
            "q1": {"info": {"total": 2}, "docs": [{"pnx": {"display": {"mms": ["991"]}}}]}
        });
        file.write_all(recorded.to_string().as_bytes()).unwrap();

        let provider = ResponseFileProvider::load(file.path()).unwrap();
        assert_eq!(provider.len(), 1);
        let got = provider.retrieve(&Query::new("q1", "x")).unwrap().unwrap();
        assert_eq!(got.total, 2);
        assert_eq!(got.documents[0].identifier("mms"), Some("991"));
        assert_eq!(provider.retrieve(&Query::new("q9", "x")).unwrap(), None);
    }

    #[test]
    fn unreadable_response_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();
        assert!(matches!(
            ResponseFileProvider::load(file.path()),
            Err(IoError::Json { .. })
        ));
        assert!(matches!(
            ResponseFileProvider::load("/definitely/not/here.json"),
            Err(IoError::Open { .. })
        ));
    }
}
