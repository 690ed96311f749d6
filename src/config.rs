//! YAML configuration file support for qmatch.
//!
//! A single optional YAML file tunes the normalizer, the matching cutoff, the
//! stop-word list, the Primo retrieval collaborator and logging. Every section
//! has defaults, so an empty `version: "1.0"` document is a valid config.
//! Command-line flags override values read from the file.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! normalize:
//!   lowercase: true
//!   strip_punctuation: true
//!   normalize_unicode: false
//!
//! matching:
//!   threshold: 50
//!   empty_query: match_none
//!   identifier_field: mms
//!
//! stop_words:
//!   path: stop_words.txt
//!
//! primo:
//!   base_url: "https://api-na.hosted.exlibrisgroup.com/"
//!   institution: "01UTXSANT_INST"
//!   limit: 50
//!   timeout_secs: 45
//!   api_key_env: PRIMO_API_KEY
//!
//! log:
//!   level: info
//!   json: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use canonical::{CanonicalError, NormalizeConfig, StopWordSet};
use matcher::{EmptyQueryPolicy, MatchConfig, MatchMode, Threshold, DEFAULT_IDENTIFIER_FIELD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Top-level YAML configuration for a qmatch run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QmatchConfig {
    /// Configuration format version
    pub version: String,

    /// Text normalizer settings, shared by queries and documents
    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub matching: MatchingYamlConfig,

    #[serde(default)]
    pub stop_words: StopWordsYamlConfig,

    #[serde(default)]
    pub primo: PrimoYamlConfig,

    #[serde(default)]
    pub log: LogYamlConfig,
}

impl QmatchConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: QmatchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.matching.validate()?;
        self.primo.validate()?;
        self.log.validate()?;

        Ok(())
    }

    /// Builds the [`MatchConfig`] for `mode`.
    ///
    /// `threshold_override` (the `--threshold` flag) wins over
    /// `matching.threshold`. Fuzzy and field modes refuse to run without a
    /// cutoff from either place.
    pub fn match_config(
        &self,
        mode: MatchMode,
        threshold_override: Option<u16>,
    ) -> Result<MatchConfig, ConfigLoadError> {
        let threshold = threshold_override
            .or(self.matching.threshold)
            .map(|cutoff| {
                Threshold::new(cutoff).map_err(|e| ConfigLoadError::Validation(e.to_string()))
            })
            .transpose()?;

        if mode != MatchMode::Exact && threshold.is_none() {
            return Err(ConfigLoadError::MissingField(format!(
                "matching.threshold (or --threshold) is required in {mode} mode"
            )));
        }

        let config = MatchConfig {
            mode,
            threshold,
            empty_query: self.matching.empty_query,
            identifier_field: self.matching.identifier_field.clone(),
        };
        config
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        Ok(config)
    }

    /// Loads the stop-word list, preferring `path_override` over
    /// `stop_words.path`. No list at all means an empty set.
    pub fn load_stop_words(
        &self,
        path_override: Option<&Path>,
    ) -> Result<Arc<StopWordSet>, CanonicalError> {
        let path = path_override.or(self.stop_words.path.as_deref());
        let set = match path {
            Some(path) => StopWordSet::load(path)?,
            None => StopWordSet::empty(),
        };
        Ok(Arc::new(set))
    }
}

impl Default for QmatchConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            normalize: NormalizeConfig::default(),
            matching: MatchingYamlConfig::default(),
            stop_words: StopWordsYamlConfig::default(),
            primo: PrimoYamlConfig::default(),
            log: LogYamlConfig::default(),
        }
    }
}

/// Matching YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingYamlConfig {
    /// Similarity cutoff in `[0, 100]`; a score must be strictly above it.
    #[serde(default)]
    pub threshold: Option<u16>,

    #[serde(default)]
    pub empty_query: EmptyQueryPolicy,

    #[serde(default = "default_identifier_field")]
    pub identifier_field: String,
}

impl MatchingYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if let Some(threshold) = self.threshold {
            if threshold > u16::from(Threshold::MAX) {
                return Err(ConfigLoadError::Validation(format!(
                    "matching.threshold must be <= {}, got {threshold}",
                    Threshold::MAX
                )));
            }
        }
        if self.identifier_field.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "matching.identifier_field must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchingYamlConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            empty_query: EmptyQueryPolicy::default(),
            identifier_field: default_identifier_field(),
        }
    }
}

/// Stop-word list YAML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopWordsYamlConfig {
    /// Newline-delimited list; absent means no stop words.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Primo search API YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimoYamlConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_institution")]
    pub institution: String,

    /// Records requested per query
    #[serde(default = "default_limit")]
    pub limit: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl PrimoYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "primo.base_url must not be empty".into(),
            ));
        }
        if self.limit == 0 {
            return Err(ConfigLoadError::Validation(
                "primo.limit must be >= 1".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "primo.timeout_secs must be >= 1".into(),
            ));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "primo.api_key_env must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PrimoYamlConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            institution: default_institution(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Logging YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogYamlConfig {
    /// `tracing` filter directive, e.g. `info` or `matcher=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LogYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "log.level must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LogYamlConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_identifier_field() -> String {
    DEFAULT_IDENTIFIER_FIELD.to_string()
}
fn default_base_url() -> String {
    "https://api-na.hosted.exlibrisgroup.com/".to_string()
}
fn default_institution() -> String {
    "01UTXSANT_INST".to_string()
}
fn default_limit() -> u32 {
    50
}
fn default_timeout_secs() -> u64 {
    45
}
fn default_api_key_env() -> String {
    "PRIMO_API_KEY".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
normalize:
  normalize_unicode: true
matching:
  threshold: 60
  empty_query: match_all
"#;

        let config = QmatchConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert!(config.normalize.normalize_unicode);
        assert!(config.normalize.lowercase);
        assert_eq!(config.matching.threshold, Some(60));
        assert_eq!(config.matching.empty_query, EmptyQueryPolicy::MatchAll);
        assert_eq!(config.matching.identifier_field, "mms");
        assert_eq!(config.primo.timeout_secs, 45);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
stop_words:
  path: /tmp/stop_words.txt
log:
  level: debug
  json: true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = QmatchConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.stop_words.path.as_deref(),
            Some(Path::new("/tmp/stop_words.txt"))
        );
        assert!(config.log.json);
    }

    #[test]
    fn test_default_config() {
        let config = QmatchConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.matching.threshold.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_version() {
        let err = QmatchConfig::from_yaml("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let yaml = r#"
version: "1.0"
matching:
  threshold: 101
"#;
        let err = QmatchConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_primo_validation() {
        let yaml = r#"
version: "1.0"
primo:
  limit: 0
"#;
        let err = QmatchConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_match_config_requires_threshold_for_fuzzy() {
        let config = QmatchConfig::default();
        assert!(config.match_config(MatchMode::Exact, None).is_ok());

        let err = config.match_config(MatchMode::Fuzzy, None).unwrap_err();
        assert!(matches!(err, ConfigLoadError::MissingField(_)));

        let fields = config.match_config(MatchMode::Fields, Some(70)).unwrap();
        assert_eq!(fields.threshold.map(Threshold::value), Some(70));
    }

    #[test]
    fn test_threshold_flag_overrides_file() {
        let config = QmatchConfig::from_yaml("version: \"1.0\"\nmatching:\n  threshold: 40\n").unwrap();
        let from_file = config.match_config(MatchMode::Fuzzy, None).unwrap();
        assert_eq!(from_file.threshold.map(Threshold::value), Some(40));
        let overridden = config.match_config(MatchMode::Fuzzy, Some(80)).unwrap();
        assert_eq!(overridden.threshold.map(Threshold::value), Some(80));

        let err = config.match_config(MatchMode::Fuzzy, Some(300)).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn test_load_stop_words() {
        let mut list = NamedTempFile::new().unwrap();
        list.write_all(b"the\nof\n").unwrap();

        let config = QmatchConfig::default();
        assert!(config.load_stop_words(None).unwrap().is_empty());
        let set = config.load_stop_words(Some(list.path())).unwrap();
        assert_eq!(set.len(), 2);

        let missing = config.load_stop_words(Some(Path::new("/definitely/not/here.txt")));
        assert!(missing.is_err());
    }
}
