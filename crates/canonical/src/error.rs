use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing normalization inputs.
///
/// Normalizing text itself never fails; only loading the stop-word list can.
#[derive(Debug, Error)]
pub enum CanonicalError {
    #[error("failed to read stop-word list {path}: {source}")]
    StopWords {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
