//! CSV input and output at the edge of a run.
//!
//! Every input file is headerless CSV in UTF-8, optionally starting with a
//! byte-order mark. Bytes are decoded here and nowhere else: invalid UTF-8
//! is replaced rather than rejected, and rows with too few columns are
//! skipped with a `row_skipped` warning.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use matcher::{FlatDocument, IdentifierSet, MatchResult, Query};
use thiserror::Error;
use tracing::{debug, warn};

const BOM: char = '\u{feff}';

/// Errors raised while reading inputs or writing results.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Decodes one raw CSV field: lossy UTF-8 with a leading BOM removed.
pub fn decode_field(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

/// Reads `(id, text[, tab, view])` query rows.
///
/// Blank `tab`/`view` cells are treated as absent.
pub fn read_queries(path: impl AsRef<Path>) -> Result<Vec<Query>, IoError> {
    read_rows(path.as_ref(), 2, |fields| {
        let mut fields = fields.into_iter();
        let id = fields.next().unwrap_or_default();
        let text = fields.next().unwrap_or_default();
        let mut query = Query::new(id, text);
        query.tab = fields.next().filter(|s| !s.trim().is_empty());
        query.view = fields.next().filter(|s| !s.trim().is_empty());
        query
    })
}

/// Reads `(id, text)` document rows. Extra columns are ignored.
pub fn read_documents(path: impl AsRef<Path>) -> Result<Vec<FlatDocument>, IoError> {
    read_rows(path.as_ref(), 2, |fields| {
        let mut fields = fields.into_iter();
        let id = fields.next().unwrap_or_default();
        let text = fields.next().unwrap_or_default();
        FlatDocument::new(id, text)
    })
}

/// Reads the identifiers of interest from the first column of each row.
pub fn read_identifiers(path: impl AsRef<Path>) -> Result<IdentifierSet, IoError> {
    let ids = read_rows(path.as_ref(), 1, |fields| {
        fields.into_iter().next().unwrap_or_default().trim().to_string()
    })?;
    Ok(ids.into_iter().filter(|id| !id.is_empty()).collect())
}

/// Writes one row per result: `(query_id, query_text, document_id, evidence...)`.
pub fn write_results(path: impl AsRef<Path>, results: &[MatchResult]) -> Result<(), IoError> {
    let path = path.as_ref();
    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(write_err)?;
    for result in results {
        writer.write_record(result.to_row()).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|source| write_err(csv::Error::from(source)))?;
    debug!(path = %path.display(), rows = results.len(), "results_written");
    Ok(())
}

fn read_rows<T>(
    path: &Path,
    min_fields: usize,
    mut build: impl FnMut(Vec<String>) -> T,
) -> Result<Vec<T>, IoError> {
    let file = File::open(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    let mut row = 0u64;
    loop {
        let more = reader
            .read_byte_record(&mut record)
            .map_err(|source| IoError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        if !more {
            break;
        }
        row += 1;

        if record.len() < min_fields {
            warn!(
                path = %path.display(),
                row,
                fields = record.len(),
                expected = min_fields,
                "row_skipped"
            );
            continue;
        }
        rows.push(build(record.iter().map(decode_field).collect()));
    }

    debug!(path = %path.display(), rows = rows.len(), "rows_read");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcher::Evidence;
    use std::collections::BTreeSet;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn decode_field_strips_bom_and_replaces_invalid_bytes() {
        assert_eq!(decode_field("\u{feff}q1".as_bytes()), "q1");
        assert_eq!(decode_field(b"caf\xe9"), "caf\u{fffd}");
        assert_eq!(decode_field(b"plain"), "plain");
    }

    #[test]
    fn reads_queries_with_optional_scope() {
        let file = csv_file(
            "\u{feff}q1,\"whale migration, patterns\",Everything,01UTXSANT_INST:SAU\nq2,ocean climate\nq3,history,,\n"
                .as_bytes(),
        );
        let queries = read_queries(file.path()).unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].id, "q1");
        assert_eq!(queries[0].text, "whale migration, patterns");
        assert_eq!(queries[0].tab.as_deref(), Some("Everything"));
        assert_eq!(queries[0].view.as_deref(), Some("01UTXSANT_INST:SAU"));
        assert_eq!(queries[1].tab, None);
        assert_eq!(queries[2].tab, None);
        assert_eq!(queries[2].view, None);
    }

    #[test]
    fn short_rows_are_skipped() {
        let file = csv_file(b"b1,Whale songs\nlonely\n\nb2,Ocean currents,extra\n");
        let docs = read_documents(file.path()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert_eq!(docs[1].text, "Ocean currents");
    }

    #[test]
    fn identifiers_come_from_first_column() {
        let file = csv_file(b"991, ignored\n 992 \n\n");
        let ids = read_identifiers(file.path()).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("991"));
        assert!(ids.contains("992"));
    }

    #[test]
    fn missing_input_is_an_open_error() {
        let err = read_documents("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, IoError::Open { .. }));
    }

    #[test]
    fn writes_evidence_columns() {
        let out = NamedTempFile::new().unwrap();
        let fields: BTreeSet<String> = ["subject", "title"].iter().map(|s| s.to_string()).collect();
        let results = vec![
            MatchResult {
                query_id: "q1".into(),
                query_text: "whale, migration".into(),
                document_id: "b1".into(),
                evidence: Evidence::Exact,
            },
            MatchResult {
                query_id: "q2".into(),
                query_text: "ocean climate".into(),
                document_id: "991".into(),
                evidence: Evidence::Fields(fields),
            },
            MatchResult {
                query_id: "q3".into(),
                query_text: "ocean".into(),
                document_id: "d1".into(),
                evidence: Evidence::Score(87),
            },
        ];
        write_results(out.path(), &results).unwrap();

        let written = std::fs::read_to_string(out.path()).unwrap();
        assert_eq!(
            written,
            "q1,\"whale, migration\",b1\nq2,ocean climate,991,subject,title\nq3,ocean,d1,87\n"
        );
    }
}
