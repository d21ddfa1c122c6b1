use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};
use vidmetrics_parser::{parse_metadata_document, parse_upload_date, CollectedRow};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::outputs::{collected_table_bytes, write_output};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub files_found: usize,
    pub retained: usize,
    pub missing_upload_date: usize,
    pub invalid_documents: usize,
    pub before_cutoff: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub rows: Vec<CollectedRow>,
    pub summary: CollectionSummary,
}

/// Lists regular files in `dir` whose name ends with `suffix`, sorted by path.
pub fn discover_documents(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(suffix)
    );

    let mut paths = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "could not read directory entry"),
        }
    }
    paths.sort();
    Ok(paths)
}

/// Parses each document and keeps those uploaded on or after `cutoff`.
/// Unreadable or malformed documents are logged and skipped.
pub fn collect_rows(paths: &[PathBuf], cutoff: NaiveDate) -> Collection {
    let mut collection = Collection {
        rows: Vec::new(),
        summary: CollectionSummary {
            files_found: paths.len(),
            ..CollectionSummary::default()
        },
    };

    for path in paths {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable document");
                collection.summary.invalid_documents += 1;
                continue;
            }
        };

        let record = match parse_metadata_document(&content) {
            Ok(record) => record,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping malformed document");
                collection.summary.invalid_documents += 1;
                continue;
            }
        };

        let Some(raw_date) = record.upload_date() else {
            debug!(path = %path.display(), "document has no upload_date");
            collection.summary.missing_upload_date += 1;
            continue;
        };

        let upload_date = match parse_upload_date(raw_date) {
            Ok(date) => date,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping document");
                collection.summary.invalid_documents += 1;
                continue;
            }
        };

        if upload_date < cutoff {
            collection.summary.before_cutoff += 1;
            continue;
        }

        collection.rows.push(record.to_collected_row(upload_date));
    }

    collection.summary.retained = collection.rows.len();
    collection
}

/// Scans `dir` and collects its documents. Fails when nothing matches.
pub fn collect_documents(dir: &Path, suffix: &str, cutoff: NaiveDate) -> Result<Collection> {
    let paths = discover_documents(dir, suffix)?;
    info!(dir = %dir.display(), files = paths.len(), "metadata documents found");

    if paths.is_empty() {
        return Err(PipelineError::NoInput {
            dir: dir.to_path_buf(),
            suffix: suffix.to_string(),
        });
    }

    info!(%cutoff, "keeping documents with upload_date >= cutoff");
    let collection = collect_rows(&paths, cutoff);
    info!(
        retained = collection.summary.retained,
        before_cutoff = collection.summary.before_cutoff,
        missing_upload_date = collection.summary.missing_upload_date,
        invalid = collection.summary.invalid_documents,
        "collection finished"
    );
    Ok(collection)
}

/// Runs the collector stage and writes the intermediate table.
pub fn run_collector(config: &PipelineConfig) -> Result<CollectionSummary> {
    let settings = &config.collector;
    let collection = collect_documents(
        &settings.input_dir,
        &settings.file_suffix,
        settings.cutoff_date,
    )?;

    let bytes = collected_table_bytes(&collection.rows, config.table.delimiter_byte()?)?;
    write_output(&settings.output_path, &bytes)?;
    info!(path = %settings.output_path.display(), rows = collection.rows.len(), "intermediate table written");

    Ok(collection.summary)
}
