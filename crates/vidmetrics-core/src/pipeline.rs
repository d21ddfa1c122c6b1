use std::path::PathBuf;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{info, warn};
use vidmetrics_parser::{decode_with_fallbacks, read_table};

use crate::cleaning::{clean_table, CleaningReport};
use crate::collector::{run_collector, CollectionSummary};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::derive_features;
use crate::outputs::{feature_table_bytes, write_output};

#[derive(Debug, Clone, Serialize)]
pub struct FeatureSummary {
    pub encoding: String,
    pub cleaning: CleaningReport,
    pub output_rows: usize,
    pub output_columns: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub collection: CollectionSummary,
    pub features: FeatureSummary,
}

/// Decodes, validates, cleans and enriches an intermediate table held in
/// memory. Returns the feature frame, the encoding that decoded the input and
/// the cleaning report.
pub fn build_feature_table(
    bytes: &[u8],
    config: &PipelineConfig,
) -> Result<(DataFrame, String, CleaningReport)> {
    let settings = &config.features;

    let decoded = decode_with_fallbacks(bytes, &settings.candidate_encodings()?)?;
    info!(encoding = %decoded.encoding, "input table decoded");

    let table = read_table(&decoded.text, config.table.delimiter_byte()?)?;
    info!(rows = table.height(), columns = ?table.headers, "input table loaded");

    let (cleaned, report) = clean_table(&table, settings.cutoff_date, &settings.date_formats)?;
    let features = derive_features(&cleaned, settings)?;

    Ok((features, decoded.encoding, report))
}

/// Runs the feature builder stage: reads the intermediate table, writes the
/// feature table. Nothing is written when any step fails.
pub fn run_feature_builder(config: &PipelineConfig) -> Result<FeatureSummary> {
    let settings = &config.features;
    let bytes = std::fs::read(&settings.input_path)?;

    let (features, encoding, cleaning) = build_feature_table(&bytes, config)?;
    let output = feature_table_bytes(&features, config.table.delimiter_byte()?)?;
    write_output(&settings.output_path, &output)?;

    info!(
        path = %settings.output_path.display(),
        rows = features.height(),
        columns = features.width(),
        "feature table written"
    );

    Ok(FeatureSummary {
        encoding,
        cleaning,
        output_rows: features.height(),
        output_columns: features.width(),
        output_path: settings.output_path.clone(),
    })
}

/// Runs both stages back to back. The feature builder reads whatever the
/// collector just wrote.
pub fn run_all(config: &PipelineConfig) -> Result<RunSummary> {
    let collection = run_collector(config)?;

    let mut chained = config.clone();
    if chained.features.input_path != chained.collector.output_path {
        warn!(
            configured = %chained.features.input_path.display(),
            collected = %chained.collector.output_path.display(),
            "feature input overridden by collector output"
        );
        chained.features.input_path = chained.collector.output_path.clone();
    }

    let features = run_feature_builder(&chained)?;
    Ok(RunSummary {
        collection,
        features,
    })
}
