use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vidmetrics_parser::TextEncoding;

use crate::error::{PipelineError, Result};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "vidmetrics.toml";

/// Top-level configuration for both pipeline stages.
///
/// Every key is optional; a missing file or section falls back to defaults
/// that reproduce the standard one-year-of-uploads run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub collector: CollectorConfig,
    pub features: FeatureConfig,
    pub table: TableConfig,
}

/// Settings for scanning metadata documents into the intermediate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Directory holding one metadata document per video.
    pub input_dir: PathBuf,
    /// File name suffix identifying metadata documents.
    pub file_suffix: String,
    /// Oldest upload date kept (inclusive).
    pub cutoff_date: NaiveDate,
    /// Where the intermediate table is written.
    pub output_path: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            file_suffix: ".info.json".to_string(),
            cutoff_date: default_cutoff(),
            output_path: PathBuf::from("videos.csv"),
        }
    }
}

/// Settings for cleaning the intermediate table and deriving features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Oldest upload date kept (inclusive).
    pub cutoff_date: NaiveDate,
    /// Candidate encodings for the input table, tried in order.
    pub encodings: Vec<String>,
    /// Accepted `upload_date` formats, tried in order.
    pub date_formats: Vec<String>,
    /// Bucket boundaries in minutes; bucket `i` is `[edges[i], edges[i + 1])`.
    pub duration_bucket_edges: Vec<f64>,
    pub duration_bucket_labels: Vec<String>,
    /// One label per equal-frequency duration bin, lowest first.
    pub quartile_labels: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("videos.csv"),
            output_path: PathBuf::from("videos_features.csv"),
            cutoff_date: default_cutoff(),
            encodings: to_strings(&["utf-8", "utf-8-sig", "gbk", "latin1"]),
            date_formats: to_strings(&["%Y-%m-%d", "%Y/%m/%d"]),
            duration_bucket_edges: vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0],
            duration_bucket_labels: to_strings(&["0-5", "5-10", "10-15", "15-20", "20-25", "25-30"]),
            quartile_labels: to_strings(&["Q1", "Q2", "Q3", "Q4"]),
        }
    }
}

impl FeatureConfig {
    pub fn candidate_encodings(&self) -> Result<Vec<TextEncoding>> {
        self.encodings
            .iter()
            .map(|label| TextEncoding::from_label(label).map_err(PipelineError::from))
            .collect()
    }
}

/// Layout shared by the intermediate and output tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub delimiter: char,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl TableConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter {
            '"' | '\n' | '\r' => Err(PipelineError::Config(format!(
                "delimiter {:?} cannot separate fields",
                self.delimiter
            ))),
            ch if ch.is_ascii() => Ok(ch as u8),
            ch => Err(PipelineError::Config(format!(
                "delimiter {ch:?} must be a single ASCII character"
            ))),
        }
    }
}

impl PipelineConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load `path` when given, otherwise `vidmetrics.toml` if it exists,
    /// otherwise the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            Self::load(fallback)
        } else {
            debug!("no configuration file found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.collector.file_suffix.is_empty() {
            return Err(PipelineError::Config(
                "collector.file_suffix must not be empty".to_string(),
            ));
        }

        let features = &self.features;
        if features.encodings.is_empty() {
            return Err(PipelineError::Config(
                "features.encodings must list at least one encoding".to_string(),
            ));
        }
        features.candidate_encodings()?;

        if features.date_formats.is_empty() {
            return Err(PipelineError::Config(
                "features.date_formats must list at least one format".to_string(),
            ));
        }

        let edges = &features.duration_bucket_edges;
        if edges.len() < 2 {
            return Err(PipelineError::Config(
                "features.duration_bucket_edges needs at least two edges".to_string(),
            ));
        }
        if edges.iter().any(|edge| !edge.is_finite())
            || edges.windows(2).any(|pair| pair[0] >= pair[1])
        {
            return Err(PipelineError::Config(
                "features.duration_bucket_edges must be finite and strictly increasing"
                    .to_string(),
            ));
        }
        if features.duration_bucket_labels.len() != edges.len() - 1 {
            return Err(PipelineError::Config(format!(
                "features.duration_bucket_labels has {} labels, expected {}",
                features.duration_bucket_labels.len(),
                edges.len() - 1
            )));
        }

        if features.quartile_labels.len() < 2 {
            return Err(PipelineError::Config(
                "features.quartile_labels needs at least two labels".to_string(),
            ));
        }

        self.table.delimiter_byte()?;
        Ok(())
    }
}

fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
