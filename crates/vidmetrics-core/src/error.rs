// crates/vidmetrics-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;
use vidmetrics_parser::ParserError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error("Configuration file could not be parsed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid document pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("no metadata documents ending in '{suffix}' found in {}", .dir.display())]
    NoInput { dir: PathBuf, suffix: String },

    #[error("table is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
