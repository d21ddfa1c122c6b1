use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeAttempt {
    pub encoding: String,
    pub message: String,
}

impl DecodeAttempt {
    pub fn new(encoding: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DecodeAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.encoding, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("metadata document is not a valid JSON object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("upload_date '{value}' is not an 8-digit calendar date")]
    InvalidUploadDate { value: String },

    #[error("table CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("table did not contain a header row")]
    EmptyTable,

    #[error("no candidate encoding could decode the table; attempts: {attempts:?}")]
    Undecodable { attempts: Vec<DecodeAttempt> },

    #[error("unknown text encoding '{0}'")]
    UnknownEncoding(String),
}
