use chrono::NaiveDate;

use crate::errors::ParserError;
use crate::model::RawMetadataRecord;

pub const UPLOAD_DATE_FORMAT: &str = "%Y%m%d";

pub fn parse_metadata_document(content: &str) -> Result<RawMetadataRecord, ParserError> {
    Ok(serde_json::from_str(content)?)
}

/// Parses the compact `YYYYMMDD` form. Anything other than exactly eight ASCII
/// digits naming a real calendar day is rejected.
pub fn parse_upload_date(value: &str) -> Result<NaiveDate, ParserError> {
    let invalid = || ParserError::InvalidUploadDate {
        value: value.to_string(),
    };

    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, UPLOAD_DATE_FORMAT).map_err(|_| invalid())
}
