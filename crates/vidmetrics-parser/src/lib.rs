pub mod document;
pub mod encoding;
pub mod errors;
pub mod model;
pub mod schema;
pub mod table;

pub use document::{parse_metadata_document, parse_upload_date};
pub use encoding::{decode_with_fallbacks, DecodedText, TextEncoding};
pub use errors::{DecodeAttempt, ParserError};
pub use model::{CollectedRow, RawMetadataRecord};
pub use table::{read_table, RawTable};

#[cfg(test)]
mod tests;
