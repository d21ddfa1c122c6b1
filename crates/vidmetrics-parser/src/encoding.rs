use std::borrow::Cow;

use encoding_rs::{Encoding, GBK};

use crate::errors::{DecodeAttempt, ParserError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodingKind {
    Utf8,
    Utf8Sig,
    /// Two-byte GBK only; the GB18030 extensions `encoding_rs` accepts are rejected.
    Gbk,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Whatwg(&'static Encoding),
}

/// A candidate text encoding for the intermediate table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEncoding {
    label: String,
    kind: EncodingKind,
}

impl TextEncoding {
    /// Resolves a configured label. `utf-8`, `utf-8-sig`, `gbk` and `latin1`
    /// are handled directly; anything else must be a WHATWG label. `latin1`
    /// decodes every byte, so it only makes sense last.
    pub fn from_label(label: &str) -> Result<Self, ParserError> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        let kind = match normalized.as_str() {
            "utf-8" | "utf8" => EncodingKind::Utf8,
            "utf-8-sig" | "utf8-sig" => EncodingKind::Utf8Sig,
            "gbk" | "cp936" | "gb2312" => EncodingKind::Gbk,
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" | "l1" => EncodingKind::Latin1,
            other => Encoding::for_label(other.as_bytes())
                .map(EncodingKind::Whatwg)
                .ok_or_else(|| ParserError::UnknownEncoding(label.to_string()))?,
        };

        Ok(Self {
            label: label.trim().to_string(),
            kind,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Strict decode: malformed input is an error, never replaced.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Cow<'a, str>, String> {
        match self.kind {
            EncodingKind::Utf8 => std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|err| err.to_string()),
            EncodingKind::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body)
                    .map(Cow::Borrowed)
                    .map_err(|err| err.to_string())
            }
            EncodingKind::Gbk => {
                check_gbk_sequences(bytes)?;
                GBK.decode_without_bom_handling_and_without_replacement(bytes)
                    .ok_or_else(|| "malformed gbk byte sequence".to_string())
            }
            EncodingKind::Latin1 => Ok(Cow::Owned(
                bytes.iter().map(|&byte| char::from(byte)).collect(),
            )),
            EncodingKind::Whatwg(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .ok_or_else(|| format!("malformed {} byte sequence", encoding.name())),
        }
    }
}

/// Rejects bytes outside the two-byte GBK layout: a lead byte in
/// `0x81..=0xFE` followed by a trail byte in `0x40..=0x7E` or `0x80..=0xFE`.
/// This excludes the single `0x80` byte and four-byte GB18030 sequences.
fn check_gbk_sequences(bytes: &[u8]) -> Result<(), String> {
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            0x00..=0x7F => idx += 1,
            0x81..=0xFE => match bytes.get(idx + 1) {
                Some(0x40..=0x7E | 0x80..=0xFE) => idx += 2,
                Some(trail) => {
                    return Err(format!(
                        "invalid gbk trail byte 0x{trail:02X} at offset {}",
                        idx + 1
                    ))
                }
                None => return Err(format!("truncated gbk sequence at offset {idx}")),
            },
            lead => return Err(format!("invalid gbk byte 0x{lead:02X} at offset {idx}")),
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DecodedText<'a> {
    pub encoding: String,
    pub text: Cow<'a, str>,
}

/// Tries each candidate in order and returns the first clean decode.
pub fn decode_with_fallbacks<'a>(
    bytes: &'a [u8],
    candidates: &[TextEncoding],
) -> Result<DecodedText<'a>, ParserError> {
    let mut attempts = Vec::new();

    for candidate in candidates {
        match candidate.decode(bytes) {
            Ok(text) => {
                return Ok(DecodedText {
                    encoding: candidate.label().to_string(),
                    text,
                })
            }
            Err(message) => attempts.push(DecodeAttempt::new(candidate.label(), message)),
        }
    }

    Err(ParserError::Undecodable { attempts })
}
