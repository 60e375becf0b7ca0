//! Decoding of the compressed payload carried by CloudWatch Logs
//! subscription events.
//!
//! The `awslogs.data` field is gzip-compressed JSON, base64 encoded with the
//! standard alphabet. The gzip header is mandatory; a raw deflate or zlib
//! stream is rejected.

use crate::error::DecodeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;

/// Decodes `awslogs.data` into the JSON value it wraps.
pub fn decode(data: &str) -> Result<Value, DecodeError> {
    let compressed = STANDARD.decode(data.trim())?;

    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(DecodeError::Gzip)?;

    let text = String::from_utf8(decompressed)?;
    Ok(serde_json::from_str(&text)?)
}
