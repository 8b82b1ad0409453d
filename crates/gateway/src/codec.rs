//! Content codec
//!
//! Payloads travel as opaque bytes on the envelope; this is the only place
//! that knows they are JSON.

use serde::{Serialize, de::DeserializeOwned};

use crate::error::CodecError;

/// Encode a payload into envelope content
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode envelope content into the expected payload shape
pub fn decode<T: DeserializeOwned>(content: &[u8]) -> Result<T, CodecError> {
    serde_json::from_slice(content).map_err(|e| CodecError::Decode(e.to_string()))
}
