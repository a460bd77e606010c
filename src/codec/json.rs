//! JSON codec using `serde_json`.
//!
//! Output is compact (`to_vec`), with no trailing newline, so encoded values
//! can be spliced into larger JSON documents as-is.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ProcwireError, Result};

/// JSON codec for structured data.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ProcwireError::Encoding`] if the value cannot be serialized.
    #[inline]
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(ProcwireError::Encoding)
    }

    /// Decode JSON bytes to a value.
    ///
    /// # Errors
    ///
    /// Returns [`ProcwireError::BadParams`] if the bytes cannot be deserialized to type T.
    #[inline]
    pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| ProcwireError::BadParams(e.to_string()))
    }
}
