//! Deferred parameter value.
//!
//! A [`Param`] carries one call parameter or return value across the wire
//! boundary in either direction:
//!
//! - **Incoming**: [`Param::from_wire`] keeps the undecoded JSON bytes. They
//!   are only decoded once the dispatcher knows which handler, and so which
//!   argument type, will consume them.
//! - **Outgoing**: [`Param::from_typed`] keeps a type-erased handle to a
//!   serializable value. It is only serialized when [`Param::encode`] is called.
//!
//! # Example
//!
//! ```
//! use procwire_rpc::Param;
//!
//! let incoming = Param::from_wire(br#"{"a": 1}"#);
//! assert_eq!(&incoming.encode().unwrap()[..], br#"{"a": 1}"#);
//!
//! let outgoing = Param::from_typed(vec![1, 2, 3]);
//! assert_eq!(&outgoing.encode().unwrap()[..], b"[1,2,3]");
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::codec::JsonCodec;
use crate::error::Result;

/// One deferred call parameter or return value.
#[derive(Clone)]
pub enum Param {
    /// Undecoded bytes received from the wire.
    Raw(Bytes),
    /// A value to be serialized on the way out.
    Typed(TypedValue),
}

impl Param {
    /// Hold a copy of incoming wire bytes. No parsing happens here.
    pub fn from_wire(bytes: &[u8]) -> Self {
        Param::Raw(Bytes::copy_from_slice(bytes))
    }

    /// Hold a value for outgoing encoding.
    pub fn from_typed<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Param::Typed(TypedValue(Arc::new(value)))
    }

    /// JSON `null`, received from the wire.
    pub(crate) fn null() -> Self {
        Param::Raw(Bytes::from_static(b"null"))
    }

    /// Encode for the wire.
    ///
    /// Raw bytes are returned unchanged. A typed value is serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProcwireError::Encoding`](crate::ProcwireError::Encoding) if
    /// the typed value cannot be serialized.
    pub fn encode(&self) -> Result<Bytes> {
        match self {
            Param::Raw(bytes) => Ok(bytes.clone()),
            Param::Typed(value) => (*value.0).to_json().map(Bytes::from),
        }
    }

    /// The received wire bytes, or `None` for an outgoing value.
    pub fn raw(&self) -> Option<&[u8]> {
        match self {
            Param::Raw(bytes) => Some(&bytes[..]),
            Param::Typed(_) => None,
        }
    }

    /// Whether this value came from the wire.
    #[inline]
    pub fn is_raw(&self) -> bool {
        matches!(self, Param::Raw(_))
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Raw(bytes) => f
                .debug_tuple("Raw")
                .field(&String::from_utf8_lossy(bytes))
                .finish(),
            Param::Typed(value) => f.debug_tuple("Typed").field(value).finish(),
        }
    }
}

/// Type-erased handle to an outgoing value.
#[derive(Clone)]
pub struct TypedValue(Arc<dyn ErasedValue>);

impl TypedValue {
    /// Rust type name of the held value.
    pub fn type_name(&self) -> &'static str {
        (*self.0).type_name()
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

trait ErasedValue: Send + Sync {
    fn to_json(&self) -> Result<Vec<u8>>;
    fn type_name(&self) -> &'static str;
}

impl<T> ErasedValue for T
where
    T: Serialize + Send + Sync,
{
    fn to_json(&self) -> Result<Vec<u8>> {
        JsonCodec::encode(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// Captures the raw JSON text of the value without interpreting it.
impl<'de> Deserialize<'de> for Param {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Param::from_wire(raw.get().as_bytes()))
    }
}

/// Embeds raw bytes verbatim and serializes typed values in place.
impl Serialize for Param {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let bytes = self.encode().map_err(S::Error::custom)?;
        let text = std::str::from_utf8(&bytes).map_err(S::Error::custom)?;
        let raw = RawValue::from_string(text.to_owned()).map_err(S::Error::custom)?;
        raw.serialize(serializer)
    }
}
