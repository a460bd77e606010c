//! Codec module - JSON encoding/decoding for params and results.
//!
//! - [`JsonCodec`] - JSON using `serde_json`
//!
//! # Design
//!
//! Codecs are implemented as marker structs with static methods rather than trait objects.
//! Encode failures and decode failures map to different [`ProcwireError`](crate::ProcwireError)
//! variants, because a value we cannot encode is our fault while bytes we
//! cannot decode are the caller's.
//!
//! # Example
//!
//! ```
//! use procwire_rpc::codec::JsonCodec;
//!
//! let encoded = JsonCodec::encode(&"hello").unwrap();
//! assert_eq!(encoded, br#""hello""#);
//! let decoded: String = JsonCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod json;

pub use json::JsonCodec;
