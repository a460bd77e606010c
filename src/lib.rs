//! # procwire-rpc
//!
//! Dispatch-support core for JSON-RPC handlers.
//!
//! A framework built on this crate registers handler functions with
//! arbitrary signatures and invokes them generically.
//!
//! ## Components
//!
//! - **[`Param`]**: a deferred parameter value. Holds raw wire bytes until
//!   the handler's argument type is known, or a typed value until it is
//!   encoded.
//! - **[`signature`]**: classifies a handler's declared outputs into result
//!   and error slots, once, at registration.
//! - **[`Backoff`]**: exponential backoff with jitter for client retries.
//! - **[`response`]**: `X-RPC-*` headers and status codes, applied only to
//!   sinks that support them.
//!
//! ## Example
//!
//! ```
//! use procwire_rpc::handler::HandlerRegistry;
//! use procwire_rpc::{HandlerError, Param};
//!
//! let mut registry = HandlerRegistry::new();
//! registry
//!     .register("greet", |(name,): (String,)| {
//!         if name.is_empty() {
//!             Err(HandlerError::new("empty name"))
//!         } else {
//!             Ok(format!("hello, {name}"))
//!         }
//!     })
//!     .unwrap();
//!
//! let mut response = http::Response::new(());
//! let body = registry
//!     .dispatch("req-1", "greet", &[Param::from_wire(br#""ada""#)], &mut response)
//!     .unwrap();
//! assert_eq!(&body[..], br#""hello, ada""#);
//! assert_eq!(response.headers()["x-rpc-handler"], "greet");
//! ```

pub mod backoff;
pub mod codec;
pub mod error;
pub mod handler;
pub mod param;
pub mod response;
pub mod signature;

pub use backoff::Backoff;
pub use error::{HandlerError, ProcwireError, RegistrationError, Result};
pub use handler::HandlerRegistry;
pub use param::Param;
pub use signature::{classify, Classification, Fault, Signature};
