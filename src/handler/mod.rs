//! Handler module - registration and dispatch.
//!
//! Provides:
//! - [`HandlerRegistry`] - maps handler names to handlers and their classified signatures
//! - [`Handler`] - the object-safe handler interface
//! - [`TypedHandler`] - adapts a plain closure into a [`Handler`]
//!
//! # Example
//!
//! ```
//! use procwire_rpc::handler::{HandlerRegistry, NoArgs};
//! use procwire_rpc::signature::Value;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("version", |_: NoArgs| Value("1.0")).unwrap();
//! registry.register("shout", |(s,): (String,)| Value(s.to_uppercase())).unwrap();
//!
//! assert!(registry.contains("shout"));
//! ```

mod registry;

pub use registry::{decode_args, Handler, HandlerRegistry, NoArgs, TypedHandler};
