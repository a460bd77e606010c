//! Handler registry for dispatching calls by handler name.
//!
//! Registration is where a handler's return signature is classified. A
//! handler whose signature is malformed is rejected here, before any call
//! can reach it. The returned [`RegistrationError`] lets the caller decide
//! whether to abort startup or just skip that handler.
//!
//! # Example
//!
//! ```
//! use procwire_rpc::handler::HandlerRegistry;
//! use procwire_rpc::{HandlerError, Param};
//!
//! let mut registry = HandlerRegistry::new();
//! registry
//!     .register("div", |(a, b): (i64, i64)| {
//!         if b == 0 {
//!             Err(HandlerError::new("division by zero"))
//!         } else {
//!             Ok(a / b)
//!         }
//!     })
//!     .unwrap();
//!
//! let params = [Param::from_wire(b"7"), Param::from_wire(b"2")];
//! let result = registry.call("div", &params).unwrap().unwrap();
//! assert_eq!(&result.encode().unwrap()[..], b"3");
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::codec::JsonCodec;
use crate::error::{ProcwireError, RegistrationError, Result};
use crate::param::Param;
use crate::response::{
    set_content_type, set_rpc_handler, set_rpc_id, write_failure, ResponseSink,
};
use crate::signature::{classify, Classification, Output, ReturnShape, Signature};

/// Trait for handler functions.
pub trait Handler: Send + Sync + 'static {
    /// Declared outputs, inspected once at registration.
    fn signature(&self) -> Signature;

    /// Handle a call with deferred params.
    ///
    /// Returns outputs in the order declared by [`Handler::signature`].
    fn call(&self, params: &[Param]) -> Result<Vec<Output>>;
}

/// Argument type for handlers that take no params.
///
/// Accepts an empty params list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NoArgs {}

/// Wrapper that decodes params before calling the handler.
///
/// Params are decoded as one JSON array into `A`, so a handler taking two
/// arguments uses a tuple `(T, U)`, one argument `(T,)`, and a variable
/// number `Vec<T>`.
pub struct TypedHandler<F, A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: ReturnShape,
{
    handler: F,
    _phantom: PhantomData<fn(A) -> R>,
}

impl<F, A, R> TypedHandler<F, A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: ReturnShape,
{
    /// Create a new typed handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, A, R> Handler for TypedHandler<F, A, R>
where
    F: Fn(A) -> R + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: ReturnShape,
{
    fn signature(&self) -> Signature {
        R::signature()
    }

    fn call(&self, params: &[Param]) -> Result<Vec<Output>> {
        let args: A = decode_args(params)?;
        Ok((self.handler)(args).into_outputs())
    }
}

/// Decode incoming params into a handler's argument type.
///
/// The params are treated as a JSON array. Each param must hold exactly one
/// JSON value received from the wire.
///
/// # Errors
///
/// Returns [`ProcwireError::BadParams`] when a param is malformed, was built
/// for sending rather than received, or the array does not fit `A`.
pub fn decode_args<A: DeserializeOwned>(params: &[Param]) -> Result<A> {
    let len: usize = params.iter().filter_map(Param::raw).map(|raw| raw.len() + 1).sum();
    let mut array = Vec::with_capacity(len + 2);
    array.push(b'[');

    for (i, param) in params.iter().enumerate() {
        let raw = param.raw().ok_or_else(|| {
            ProcwireError::BadParams(format!("param {i} is an outgoing value, not wire input"))
        })?;

        // Reject "1,2" and similar so one param cannot pose as several.
        serde_json::from_slice::<&RawValue>(raw)
            .map_err(|e| ProcwireError::BadParams(format!("param {i}: {e}")))?;

        if i > 0 {
            array.push(b',');
        }
        array.extend_from_slice(raw);
    }

    array.push(b']');
    JsonCodec::decode(&array)
}

/// Entry for a registered handler.
struct HandlerEntry {
    /// The handler function.
    handler: Box<dyn Handler>,
    /// Where its result and error live, computed at registration.
    classification: Classification,
}

/// Registry mapping handler names to handlers.
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerEntry>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a closure handler.
    ///
    /// The closure takes its decoded arguments and returns one of the
    /// [`ReturnShape`] types.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if the return signature is malformed.
    pub fn register<F, A, R>(
        &mut self,
        name: &str,
        handler: F,
    ) -> std::result::Result<Classification, RegistrationError>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        A: DeserializeOwned + 'static,
        R: ReturnShape,
    {
        self.register_handler(name, TypedHandler::new(handler))
    }

    /// Register any [`Handler`] implementation.
    ///
    /// Registering a name twice replaces the earlier handler.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] if the return signature is malformed.
    /// Nothing is registered in that case.
    pub fn register_handler<H: Handler>(
        &mut self,
        name: &str,
        handler: H,
    ) -> std::result::Result<Classification, RegistrationError> {
        let signature = handler.signature();
        let classification = match classify(&signature) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(handler = name, %signature, "Rejected handler registration: {}", e);
                return Err(e);
            }
        };

        tracing::debug!(
            handler = name,
            %signature,
            result_slot = ?classification.result_slot(),
            error_slot = ?classification.error_slot(),
            "Registered handler"
        );

        let entry = HandlerEntry {
            handler: Box::new(handler),
            classification,
        };
        if self.handlers.insert(name.to_string(), entry).is_some() {
            tracing::warn!(handler = name, "Replaced previously registered handler");
        }

        Ok(classification)
    }

    /// Whether a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Classification of a registered handler.
    pub fn get_classification(&self, name: &str) -> Option<Classification> {
        self.handlers.get(name).map(|e| e.classification)
    }

    /// Names of all registered handlers, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(|s| s.as_str())
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Call a handler and pick its result using the stored classification.
    ///
    /// Returns `Ok(None)` for handlers without a result slot.
    ///
    /// # Errors
    ///
    /// - [`ProcwireError::HandlerNotFound`] for an unknown name.
    /// - [`ProcwireError::BadParams`] if the params do not decode.
    /// - [`ProcwireError::Handler`] if the handler filled its error slot.
    /// - [`ProcwireError::OutputMismatch`] if the outputs do not match the
    ///   registered signature.
    pub fn call(&self, name: &str, params: &[Param]) -> Result<Option<Param>> {
        let entry = self
            .handlers
            .get(name)
            .ok_or_else(|| ProcwireError::HandlerNotFound(name.to_string()))?;
        let class = entry.classification;

        let outputs = entry.handler.call(params)?;
        if outputs.len() != class.output_count() {
            return Err(ProcwireError::OutputMismatch {
                expected: class.output_count(),
                found: outputs.len(),
            });
        }

        let mut result = None;
        for (slot, output) in outputs.into_iter().enumerate() {
            match output {
                Output::Error(Some(err)) if class.error_slot() == Some(slot) => {
                    tracing::error!(handler = name, "Handler error: {}", err);
                    return Err(err.into());
                }
                Output::Error(None) if class.error_slot() == Some(slot) => {}
                Output::Value(param) if class.result_slot() == Some(slot) => {
                    result = Some(param);
                }
                _ => {
                    return Err(ProcwireError::OutputMismatch {
                        expected: class.output_count(),
                        found: slot + 1,
                    });
                }
            }
        }

        Ok(result)
    }

    /// Serve one call and write its metadata to `sink`.
    ///
    /// Sets `X-RPC-Id`, `X-RPC-Handler` and `Content-Type`. On success the
    /// encoded result (or `null` when the handler has no result slot) is
    /// returned as the body. On failure the status and `X-RPC-Error` are set
    /// from the error, which is also returned.
    pub fn dispatch<S: ResponseSink + ?Sized>(
        &self,
        id: &str,
        name: &str,
        params: &[Param],
        sink: &mut S,
    ) -> Result<Bytes> {
        set_rpc_id(sink, id);
        set_rpc_handler(sink, name);
        set_content_type(sink);

        tracing::debug!(id, handler = name, params = params.len(), "Dispatching call");

        let body = self.call(name, params).and_then(|result| match result {
            Some(param) => param.encode(),
            None => Ok(Bytes::from_static(b"null")),
        });

        if let Err(e) = &body {
            tracing::debug!(id, handler = name, status = %e.status(), "Call failed: {}", e);
            write_failure(sink, e);
        }

        body
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
