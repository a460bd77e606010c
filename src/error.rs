//! Error types for procwire-rpc.

use http::StatusCode;
use thiserror::Error;

/// Main error type for all procwire-rpc operations.
#[derive(Debug, Error)]
pub enum ProcwireError {
    /// A typed value could not be serialized to JSON.
    #[error("encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Incoming parameters could not be decoded into the handler's argument type.
    #[error("bad params: {0}")]
    BadParams(String),

    /// No handler registered under the given name.
    #[error("handler not found: {0}")]
    HandlerNotFound(String),

    /// Handler signature rejected at registration.
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// The handler reported a failure through its error slot.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// The handler produced outputs that do not match its declared signature.
    #[error("handler returned {found} outputs, signature declares {expected}")]
    OutputMismatch {
        /// Number of outputs in the registered signature.
        expected: usize,
        /// Number of outputs actually produced.
        found: usize,
    },

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}

impl ProcwireError {
    /// HTTP status this failure maps to.
    ///
    /// Problems with what the caller sent are `400 Bad Request`, everything
    /// else is `500 Internal Server Error`.
    pub fn status(&self) -> StatusCode {
        match self {
            ProcwireError::BadParams(_) | ProcwireError::HandlerNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            ProcwireError::Encoding(_)
            | ProcwireError::Registration(_)
            | ProcwireError::Handler(_)
            | ProcwireError::OutputMismatch { .. }
            | ProcwireError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-line summary suitable for the `X-RPC-Error` header.
    pub fn summary(&self) -> String {
        // Header values reject control bytes other than tab.
        self.to_string()
            .chars()
            .map(|c| if c.is_control() && c != '\t' { ' ' } else { c })
            .collect()
    }
}

/// Malformed handler signature, detected once when the handler is registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// More than two declared outputs.
    #[error("too many return values: {signature}")]
    TooManyReturnValues {
        /// Rendered signature of the rejected handler.
        signature: String,
    },

    /// Two outputs, but the second one is not the error type.
    #[error("expected error as second return value, found {found}")]
    SecondOutputNotError {
        /// Type name found in the second position.
        found: &'static str,
    },
}

/// Failure reported by a handler.
///
/// Handlers that can fail return this in their error slot. An empty slot
/// (`None`) means success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Create a handler error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type alias using ProcwireError.
pub type Result<T> = std::result::Result<T, ProcwireError>;
