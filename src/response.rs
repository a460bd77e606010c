//! RPC response metadata: headers and status codes.
//!
//! Responses are written to a [`ResponseSink`]. Some sinks are plain byte
//! outputs, others are HTTP responses that also accept headers and a status.
//! The helpers here downgrade the sink with [`ResponseSink::header_sink`] and
//! act only when that succeeds. On any other sink they are a no-op.
//!
//! Each helper sets exactly one header (or the status), replacing any earlier
//! value, so calling them repeatedly or in any order gives the same result.
//!
//! # Example
//!
//! ```
//! use procwire_rpc::response::{set_content_type, set_rpc_id, X_RPC_ID};
//!
//! let mut response = http::Response::new(());
//! set_rpc_id(&mut response, "req-1");
//! set_content_type(&mut response);
//! assert_eq!(response.headers()[X_RPC_ID], "req-1");
//!
//! // A plain byte buffer has no headers; nothing happens.
//! let mut body: Vec<u8> = Vec::new();
//! set_rpc_id(&mut body, "req-1");
//! assert!(body.is_empty());
//! ```

use http::header::CONTENT_TYPE;
use http::{HeaderName, HeaderValue, Response, StatusCode};

use crate::error::ProcwireError;

/// Request identifier header.
pub const X_RPC_ID: HeaderName = HeaderName::from_static("x-rpc-id");

/// Handler name header.
pub const X_RPC_HANDLER: HeaderName = HeaderName::from_static("x-rpc-handler");

/// Error summary header.
pub const X_RPC_ERROR: HeaderName = HeaderName::from_static("x-rpc-error");

/// Content type of every RPC response body.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Header and status mutation.
pub trait HeaderSink {
    /// Set `name` to `value`, replacing any previous value.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Set the response status.
    fn set_status(&mut self, status: StatusCode);
}

/// Output a response is written to.
pub trait ResponseSink {
    /// Header access, if this sink supports it.
    fn header_sink(&mut self) -> Option<&mut dyn HeaderSink> {
        None
    }
}

impl<B> HeaderSink for Response<B> {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }
}

impl<B> ResponseSink for Response<B> {
    fn header_sink(&mut self) -> Option<&mut dyn HeaderSink> {
        Some(self)
    }
}

impl ResponseSink for Vec<u8> {}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn header_sink(&mut self) -> Option<&mut dyn HeaderSink> {
        (**self).header_sink()
    }
}

fn set_text_header<S: ResponseSink + ?Sized>(sink: &mut S, name: HeaderName, value: &str) {
    let Some(headers) = sink.header_sink() else {
        return;
    };

    match HeaderValue::from_str(value) {
        Ok(value) => headers.set_header(name, value),
        Err(_) => {
            tracing::warn!(header = %name, value, "Skipping header value not valid in HTTP");
        }
    }
}

fn set_status<S: ResponseSink + ?Sized>(sink: &mut S, status: StatusCode) {
    if let Some(headers) = sink.header_sink() {
        headers.set_status(status);
    }
}

/// Set `X-RPC-Id`.
pub fn set_rpc_id<S: ResponseSink + ?Sized>(sink: &mut S, id: &str) {
    set_text_header(sink, X_RPC_ID, id);
}

/// Set `X-RPC-Handler`.
pub fn set_rpc_handler<S: ResponseSink + ?Sized>(sink: &mut S, handler: &str) {
    set_text_header(sink, X_RPC_HANDLER, handler);
}

/// Set `X-RPC-Error`.
pub fn set_rpc_error<S: ResponseSink + ?Sized>(sink: &mut S, summary: &str) {
    set_text_header(sink, X_RPC_ERROR, summary);
}

/// Set `Content-Type` to JSON.
pub fn set_content_type<S: ResponseSink + ?Sized>(sink: &mut S) {
    if let Some(headers) = sink.header_sink() {
        headers.set_header(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    }
}

/// Set status `400 Bad Request`.
pub fn set_bad_request<S: ResponseSink + ?Sized>(sink: &mut S) {
    set_status(sink, StatusCode::BAD_REQUEST);
}

/// Set status `500 Internal Server Error`.
pub fn set_internal_server_error<S: ResponseSink + ?Sized>(sink: &mut S) {
    set_status(sink, StatusCode::INTERNAL_SERVER_ERROR);
}

/// Record a failed call: its status plus an `X-RPC-Error` summary.
pub fn write_failure<S: ResponseSink + ?Sized>(sink: &mut S, err: &ProcwireError) {
    if err.status() == StatusCode::BAD_REQUEST {
        set_bad_request(sink);
    } else {
        set_internal_server_error(sink);
    }
    set_rpc_error(sink, &err.summary());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;

    /// Sink that only exposes headers once switched on.
    struct Switchable {
        enabled: bool,
        inner: Response<()>,
    }

    impl ResponseSink for Switchable {
        fn header_sink(&mut self) -> Option<&mut dyn HeaderSink> {
            if self.enabled {
                Some(&mut self.inner)
            } else {
                None
            }
        }
    }

    #[test]
    fn test_plain_sink_is_noop() {
        let mut body: Vec<u8> = b"payload".to_vec();
        set_rpc_id(&mut body, "1");
        set_rpc_handler(&mut body, "echo");
        set_rpc_error(&mut body, "boom");
        set_content_type(&mut body);
        set_bad_request(&mut body);
        set_internal_server_error(&mut body);
        write_failure(&mut body, &ProcwireError::BadParams("x".into()));

        assert_eq!(body, b"payload");
    }

    #[test]
    fn test_each_setter_touches_only_its_header() {
        let mut response = Response::new(());
        response
            .headers_mut()
            .insert("x-other", HeaderValue::from_static("keep"));

        set_rpc_id(&mut response, "abc-123");
        assert_eq!(response.headers()[X_RPC_ID], "abc-123");
        assert_eq!(response.headers()["x-other"], "keep");
        assert_eq!(response.headers().len(), 2);

        set_rpc_handler(&mut response, "math.add");
        set_rpc_error(&mut response, "bad input");
        set_content_type(&mut response);

        let headers = response.headers();
        assert_eq!(headers[X_RPC_HANDLER], "math.add");
        assert_eq!(headers[X_RPC_ERROR], "bad input");
        assert_eq!(headers[CONTENT_TYPE], CONTENT_TYPE_JSON);
        assert_eq!(headers.len(), 5);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_setters_are_idempotent_and_replace() {
        let mut response = Response::new(());
        set_rpc_id(&mut response, "first");
        set_rpc_id(&mut response, "second");
        set_rpc_id(&mut response, "second");

        assert_eq!(response.headers().get_all(X_RPC_ID).iter().count(), 1);
        assert_eq!(response.headers()[X_RPC_ID], "second");
    }

    #[test]
    fn test_order_independent() {
        let mut a = Response::new(());
        set_rpc_id(&mut a, "1");
        set_rpc_handler(&mut a, "h");
        set_bad_request(&mut a);

        let mut b = Response::new(());
        set_bad_request(&mut b);
        set_rpc_handler(&mut b, "h");
        set_rpc_id(&mut b, "1");

        assert_eq!(a.headers(), b.headers());
        assert_eq!(a.status(), b.status());
    }

    #[test]
    fn test_status_setters() {
        let mut response = Response::new(());
        set_bad_request(&mut response);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        set_internal_server_error(&mut response);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_invalid_header_value_is_skipped() {
        let mut response = Response::new(());
        set_rpc_error(&mut response, "line\nbreak");
        assert!(response.headers().get(X_RPC_ERROR).is_none());
    }

    #[test]
    fn test_capability_checked_per_call() {
        let mut sink = Switchable {
            enabled: false,
            inner: Response::new(()),
        };
        set_rpc_id(&mut sink, "1");
        assert!(sink.inner.headers().is_empty());

        sink.enabled = true;
        set_rpc_id(&mut sink, "2");
        assert_eq!(sink.inner.headers()[X_RPC_ID], "2");
    }

    #[test]
    fn test_works_through_dyn_sink() {
        let mut response = Response::new(());
        {
            let sink: &mut dyn ResponseSink = &mut response;
            set_rpc_handler(sink, "dyn");
        }
        assert_eq!(response.headers()[X_RPC_HANDLER], "dyn");
    }

    #[test]
    fn test_write_failure_maps_status() {
        let mut response = Response::new(());
        write_failure(&mut response, &ProcwireError::HandlerNotFound("nope".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[X_RPC_ERROR], "handler not found: nope");

        let mut response = Response::new(());
        let err = ProcwireError::Handler(HandlerError::new("disk\nfull"));
        write_failure(&mut response, &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[X_RPC_ERROR], "handler error: disk full");

        let mut response = Response::new(());
        let err = ProcwireError::Handler(HandlerError::new("tab\tok, bell\x07bad"));
        write_failure(&mut response, &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[X_RPC_ERROR],
            "handler error: tab\tok, bell bad"
        );
    }
}
