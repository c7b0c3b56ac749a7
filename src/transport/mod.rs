//! Transport - the HTTP-shaped boundary adapters talk through.
//!
//! A transport performs exactly one request per call and hands back the status
//! code with an already-decoded JSON body. It is assumed to either complete or
//! fail atomically; nothing above it retries.
//!
//! ## Example
//!
//! ```ignore
//! use restmodel::{Method, StubTransport, Transport};
//! use serde_json::json;
//!
//! let transport = StubTransport::new();
//! transport.on(Method::Get, "categories", 200, json!({ "categories": [] }));
//!
//! let response = transport.request(Method::Get, "categories", None)?;
//! assert_eq!(response.status, 200);
//! ```

#[cfg(feature = "http")]
mod http;
mod in_memory;

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// HTTP verbs the adapters issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed exchange: status code plus decoded body.
///
/// An empty response body decodes to `Value::Null`, as does an error
/// response whose body is not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Failure below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("connection failed: {0}")]
    Connection(String),
    /// A response arrived but its body was not JSON.
    #[error("response body could not be decoded: {0}")]
    Decode(String),
    /// The transport could not be set up (bad base URL, TLS init, ...).
    #[error("transport misconfigured: {0}")]
    Config(String),
}

/// One request per invocation against a relative resource URL.
///
/// Implementations resolve `url` against their own base; absolute URLs (for
/// example pagination links returned by the server) are used as given.
pub trait Transport: Send + Sync {
    fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, TransportError>;
}

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use in_memory::{RecordedRequest, StubTransport};
