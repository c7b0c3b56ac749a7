//! HTTP transport backed by a blocking reqwest client.
//!
//! Requires the `http` feature. Relative URLs are joined onto the base URL the
//! transport was built with; absolute URLs pass through unchanged.

use reqwest::blocking::Client;
use serde_json::Value;

use super::{Method, Response, Transport, TransportError};

/// JSON-over-HTTP transport rooted at a base URL.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url` (e.g. `"https://api.example.com/v1"`).
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured client (timeouts, default headers, auth).
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        }
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, TransportError> {
        let full_url = self.resolve(url);
        let mut request = match method {
            Method::Get => self.client.get(&full_url),
            Method::Post => self.client.post(&full_url),
            Method::Put => self.client.put(&full_url),
        };
        request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, url = %full_url, "sending request");
        let response = request
            .send()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        tracing::debug!(method = %method, url = %full_url, status, "received response");

        Ok(Response::new(status, decode_body(status, &bytes)?))
    }
}

/// JSON body of a response. Blank bodies are `Null`; so are undecodable
/// error bodies (an HTML 404 page), leaving the status to speak for itself.
fn decode_body(status: u16, bytes: &[u8]) -> Result<Value, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match serde_json::from_slice(bytes) {
        Ok(body) => Ok(body),
        Err(err) if (200..300).contains(&status) => Err(TransportError::Decode(err.to_string())),
        Err(err) => {
            tracing::debug!(status, error = %err, "error body is not JSON, ignored");
            Ok(Value::Null)
        }
    }
}
