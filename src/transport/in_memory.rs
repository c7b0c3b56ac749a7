//! StubTransport - scripted in-memory transport for testing and development.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::{Method, Response, Transport, TransportError};

/// A request as the stub saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct StubState {
    routes: HashMap<(Method, String), VecDeque<Response>>,
    requests: Vec<RecordedRequest>,
}

/// In-memory transport answering from scripted responses.
///
/// Responses are keyed by `(method, url)` and served in the order they were
/// scripted; the last one keeps answering once the queue is down to it.
/// Every request is recorded, including unmatched ones. Clone-friendly via Arc,
/// so a test can keep a handle while the registry owns another.
#[derive(Clone, Default)]
pub struct StubTransport {
    state: Arc<RwLock<StubState>>,
}

impl StubTransport {
    /// Create a stub with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for `method url`.
    pub fn on(&self, method: Method, url: &str, status: u16, body: Value) -> &Self {
        if let Ok(mut state) = self.state.write() {
            state
                .routes
                .entry((method, url.to_string()))
                .or_default()
                .push_back(Response::new(status, body));
        }
        self
    }

    /// All requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .read()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }

    /// Number of requests made with `method`.
    pub fn count(&self, method: Method) -> usize {
        self.state
            .read()
            .map(|state| state.requests.iter().filter(|r| r.method == method).count())
            .unwrap_or_default()
    }

    /// Total number of requests made.
    pub fn total(&self) -> usize {
        self.state
            .read()
            .map(|state| state.requests.len())
            .unwrap_or_default()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.requests.last().cloned())
    }
}

impl Transport for StubTransport {
    fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, TransportError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| TransportError::Connection("stub transport lock poisoned".into()))?;

        state.requests.push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });

        let queue = state
            .routes
            .get_mut(&(method, url.to_string()))
            .ok_or_else(|| TransportError::Connection(format!("no stubbed response for {} {}", method, url)))?;

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        response.ok_or_else(|| TransportError::Connection(format!("no stubbed response for {} {}", method, url)))
    }
}
