use thiserror::Error;

use crate::model::{parse_error_messages, ErrorMessages, ModelError};
use crate::transport::{Response, TransportError};

/// The server answered with a status the operation does not accept.
///
/// Every variant keeps the response for inspection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    /// 401 Unauthorized.
    #[error("server returned 401 Unauthorized")]
    Unauthorized(Response),
    /// 404 Not Found.
    #[error("server returned 404 Not Found")]
    NotFound(Response),
    /// 422 Unprocessable Entity; see [`ResponseError::errors`].
    #[error("server returned 422 Unprocessable Entity")]
    UnprocessableEntity(Response),
    /// Any other status.
    #[error("server returned unhandled status {}", .0.status)]
    Unhandled(Response),
}

impl ResponseError {
    /// Classify a response whose status was not the expected one.
    pub fn from_response(response: Response) -> Self {
        match response.status {
            401 => ResponseError::Unauthorized(response),
            404 => ResponseError::NotFound(response),
            422 => ResponseError::UnprocessableEntity(response),
            _ => ResponseError::Unhandled(response),
        }
    }

    pub fn response(&self) -> &Response {
        match self {
            ResponseError::Unauthorized(response)
            | ResponseError::NotFound(response)
            | ResponseError::UnprocessableEntity(response)
            | ResponseError::Unhandled(response) => response,
        }
    }

    pub fn status(&self) -> u16 {
        self.response().status
    }

    /// Validation messages from the body's `errors` key.
    ///
    /// Empty for a 422 without `errors`, and for every other variant.
    pub fn errors(&self) -> ErrorMessages {
        match self {
            ResponseError::UnprocessableEntity(response) => {
                parse_error_messages(response.body.get("errors"))
            }
            _ => Vec::new(),
        }
    }
}

/// Error type for adapter operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    /// The body held neither the singular nor the plural resource key, or
    /// held the wrong one of the two for the operation.
    #[error("unable to unpack {model} attributes from {body}")]
    Unpack { model: String, body: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl AdapterError {
    /// The response error, if the server rejected the request.
    pub fn response_error(&self) -> Option<&ResponseError> {
        match self {
            AdapterError::Response(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type for repository operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("repository lock poisoned during {0}")]
    LockPoisoned(&'static str),
    /// No adapter is registered under this resource key.
    #[error("no adapter registered for {0}")]
    MissingAdapter(String),
    /// Updates need an id to address the record.
    #[error("cannot update {0}: record is not persisted")]
    NotPersisted(&'static str),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl RepositoryError {
    /// The response error, if the server rejected the request.
    pub fn response_error(&self) -> Option<&ResponseError> {
        match self {
            RepositoryError::Adapter(err) => err.response_error(),
            _ => None,
        }
    }
}

/// Error type for registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry lock poisoned during {0}")]
    LockPoisoned(&'static str),
    /// The shared default connection could not be built.
    #[error("default connection unavailable: {0}")]
    Connection(#[from] TransportError),
    /// A memoized repository has a different model type than requested.
    #[error("repository registered for {0} has a different model type")]
    TypeMismatch(String),
}
