//! Models - typed structs standing in for remote resources.
//!
//! A model is a plain serde struct naming the resource it represents. Wrapped
//! in a [`Record`] it gains dirty tracking against the last server state and a
//! collection of validation [`Errors`].
//!
//! ## Example
//!
//! ```ignore
//! use restmodel::{Model, Record};
//!
//! #[derive(Serialize, Deserialize, Clone, Model)]
//! #[model(name = "Shop::Category")]
//! struct Category {
//!     pub id: Option<u64>,
//!     pub name: String,
//!     // Anything the server sends that is not declared above
//!     #[serde(flatten)]
//!     pub extra: serde_json::Map<String, serde_json::Value>,
//! }
//!
//! let mut category = Record::new(Category { id: None, name: "Tea".into(), extra: Default::default() });
//! assert!(!category.is_persisted());
//! category.name = "Green tea".into();
//! ```

mod errors;
mod record;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Attribute name → JSON value, in declaration order.
pub type Attributes = Map<String, Value>;

/// Trait for types that represent a remote resource.
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The model name, `::`-separated for namespaced resources (e.g. `"Foo::Bar"`).
    /// Resource URLs, response keys and registry keys are derived from it.
    const NAME: &'static str;

    /// The server-assigned identifier, `None` until persisted.
    fn id(&self) -> Option<String>;
}

/// Conversion from an id field to the identifier used in URLs.
///
/// Empty strings count as absent.
pub trait ModelId {
    fn model_id(&self) -> Option<String>;
}

impl ModelId for String {
    fn model_id(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.clone())
    }
}

impl ModelId for &str {
    fn model_id(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl ModelId for Value {
    fn model_id(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => s.model_id(),
            other => Some(other.to_string()),
        }
    }
}

impl<T: ModelId> ModelId for Option<T> {
    fn model_id(&self) -> Option<String> {
        self.as_ref().and_then(ModelId::model_id)
    }
}

macro_rules! integer_model_id {
    ($($ty:ty),*) => {
        $(
            impl ModelId for $ty {
                fn model_id(&self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

integer_model_id!(u32, u64, i32, i64, usize);

/// Error type for converting between models and attribute maps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Serialization/deserialization error.
    #[error("model serialization error for {model}: {message}")]
    Serde { model: &'static str, message: String },
    /// The model did not serialize to a JSON object.
    #[error("model {0} does not serialize to a JSON object")]
    NotAnObject(&'static str),
}

/// Serialize a model into its attribute map.
pub fn to_attributes<M: Model>(model: &M) -> Result<Attributes, ModelError> {
    match serde_json::to_value(model) {
        Ok(Value::Object(attributes)) => Ok(attributes),
        Ok(_) => Err(ModelError::NotAnObject(M::NAME)),
        Err(e) => Err(ModelError::Serde {
            model: M::NAME,
            message: e.to_string(),
        }),
    }
}

/// Build a model from an attribute map.
pub fn from_attributes<M: Model>(attributes: Attributes) -> Result<M, ModelError> {
    serde_json::from_value(Value::Object(attributes)).map_err(|e| ModelError::Serde {
        model: M::NAME,
        message: e.to_string(),
    })
}

pub(crate) use errors::parse_error_messages;
pub use errors::{ErrorMessages, Errors, BASE};
pub use record::Record;
