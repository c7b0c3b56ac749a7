//! RestAdapter - the conventional JSON-over-REST adapter.

use std::sync::Arc;

use serde_json::Value;

use super::{Adapter, Options, Scope};
use crate::collection::{Collection, PageMeta};
use crate::error::{AdapterError, ResponseError};
use crate::inflect::{self, ResourceName};
use crate::model::{Attributes, Model};
use crate::transport::{Method, Response, Transport};

/// Attribute sets found in a response body.
#[derive(Debug, Clone, PartialEq)]
enum Unpacked {
    One(Attributes),
    Many(Vec<Attributes>),
}

/// Adapter for resources following REST conventions.
///
/// - collection: `GET|POST [prefix/]<plural>[.format]`
/// - member: `GET|PUT [prefix/]<plural>/<id>[.format]`
/// - action: `POST [prefix/]<plural>/<id>/<action>[.format]`
///
/// Bodies wrap attributes under the resource key: `{"bar": {...}}` for one
/// record, `{"bars": [...]}` for many. Requests send bare attributes.
#[derive(Clone)]
pub struct RestAdapter {
    connection: Arc<dyn Transport>,
    resource: ResourceName,
    prefix: Option<String>,
    format: Option<String>,
}

impl RestAdapter {
    /// Create an adapter for the model named `model_name` (e.g. `"Foo::Bar"`).
    pub fn new(connection: Arc<dyn Transport>, model_name: &str) -> Self {
        Self {
            connection,
            resource: ResourceName::new(model_name),
            prefix: None,
            format: None,
        }
    }

    /// Create an adapter for `M`.
    pub fn for_model<M: Model>(connection: Arc<dyn Transport>) -> Self {
        Self::new(connection, M::NAME)
    }

    /// Path segment(s) placed before the collection (e.g. `"api/v1"`).
    pub fn prefix(mut self, prefix: &str) -> Self {
        let prefix = prefix.trim_matches('/');
        self.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    /// Extension appended to every URL (e.g. `"json"`).
    pub fn format(mut self, format: &str) -> Self {
        let format = format.trim_start_matches('.');
        self.format = (!format.is_empty()).then(|| format.to_string());
        self
    }

    pub fn resource(&self) -> &ResourceName {
        &self.resource
    }

    pub fn connection(&self) -> &Arc<dyn Transport> {
        &self.connection
    }

    /// Build the URL for `scope`.
    pub fn url_for(&self, scope: Scope<'_>) -> String {
        let mut segments: Vec<&str> = Vec::with_capacity(3);
        if let Some(prefix) = &self.prefix {
            segments.push(prefix);
        }
        segments.push(self.resource.collection());
        if let Scope::Member(member) = scope {
            segments.push(member);
        }

        let url = segments.join("/");
        match &self.format {
            Some(format) => format!("{}.{}", url, format),
            None => url,
        }
    }

    fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response, AdapterError> {
        tracing::debug!(resource = self.resource.model_name(), %method, url, "adapter request");
        let response = self.connection.request(method, url, body)?;
        tracing::debug!(
            resource = self.resource.model_name(),
            %method,
            url,
            status = response.status,
            "adapter response"
        );
        Ok(response)
    }

    /// Pass the response through when it has the `handled` status.
    fn handle(response: Response, handled: u16) -> Result<Response, AdapterError> {
        if response.status == handled {
            Ok(response)
        } else {
            Err(ResponseError::from_response(response).into())
        }
    }

    /// Find the resource's attributes in `body`.
    ///
    /// Keys are probed per name (demodulized first, then fully qualified),
    /// plural before singular. The plural key only matches an array, since
    /// uncountable names (`news`) use the same key for both.
    fn unpack(&self, body: &Value) -> Result<Unpacked, AdapterError> {
        if let Value::Object(map) = body {
            for key in self.resource.unpack_keys() {
                let plural = inflect::pluralize(key);
                let singular = inflect::singularize(key);

                if let Some(Value::Array(items)) = map.get(&plural) {
                    return items
                        .iter()
                        .map(|item| self.attributes_of(item, body))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Unpacked::Many);
                }
                if let Some(value) = map.get(&singular) {
                    return self.attributes_of(value, body).map(Unpacked::One);
                }
            }
        }
        Err(self.unpack_error(body))
    }

    fn unpack_one(&self, body: &Value) -> Result<Attributes, AdapterError> {
        match self.unpack(body)? {
            Unpacked::One(attributes) => Ok(attributes),
            Unpacked::Many(_) => Err(self.unpack_error(body)),
        }
    }

    fn unpack_many(&self, body: &Value) -> Result<Vec<Attributes>, AdapterError> {
        match self.unpack(body)? {
            Unpacked::Many(items) => Ok(items),
            Unpacked::One(_) => Err(self.unpack_error(body)),
        }
    }

    fn attributes_of(&self, value: &Value, body: &Value) -> Result<Attributes, AdapterError> {
        match value {
            Value::Object(attributes) => Ok(attributes.clone()),
            _ => Err(self.unpack_error(body)),
        }
    }

    fn unpack_error(&self, body: &Value) -> AdapterError {
        AdapterError::Unpack {
            model: self.resource.model_name().to_string(),
            body: body.to_string(),
        }
    }
}

impl Adapter for RestAdapter {
    fn find(&self, id: &str, options: &Options) -> Result<Attributes, AdapterError> {
        let url = options
            .url
            .clone()
            .unwrap_or_else(|| self.url_for(Scope::Member(id)));
        let response = Self::handle(self.send(Method::Get, &url, None)?, 200)?;
        self.unpack_one(&response.body)
    }

    fn all(&self, options: &Options) -> Result<Collection<Attributes>, AdapterError> {
        let url = options
            .url
            .clone()
            .unwrap_or_else(|| self.url_for(Scope::All));
        let response = Self::handle(self.send(Method::Get, &url, None)?, 200)?;
        let items = self.unpack_many(&response.body)?;
        let meta = response.body.get("meta").and_then(PageMeta::from_value);
        Ok(Collection::with_meta(items, meta))
    }

    fn create(&self, attributes: &Attributes) -> Result<Attributes, AdapterError> {
        let body = Value::Object(attributes.clone());
        let url = self.url_for(Scope::All);
        let response = Self::handle(self.send(Method::Post, &url, Some(&body))?, 201)?;
        self.unpack_one(&response.body)
    }

    fn update(
        &self,
        id: &str,
        current: &Attributes,
        overrides: &Attributes,
    ) -> Result<Attributes, AdapterError> {
        let mut merged = current.clone();
        for (name, value) in overrides {
            merged.insert(name.clone(), value.clone());
        }
        let body = Value::Object(merged);
        let url = self.url_for(Scope::Member(id));
        let response = Self::handle(self.send(Method::Put, &url, Some(&body))?, 200)?;
        self.unpack_one(&response.body)
    }

    fn post(&self, id: &str, action: &str) -> Result<Attributes, AdapterError> {
        let member = format!("{}/{}", id, action);
        let url = self.url_for(Scope::Member(&member));
        let response = Self::handle(self.send(Method::Post, &url, None)?, 201)?;
        self.unpack_one(&response.body)
    }
}
