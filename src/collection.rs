//! Collection - the result of an `all` request.

use std::ops::Deref;

use serde_json::Value;

/// Pagination block returned next to a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub next_url: Option<String>,
    pub prev_url: Option<String>,
    pub count_all: Option<u64>,
}

impl PageMeta {
    /// Read `{"next_url": .., "prev_url": .., "count": ..}`.
    ///
    /// Returns `None` unless `meta` is an object.
    pub fn from_value(meta: &Value) -> Option<Self> {
        let meta = meta.as_object()?;
        Some(Self {
            next_url: meta.get("next_url").and_then(Value::as_str).map(str::to_string),
            prev_url: meta.get("prev_url").and_then(Value::as_str).map(str::to_string),
            count_all: meta.get("count").and_then(Value::as_u64),
        })
    }
}

/// Ordered items plus the pagination metadata the server sent, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
    meta: Option<PageMeta>,
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, meta: None }
    }

    pub fn with_meta(items: Vec<T>, meta: Option<PageMeta>) -> Self {
        Self { items, meta }
    }

    pub fn meta(&self) -> Option<&PageMeta> {
        self.meta.as_ref()
    }

    pub fn next_url(&self) -> Option<&str> {
        self.meta.as_ref()?.next_url.as_deref()
    }

    pub fn prev_url(&self) -> Option<&str> {
        self.meta.as_ref()?.prev_url.as_deref()
    }

    /// Total number of records on the server, across all pages.
    pub fn count_all(&self) -> Option<u64> {
        self.meta.as_ref()?.count_all
    }

    /// Query string of the next page link: `"/things?page=2"` → `"page=2"`.
    pub fn next_page_query(&self) -> Option<&str> {
        let (_, query) = self.next_url()?.split_once('?')?;
        let query = query.split('#').next().unwrap_or(query);
        (!query.is_empty()).then_some(query)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Convert every item, keeping the metadata. Stops at the first error.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Collection<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Collection {
            items,
            meta: self.meta,
        })
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Deref for Collection<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
