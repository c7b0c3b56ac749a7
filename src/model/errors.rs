//! Errors - validation messages attached to a record.

use serde::Serialize;
use serde_json::Value;

use crate::inflect;

/// Bucket for messages not tied to a known attribute.
pub const BASE: &str = "base";

/// Attribute name → messages, in the order the server sent them.
pub type ErrorMessages = Vec<(String, Vec<String>)>;

/// Validation messages for one record, grouped by attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Errors {
    entries: Vec<(String, Vec<String>)>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` under `attribute`.
    pub fn add(&mut self, attribute: &str, message: impl Into<String>) {
        self.bucket_mut(attribute).push(message.into());
    }

    /// Messages for `attribute`; empty when there are none.
    pub fn get(&self, attribute: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    /// Messages under [`BASE`].
    pub fn base(&self) -> &[String] {
        self.get(BASE)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, messages)| messages.is_empty())
    }

    /// Total number of messages across all attributes.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate `(attribute, messages)` pairs that hold at least one message.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    /// Sentences for display: `"Name can't be blank"`; base messages as-is.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(attribute, messages)| {
                messages.iter().map(move |message| {
                    if attribute == BASE {
                        message.clone()
                    } else {
                        format!("{} {}", inflect::humanize(attribute), message)
                    }
                })
            })
            .collect()
    }

    /// Merge server-side validation messages.
    ///
    /// `is_attribute` says whether a name is an attribute of the record.
    /// Known attributes collect their messages verbatim, skipping ones already
    /// present. Everything else lands in [`BASE`], unknown names rewritten as
    /// `"<Humanized attribute> <message>"`. `base` is deduplicated last, so
    /// merging the same messages twice leaves the collection unchanged.
    pub fn from_hash<F>(&mut self, messages: &ErrorMessages, is_attribute: F)
    where
        F: Fn(&str) -> bool,
    {
        for (attribute, list) in messages {
            for message in list {
                if attribute != BASE && is_attribute(attribute.as_str()) {
                    let bucket = self.bucket_mut(attribute);
                    if !bucket.contains(message) {
                        bucket.push(message.clone());
                    }
                } else if attribute == BASE {
                    self.bucket_mut(BASE).push(message.clone());
                } else {
                    let rewritten = format!("{} {}", inflect::humanize(attribute), message);
                    self.bucket_mut(BASE).push(rewritten);
                }
            }
        }

        if let Some((_, base)) = self.entries.iter_mut().find(|(name, _)| name == BASE) {
            let mut seen = Vec::with_capacity(base.len());
            base.retain(|message| {
                if seen.contains(message) {
                    false
                } else {
                    seen.push(message.clone());
                    true
                }
            });
        }
    }

    fn bucket_mut(&mut self, attribute: &str) -> &mut Vec<String> {
        let idx = match self.entries.iter().position(|(name, _)| name == attribute) {
            Some(idx) => idx,
            None => {
                self.entries.push((attribute.to_string(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }
}

/// Read an `errors` object (`{"name": ["can't be blank"]}`) into messages.
///
/// A bare string counts as a one-message list; other values are ignored.
pub(crate) fn parse_error_messages(errors: Option<&Value>) -> ErrorMessages {
    let Some(Value::Object(map)) = errors else {
        return Vec::new();
    };

    map.iter()
        .map(|(attribute, value)| {
            let messages = match value {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                Value::String(message) => vec![message.clone()],
                _ => Vec::new(),
            };
            (attribute.clone(), messages)
        })
        .collect()
}
