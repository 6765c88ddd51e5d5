//! Field-level validation failures.
//!
//! The server reports rejected input as a JSON document whose shape varies:
//! a bare string, a list of strings, or an object mapping field names to
//! one or more messages (with an optional `detail` entry for the whole
//! request). [`ValidationErrors`] normalizes all of them into a field map
//! plus an optional global message.

use std::collections::BTreeMap;

use serde_json::Value;

/// Key used by the server for non-field messages.
const DETAIL_KEY: &str = "detail";

/// Normalized validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
    global: Option<String>,
}

impl ValidationErrors {
    /// Parses an error response body.
    ///
    /// Bodies that are not JSON, or JSON of an unrecognized shape, produce an
    /// empty value; callers then fall back to a generic message.
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice::<Value>(body)
            .map(|value| Self::from_value(&value))
            .unwrap_or_default()
    }

    /// Parses an already decoded error payload.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut errors = Self::default();
        match value {
            Value::String(message) => errors.set_global(message.clone()),
            Value::Array(_) => {
                if let Some(message) = join_messages(value) {
                    errors.set_global(message);
                }
            }
            Value::Object(map) => {
                let detail = map.get(DETAIL_KEY).and_then(join_messages);
                for (field, messages) in map {
                    if field == DETAIL_KEY {
                        continue;
                    }
                    if let Some(message) = join_messages(messages) {
                        errors.insert_field(field.clone(), message);
                    }
                }
                match detail {
                    Some(detail) => errors.set_global(detail),
                    None => {
                        if let Some(first) = errors.fields.values().next().cloned() {
                            errors.set_global(first);
                        }
                    }
                }
            }
            _ => {}
        }
        errors
    }

    /// Message for a single field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// All field messages, ordered by field name.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// The request-wide message, if any.
    #[must_use]
    pub fn global(&self) -> Option<&str> {
        self.global.as_deref()
    }

    /// The global message, or `fallback` when none was recognized.
    #[must_use]
    pub fn global_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.global().unwrap_or(fallback)
    }

    /// Returns true if nothing was recognized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.global.is_none()
    }

    /// Records a field message, replacing any previous one.
    pub fn insert_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(field.into(), message.into());
    }

    /// Sets the request-wide message.
    pub fn set_global(&mut self, message: impl Into<String>) {
        self.global = Some(message.into());
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.global {
            Some(global) => write!(f, "{global}"),
            None if self.fields.is_empty() => write!(f, "invalid request"),
            None => {
                let joined: Vec<String> = self
                    .fields
                    .iter()
                    .map(|(field, message)| format!("{field}: {message}"))
                    .collect();
                write!(f, "{}", joined.join("; "))
            }
        }
    }
}

/// Flattens a string, a list of strings, or a nested value into one line.
fn join_messages(value: &Value) -> Option<String> {
    let message = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(join_messages)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => ValidationErrors::from_value(value).to_string(),
        other => other.to_string(),
    };
    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}
