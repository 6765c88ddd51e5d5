//! List response normalization.
//!
//! List endpoints answer either with a bare JSON array or with a paginated
//! envelope. [`ListPayload`] names each accepted shape explicitly and always
//! yields an ordered `Vec`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every list shape the API is known to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    /// `[ ... ]`
    Bare(Vec<T>),
    /// `{ "count": .., "next": .., "results": [ ... ] }`
    Results {
        /// Items of the current page.
        results: Vec<T>,
    },
    /// `{ "data": [ ... ] }`
    Data {
        /// Wrapped items.
        data: Vec<T>,
    },
    /// `null`
    Empty,
}

impl<T> ListPayload<T> {
    /// Returns the items in server order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Results { results: items } | Self::Data { data: items } => {
                items
            }
            Self::Empty => Vec::new(),
        }
    }
}

impl<T> Default for ListPayload<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> From<ListPayload<T>> for Vec<T> {
    fn from(payload: ListPayload<T>) -> Self {
        payload.into_vec()
    }
}

/// Extracts an array from a loosely typed payload.
///
/// Accepts a bare array, a `results` or `data` field, or otherwise the first
/// array-valued field of an object. Anything else yields an empty list.
#[must_use]
pub fn extract_array(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ["results", "data"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return items;
                }
            }
            map.into_iter()
                .find_map(|(_, value)| match value {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .unwrap_or_default()
        }
        _ => Vec::new(),
    }
}
