//! Aggregated intent data

use serde::Serialize;
use std::collections::BTreeMap;

/// Data reported by an intent node
///
/// Leaves report an opaque JSON value. Composites report their children's
/// data keyed by child name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IntentData {
    /// Opaque leaf value
    Leaf(serde_json::Value),
    /// Child name -> child data
    Composite(BTreeMap<String, IntentData>),
}

impl IntentData {
    /// Create leaf data
    #[inline]
    pub fn leaf(value: impl Into<serde_json::Value>) -> Self {
        Self::Leaf(value.into())
    }

    /// Leaf value, if this is a leaf
    #[must_use]
    pub fn as_leaf(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Leaf(value) => Some(value),
            Self::Composite(_) => None,
        }
    }

    /// Data of child `name`, if this is a composite
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&IntentData> {
        match self {
            Self::Leaf(_) => None,
            Self::Composite(children) => children.get(name),
        }
    }

    /// Nested JSON view
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Leaf(value) => value.clone(),
            Self::Composite(children) => serde_json::Value::Object(
                children
                    .iter()
                    .map(|(name, data)| (name.clone(), data.to_json()))
                    .collect(),
            ),
        }
    }
}
