//! Managed object identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one managed object by kind and name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    /// Category of the object; the inventory groups identifiers by it
    pub kind: String,
    /// Identifier within the kind
    pub name: String,
}

impl ResourceKey {
    /// Create new key
    #[inline]
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_kind_and_name() {
        assert_eq!(ResourceKey::new("Vlan", "100").to_string(), "Vlan/100");
    }
}
