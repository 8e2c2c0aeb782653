//! Composite configuration

use serde::{Deserialize, Serialize};

/// How a composite holds its guard while visiting children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Hold the guard for the whole traversal
    ///
    /// Registration on this node waits until the traversal finishes, and a
    /// slow leaf keeps every ancestor locked while it runs.
    #[default]
    Locked,

    /// Copy the child list under the guard, release it, then traverse
    ///
    /// Registration proceeds during a traversal. Children added after the
    /// copy is taken are not visited by that traversal.
    Snapshot,
}

/// Composite intent configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeConfig {
    /// Guard policy during lifecycle traversals
    pub traversal: TraversalMode,
    /// Check the cancellation token before visiting each child
    pub check_cancellation: bool,
}

impl CompositeConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With traversal mode
    #[inline]
    #[must_use]
    pub fn with_traversal(mut self, traversal: TraversalMode) -> Self {
        self.traversal = traversal;
        self
    }

    /// With per-child cancellation checks on or off
    #[inline]
    #[must_use]
    pub fn with_cancellation_checks(mut self, enabled: bool) -> Self {
        self.check_cancellation = enabled;
        self
    }
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            traversal: TraversalMode::Locked,
            check_cancellation: true,
        }
    }
}
