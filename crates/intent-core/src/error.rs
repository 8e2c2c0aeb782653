//! Error types for intent trees
//!
//! Provides:
//! - [`IntentError`]: the single error type flowing through every lifecycle
//!   operation, so a child's failure reaches the root unchanged
//! - [`BackendError`]: failures reported by a [`ResourceBackend`](crate::ResourceBackend)

use crate::key::ResourceKey;

/// Main intent error type
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    /// Lookup of a child name that was never registered
    #[error("intent {intent}: no child named {child:?}")]
    ChildNotFound {
        /// Composite that was asked
        intent: String,
        /// Requested child name
        child: String,
    },

    /// Cancellation was observed before the next step started
    #[error("intent {intent}: operation cancelled")]
    Cancelled {
        /// Node that observed the cancellation
        intent: String,
    },

    /// A leaf's backend call failed
    #[error("backend failed for {key}: {source}")]
    Backend {
        /// Managed object the call targeted
        key: ResourceKey,
        /// Backend failure
        #[source]
        source: BackendError,
    },

    /// A custom leaf failed for its own reasons
    #[error("intent {intent} failed: {reason}")]
    Failed {
        /// Failing node
        intent: String,
        /// Human-readable reason
        reason: String,
    },
}

impl IntentError {
    /// Create a child-not-found error
    #[inline]
    pub fn child_not_found(intent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::ChildNotFound {
            intent: intent.into(),
            child: child.into(),
        }
    }

    /// Create a cancellation error
    #[inline]
    pub fn cancelled(intent: impl Into<String>) -> Self {
        Self::Cancelled {
            intent: intent.into(),
        }
    }

    /// Create a leaf failure
    #[inline]
    pub fn failed(intent: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            intent: intent.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a backend failure for `key`
    #[inline]
    #[must_use]
    pub fn backend(key: ResourceKey, source: BackendError) -> Self {
        Self::Backend { key, source }
    }

    /// Check if error is an unknown-child lookup
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChildNotFound { .. })
    }

    /// Check if error is a cancellation
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Check if error is retryable
    ///
    /// Retrying is only meaningful when the leaves involved are idempotent;
    /// that is a property of the backend, not of the tree.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Cancelled { .. } => true,
            Self::Backend { source, .. } => source.is_retryable(),
            Self::ChildNotFound { .. } | Self::Failed { .. } => false,
        }
    }
}

/// Resource backend errors
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend refused the request
    #[error("rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached or is temporarily unable to serve
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackendError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ResourceKey {
        ResourceKey::new("Interface", "eth0")
    }

    #[test]
    fn child_not_found_display() {
        let err = IntentError::child_not_found("root", "missing");
        assert_eq!(err.to_string(), "intent root: no child named \"missing\"");
        assert!(err.is_not_found());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn cancelled_is_distinct_from_backend_failure() {
        let cancelled = IntentError::cancelled("root");
        let backend = IntentError::backend(key(), BackendError::Rejected("bad spec".into()));

        assert!(cancelled.is_cancelled());
        assert!(!backend.is_cancelled());
        assert!(!backend.is_not_found());
    }

    #[test]
    fn backend_error_keeps_source() {
        let err = IntentError::backend(key(), BackendError::Unavailable("timeout".into()));
        assert!(err.to_string().contains("Interface/eth0"));

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("unavailable: timeout"));
    }

    #[test]
    fn intent_error_is_retryable() {
        assert!(IntentError::cancelled("x").is_retryable());
        assert!(IntentError::backend(key(), BackendError::Unavailable("down".into())).is_retryable());
        assert!(!IntentError::backend(key(), BackendError::Rejected("no".into())).is_retryable());
        assert!(!IntentError::child_not_found("x", "y").is_retryable());
        assert!(!IntentError::failed("x", "boom").is_retryable());
    }

    #[test]
    fn backend_other_from_anyhow() {
        let err: BackendError = anyhow::anyhow!("disk full").into();
        assert_eq!(err.to_string(), "disk full");
        assert!(!err.is_retryable());
    }
}
