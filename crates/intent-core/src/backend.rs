//! Resource backend contract
//!
//! The backend performs the actual work against managed objects. Only leaves
//! call it; composites never do. Implementations must be safe to share across
//! every node of a tree.

use crate::error::BackendError;
use crate::intent::Labels;
use crate::key::ResourceKey;

/// Backend performing work for leaf intents
#[async_trait::async_trait]
pub trait ResourceBackend: Send + Sync + 'static {
    /// Managed-resource handle the backend works on behalf of
    type Resource: ?Sized + Send + Sync + 'static;

    /// Create or update `key` so that it matches `spec`
    async fn apply(
        &self,
        resource: &Self::Resource,
        key: &ResourceKey,
        spec: &serde_json::Value,
        labels: &Labels,
    ) -> Result<(), BackendError>;

    /// Remove what `apply` created for `key`
    async fn remove(
        &self,
        resource: &Self::Resource,
        key: &ResourceKey,
        labels: &Labels,
    ) -> Result<(), BackendError>;

    /// Whether `key` currently exists
    async fn observe(&self, resource: &Self::Resource, key: &ResourceKey)
        -> Result<bool, BackendError>;

    /// Check `spec` for `key` without changing anything
    async fn validate(
        &self,
        resource: &Self::Resource,
        key: &ResourceKey,
        spec: &serde_json::Value,
    ) -> Result<(), BackendError>;

    /// Delete `key`
    async fn delete(&self, resource: &Self::Resource, key: &ResourceKey)
        -> Result<(), BackendError>;
}
