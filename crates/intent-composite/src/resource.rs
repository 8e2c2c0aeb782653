//! Backend-driven leaf intent

use intent_core::{
    ensure_active, BackendError, Intent, IntentData, IntentError, Inventory, Labels,
    ResourceBackend, ResourceKey,
};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Leaf intent for a single managed object
///
/// Hands every operation to the shared [`ResourceBackend`]:
///
/// | operation | backend call |
/// |---|---|
/// | deploy | `apply` with the desired spec and labels |
/// | destroy | `remove` |
/// | list | `observe`; records the key when the object exists |
/// | validate | `validate`; records the key on success |
/// | delete | `delete`, only when the inventory names the key |
///
/// Data is the desired spec.
pub struct ResourceIntent<B: ResourceBackend> {
    client: Arc<B>,
    key: ResourceKey,
    spec: serde_json::Value,
}

impl<B: ResourceBackend> ResourceIntent<B> {
    /// Create leaf for `key` with desired `spec`
    #[must_use]
    pub fn new(client: Arc<B>, key: ResourceKey, spec: serde_json::Value) -> Self {
        Self { client, key, spec }
    }

    /// Managed object this leaf owns
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Desired spec
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &serde_json::Value {
        &self.spec
    }

    fn ensure_active(&self, cancel: &CancellationToken) -> Result<(), IntentError> {
        ensure_active(cancel, &self.key.to_string())
    }

    fn backend_failed(&self, op: &'static str, source: BackendError) -> IntentError {
        tracing::warn!(resource = %self.key, op, error = %source, "backend call failed");
        IntentError::backend(self.key.clone(), source)
    }
}

#[async_trait::async_trait]
impl<B: ResourceBackend> Intent<B::Resource> for ResourceIntent<B> {
    async fn deploy(
        &self,
        cancel: &CancellationToken,
        resource: &B::Resource,
        labels: &Labels,
    ) -> Result<(), IntentError> {
        self.ensure_active(cancel)?;
        tracing::debug!(resource = %self.key, "apply");
        self.client
            .apply(resource, &self.key, &self.spec, labels)
            .await
            .map_err(|err| self.backend_failed("apply", err))
    }

    async fn destroy(
        &self,
        cancel: &CancellationToken,
        resource: &B::Resource,
        labels: &Labels,
    ) -> Result<(), IntentError> {
        self.ensure_active(cancel)?;
        tracing::debug!(resource = %self.key, "remove");
        self.client
            .remove(resource, &self.key, labels)
            .await
            .map_err(|err| self.backend_failed("remove", err))
    }

    async fn list(
        &self,
        cancel: &CancellationToken,
        resource: &B::Resource,
        mut inventory: Inventory,
    ) -> Result<Inventory, IntentError> {
        self.ensure_active(cancel)?;
        let exists = self
            .client
            .observe(resource, &self.key)
            .await
            .map_err(|err| self.backend_failed("observe", err))?;
        if exists {
            inventory.insert_key(&self.key);
        }
        Ok(inventory)
    }

    async fn validate(
        &self,
        cancel: &CancellationToken,
        resource: &B::Resource,
        mut inventory: Inventory,
    ) -> Result<Inventory, IntentError> {
        self.ensure_active(cancel)?;
        self.client
            .validate(resource, &self.key, &self.spec)
            .await
            .map_err(|err| self.backend_failed("validate", err))?;
        inventory.insert_key(&self.key);
        Ok(inventory)
    }

    async fn delete(
        &self,
        cancel: &CancellationToken,
        resource: &B::Resource,
        inventory: &Inventory,
    ) -> Result<(), IntentError> {
        if !inventory.contains_key(&self.key) {
            return Ok(());
        }
        self.ensure_active(cancel)?;
        tracing::debug!(resource = %self.key, "delete");
        self.client
            .delete(resource, &self.key)
            .await
            .map_err(|err| self.backend_failed("delete", err))
    }

    async fn data(&self) -> IntentData {
        IntentData::Leaf(self.spec.clone())
    }
}

impl<B: ResourceBackend> fmt::Debug for ResourceIntent<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceIntent")
            .field("key", &self.key)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}
