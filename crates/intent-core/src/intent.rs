//! Intent lifecycle contract
//!
//! Every node of an intent tree, leaf or composite, implements [`Intent`].
//! A traversal therefore treats any subtree opaquely.

use crate::data::IntentData;
use crate::error::IntentError;
use crate::inventory::Inventory;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Label set passed unchanged to deploy/destroy
pub type Labels = BTreeMap<String, String>;

/// Shared, type-erased intent node
pub type SharedIntent<M: ?Sized> = Arc<dyn Intent<M>>;

/// Intent node
///
/// `M` is the managed-resource handle. The tree never looks inside it; it is
/// handed by reference to every node down to the leaves.
///
/// Every operation takes the caller's [`CancellationToken`]. Implementations
/// should check it (see [`ensure_active`]) before starting work that can be
/// skipped.
#[async_trait::async_trait]
pub trait Intent<M>: Send + Sync
where
    M: ?Sized + Send + Sync + 'static,
{
    /// Bring the managed state in line with the intent
    async fn deploy(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        labels: &Labels,
    ) -> Result<(), IntentError>;

    /// Tear down what `deploy` created
    async fn destroy(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        labels: &Labels,
    ) -> Result<(), IntentError>;

    /// Record known resources into `inventory` and return it
    async fn list(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        inventory: Inventory,
    ) -> Result<Inventory, IntentError>;

    /// Validate the intent, recording confirmed resources into `inventory`
    async fn validate(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        inventory: Inventory,
    ) -> Result<Inventory, IntentError>;

    /// Delete resources named by `inventory`
    async fn delete(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        inventory: &Inventory,
    ) -> Result<(), IntentError>;

    /// Data represented by this node
    async fn data(&self) -> IntentData;
}

/// Fail with [`IntentError::Cancelled`] once `cancel` has fired
///
/// `intent` names the node that observed the cancellation.
///
/// # Errors
/// Returns `IntentError::Cancelled` if the token is cancelled.
#[inline]
pub fn ensure_active(cancel: &CancellationToken, intent: &str) -> Result<(), IntentError> {
    if cancel.is_cancelled() {
        return Err(IntentError::cancelled(intent));
    }
    Ok(())
}
