//! Composite intent
//!
//! [`CompositeIntent`] owns named children and implements [`Intent`] by
//! fanning each operation out to them:
//! - deploy/destroy/delete visit every child and stop at the first failure
//! - list/validate thread one [`Inventory`] through the children in turn
//! - data collects every child's data keyed by child name
//!
//! Children are visited in no particular order. Each node guards its own
//! child map; there is no lock shared between levels.

use crate::config::{CompositeConfig, TraversalMode};
use intent_core::{
    ensure_active, Intent, IntentData, IntentError, Inventory, Labels, SharedIntent,
};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

type Children<M: ?Sized> = HashMap<String, SharedIntent<M>>;

/// Outcome of [`CompositeIntent::register`]
pub enum Registration<M>
where
    M: ?Sized + Send + Sync + 'static,
{
    /// The node passed in is now registered
    Created(SharedIntent<M>),
    /// The name was taken; the node passed in was dropped
    Existing(SharedIntent<M>),
}

impl<M> Registration<M>
where
    M: ?Sized + Send + Sync + 'static,
{
    /// Whether the call inserted a new child
    #[inline]
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Child registered under the name
    #[inline]
    #[must_use]
    pub fn child(&self) -> &SharedIntent<M> {
        match self {
            Self::Created(child) | Self::Existing(child) => child,
        }
    }

    /// Take the registered child
    #[inline]
    #[must_use]
    pub fn into_child(self) -> SharedIntent<M> {
        match self {
            Self::Created(child) | Self::Existing(child) => child,
        }
    }
}

impl<M> fmt::Debug for Registration<M>
where
    M: ?Sized + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(_) => f.write_str("Created"),
            Self::Existing(_) => f.write_str("Existing"),
        }
    }
}

/// Intent node owning named children
///
/// `M` is the managed-resource handle passed through to every child, `C` the
/// backend client shared by the whole tree.
///
/// # Locking
///
/// With [`TraversalMode::Locked`] (the default) the child map stays locked
/// for the whole of a lifecycle traversal, including every nested call. A
/// child must therefore never register into one of its ancestors while that
/// ancestor is traversing: the registration would wait on the ancestor's
/// guard for as long as the traversal lasts, which is forever.
///
/// The tree must be acyclic. Nothing checks this.
pub struct CompositeIntent<M, C>
where
    M: ?Sized + Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
{
    name: String,
    client: Arc<C>,
    children: Mutex<Children<M>>,
    config: CompositeConfig,
}

/// Children selected for one traversal
///
/// In locked mode the guard rides along so the child map stays locked until
/// the traversal is dropped.
struct Traversal<'a, M>
where
    M: ?Sized + Send + Sync + 'static,
{
    _guard: Option<MutexGuard<'a, Children<M>>>,
    children: Vec<(String, SharedIntent<M>)>,
}

impl<M, C> CompositeIntent<M, C>
where
    M: ?Sized + Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
{
    /// Create composite with default configuration
    #[must_use]
    pub fn new(name: impl Into<String>, client: Arc<C>) -> Self {
        Self::with_config(name, client, CompositeConfig::default())
    }

    /// Create composite with custom configuration
    #[must_use]
    pub fn with_config(name: impl Into<String>, client: Arc<C>, config: CompositeConfig) -> Self {
        Self {
            name: name.into(),
            client,
            children: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Name given at construction
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared backend client
    #[inline]
    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> CompositeConfig {
        self.config
    }

    /// Register `child` under `name` unless the name is taken
    ///
    /// Returns the child registered under `name` afterwards: `child` itself,
    /// or the earlier registration if there was one. Use [`Self::register`]
    /// to learn which.
    pub async fn add_child(&self, name: impl Into<String>, child: SharedIntent<M>) -> SharedIntent<M> {
        self.register(name, child).await.into_child()
    }

    /// Register `child` under `name` unless the name is taken, reporting
    /// whether it was inserted
    pub async fn register(&self, name: impl Into<String>, child: SharedIntent<M>) -> Registration<M> {
        let mut children = self.children.lock().await;
        match children.entry(name.into()) {
            Entry::Occupied(entry) => {
                tracing::debug!(intent = %self.name, child = %entry.key(), "child already registered");
                Registration::Existing(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                tracing::debug!(intent = %self.name, child = %entry.key(), "registered child");
                Registration::Created(Arc::clone(entry.insert(child)))
            }
        }
    }

    /// Register the node built by `init` under `name` unless the name is taken
    ///
    /// `init` receives the shared client and the name. It runs under the
    /// guard and only when the name is free.
    pub async fn add_child_with<F>(&self, name: impl Into<String>, init: F) -> SharedIntent<M>
    where
        F: FnOnce(&Arc<C>, &str) -> SharedIntent<M>,
    {
        let mut children = self.children.lock().await;
        match children.entry(name.into()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let child = init(&self.client, entry.key().as_str());
                tracing::debug!(intent = %self.name, child = %entry.key(), "initialised child");
                Arc::clone(entry.insert(child))
            }
        }
    }

    /// Child registered under `name`
    pub async fn child(&self, name: &str) -> Option<SharedIntent<M>> {
        self.children.lock().await.get(name).cloned()
    }

    /// Copy of the child map
    pub async fn children(&self) -> HashMap<String, SharedIntent<M>> {
        self.children.lock().await.clone()
    }

    /// Registered child names, in no particular order
    pub async fn child_names(&self) -> Vec<String> {
        self.children.lock().await.keys().cloned().collect()
    }

    /// Number of registered children
    pub async fn len(&self) -> usize {
        self.children.lock().await.len()
    }

    /// Whether no child is registered
    pub async fn is_empty(&self) -> bool {
        self.children.lock().await.is_empty()
    }

    /// Data of the child registered under `name`
    ///
    /// # Errors
    /// Returns `IntentError::ChildNotFound` if nothing is registered under
    /// `name`.
    pub async fn child_data(&self, name: &str) -> Result<IntentData, IntentError> {
        let children = self.children.lock().await;
        let child = children
            .get(name)
            .ok_or_else(|| IntentError::child_not_found(self.name.as_str(), name))?;
        Ok(child.data().await)
    }

    async fn traverse(&self) -> Traversal<'_, M> {
        let guard = self.children.lock().await;
        let children = guard
            .iter()
            .map(|(name, child)| (name.clone(), Arc::clone(child)))
            .collect();

        let guard = match self.config.traversal {
            TraversalMode::Locked => Some(guard),
            TraversalMode::Snapshot => {
                drop(guard);
                None
            }
        };

        Traversal {
            _guard: guard,
            children,
        }
    }

    fn checkpoint(
        &self,
        cancel: &CancellationToken,
        op: &'static str,
        child: &str,
    ) -> Result<(), IntentError> {
        if !self.config.check_cancellation {
            return Ok(());
        }
        ensure_active(cancel, &self.name).map_err(|err| {
            tracing::warn!(intent = %self.name, op, next = %child, "cancelled, skipping remaining children");
            err
        })
    }

    fn child_failed(&self, op: &'static str, child: &str, err: IntentError) -> IntentError {
        tracing::debug!(intent = %self.name, op, child = %child, error = %err, "child failed");
        err
    }
}

#[async_trait::async_trait]
impl<M, C> Intent<M> for CompositeIntent<M, C>
where
    M: ?Sized + Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
{
    async fn deploy(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        labels: &Labels,
    ) -> Result<(), IntentError> {
        let traversal = self.traverse().await;
        for (name, child) in &traversal.children {
            self.checkpoint(cancel, "deploy", name)?;
            tracing::debug!(intent = %self.name, child = %name, "deploy");
            child
                .deploy(cancel, resource, labels)
                .await
                .map_err(|err| self.child_failed("deploy", name, err))?;
        }
        Ok(())
    }

    async fn destroy(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        labels: &Labels,
    ) -> Result<(), IntentError> {
        let traversal = self.traverse().await;
        for (name, child) in &traversal.children {
            self.checkpoint(cancel, "destroy", name)?;
            tracing::debug!(intent = %self.name, child = %name, "destroy");
            child
                .destroy(cancel, resource, labels)
                .await
                .map_err(|err| self.child_failed("destroy", name, err))?;
        }
        Ok(())
    }

    async fn list(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        mut inventory: Inventory,
    ) -> Result<Inventory, IntentError> {
        let traversal = self.traverse().await;
        for (name, child) in &traversal.children {
            self.checkpoint(cancel, "list", name)?;
            tracing::debug!(intent = %self.name, child = %name, known = inventory.len(), "list");
            inventory = child
                .list(cancel, resource, inventory)
                .await
                .map_err(|err| self.child_failed("list", name, err))?;
        }
        Ok(inventory)
    }

    async fn validate(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        mut inventory: Inventory,
    ) -> Result<Inventory, IntentError> {
        let traversal = self.traverse().await;
        for (name, child) in &traversal.children {
            self.checkpoint(cancel, "validate", name)?;
            tracing::debug!(intent = %self.name, child = %name, known = inventory.len(), "validate");
            inventory = child
                .validate(cancel, resource, inventory)
                .await
                .map_err(|err| self.child_failed("validate", name, err))?;
        }
        Ok(inventory)
    }

    async fn delete(
        &self,
        cancel: &CancellationToken,
        resource: &M,
        inventory: &Inventory,
    ) -> Result<(), IntentError> {
        let traversal = self.traverse().await;
        for (name, child) in &traversal.children {
            self.checkpoint(cancel, "delete", name)?;
            tracing::debug!(intent = %self.name, child = %name, "delete");
            child
                .delete(cancel, resource, inventory)
                .await
                .map_err(|err| self.child_failed("delete", name, err))?;
        }
        Ok(())
    }

    async fn data(&self) -> IntentData {
        let traversal = self.traverse().await;
        let mut data = BTreeMap::new();
        for (name, child) in &traversal.children {
            data.insert(name.clone(), child.data().await);
        }
        tracing::trace!(intent = %self.name, children = data.len(), "collected data");
        IntentData::Composite(data)
    }
}

impl<M, C> fmt::Debug for CompositeIntent<M, C>
where
    M: ?Sized + Send + Sync + 'static,
    C: ?Sized + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CompositeIntent");
        s.field("name", &self.name).field("config", &self.config);
        // Skip the count rather than block while a traversal holds the guard.
        match self.children.try_lock() {
            Ok(children) => s.field("children", &children.len()),
            Err(_) => s.field("children", &"<locked>"),
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_test_utils::{ProbeIntent, TestResource};
    use serde_json::json;

    type Composite = CompositeIntent<TestResource, ()>;

    fn composite(name: &str) -> Composite {
        CompositeIntent::new(name, Arc::new(()))
    }

    #[tokio::test]
    async fn composite_new_empty() {
        let root = composite("root");
        assert_eq!(root.name(), "root");
        assert!(root.is_empty().await);
        assert_eq!(root.len().await, 0);
        assert_eq!(root.config(), CompositeConfig::default());
    }

    #[tokio::test]
    async fn add_child_keeps_first_registration() {
        let root = composite("root");
        let first: SharedIntent<TestResource> =
            Arc::new(ProbeIntent::new("a").with_data(json!("first")));
        let second: SharedIntent<TestResource> =
            Arc::new(ProbeIntent::new("a").with_data(json!("second")));

        let registered = root.add_child("a", Arc::clone(&first)).await;
        assert!(Arc::ptr_eq(&registered, &first));

        let registered = root.add_child("a", second).await;
        assert!(Arc::ptr_eq(&registered, &first));

        assert_eq!(root.len().await, 1);
        assert_eq!(root.child_data("a").await.unwrap(), IntentData::leaf("first"));
    }

    #[tokio::test]
    async fn register_reports_status() {
        let root = composite("root");

        let created = root.register("a", Arc::new(ProbeIntent::new("a"))).await;
        assert!(created.is_created());

        let existing = root.register("a", Arc::new(ProbeIntent::new("a"))).await;
        assert!(!existing.is_created());
        assert!(Arc::ptr_eq(created.child(), existing.child()));
        assert_eq!(format!("{existing:?}"), "Existing");
    }

    #[tokio::test]
    async fn add_child_with_only_initialises_missing_names() {
        let root = composite("root");
        let mut built = Vec::new();

        for _ in 0..3 {
            root.add_child_with("a", |_client, name| {
                built.push(name.to_string());
                Arc::new(ProbeIntent::new(name))
            })
            .await;
        }

        assert_eq!(built, vec!["a".to_string()]);
        assert_eq!(root.child_names().await, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn add_child_with_passes_shared_client() {
        let client = Arc::new(());
        let root: Composite = CompositeIntent::new("root", Arc::clone(&client));

        root.add_child_with("a", |shared, name| {
            assert!(Arc::ptr_eq(shared, &client));
            Arc::new(ProbeIntent::new(name))
        })
        .await;

        assert!(root.child("a").await.is_some());
    }

    #[tokio::test]
    async fn child_data_unknown_name() {
        let root = composite("root");
        root.add_child("a", Arc::new(ProbeIntent::new("a"))).await;

        let err = root.child_data("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(
            err,
            IntentError::ChildNotFound { ref intent, ref child } if intent == "root" && child == "missing"
        ));
    }

    #[tokio::test]
    async fn data_is_keyed_by_child_name() {
        let root = composite("root");
        root.add_child("a", Arc::new(ProbeIntent::new("a").with_data(json!("X"))))
            .await;
        root.add_child("b", Arc::new(ProbeIntent::new("b").with_data(json!("Y"))))
            .await;

        let data = root.data().await;
        assert_eq!(data.to_json(), json!({ "a": "X", "b": "Y" }));
    }

    #[tokio::test]
    async fn empty_composite_operations_succeed() {
        let root = composite("root");
        let cancel = CancellationToken::new();
        let resource = TestResource::new("device");

        assert!(root.deploy(&cancel, &resource, &Labels::new()).await.is_ok());
        assert!(root.destroy(&cancel, &resource, &Labels::new()).await.is_ok());
        assert!(root.delete(&cancel, &resource, &Inventory::new()).await.is_ok());

        let listed = root.list(&cancel, &resource, Inventory::new()).await.unwrap();
        assert!(listed.is_empty());
        assert_eq!(root.data().await, IntentData::Composite(BTreeMap::new()));
    }

    #[tokio::test]
    async fn debug_shows_child_count() {
        let root = composite("root");
        root.add_child("a", Arc::new(ProbeIntent::new("a"))).await;

        let debug = format!("{root:?}");
        assert!(debug.contains("\"root\""));
        assert!(debug.contains("children: 1"));
    }
}
