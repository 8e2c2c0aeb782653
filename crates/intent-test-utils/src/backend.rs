use crate::TestResource;
use dashmap::DashMap;
use intent_core::{BackendError, Labels, ResourceBackend, ResourceKey};
use parking_lot::Mutex;

/// Object held by [`MemoryBackend`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub spec: serde_json::Value,
    pub labels: Labels,
}

/// Failure injected for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Rejected,
    Unavailable,
}

/// In-memory [`ResourceBackend`] recording every call
///
/// `validate` rejects a `null` spec.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    objects: DashMap<ResourceKey, StoredObject>,
    faults: DashMap<ResourceKey, Fault>,
    calls: Mutex<Vec<(&'static str, ResourceKey)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `key` already exists
    pub fn seed(&self, key: ResourceKey, spec: serde_json::Value) {
        self.objects.insert(
            key,
            StoredObject {
                spec,
                labels: Labels::new(),
            },
        );
    }

    pub fn reject(&self, key: ResourceKey) {
        self.faults.insert(key, Fault::Rejected);
    }

    pub fn make_unavailable(&self, key: ResourceKey) {
        self.faults.insert(key, Fault::Unavailable);
    }

    pub fn get(&self, key: &ResourceKey) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// `(operation, key)` pairs in call order
    pub fn calls(&self) -> Vec<(&'static str, ResourceKey)> {
        self.calls.lock().clone()
    }

    fn record(&self, op: &'static str, key: &ResourceKey) -> Result<(), BackendError> {
        self.calls.lock().push((op, key.clone()));
        match self.faults.get(key).map(|fault| *fault) {
            Some(Fault::Rejected) => Err(BackendError::Rejected(format!("{op} {key}"))),
            Some(Fault::Unavailable) => Err(BackendError::Unavailable(format!("{op} {key}"))),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ResourceBackend for MemoryBackend {
    type Resource = TestResource;

    async fn apply(
        &self,
        _resource: &TestResource,
        key: &ResourceKey,
        spec: &serde_json::Value,
        labels: &Labels,
    ) -> Result<(), BackendError> {
        self.record("apply", key)?;
        self.objects.insert(
            key.clone(),
            StoredObject {
                spec: spec.clone(),
                labels: labels.clone(),
            },
        );
        Ok(())
    }

    async fn remove(
        &self,
        _resource: &TestResource,
        key: &ResourceKey,
        _labels: &Labels,
    ) -> Result<(), BackendError> {
        self.record("remove", key)?;
        self.objects.remove(key);
        Ok(())
    }

    async fn observe(&self, _resource: &TestResource, key: &ResourceKey) -> Result<bool, BackendError> {
        self.record("observe", key)?;
        Ok(self.objects.contains_key(key))
    }

    async fn validate(
        &self,
        _resource: &TestResource,
        key: &ResourceKey,
        spec: &serde_json::Value,
    ) -> Result<(), BackendError> {
        self.record("validate", key)?;
        if spec.is_null() {
            return Err(BackendError::Rejected(format!("empty spec for {key}")));
        }
        Ok(())
    }

    async fn delete(&self, _resource: &TestResource, key: &ResourceKey) -> Result<(), BackendError> {
        self.record("delete", key)?;
        self.objects.remove(key);
        Ok(())
    }
}
