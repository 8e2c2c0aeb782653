use dashmap::DashMap;
use intent_core::{Intent, IntentData, IntentError, Inventory, Labels};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Lifecycle operation recorded by [`ProbeIntent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Deploy,
    Destroy,
    List,
    Validate,
    Delete,
}

/// Shared record of probe names, one entry per lifecycle call, in call order
pub type VisitLog = Arc<Mutex<Vec<String>>>;

/// Two-way rendezvous between a test and a probe parked inside `deploy`
#[derive(Debug, Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wait until a probe has entered the gate
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the parked probe continue
    pub fn open(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Invocation-counting leaf double
///
/// Works for any resource handle type. Every lifecycle call is counted and,
/// when a [`VisitLog`] is attached, appended to it.
#[derive(Debug)]
pub struct ProbeIntent {
    name: String,
    data: serde_json::Value,
    fail_on: HashSet<Op>,
    contributes: Vec<(String, String)>,
    log: Option<VisitLog>,
    gate: Option<Arc<Gate>>,
    cancel_on_visit: Option<CancellationToken>,
    calls: DashMap<Op, usize>,
    seen_sizes: Mutex<Vec<usize>>,
    seen_labels: Mutex<Vec<Labels>>,
}

impl ProbeIntent {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            data: serde_json::Value::String(name.clone()),
            name,
            fail_on: HashSet::new(),
            contributes: Vec::new(),
            log: None,
            gate: None,
            cancel_on_visit: None,
            calls: DashMap::new(),
            seen_sizes: Mutex::new(Vec::new()),
            seen_labels: Mutex::new(Vec::new()),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    pub fn failing_on(mut self, op: Op) -> Self {
        self.fail_on.insert(op);
        self
    }

    /// Add `(kind, id)` to the inventory on list and validate
    pub fn contributing(mut self, kind: impl Into<String>, id: impl Into<String>) -> Self {
        self.contributes.push((kind.into(), id.into()));
        self
    }

    pub fn with_log(mut self, log: VisitLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Park inside `deploy` until the gate is opened
    pub fn with_gate(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Cancel `token` whenever this probe is visited
    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_visit = Some(token);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.get(&op).map_or(0, |count| *count)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| *entry.value()).sum()
    }

    /// Inventory sizes handed to list/validate, in call order
    pub fn seen_inventory_sizes(&self) -> Vec<usize> {
        self.seen_sizes.lock().clone()
    }

    /// Label sets handed to deploy/destroy, in call order
    pub fn seen_labels(&self) -> Vec<Labels> {
        self.seen_labels.lock().clone()
    }

    async fn visit(&self, op: Op) -> Result<(), IntentError> {
        *self.calls.entry(op).or_insert(0) += 1;
        if let Some(log) = &self.log {
            log.lock().push(self.name.clone());
        }
        if let Some(token) = &self.cancel_on_visit {
            token.cancel();
        }
        if op == Op::Deploy {
            if let Some(gate) = &self.gate {
                gate.pass().await;
            }
        }
        if self.fail_on.contains(&op) {
            return Err(IntentError::failed(
                self.name.as_str(),
                format!("injected {op:?} failure"),
            ));
        }
        Ok(())
    }

    async fn accumulate(&self, op: Op, mut inventory: Inventory) -> Result<Inventory, IntentError> {
        self.seen_sizes.lock().push(inventory.len());
        self.visit(op).await?;
        for (kind, id) in &self.contributes {
            inventory.insert(kind.as_str(), id.as_str());
        }
        Ok(inventory)
    }
}

#[async_trait::async_trait]
impl<M> Intent<M> for ProbeIntent
where
    M: ?Sized + Send + Sync + 'static,
{
    async fn deploy(
        &self,
        _cancel: &CancellationToken,
        _resource: &M,
        labels: &Labels,
    ) -> Result<(), IntentError> {
        self.seen_labels.lock().push(labels.clone());
        self.visit(Op::Deploy).await
    }

    async fn destroy(
        &self,
        _cancel: &CancellationToken,
        _resource: &M,
        labels: &Labels,
    ) -> Result<(), IntentError> {
        self.seen_labels.lock().push(labels.clone());
        self.visit(Op::Destroy).await
    }

    async fn list(
        &self,
        _cancel: &CancellationToken,
        _resource: &M,
        inventory: Inventory,
    ) -> Result<Inventory, IntentError> {
        self.accumulate(Op::List, inventory).await
    }

    async fn validate(
        &self,
        _cancel: &CancellationToken,
        _resource: &M,
        inventory: Inventory,
    ) -> Result<Inventory, IntentError> {
        self.accumulate(Op::Validate, inventory).await
    }

    async fn delete(
        &self,
        _cancel: &CancellationToken,
        _resource: &M,
        _inventory: &Inventory,
    ) -> Result<(), IntentError> {
        self.visit(Op::Delete).await
    }

    async fn data(&self) -> IntentData {
        IntentData::Leaf(self.data.clone())
    }
}
