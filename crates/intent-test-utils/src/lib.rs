//! Testing utilities for intent tree workspace
//!
//! Shared test doubles, fixtures, and tracing setup.

#![allow(missing_docs)]

mod backend;
mod probe;

pub use backend::{Fault, MemoryBackend, StoredObject};
pub use probe::{Gate, Op, ProbeIntent, VisitLog};

use tracing_subscriber::EnvFilter;

/// Managed-resource handle used across tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResource {
    pub name: String,
}

impl TestResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Install a test-writer subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn labels(pairs: &[(&str, &str)]) -> intent_core::Labels {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}
