//! Intent Composite
//!
//! Tree container for intents.
//!
//! # Core Concepts
//!
//! - [`CompositeIntent`]: owns named children and fans lifecycle operations
//!   out to them, failing fast on the first child error
//! - [`Registration`]: whether a registration inserted a new child
//! - [`CompositeConfig`] / [`TraversalMode`]: guard policy and cancellation
//!   checks for a composite
//! - [`ResourceIntent`]: leaf handing its operations to a
//!   [`ResourceBackend`](intent_core::ResourceBackend)
//!
//! # Example
//!
//! ```rust,ignore
//! use intent_composite::{BackendComposite, ResourceIntent};
//! use intent_core::{Intent, Labels, ResourceKey};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let backend = Arc::new(DeviceBackend::connect(..)?);
//! let root: BackendComposite<DeviceBackend> = BackendComposite::new("fabric", Arc::clone(&backend));
//!
//! root.add_child(
//!     "eth0",
//!     Arc::new(ResourceIntent::new(Arc::clone(&backend), ResourceKey::new("Interface", "eth0"), spec)),
//! )
//! .await;
//!
//! root.deploy(&CancellationToken::new(), &device, &Labels::new()).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod composite;
mod config;
mod resource;

// Re-exports
pub use composite::{CompositeIntent, Registration};
pub use config::{CompositeConfig, TraversalMode};
pub use resource::ResourceIntent;

/// Composite whose client is the backend its leaves use
pub type BackendComposite<B> =
    CompositeIntent<<B as intent_core::ResourceBackend>::Resource, B>;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building intent trees
    pub use crate::{
        BackendComposite, CompositeConfig, CompositeIntent, Registration, ResourceIntent,
        TraversalMode,
    };
    pub use intent_core::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
