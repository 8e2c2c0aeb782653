//! Intent Core
//!
//! Contract shared by every node of an intent tree:
//! - [`Intent`]: lifecycle operations (deploy, destroy, list, validate,
//!   delete) plus data access
//! - [`Inventory`]: kind -> identifiers accumulator threaded through list and
//!   validate
//! - [`IntentData`]: opaque leaf values aggregated by composites
//! - [`ResourceBackend`]: the collaborator that leaves hand real work to
//! - [`IntentError`]: the error type propagated unchanged up the tree
//!
//! # Example
//!
//! ```rust,ignore
//! use intent_core::{ensure_active, Intent, IntentData, IntentError, Inventory, Labels};
//! use tokio_util::sync::CancellationToken;
//!
//! struct Vlan { id: u16 }
//!
//! #[async_trait::async_trait]
//! impl Intent<Device> for Vlan {
//!     async fn deploy(&self, cancel: &CancellationToken, device: &Device, labels: &Labels)
//!         -> Result<(), IntentError>
//!     {
//!         ensure_active(cancel, "vlan")?;
//!         device.push_vlan(self.id, labels).await
//!     }
//!     // ...
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod data;
pub mod error;
pub mod intent;
pub mod inventory;
pub mod key;

// Re-exports
pub use backend::ResourceBackend;
pub use data::IntentData;
pub use error::{BackendError, IntentError};
pub use intent::{ensure_active, Intent, Labels, SharedIntent};
pub use inventory::Inventory;
pub use key::ResourceKey;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for implementing intents
    pub use crate::{
        ensure_active, BackendError, Intent, IntentData, IntentError, Inventory, Labels,
        ResourceBackend, ResourceKey, SharedIntent,
    };
    pub use tokio_util::sync::CancellationToken;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
