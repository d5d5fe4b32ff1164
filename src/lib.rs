//! # codepush-native
//!
//! Host-side building blocks of a live-update client:
//!
//! - **Client configuration**: [`ConfigBuilder`] and [`ClientConfig::from_options`]
//!   assemble an immutable [`ClientConfig`] with injected [`ServiceDefaults`]
//! - **Preference storage**: [`PreferenceStore`] namespaces backed by SQLite
//!   or memory
//! - **Scripting bridge**: [`RolloutStorage`] exposes a namespace as
//!   `getItem` / `setItem` / `removeItem`
//! - **Release history**: seed, extend and patch the published release list
//! - **Release versioning**: decide whether an update is mandatory or must be
//!   rolled back
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use codepush_native::{RolloutStorage, SqlitePreferences, DEFAULT_NAMESPACE};
//!
//! #[tokio::main]
//! async fn main() -> codepush_native::Result<()> {
//!     let prefs = SqlitePreferences::open("prefs.db", DEFAULT_NAMESPACE).await?;
//!     let storage = RolloutStorage::spawn(Arc::new(prefs));
//!
//!     storage.set_item("rollout", "50");
//!     let value = storage.get_item("rollout").await?;
//!     println!("rollout = {:?}", value);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use codepush_native::{ConfigBuilder, ServiceDefaults};
//!
//! let defaults = ServiceDefaults::from_env();
//! let config = ConfigBuilder::new(&defaults)
//!     .set_is_debug_mode(true)
//!     .set_public_key_resource_descriptor(12)
//!     .build();
//!
//! assert!(config.is_debug_mode());
//! assert_eq!(config.deployment_key(), "deprecated_deployment_key");
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod history;
pub mod memory;
pub mod sqlite;
pub mod store;
pub mod versioning;

// Re-export main types
pub use bridge::{PendingItem, RolloutStorage, MODULE_NAME};
pub use config::{
    ClientConfig, ClientOptions, ConfigBuilder, ServiceDefaults, DEFAULT_DEPLOYMENT_KEY,
    DEFAULT_SERVICE_URL,
};
pub use error::{CodePushError, Result};
pub use history::{ReleaseHistory, ReleaseInfo};
pub use memory::MemoryPreferences;
pub use sqlite::SqlitePreferences;
pub use store::{PreferenceStore, DEFAULT_NAMESPACE};
pub use versioning::{IncrementalVersioning, ReleaseVersioning, SemverVersioning};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::bridge::RolloutStorage;
    pub use crate::config::{ClientConfig, ConfigBuilder, ServiceDefaults};
    pub use crate::error::{CodePushError, Result};
    pub use crate::memory::MemoryPreferences;
    pub use crate::sqlite::SqlitePreferences;
    pub use crate::store::PreferenceStore;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_preferences_basic() {
        let prefs = MemoryPreferences::new(DEFAULT_NAMESPACE);

        prefs.set("rollout", "50").await.unwrap();
        assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("50"));
    }

    #[tokio::test]
    async fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<MemoryPreferences>();
        assert_send_sync::<SqlitePreferences>();
        assert_send_sync::<RolloutStorage>();
        assert_send_sync::<ClientConfig>();
    }
}
