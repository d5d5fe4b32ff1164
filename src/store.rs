//! PreferenceStore trait - the abstraction over persistent preference namespaces.
//!
//! A namespace is a flat string-to-string mapping:
//! - keys are unique within a namespace
//! - values are plain strings, absence is `None`
//! - writes overwrite silently, removing an absent key is a no-op
//!
//! Keys and values are not validated; any string, including the empty
//! string, is accepted.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Namespace used for rollout preferences when the host does not pick one.
pub const DEFAULT_NAMESPACE: &str = "CodePushPrefs";

/// A named, persistent key-value namespace.
///
/// All backends (SQLite, memory) implement this trait. Each operation is a
/// single atomic mapping update; the last writer wins per key.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Name of the namespace this store operates on.
    fn namespace(&self) -> &str;

    /// Get the value stored under `key`.
    ///
    /// Returns `None` if the key has never been set or was removed.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`.
    ///
    /// Returns `Ok(())` if the key was removed or didn't exist.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check if a key is present.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Get a value and deserialize it as JSON.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Store a JSON-encoded value.
    async fn set_json<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw).await
    }
}
