//! In-memory preference store.
//!
//! This implementation is NOT durable - data is lost on process exit.
//! Use for testing and development only.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::store::PreferenceStore;

/// In-memory implementation of PreferenceStore.
///
/// Uses a BTreeMap for ordered key iteration and RwLock for concurrency.
/// Clones share the same underlying map.
#[derive(Clone)]
pub struct MemoryPreferences {
    namespace: String,
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryPreferences {
    /// Create a new empty namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Get the number of entries in the namespace.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the namespace is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// All keys, in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data.write().remove(key);
        Ok(())
    }
}
