//! Persisted per-user module preferences (depth, language, stage filter).

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Namespace of every key stored by this module.
pub const KEY_PREFIX: &str = "moduleData.workspaces_admin";

pub const DEPTH: &str = "depth";
pub const LANGUAGE: &str = "language";
pub const STAGE: &str = "stage";

/// Full storage key for a preference name.
pub fn storage_key(name: &str) -> String {
    format!("{KEY_PREFIX}.{name}")
}

/// Key/value store for user preferences.
#[async_trait]
pub trait ModuleDataStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String);
}

/// Process-local store. Preferences live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModuleDataStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        self.values.write().await.insert(key.to_string(), value);
    }
}
