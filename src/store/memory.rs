use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{CollectionStore, validate_name};

/// Process-local store; contents vanish on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn get(&self, name: &str) -> anyhow::Result<Option<serde_json::Value>> {
        validate_name(name)?;
        Ok(self.collections.read().await.get(name).cloned())
    }

    async fn put(&self, name: &str, value: &serde_json::Value) -> anyhow::Result<()> {
        validate_name(name)?;
        self.collections
            .write()
            .await
            .insert(name.to_owned(), value.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> anyhow::Result<bool> {
        validate_name(name)?;
        Ok(self.collections.write().await.remove(name).is_some())
    }

    async fn names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.collections.read().await.keys().cloned().collect())
    }
}
