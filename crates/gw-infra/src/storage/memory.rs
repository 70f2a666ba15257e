use std::collections::HashMap;

use async_trait::async_trait;
use gw_core::ports::HandoffStorePort;
use tokio::sync::Mutex;

/// Handoff store that lives as long as the process.
#[derive(Default)]
pub struct MemoryHandoffStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryHandoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl HandoffStorePort for MemoryHandoffStore {
    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn take(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().await.remove(key))
    }

    async fn peek(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }
}
