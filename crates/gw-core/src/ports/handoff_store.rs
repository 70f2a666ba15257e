//! Raw storage that survives a full-page navigation.

use async_trait::async_trait;

#[async_trait]
pub trait HandoffStorePort: Send + Sync {
    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Atomically reads and removes the value under `key`.
    async fn take(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn peek(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.take(key).await.map(|_| ())
    }
}
