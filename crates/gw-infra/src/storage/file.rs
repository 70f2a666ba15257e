//! Handoff store backed by a single JSON object on disk.
//!
//! Survives a process restart the way session storage survives a page
//! redirect. Every mutation rewrites the whole file through a temporary
//! sibling followed by a rename.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use gw_core::ports::HandoffStorePort;
use tokio::sync::Mutex;
use tracing::debug;

type Entries = BTreeMap<String, String>;

pub struct FileHandoffStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileHandoffStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> anyhow::Result<Entries> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Entries::new()),
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("handoff file {} is corrupt", self.path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(err)
                .with_context(|| format!("failed to read handoff file {}", self.path.display())),
        }
    }

    async fn save(&self, entries: &Entries) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl HandoffStorePort for FileHandoffStore {
    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await?;
        debug!(key, "handoff entry stored");
        Ok(())
    }

    async fn take(&self, key: &str) -> anyhow::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let value = entries.remove(key);
        if value.is_some() {
            self.save(&entries).await?;
        }
        Ok(value)
    }

    async fn peek(&self, key: &str) -> anyhow::Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(key).cloned())
    }
}
