//! In-memory store with an optional JSON snapshot file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::persistence::{Persistence, PersistenceError};

/// A thread-safe key/value store.
///
/// When a snapshot path is set, `connect` loads it (if the file exists) and
/// `flush` rewrites it.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, Value>>,
    snapshot_path: Option<PathBuf>,
    connected: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new(snapshot_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            snapshot_path,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn ensure_connected(&self) -> Result<(), PersistenceError> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(PersistenceError::NotConnected)
        }
    }

    fn snapshot(&self) -> BTreeMap<String, Value> {
        self.inner
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn connect(&self) -> Result<(), PersistenceError> {
        if let Some(path) = &self.snapshot_path {
            if tokio::fs::try_exists(path).await? {
                let content = tokio::fs::read_to_string(path).await?;
                let map: BTreeMap<String, Value> = serde_json::from_str(&content)?;
                for (k, v) in map {
                    self.inner.insert(k, v);
                }
                tracing::info!(path = ?path, entries = self.inner.len(), "Loaded persistence snapshot");
            }
        }
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        self.ensure_connected()?;
        Ok(self.inner.get(key).map(|r| r.value().clone()))
    }

    async fn put(&self, key: &str, value: Value) -> Result<Option<Value>, PersistenceError> {
        self.ensure_connected()?;
        Ok(self.inner.insert(key.to_string(), value))
    }

    async fn delete(&self, key: &str) -> Result<bool, PersistenceError> {
        self.ensure_connected()?;
        Ok(self.inner.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        self.ensure_connected()?;
        let mut keys: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }

    async fn flush(&self) -> Result<(), PersistenceError> {
        self.ensure_connected()?;
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&self.snapshot())?;
        tokio::fs::write(path, bytes).await?;
        tracing::debug!(path = ?path, entries = self.inner.len(), "Wrote persistence snapshot");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
