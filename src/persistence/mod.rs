//! Persistence handle shared with route units.
//!
//! # Design Decisions
//! - Route units only see `Arc<dyn Persistence>`; the backing store is swappable
//! - The handle is safe for concurrent use; callers never lock around it
//! - Operations before `connect()` fail with `NotConnected`

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;

/// Errors raised by a persistence backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("persistence IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("persistence handle is not connected")]
    NotConnected,
}

/// Key/value connection handle.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Open the connection. Called once during bootstrap.
    async fn connect(&self) -> Result<(), PersistenceError>;

    async fn get(&self, key: &str) -> Result<Option<Value>, PersistenceError>;

    /// Store `value`, returning the previous value if any.
    async fn put(&self, key: &str, value: Value) -> Result<Option<Value>, PersistenceError>;

    /// Remove `key`, returning whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, PersistenceError>;

    /// All keys, sorted.
    async fn keys(&self) -> Result<Vec<String>, PersistenceError>;

    /// Write buffered state to durable storage, if the backend has any.
    async fn flush(&self) -> Result<(), PersistenceError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}
