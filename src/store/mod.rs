//! Key-value persistence
//!
//! A small asynchronous store for whole JSON values. Two backends exist: a
//! JSON document on disk and an in-process map. Callers normally go through
//! [`Persisted`], which makes every read and write best-effort and queues
//! writes to a background [`StoreWriter`].

pub mod file;
pub mod memory;
pub mod persisted;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use persisted::{Persisted, StoreWriter};

/// Key under which the current story is stored
pub const CURRENT_STORY_KEY: &str = "current-story";
/// Key under which the question-id to answer map is stored
pub const USER_ANSWERS_KEY: &str = "user-answers";

/// Errors from a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Asynchronous get/set/delete of JSON values by string key
///
/// Last write wins. There are no transactions and values are always read
/// and written whole.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value under `key`
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `key`; removing an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// All keys currently stored, sorted
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}
