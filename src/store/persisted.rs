//! Typed, best-effort access to one store entry
//!
//! Writes never block the caller. They are queued to a [`StoreWriter`] task
//! that applies them to the backend in the order they were made, so a slow
//! or stalled store delays only the disk, never the session.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::KeyValueStore;

/// One queued write
enum WriteOp {
    Set(&'static str, Value),
    Delete(&'static str),
    /// Answered once every earlier write has been attempted
    Flush(oneshot::Sender<()>),
}

/// Handle to the background task that applies writes to a store
#[derive(Clone)]
pub struct StoreWriter {
    store: Arc<dyn KeyValueStore>,
    ops: mpsc::UnboundedSender<WriteOp>,
}

impl StoreWriter {
    /// Start the writer task; needs a running tokio runtime
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (ops, mut queue) = mpsc::unbounded_channel();
        let backend = Arc::clone(&store);

        tokio::spawn(async move {
            while let Some(op) = queue.recv().await {
                match op {
                    WriteOp::Set(key, value) => {
                        if let Err(e) = backend.set(key, value).await {
                            tracing::warn!(key, "Failed to store: {}", e);
                        }
                    }
                    WriteOp::Delete(key) => {
                        if let Err(e) = backend.delete(key).await {
                            tracing::warn!(key, "Failed to delete: {}", e);
                        }
                    }
                    WriteOp::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("Store writer stopped");
        });

        Self { store, ops }
    }

    fn push(&self, op: WriteOp) {
        if self.ops.send(op).is_err() {
            tracing::warn!("Store writer is gone; write dropped");
        }
    }

    /// Wait until every write queued so far has been attempted
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.push(WriteOp::Flush(done));
        let _ = wait.await;
    }
}

/// One named value in a [`KeyValueStore`]
///
/// Persistence is best-effort: a failed or undecodable read yields the
/// caller's default, and failed writes are logged and dropped. In-memory
/// state stays the source of truth.
pub struct Persisted<T> {
    writer: StoreWriter,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Persisted<T> {
    fn clone(&self) -> Self {
        Self { writer: self.writer.clone(), key: self.key, _marker: PhantomData }
    }
}

impl<T: Serialize + DeserializeOwned> Persisted<T> {
    pub fn new(writer: &StoreWriter, key: &'static str) -> Self {
        Self { writer: writer.clone(), key, _marker: PhantomData }
    }

    /// Store key
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read the value, falling back to `default` on any failure
    ///
    /// Reads go straight to the backend and do not wait for queued writes.
    pub async fn load(&self, default: T) -> T {
        match self.writer.store.get(self.key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => decoded,
                Err(e) => {
                    tracing::warn!(key = self.key, "Ignoring undecodable stored value: {}", e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key = self.key, "Failed to load: {}", e);
                default
            }
        }
    }

    /// Queue a write of `value`
    pub fn save(&self, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.writer.push(WriteOp::Set(self.key, value)),
            Err(e) => tracing::warn!(key = self.key, "Failed to serialize: {}", e),
        }
    }

    /// Queue removal of the value
    pub fn clear(&self) {
        self.writer.push(WriteOp::Delete(self.key));
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::future;

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::store::{KeyValueStore, StoreError};

    /// A store whose writes never complete
    pub struct StalledStore;

    #[async_trait]
    impl KeyValueStore for StalledStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
            future::pending().await
        }
        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            future::pending().await
        }
        async fn keys(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }
}
