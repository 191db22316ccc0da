use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Observer for key-value store changes.
#[async_trait]
pub trait StorageObserver: Send + Sync {
    /// Called after a write, with every key the write touched.
    async fn on_keys_changed(&self, keys: &[String]);
}

/// The external key-value store the settings and the login cache live in.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> io::Result<Option<Value>>;

    async fn set_many(&self, entries: Vec<(String, Value)>) -> io::Result<()>;

    async fn set(&self, key: &str, value: Value) -> io::Result<()> {
        self.set_many(vec![(key.to_string(), value)]).await
    }

    async fn subscribe(&self, observer: Arc<dyn StorageObserver>);
}

/// File-backed store, one JSON file per key.
pub struct LocalStorage {
    storage_path: PathBuf,
    observers: Mutex<Vec<Arc<dyn StorageObserver>>>,
}

impl LocalStorage {
    pub fn new(storage_path: &Path) -> Self {
        Self {
            storage_path: storage_path.to_path_buf(),
            observers: Mutex::new(Vec::new()),
        }
    }

    fn key_file(&self, key: &str) -> PathBuf {
        self.storage_path.join(format!("{}.json", key))
    }

    async fn notify(&self, keys: &[String]) {
        let observers = self.observers.lock().await;
        for observer in observers.iter() {
            observer.on_keys_changed(keys).await;
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn get(&self, key: &str) -> io::Result<Option<Value>> {
        match tokio::fs::read(self.key_file(key)).await {
            Ok(data) => match serde_json::from_slice(&data) {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    warn!(key, "discarding unreadable stored value: {err}");
                    Ok(None)
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.storage_path).await?;
        let mut keys = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let data = serde_json::to_vec(&value)?;
            tokio::fs::write(self.key_file(&key), data).await?;
            keys.push(key);
        }
        debug!(?keys, "storage keys written");
        self.notify(&keys).await;
        Ok(())
    }

    async fn subscribe(&self, observer: Arc<dyn StorageObserver>) {
        self.observers.lock().await.push(observer);
    }
}
