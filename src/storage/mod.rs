//! Key-value storage port backing the local cache tier.
//!
//! Values are opaque strings; the local cache stores JSON arrays under fixed keys.

mod cache;
mod catalog;

pub use cache::*;
pub use catalog::*;

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::AppError;

/// Durable key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// In-process store, used headless and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per key under a directory.
pub struct FileStore {
    root: PathBuf,
    next_tmp: AtomicU64,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            next_tmp: AtomicU64::new(0),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::Storage(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        // Write then rename so readers never see a partial value. Each write
        // gets its own temp file.
        let tmp = self.root.join(format!(
            "{}.json.{}-{}.tmp",
            key,
            std::process::id(),
            self.next_tmp.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
