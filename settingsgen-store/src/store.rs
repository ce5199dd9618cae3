//! Persistence backends for settings records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use settingsgen_common::Pretty;
use settingsgen_fields::SettingsRecord;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::error::{Result, StoreError};

/// Key-value storage holding one aggregate record per page id.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// The stored record, or `None` if the page was never saved.
    async fn get(&self, page_id: &str) -> Result<Option<SettingsRecord>>;

    /// Replace the stored record for `page_id`.
    async fn set(&self, page_id: &str, record: &SettingsRecord) -> Result<()>;
}

/// Reject ids that could escape a storage directory or collide on disk.
pub fn validate_page_id(page_id: &str) -> Result<()> {
    let valid = !page_id.is_empty()
        && page_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPageId {
            id: page_id.to_string(),
        })
    }
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, SettingsRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceStore for MemoryStore {
    async fn get(&self, page_id: &str) -> Result<Option<SettingsRecord>> {
        validate_page_id(page_id)?;
        Ok(self.records.read().await.get(page_id).cloned())
    }

    async fn set(&self, page_id: &str, record: &SettingsRecord) -> Result<()> {
        validate_page_id(page_id)?;
        self.records
            .write()
            .await
            .insert(page_id.to_string(), record.clone());
        Ok(())
    }
}

/// One `<page_id>.yaml` file per page under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, page_id: &str) -> PathBuf {
        self.root.join(format!("{page_id}.yaml"))
    }
}

#[async_trait]
impl PersistenceStore for FileStore {
    async fn get(&self, page_id: &str) -> Result<Option<SettingsRecord>> {
        validate_page_id(page_id)?;
        let path = self.record_path(page_id);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_yaml_ng::from_str::<SettingsRecord>(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "stored settings record is unreadable");
                Err(e.into())
            }
        }
    }

    async fn set(&self, page_id: &str, record: &SettingsRecord) -> Result<()> {
        validate_page_id(page_id)?;
        fs::create_dir_all(&self.root).await?;
        let path = self.record_path(page_id);
        let yaml = serde_yaml_ng::to_string(record)?;
        atomic_write(&path, yaml.as_bytes()).await?;
        debug!(page = page_id, record = %Pretty(record), "wrote settings record");
        Ok(())
    }
}

/// Write to a sibling temp file, then rename over the target.
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use settingsgen_fields::SettingValue;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    fn sample() -> SettingsRecord {
        let mut record = SettingsRecord::new();
        record.insert("volume", SettingValue::Number(7.5));
        record.insert("colors", SettingValue::from(vec!["red", "blue"]));
        record.insert("debug", SettingValue::Bool(true));
        record
    }

    #[test]
    fn test_validate_page_id() {
        assert!(validate_page_id("my_page-2").is_ok());
        for bad in ["", "../etc", "a/b", "a.b", "sp ace"] {
            assert!(
                matches!(validate_page_id(bad), Err(StoreError::InvalidPageId { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("demo").await.unwrap(), None);
        store.set("demo", &sample()).await.unwrap();
        assert_eq!(store.get("demo").await.unwrap(), Some(sample()));
        assert!(store.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_creates_directory_and_reads_back() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("nested").join("settings"));
        assert!(store.get("demo").await.unwrap().is_none());

        store.set("demo", &sample()).await.unwrap();
        assert!(store.record_path("demo").exists());
        assert_eq!(store.get("demo").await.unwrap(), Some(sample()));

        let leftovers: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp_"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.set("demo", &sample()).await.unwrap();

        let mut next = SettingsRecord::new();
        next.insert("volume", SettingValue::Number(1.0));
        store.set("demo", &next).await.unwrap();
        assert_eq!(store.get("demo").await.unwrap(), Some(next));
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_like_ids() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        let err = store.set("../escape", &sample()).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPageId { .. }));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_file_store_reports_corrupt_record() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        std::fs::write(store.record_path("demo"), "volume: [unclosed").unwrap();
        let err = store.get("demo").await.unwrap_err();
        assert!(matches!(err, StoreError::Yaml(_)));
        assert!(logs_contain("stored settings record is unreadable"));
    }
}
