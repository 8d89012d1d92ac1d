use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use super::error::BotResult;
use super::record::BotRecord;

pub type RecordMap = BTreeMap<String, BotRecord>;

/// Whole-document JSON store for bot records, keyed by bot id.
///
/// Every `load` reads the full file and every `save` rewrites it. Callers that
/// read-modify-write hold [`RecordStore::lock`] for the whole sequence so two
/// requests cannot interleave their updates.
pub struct RecordStore {
    path: PathBuf,
    txn: Mutex<()>,
}

impl RecordStore {
    /// Opens the store, creating the parent directory and an empty document if needed.
    pub async fn open<P: AsRef<Path>>(path: P) -> BotResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !path.exists() {
            info!("Initializing empty bot record store at {:?}", path);
            tokio::fs::write(&path, b"{}").await?;
        }
        Ok(Self {
            path,
            txn: Mutex::new(()),
        })
    }

    /// Serializes read-modify-write sequences against this store.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.txn.lock().await
    }

    pub async fn load(&self) -> BotResult<RecordMap> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&self.path, b"{}").await?;
                return Ok(RecordMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn save(&self, records: &RecordMap) -> BotResult<()> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bots::error::BotError;
    use chrono::Utc;

    fn sample(id: &str, owner: &str) -> BotRecord {
        BotRecord::new(
            id.to_string(),
            "bot".to_string(),
            owner.to_string(),
            PathBuf::from(format!("/tmp/{id}.py")),
            "py".to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn open_initializes_missing_file_as_empty_object() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("bots.json");
        let store = RecordStore::open(&path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_whole_document() {
        let tmp = tempfile::tempdir().unwrap();
        let store = RecordStore::open(tmp.path().join("bots.json")).await.unwrap();

        let mut records = RecordMap::new();
        records.insert("a".into(), sample("a", "alice"));
        records.insert("b".into(), sample("b", "bob"));
        store.save(&records).await.unwrap();

        records.remove("a");
        store.save(&records).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["b"].owner, "bob");
        assert!(!tmp.path().join("bots.json.tmp").exists());
    }

    #[tokio::test]
    async fn load_recreates_file_deleted_underneath() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bots.json");
        let store = RecordStore::open(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(store.load().await.unwrap().is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn corrupt_document_surfaces_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bots.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = RecordStore::open(&path).await.unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, BotError::Corrupt(_)));
    }
}
