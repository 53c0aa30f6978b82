//! History Store: every completed analysis, newest first, kept as one JSON
//! array under a single well-known key.
//!
//! Read-modify-write cycles within this process are serialised. Two processes
//! sharing the same backend can still overwrite each other's writes.

pub mod backend;
pub mod handlers;

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{error, warn};
use uuid::Uuid;

use crate::analysis::AnalysisReport;
use crate::extraction::ExtractedContent;

pub use backend::{BlobStore, StorageError};

pub const HISTORY_KEY: &str = "resume_analyzer_history_v1";

/// A persisted analysis: the report plus the upload it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResumeItem {
    pub id: String,
    /// Unix epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    pub thumbnail: String,
    #[serde(rename = "extractedText")]
    pub extracted_text: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

impl StoredResumeItem {
    pub fn new(content: ExtractedContent, report: AnalysisReport) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().timestamp_millis(),
            thumbnail: content.thumbnail,
            extracted_text: content.text,
            report,
        }
    }
}

pub struct HistoryStore {
    backend: Arc<dyn BlobStore>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn BlobStore>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Full list, newest first. A missing key, an unreadable backend, or a
    /// payload that is not a JSON array all yield an empty list. Entries that
    /// do not parse as items are skipped.
    pub async fn load_all(&self) -> Vec<StoredResumeItem> {
        let entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to load resume history: {e}");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping unreadable history entry {index}: {e}");
                    None
                }
            })
            .collect()
    }

    pub async fn get(&self, id: &str) -> Option<StoredResumeItem> {
        self.load_all().await.into_iter().find(|item| item.id == id)
    }

    /// Puts `item` at the front and persists the whole list. Entries this
    /// version cannot read are written back untouched.
    pub async fn save(&self, item: StoredResumeItem) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(0, serde_json::to_value(&item)?);
        self.persist(&entries).await
    }

    /// Drops every entry whose `id` is `id`. Unknown ids are not an error.
    pub async fn remove_by_id(&self, id: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.retain(|entry| entry.get("id").and_then(Value::as_str) != Some(id));
        self.persist(&entries).await
    }

    pub async fn clear_all(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.backend.remove(HISTORY_KEY).await
    }

    /// Raw array elements. Backend failures propagate so a write never
    /// replaces a list it could not read; a payload that is not a JSON array
    /// reads as empty.
    async fn read_entries(&self) -> Result<Vec<Value>, StorageError> {
        let Some(raw) = self.backend.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => Ok(entries),
            Ok(_) => {
                warn!("Ignoring resume history payload that is not a list");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!("Ignoring corrupt resume history payload: {e}");
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, entries: &[Value]) -> Result<(), StorageError> {
        let payload = serde_json::to_string(entries)?;
        self.backend.set(HISTORY_KEY, &payload).await
    }
}


#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::backend::{FileBlobStore, MemoryBlobStore};
    use super::test_items::item;
    use super::*;

    fn memory_store() -> (Arc<MemoryBlobStore>, HistoryStore) {
        let backend = Arc::new(MemoryBlobStore::new());
        (backend.clone(), HistoryStore::new(backend))
    }

    /// Reads succeed with nothing stored; every write fails.
    struct ReadOnlyBlobStore;

    #[async_trait]
    impl BlobStore for ReadOnlyBlobStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Worker("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_empty_when_key_absent() {
        let (_, store) = memory_store();
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_puts_newest_first() {
        let (_, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();
        store.save(item("b", 2)).await.unwrap();

        let all = store.load_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], item("b", 2));
        assert_eq!(all[1].id, "a");
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let (_, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();
        store.save(item("b", 2)).await.unwrap();

        store.remove_by_id("a").await.unwrap();
        let ids: Vec<String> = store.load_all().await.into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let (_, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();
        store.remove_by_id("missing").await.unwrap();
        assert_eq!(store.load_all().await, vec![item("a", 1)]);
    }

    #[tokio::test]
    async fn test_clear_all_twice() {
        let (_, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();

        store.clear_all().await.unwrap();
        assert!(store.load_all().await.is_empty());
        store.clear_all().await.unwrap();
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let (_, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();
        assert_eq!(store.get("a").await, Some(item("a", 1)));
        assert_eq!(store.get("z").await, None);
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_empty() {
        let (backend, store) = memory_store();
        backend.set(HISTORY_KEY, "{not json").await.unwrap();
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_list_payload_reads_as_empty() {
        let (backend, store) = memory_store();
        backend
            .set(HISTORY_KEY, &json!({ "id": "a" }).to_string())
            .await
            .unwrap();
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_over_corrupt_payload_recovers() {
        let (backend, store) = memory_store();
        backend.set(HISTORY_KEY, "garbage").await.unwrap();
        store.save(item("a", 1)).await.unwrap();
        assert_eq!(store.load_all().await, vec![item("a", 1)]);
    }

    async fn append_raw(backend: &MemoryBlobStore, entry: serde_json::Value) {
        let raw = backend.get(HISTORY_KEY).await.unwrap().unwrap();
        let mut entries: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        entries.push(entry);
        backend
            .set(HISTORY_KEY, &serde_json::to_string(&entries).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unreadable_entry_does_not_hide_the_rest() {
        let (backend, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();
        store.save(item("b", 2)).await.unwrap();
        append_raw(&backend, json!({ "id": "legacy", "createdAt": 0 })).await;

        let ids: Vec<String> = store.load_all().await.into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_save_keeps_valid_and_unreadable_entries() {
        let (backend, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();
        store.save(item("b", 2)).await.unwrap();
        append_raw(&backend, json!({ "id": "legacy", "createdAt": 0 })).await;

        store.save(item("c", 3)).await.unwrap();

        let ids: Vec<String> = store.load_all().await.into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let raw = backend.get(HISTORY_KEY).await.unwrap().unwrap();
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[3], json!({ "id": "legacy", "createdAt": 0 }));
    }

    #[tokio::test]
    async fn test_remove_by_id_reaches_unreadable_entries() {
        let (backend, store) = memory_store();
        store.save(item("a", 1)).await.unwrap();
        append_raw(&backend, json!({ "id": "legacy" })).await;

        store.remove_by_id("legacy").await.unwrap();
        store.remove_by_id("missing").await.unwrap();

        let raw = backend.get(HISTORY_KEY).await.unwrap().unwrap();
        let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["id"], "a");
    }

    #[tokio::test]
    async fn test_persisted_layout() {
        let (backend, store) = memory_store();
        store.save(item("a", 1_700_000_000_000)).await.unwrap();

        let raw = backend.get(HISTORY_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], "a");
        assert_eq!(first["createdAt"], 1_700_000_000_000_i64);
        assert_eq!(first["extractedText"], "Jane Doe\nRust");
        assert_eq!(first["overall_score"], 64.0);
        assert_eq!(first["sections"]["skills"]["score"], 11.0);
        assert!(first.get("report").is_none(), "report fields are flattened");
    }

    #[tokio::test]
    async fn test_write_failures_are_reported() {
        let store = HistoryStore::new(Arc::new(ReadOnlyBlobStore));
        assert!(store.save(item("a", 1)).await.is_err());
        assert!(store.remove_by_id("a").await.is_err());
        assert!(store.clear_all().await.is_err());
        assert!(store.load_all().await.is_empty());
    }

    /// Reads always fail; counts write attempts.
    #[derive(Default)]
    struct UnreadableBlobStore {
        writes: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl BlobStore for UnreadableBlobStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Worker("connection reset".to_string()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_read_does_not_overwrite_history() {
        let backend = Arc::new(UnreadableBlobStore::default());
        let store = HistoryStore::new(backend.clone());

        assert!(store.save(item("a", 1)).await.is_err());
        assert!(store.remove_by_id("a").await.is_err());
        assert_eq!(backend.writes.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_saves_are_not_lost() {
        let (_, store) = memory_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.save(item(&format!("id-{i}"), i)).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.load_all().await.len(), 16);
    }

    #[tokio::test]
    async fn test_file_backed_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = HistoryStore::new(Arc::new(FileBlobStore::new(dir.path())));
            store.save(item("a", 1)).await.unwrap();
        }
        let reopened = HistoryStore::new(Arc::new(FileBlobStore::new(dir.path())));
        assert_eq!(reopened.load_all().await, vec![item("a", 1)]);
    }

    #[test]
    fn test_new_item_copies_upload() {
        let content = ExtractedContent {
            text: "Jane".to_string(),
            thumbnail: "data:image/png;base64,AA==".to_string(),
        };
        let a = StoredResumeItem::new(content.clone(), AnalysisReport::fallback());
        let b = StoredResumeItem::new(content, AnalysisReport::fallback());
        assert_eq!(a.extracted_text, "Jane");
        assert_eq!(a.thumbnail, "data:image/png;base64,AA==");
        assert_ne!(a.id, b.id);
        assert!(a.created_at > 0);
    }
}
