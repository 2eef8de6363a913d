//! Local file backend
//!
//! Each collection is a pretty-printed JSON array in its own file. A missing
//! file is created as `[]` on first read. Appends hold a per-collection lock
//! across read, append and write so concurrent submissions are never lost.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use super::codec;
use super::{CollectionStore, Snapshot, StoreError, StoreResult, VersionToken};
use crate::collection::Collection;
use crate::config::StorageConfig;

const EMPTY_COLLECTION: &str = "[]\n";

struct CollectionFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CollectionFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }
}

/// Collections stored as JSON files on local disk
pub struct LocalStore {
    wishes: CollectionFile,
    rsvp: CollectionFile,
}

impl LocalStore {
    pub fn new(wishes_path: impl Into<PathBuf>, rsvp_path: impl Into<PathBuf>) -> Self {
        Self {
            wishes: CollectionFile::new(wishes_path.into()),
            rsvp: CollectionFile::new(rsvp_path.into()),
        }
    }

    /// Store with file names from `storage`, resolved against `root`
    pub fn in_dir(root: &Path, storage: &StorageConfig) -> Self {
        Self::new(root.join(&storage.wishes_file), root.join(&storage.rsvp_file))
    }

    const fn file(&self, collection: Collection) -> &CollectionFile {
        match collection {
            Collection::Wishes => &self.wishes,
            Collection::Rsvp => &self.rsvp,
        }
    }

    /// Read raw bytes, creating the file as an empty array when absent
    async fn load_bytes(path: &Path) -> StoreResult<Vec<u8>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(path, EMPTY_COLLECTION)
                    .await
                    .map_err(|e| StoreError::io(path, e))?;
                Ok(EMPTY_COLLECTION.as_bytes().to_vec())
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn read_unlocked(path: &Path) -> StoreResult<Snapshot> {
        let bytes = Self::load_bytes(path).await?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(Snapshot {
            records: codec::parse_records(&text, &path.display().to_string()),
            version: Some(content_version(&bytes)),
        })
    }

    async fn write_unlocked(path: &Path, records: &[Value]) -> StoreResult<VersionToken> {
        let text = codec::render_records(records)?;
        fs::write(path, &text)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        Ok(content_version(text.as_bytes()))
    }
}

#[async_trait]
impl CollectionStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn read_collection(&self, collection: Collection) -> StoreResult<Snapshot> {
        let file = self.file(collection);
        let _guard = file.lock.lock().await;
        Self::read_unlocked(&file.path).await
    }

    /// Used by callers writing directly; appends go through `append_record`,
    /// which keeps the lock across read and write.
    async fn write_collection(
        &self,
        collection: Collection,
        records: &[Value],
        expected: Option<&VersionToken>,
    ) -> StoreResult<Option<VersionToken>> {
        let file = self.file(collection);
        let _guard = file.lock.lock().await;

        if let Some(expected) = expected {
            let current = match fs::read(&file.path).await {
                Ok(bytes) => Some(content_version(&bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => return Err(StoreError::io(&file.path, e)),
            };
            if current.as_ref() != Some(expected) {
                return Err(StoreError::Conflict {
                    path: file.path.display().to_string(),
                });
            }
        }

        Self::write_unlocked(&file.path, records).await.map(Some)
    }

    async fn append_record(
        &self,
        collection: Collection,
        record: Value,
    ) -> StoreResult<Option<VersionToken>> {
        let file = self.file(collection);
        let _guard = file.lock.lock().await;

        let mut snapshot = Self::read_unlocked(&file.path).await?;
        snapshot.records.push(record);
        Self::write_unlocked(&file.path, &snapshot.records)
            .await
            .map(Some)
    }
}

/// Hash of the stored bytes, in the same form as a weak `ETag`
fn content_version(content: &[u8]) -> VersionToken {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    VersionToken::new(format!("{:x}", hasher.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn store_in(dir: &Path) -> LocalStore {
        LocalStore::new(dir.join("wishes.json"), dir.join("rsvp.json"))
    }

    #[tokio::test]
    async fn test_first_read_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let snapshot = store.read_collection(Collection::Wishes).await.unwrap();
        assert!(snapshot.records.is_empty());
        assert!(snapshot.version.is_some());

        let on_disk = std::fs::read_to_string(dir.path().join("wishes.json")).unwrap();
        assert_eq!(on_disk, "[]\n");
        assert!(!dir.path().join("rsvp.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rsvp.json"), "{\"oops\": ").unwrap();
        let store = store_in(dir.path());

        let snapshot = store.read_collection(Collection::Rsvp).await.unwrap();
        assert!(snapshot.records.is_empty());

        store
            .append_record(Collection::Rsvp, json!({"name": "Minh", "attendance": "yes"}))
            .await
            .unwrap();
        let snapshot = store.read_collection(Collection::Rsvp).await.unwrap();
        assert_eq!(snapshot.records.len(), 1);
    }

    #[tokio::test]
    async fn test_appends_keep_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        for i in 0..5 {
            store
                .append_record(
                    Collection::Wishes,
                    json!({"name": format!("guest-{i}"), "content": "hi"}),
                )
                .await
                .unwrap();
        }

        let records = store.read_collection(Collection::Wishes).await.unwrap().records;
        let names: Vec<_> = records.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["guest-0", "guest-1", "guest-2", "guest-3", "guest-4"]);

        let text = std::fs::read_to_string(dir.path().join("wishes.json")).unwrap();
        assert!(text.starts_with("[\n  {"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(dir.path()));

        let tasks: Vec<_> = (0..25)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append_record(Collection::Wishes, json!({"name": i, "content": "x"}))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let snapshot = store.read_collection(Collection::Wishes).await.unwrap();
        assert_eq!(snapshot.records.len(), 25);
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let stale = store.read_collection(Collection::Wishes).await.unwrap();
        store
            .append_record(Collection::Wishes, json!({"name": "a", "content": "b"}))
            .await
            .unwrap();

        let err = store
            .write_collection(Collection::Wishes, &[], stale.version.as_ref())
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let fresh = store.read_collection(Collection::Wishes).await.unwrap();
        let next = store
            .write_collection(Collection::Wishes, &fresh.records, fresh.version.as_ref())
            .await
            .unwrap();
        assert_eq!(next, fresh.version);
    }
}
