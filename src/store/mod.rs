//! Collection storage
//!
//! A `CollectionStore` holds the two guestbook collections. Two backends exist:
//! local JSON files next to the site, and files in a remote repository reached
//! through the GitHub contents API. Both hand out an opaque version token with
//! each read so that a write can be rejected when the content moved on.

pub mod codec;
mod error;
pub mod local;
pub mod remote;

use async_trait::async_trait;
use serde_json::Value;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use remote::RemoteStore;

use crate::collection::Collection;
use crate::logger;

/// Opaque version of a stored collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Records of a collection together with the version they were read at
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub records: Vec<Value>,
    /// `None` when the collection does not exist yet
    pub version: Option<VersionToken>,
}

impl Snapshot {
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            version: None,
        }
    }
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Human-readable backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Load every record of `collection`
    async fn read_collection(&self, collection: Collection) -> StoreResult<Snapshot>;

    /// Replace the stored records
    ///
    /// `expected` is the version the records were derived from; `None` means the
    /// collection is being created. Returns the new version when the backend
    /// reports one.
    async fn write_collection(
        &self,
        collection: Collection,
        records: &[Value],
        expected: Option<&VersionToken>,
    ) -> StoreResult<Option<VersionToken>>;

    /// How many times an append is retried after a write conflict
    fn max_conflict_retries(&self) -> u32 {
        0
    }

    /// Append one record at the tail
    ///
    /// Re-reads and retries on `StoreError::Conflict` up to
    /// `max_conflict_retries` times.
    async fn append_record(
        &self,
        collection: Collection,
        record: Value,
    ) -> StoreResult<Option<VersionToken>> {
        let max_retries = self.max_conflict_retries();
        let mut attempt = 0;
        loop {
            let Snapshot {
                mut records,
                version,
            } = self.read_collection(collection).await?;
            records.push(record.clone());

            match self
                .write_collection(collection, &records, version.as_ref())
                .await
            {
                Err(err) if err.is_conflict() && attempt < max_retries => {
                    attempt += 1;
                    logger::log_conflict_retry(collection.name(), attempt, max_retries);
                }
                result => return result,
            }
        }
    }
}
