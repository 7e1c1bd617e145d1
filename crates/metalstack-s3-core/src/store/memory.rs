//! In-memory object store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use metalstack_core::sorted_keys;
use parking_lot::RwLock;
use tracing::debug;

use super::{
    BucketInfo, BucketStore, ObjectInfo, ObjectStore, StoreError, StoreResult, StoredObject,
    compute_etag,
};

/// Object store that keeps every bucket and object in memory.
///
/// ```
/// use bytes::Bytes;
/// use metalstack_s3_core::store::{BucketStore, MemoryObjectStore, ObjectStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryObjectStore::new("owner");
/// store.create_bucket("state").await.unwrap();
/// let (bucket, info) = store.get_bucket("state").await.unwrap().unwrap();
/// assert_eq!(info.owner, "owner");
///
/// let object = bucket.put_object("config", Bytes::from("hello")).await.unwrap();
/// assert_eq!(object.size, 5);
/// # });
/// ```
#[derive(Debug)]
pub struct MemoryObjectStore {
    owner: String,
    buckets: DashMap<String, Arc<MemoryBucket>>,
}

impl MemoryObjectStore {
    /// Create an empty store whose buckets are owned by `owner`.
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            buckets: DashMap::new(),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        Ok(self
            .buckets
            .iter()
            .map(|entry| entry.value().info.clone())
            .collect())
    }

    async fn get_bucket(
        &self,
        name: &str,
    ) -> StoreResult<Option<(Arc<dyn BucketStore>, BucketInfo)>> {
        Ok(self.buckets.get(name).map(|entry| {
            let bucket = Arc::clone(entry.value());
            let info = bucket.info.clone();
            (bucket as Arc<dyn BucketStore>, info)
        }))
    }

    async fn create_bucket(&self, name: &str) -> StoreResult<BucketInfo> {
        match self.buckets.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists {
                bucket: name.to_owned(),
            }),
            Entry::Vacant(slot) => {
                let info = BucketInfo {
                    name: name.to_owned(),
                    creation_date: Utc::now(),
                    owner: self.owner.clone(),
                };
                slot.insert(Arc::new(MemoryBucket {
                    info: info.clone(),
                    objects: RwLock::new(HashMap::new()),
                }));
                debug!(bucket = %name, "created in-memory bucket");
                Ok(info)
            }
        }
    }
}

#[derive(Debug)]
struct MemoryBucket {
    info: BucketInfo,
    objects: RwLock<HashMap<String, StoredObject>>,
}

#[async_trait]
impl BucketStore for MemoryBucket {
    async fn list_objects(&self) -> StoreResult<Vec<ObjectInfo>> {
        let objects = self.objects.read();
        Ok(sorted_keys(&objects)
            .iter()
            .filter_map(|key| objects.get(key).map(|obj| obj.info.clone()))
            .collect())
    }

    async fn get_object(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        Ok(self.objects.read().get(key).cloned())
    }

    async fn put_object(&self, key: &str, data: Bytes) -> StoreResult<ObjectInfo> {
        let info = ObjectInfo {
            key: key.to_owned(),
            last_modified: Utc::now(),
            size: data.len() as u64,
            etag: Some(compute_etag(&data)),
        };
        self.objects.write().insert(
            key.to_owned(),
            StoredObject {
                info: info.clone(),
                data,
            },
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_should_create_and_get_bucket() {
        let store = MemoryObjectStore::new("owner-1");
        let info = store.create_bucket("state").await.unwrap();
        assert_eq!(info.name, "state");
        assert_eq!(info.owner, "owner-1");

        let (_, found) = store.get_bucket("state").await.unwrap().unwrap();
        assert_eq!(found, info);
        assert!(store.get_bucket("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_bucket() {
        let store = MemoryObjectStore::new("owner-1");
        store.create_bucket("state").await.unwrap();
        let err = store.create_bucket("state").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { bucket } if bucket == "state"));
        assert_eq!(store.list_buckets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_should_put_get_and_replace_objects() {
        let store = MemoryObjectStore::new("o");
        store.create_bucket("b").await.unwrap();
        let (bucket, _) = store.get_bucket("b").await.unwrap().unwrap();

        bucket.put_object("k", Bytes::from_static(b"one")).await.unwrap();
        let info = bucket
            .put_object("k", Bytes::from_static(b"second"))
            .await
            .unwrap();
        assert_eq!(info.size, 6);

        let obj = bucket.get_object("k").await.unwrap().unwrap();
        assert_eq!(obj.data, Bytes::from_static(b"second"));
        assert_eq!(obj.info.etag, Some(compute_etag(b"second")));
        assert_eq!(bucket.list_objects().await.unwrap().len(), 1);
        assert!(bucket.get_object("nope").await.unwrap().is_none());
    }
}
