//! Bucket and object persistence.
//!
//! [`ObjectStore`] owns the set of buckets; each bucket hands out a
//! [`BucketStore`] for its objects. Two implementations exist:
//!
//! - [`FsObjectStore`]: one directory per bucket under a storage root.
//! - [`MemoryObjectStore`]: concurrent maps, used by tests and when no
//!   storage directory is configured.

mod fs;
mod memory;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;

/// Errors raised by a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A bucket with this name already exists.
    #[error("bucket {bucket:?} already exists")]
    AlreadyExists {
        /// The bucket name.
        bucket: String,
    },

    /// The key cannot be mapped onto the store.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey {
        /// The rejected key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A filesystem operation failed.
    #[error("{op} {}: {source}", path.display())]
    Io {
        /// What was being attempted.
        op: &'static str,
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Bucket metadata could not be encoded or decoded.
    #[error("bucket metadata {}: {source}", path.display())]
    Metadata {
        /// The metadata file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Metadata describing a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
    /// Canonical ID of the bucket owner.
    pub owner: String,
}

/// Metadata describing a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Last write time.
    pub last_modified: DateTime<Utc>,
    /// Size in bytes.
    pub size: u64,
    /// Quoted hex MD5 of the contents, when the store knows it.
    pub etag: Option<String>,
}

/// An object's metadata together with its contents.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Object metadata.
    pub info: ObjectInfo,
    /// Object contents.
    pub data: Bytes,
}

/// The set of buckets.
#[async_trait]
pub trait ObjectStore: Send + Sync + fmt::Debug {
    /// All buckets, in no particular order.
    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>>;

    /// Look up a bucket. Returns `None` when it does not exist.
    async fn get_bucket(
        &self,
        name: &str,
    ) -> StoreResult<Option<(Arc<dyn BucketStore>, BucketInfo)>>;

    /// Create a bucket, failing with [`StoreError::AlreadyExists`] if the
    /// name is taken.
    async fn create_bucket(&self, name: &str) -> StoreResult<BucketInfo>;
}

/// The objects inside one bucket.
#[async_trait]
pub trait BucketStore: Send + Sync + fmt::Debug {
    /// All objects, in no particular order.
    async fn list_objects(&self) -> StoreResult<Vec<ObjectInfo>>;

    /// Read an object. Returns `None` when the key does not exist.
    async fn get_object(&self, key: &str) -> StoreResult<Option<StoredObject>>;

    /// Create or replace an object.
    async fn put_object(&self, key: &str, data: Bytes) -> StoreResult<ObjectInfo>;
}

/// Compute the S3 ETag (quoted hex MD5) of `data`.
///
/// ```
/// use metalstack_s3_core::store::compute_etag;
///
/// assert_eq!(compute_etag(b"hello"), "\"5d41402abc4b2a76b9719d911017c592\"");
/// ```
#[must_use]
pub fn compute_etag(data: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Md5::digest(data)))
}
