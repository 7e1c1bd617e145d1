//! Operation outputs.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::types::{Bucket, CommonPrefix, Grant, Object, Owner};

/// S3 ListBucketsOutput, rendered as `ListAllMyBucketsResult`.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsOutput {
    /// Owner of the listed buckets.
    pub owner: Option<Owner>,
    /// All buckets, sorted by name.
    pub buckets: Vec<Bucket>,
}

/// S3 CreateBucketOutput.
#[derive(Debug, Clone, Default)]
pub struct CreateBucketOutput {
    /// HTTP header: `Location`.
    pub location: Option<String>,
}

/// S3 HeadBucketOutput.
#[derive(Debug, Clone, Default)]
pub struct HeadBucketOutput {}

/// S3 ListObjectsV2Output, rendered as `ListBucketResult`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsV2Output {
    /// Bucket name.
    pub name: String,
    /// Prefix echoed from the request.
    pub prefix: String,
    /// Delimiter echoed from the request.
    pub delimiter: Option<String>,
    /// Number of entries in `contents`.
    pub key_count: usize,
    /// Always `false`; results are never paginated.
    pub is_truncated: bool,
    /// Matching objects, sorted by key.
    pub contents: Vec<Object>,
    /// Rolled-up prefixes, sorted.
    pub common_prefixes: Vec<CommonPrefix>,
}

/// S3 GetObjectOutput.
#[derive(Debug, Clone)]
pub struct GetObjectOutput {
    /// Object contents.
    pub body: Bytes,
    /// HTTP header: `Content-Length`.
    pub content_length: u64,
    /// HTTP header: `Last-Modified`.
    pub last_modified: DateTime<Utc>,
    /// HTTP header: `ETag`.
    pub e_tag: Option<String>,
}

/// S3 HeadObjectOutput.
#[derive(Debug, Clone)]
pub struct HeadObjectOutput {
    /// HTTP header: `Content-Length`.
    pub content_length: u64,
    /// HTTP header: `Last-Modified`.
    pub last_modified: DateTime<Utc>,
    /// HTTP header: `ETag`.
    pub e_tag: Option<String>,
}

/// S3 GetObjectAclOutput, rendered as `AccessControlPolicy`.
#[derive(Debug, Clone, Default)]
pub struct GetObjectAclOutput {
    /// Object owner.
    pub owner: Option<Owner>,
    /// Access grants.
    pub grants: Vec<Grant>,
}

/// S3 PutObjectOutput.
#[derive(Debug, Clone, Default)]
pub struct PutObjectOutput {
    /// HTTP header: `ETag`.
    pub e_tag: Option<String>,
}
