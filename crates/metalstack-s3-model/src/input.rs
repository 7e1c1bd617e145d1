//! Operation inputs.

use bytes::Bytes;

/// S3 ListBucketsInput.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsInput {}

/// S3 CreateBucketInput.
#[derive(Debug, Clone, Default)]
pub struct CreateBucketInput {
    /// Bucket to create.
    pub bucket: String,
}

/// S3 HeadBucketInput.
#[derive(Debug, Clone, Default)]
pub struct HeadBucketInput {
    /// Bucket to check.
    pub bucket: String,
}

/// S3 ListObjectsV2Input.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsV2Input {
    /// Bucket to list.
    pub bucket: String,
    /// Only keys starting with this prefix are returned.
    pub prefix: Option<String>,
    /// Keys are rolled up into common prefixes at this delimiter.
    pub delimiter: Option<String>,
}

/// S3 GetObjectInput.
#[derive(Debug, Clone, Default)]
pub struct GetObjectInput {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

/// S3 HeadObjectInput.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectInput {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

/// S3 GetObjectAclInput.
#[derive(Debug, Clone, Default)]
pub struct GetObjectAclInput {
    /// Bucket holding the object.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

/// S3 PutObjectInput.
#[derive(Debug, Clone, Default)]
pub struct PutObjectInput {
    /// Destination bucket.
    pub bucket: String,
    /// Destination key.
    pub key: String,
    /// Object contents.
    pub body: Bytes,
}
