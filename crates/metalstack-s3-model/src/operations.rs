//! The S3 operations served by the storage server.

use std::fmt;

/// All supported S3 operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Operation {
    /// `GET /`.
    ListBuckets,
    /// `PUT /{bucket}`.
    CreateBucket,
    /// `HEAD /{bucket}`.
    HeadBucket,
    /// `GET /{bucket}`.
    ListObjectsV2,
    /// `GET /{bucket}/{key}`.
    GetObject,
    /// `HEAD /{bucket}/{key}`.
    HeadObject,
    /// `GET /{bucket}/{key}?acl`.
    GetObjectAcl,
    /// `PUT /{bucket}/{key}`.
    PutObject,
}

impl S3Operation {
    /// The operation name as used by the S3 API.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::CreateBucket => "CreateBucket",
            Self::HeadBucket => "HeadBucket",
            Self::ListObjectsV2 => "ListObjectsV2",
            Self::GetObject => "GetObject",
            Self::HeadObject => "HeadObject",
            Self::GetObjectAcl => "GetObjectAcl",
            Self::PutObject => "PutObject",
        }
    }
}

impl fmt::Display for S3Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
