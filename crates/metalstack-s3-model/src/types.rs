//! Shared S3 structures that appear inside XML documents.

use std::fmt;

use chrono::{DateTime, Utc};

/// S3 Bucket entry in `ListAllMyBucketsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// S3 Owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    /// Canonical user ID.
    pub id: String,
    /// Optional display name.
    pub display_name: Option<String>,
}

/// S3 Object entry in `ListBucketResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// Object key.
    pub key: String,
    /// Last write time.
    pub last_modified: DateTime<Utc>,
    /// Size in bytes.
    pub size: u64,
    /// Quoted hex MD5, when known.
    pub e_tag: Option<String>,
}

/// S3 CommonPrefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonPrefix {
    /// The rolled-up prefix, ending with the delimiter.
    pub prefix: String,
}

/// Grantee type (the `xsi:type` attribute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GranteeType {
    /// A canonical user ID.
    #[default]
    CanonicalUser,
    /// A predefined group URI.
    Group,
}

impl GranteeType {
    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanonicalUser => "CanonicalUser",
            Self::Group => "Group",
        }
    }
}

/// S3 Grantee.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grantee {
    /// Canonical user ID.
    pub id: Option<String>,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Group URI.
    pub uri: Option<String>,
    /// Grantee kind.
    pub r#type: GranteeType,
}

/// ACL permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// `FULL_CONTROL`.
    FullControl,
    /// `READ`.
    Read,
    /// `WRITE`.
    Write,
    /// `READ_ACP`.
    ReadAcp,
    /// `WRITE_ACP`.
    WriteAcp,
}

impl Permission {
    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullControl => "FULL_CONTROL",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::ReadAcp => "READ_ACP",
            Self::WriteAcp => "WRITE_ACP",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// S3 Grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Who the grant applies to.
    pub grantee: Grantee,
    /// What is granted.
    pub permission: Permission,
}
