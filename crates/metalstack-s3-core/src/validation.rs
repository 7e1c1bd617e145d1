//! Request validation for bucket names and object keys.
//!
//! Bucket names map directly onto directories in the filesystem store, so
//! the rules here are about keeping a name to exactly one path segment
//! rather than enforcing the full AWS naming rules.

use crate::error::S3ServiceError;

/// Maximum bucket name length in bytes.
const MAX_BUCKET_NAME_BYTES: usize = 255;

/// Maximum object key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Validate a bucket name.
///
/// A name must be non-empty, at most 255 bytes, must not contain `/` or an
/// encoded slash (`%2F`, any case), and must not be `.` or `..`.
///
/// # Examples
///
/// ```
/// use metalstack_s3_core::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("kops-state").is_ok());
/// assert!(validate_bucket_name("a/b").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), S3ServiceError> {
    let invalid = |reason: &str| S3ServiceError::InvalidBucketName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };

    if name.is_empty() {
        return Err(invalid("Bucket name must not be empty"));
    }
    if name.len() > MAX_BUCKET_NAME_BYTES {
        return Err(invalid(&format!(
            "Bucket name must be at most {MAX_BUCKET_NAME_BYTES} bytes long"
        )));
    }
    if name.contains('/') || name.to_ascii_lowercase().contains("%2f") {
        return Err(invalid("Bucket name must not contain a slash"));
    }
    if name == "." || name == ".." {
        return Err(invalid("Bucket name must not be a relative path"));
    }

    Ok(())
}

/// Validate an object key.
///
/// A key must be non-empty, at most 1024 bytes, and must not contain a NUL
/// byte.
pub fn validate_object_key(key: &str) -> Result<(), S3ServiceError> {
    if key.is_empty() {
        return Err(S3ServiceError::InvalidArgument {
            message: "Object key must not be empty".to_owned(),
        });
    }
    if key.len() > MAX_KEY_BYTES {
        return Err(S3ServiceError::InvalidArgument {
            message: format!("Object key must be at most {MAX_KEY_BYTES} bytes long"),
        });
    }
    if key.contains('\0') {
        return Err(S3ServiceError::InvalidArgument {
            message: "Object key must not contain NUL".to_owned(),
        });
    }
    Ok(())
}
