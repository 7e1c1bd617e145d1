//! S3-specific error types.
//!
//! [`S3ServiceError`] covers the failures the provider can produce. Each
//! variant maps to a wire-level [`S3Error`] through the [`From`]
//! implementation, which attaches the error code, status, and any bucket
//! name or resource the error document should echo.

use metalstack_s3_model::{S3Error, S3ErrorCode};

use crate::store::StoreError;

/// S3 service error type.
#[derive(Debug, thiserror::Error)]
pub enum S3ServiceError {
    /// The specified bucket does not exist.
    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The requested bucket name is not available.
    #[error("The requested bucket name is not available: {bucket}")]
    BucketAlreadyExists {
        /// The bucket name that already exists.
        bucket: String,
    },

    /// The specified key does not exist.
    #[error("The specified key does not exist: {key}")]
    NoSuchKey {
        /// The bucket that was searched.
        bucket: String,
        /// The key that was not found.
        key: String,
    },

    /// The specified bucket name is not valid.
    #[error("Invalid bucket name: {name}: {reason}")]
    InvalidBucketName {
        /// The invalid bucket name.
        name: String,
        /// The reason for the error.
        reason: String,
    },

    /// An argument provided is invalid.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// An unexpected failure in the storage layer.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl S3ServiceError {
    /// Convert into a wire-level [`S3Error`].
    #[must_use]
    pub fn into_s3_error(self) -> S3Error {
        S3Error::from(self)
    }
}

impl From<StoreError> for S3ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists { bucket } => Self::BucketAlreadyExists { bucket },
            StoreError::InvalidKey { key, reason } => Self::InvalidArgument {
                message: format!("invalid object key {key:?}: {reason}"),
            },
            other => Self::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<S3ServiceError> for S3Error {
    fn from(err: S3ServiceError) -> Self {
        match err {
            S3ServiceError::NoSuchBucket { bucket } => S3Error::no_such_bucket(bucket),
            S3ServiceError::BucketAlreadyExists { bucket } => {
                S3Error::bucket_already_exists(bucket)
            }
            S3ServiceError::NoSuchKey { bucket, key } => {
                S3Error::no_such_key(format!("/{bucket}/{key}"))
            }
            S3ServiceError::InvalidBucketName { name, reason } => {
                S3Error::invalid_bucket_name(name, reason)
            }
            S3ServiceError::InvalidArgument { message } => S3Error::invalid_argument(message),
            S3ServiceError::Internal(e) => {
                tracing::error!(error = %format!("{e:#}"), "internal S3 error");
                S3Error::new(S3ErrorCode::InternalError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_convert_no_such_bucket() {
        let err: S3Error = S3ServiceError::NoSuchBucket {
            bucket: "state".to_owned(),
        }
        .into();
        assert_eq!(err.code, S3ErrorCode::NoSuchBucket);
        assert_eq!(err.status_code.as_u16(), 404);
        assert_eq!(err.bucket_name.as_deref(), Some("state"));
    }

    #[test]
    fn test_should_convert_bucket_already_exists_with_long_message() {
        let err = S3ServiceError::BucketAlreadyExists {
            bucket: "state".to_owned(),
        }
        .into_s3_error();
        assert_eq!(err.code, S3ErrorCode::BucketAlreadyExists);
        assert_eq!(err.status_code.as_u16(), 409);
        assert!(err.message.starts_with("The requested bucket name is not available."));
        assert_eq!(err.bucket_name.as_deref(), Some("state"));
    }

    #[test]
    fn test_should_convert_no_such_key_with_resource() {
        let err = S3ServiceError::NoSuchKey {
            bucket: "b".to_owned(),
            key: "a/b".to_owned(),
        }
        .into_s3_error();
        assert_eq!(err.code, S3ErrorCode::NoSuchKey);
        assert_eq!(err.resource.as_deref(), Some("/b/a/b"));
    }

    #[test]
    fn test_should_hide_internal_error_details() {
        let err = S3ServiceError::Internal(anyhow::anyhow!("disk on fire")).into_s3_error();
        assert_eq!(err.code, S3ErrorCode::InternalError);
        assert!(!err.message.contains("disk on fire"));
    }

    #[test]
    fn test_should_map_store_errors() {
        let err: S3ServiceError = StoreError::AlreadyExists {
            bucket: "b".to_owned(),
        }
        .into();
        assert!(matches!(err, S3ServiceError::BucketAlreadyExists { .. }));

        let err: S3ServiceError = StoreError::InvalidKey {
            key: "../x".to_owned(),
            reason: "parent segment".to_owned(),
        }
        .into();
        assert!(matches!(err, S3ServiceError::InvalidArgument { .. }));
    }
}
