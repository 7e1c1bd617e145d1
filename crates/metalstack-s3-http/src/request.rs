//! HTTP request to S3 input deserialization.

use bytes::Bytes;
use metalstack_s3_model::error::S3Error;
use metalstack_s3_model::input::{
    CreateBucketInput, GetObjectAclInput, GetObjectInput, HeadBucketInput, HeadObjectInput,
    ListBucketsInput, ListObjectsV2Input, PutObjectInput,
};

use crate::router::query_value;

/// Trait for extracting an S3 input struct from HTTP request components.
pub trait FromS3Request: Sized {
    /// Extract the input from HTTP request parts.
    ///
    /// # Errors
    ///
    /// Returns an `S3Error` if a required bucket or key is missing.
    fn from_s3_request(
        parts: &http::request::Parts,
        bucket: Option<&str>,
        key: Option<&str>,
        query_params: &[(String, String)],
        body: Bytes,
    ) -> Result<Self, S3Error>;
}

fn require_bucket(bucket: Option<&str>) -> Result<String, S3Error> {
    bucket
        .map(str::to_owned)
        .ok_or_else(|| S3Error::invalid_argument("Missing bucket name"))
}

fn require_key(key: Option<&str>) -> Result<String, S3Error> {
    key.map(str::to_owned)
        .ok_or_else(|| S3Error::invalid_argument("Missing object key"))
}

impl FromS3Request for ListBucketsInput {
    fn from_s3_request(
        _parts: &http::request::Parts,
        _bucket: Option<&str>,
        _key: Option<&str>,
        _query_params: &[(String, String)],
        _body: Bytes,
    ) -> Result<Self, S3Error> {
        Ok(Self {})
    }
}

impl FromS3Request for CreateBucketInput {
    fn from_s3_request(
        _parts: &http::request::Parts,
        bucket: Option<&str>,
        _key: Option<&str>,
        _query_params: &[(String, String)],
        _body: Bytes,
    ) -> Result<Self, S3Error> {
        // The body may carry a CreateBucketConfiguration; region constraints
        // have no meaning here, so it is ignored.
        Ok(Self {
            bucket: require_bucket(bucket)?,
        })
    }
}

impl FromS3Request for HeadBucketInput {
    fn from_s3_request(
        _parts: &http::request::Parts,
        bucket: Option<&str>,
        _key: Option<&str>,
        _query_params: &[(String, String)],
        _body: Bytes,
    ) -> Result<Self, S3Error> {
        Ok(Self {
            bucket: require_bucket(bucket)?,
        })
    }
}

impl FromS3Request for ListObjectsV2Input {
    fn from_s3_request(
        _parts: &http::request::Parts,
        bucket: Option<&str>,
        _key: Option<&str>,
        query_params: &[(String, String)],
        _body: Bytes,
    ) -> Result<Self, S3Error> {
        Ok(Self {
            bucket: require_bucket(bucket)?,
            prefix: query_value(query_params, "prefix").map(str::to_owned),
            delimiter: query_value(query_params, "delimiter").map(str::to_owned),
        })
    }
}

impl FromS3Request for GetObjectInput {
    fn from_s3_request(
        _parts: &http::request::Parts,
        bucket: Option<&str>,
        key: Option<&str>,
        _query_params: &[(String, String)],
        _body: Bytes,
    ) -> Result<Self, S3Error> {
        Ok(Self {
            bucket: require_bucket(bucket)?,
            key: require_key(key)?,
        })
    }
}

impl FromS3Request for HeadObjectInput {
    fn from_s3_request(
        _parts: &http::request::Parts,
        bucket: Option<&str>,
        key: Option<&str>,
        _query_params: &[(String, String)],
        _body: Bytes,
    ) -> Result<Self, S3Error> {
        Ok(Self {
            bucket: require_bucket(bucket)?,
            key: require_key(key)?,
        })
    }
}

impl FromS3Request for GetObjectAclInput {
    fn from_s3_request(
        _parts: &http::request::Parts,
        bucket: Option<&str>,
        key: Option<&str>,
        _query_params: &[(String, String)],
        _body: Bytes,
    ) -> Result<Self, S3Error> {
        Ok(Self {
            bucket: require_bucket(bucket)?,
            key: require_key(key)?,
        })
    }
}

impl FromS3Request for PutObjectInput {
    fn from_s3_request(
        _parts: &http::request::Parts,
        bucket: Option<&str>,
        key: Option<&str>,
        _query_params: &[(String, String)],
        body: Bytes,
    ) -> Result<Self, S3Error> {
        Ok(Self {
            bucket: require_bucket(bucket)?,
            key: require_key(key)?,
            body,
        })
    }
}
