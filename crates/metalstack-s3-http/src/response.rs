//! S3 output to HTTP response serialization.
//!
//! Response categories:
//! - **Header-only**: `CreateBucket`, `HeadBucket`, `HeadObject`, `PutObject`.
//! - **XML body**: `ListBuckets`, `ListObjectsV2`, `GetObjectAcl`.
//! - **Raw body**: `GetObject` passes the object bytes through.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::HeaderValue;
use metalstack_s3_model::error::S3Error;
use metalstack_s3_model::output::{
    CreateBucketOutput, GetObjectAclOutput, GetObjectOutput, HeadBucketOutput, HeadObjectOutput,
    ListBucketsOutput, ListObjectsV2Output, PutObjectOutput,
};
use metalstack_s3_xml::{S3Serialize, error_to_xml, to_xml};

use crate::body::S3ResponseBody;

/// Trait for converting an S3 output struct into an HTTP response.
pub trait IntoS3Response {
    /// Convert this output into an HTTP response.
    ///
    /// # Errors
    ///
    /// Returns an `S3Error` if the response cannot be constructed.
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error>;
}

/// Set an optional header on a response builder if the value is `Some`.
fn set_optional_header(
    builder: http::response::Builder,
    name: &str,
    value: Option<&str>,
) -> http::response::Builder {
    if let Some(v) = value {
        if let Ok(hv) = HeaderValue::from_str(v) {
            return builder.header(name, hv);
        }
    }
    builder
}

/// Format a timestamp as an HTTP date.
fn http_date(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build a response from a builder, converting build errors to `S3Error`.
fn build_response(
    builder: http::response::Builder,
    body: S3ResponseBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    builder
        .body(body)
        .map_err(|e| S3Error::internal_error(format!("failed to build HTTP response: {e}")))
}

/// Render `value` under `root` as an XML response.
fn xml_response<T: S3Serialize>(
    root: &str,
    value: &T,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let xml = to_xml(root, value)
        .map_err(|e| S3Error::internal_error(format!("failed to serialize {root}: {e}")))?;
    build_response(
        http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::CONTENT_TYPE, "application/xml"),
        S3ResponseBody::from_bytes(xml),
    )
}

/// Headers shared by GetObject and HeadObject.
fn object_headers(
    content_length: u64,
    last_modified: &DateTime<Utc>,
    e_tag: Option<&str>,
) -> http::response::Builder {
    let builder = http::Response::builder()
        .status(http::StatusCode::OK)
        .header(
            http::header::CONTENT_TYPE,
            mime::APPLICATION_OCTET_STREAM.as_ref(),
        )
        .header(http::header::CONTENT_LENGTH, content_length)
        .header(http::header::LAST_MODIFIED, http_date(last_modified));
    set_optional_header(builder, "ETag", e_tag)
}

impl IntoS3Response for ListBucketsOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListAllMyBucketsResult", &self)
    }
}

impl IntoS3Response for CreateBucketOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let builder = http::Response::builder().status(http::StatusCode::OK);
        let builder = set_optional_header(builder, "Location", self.location.as_deref());
        build_response(builder, S3ResponseBody::empty())
    }
}

impl IntoS3Response for HeadBucketOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        build_response(
            http::Response::builder().status(http::StatusCode::OK),
            S3ResponseBody::empty(),
        )
    }
}

impl IntoS3Response for ListObjectsV2Output {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("ListBucketResult", &self)
    }
}

impl IntoS3Response for GetObjectOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let builder = object_headers(
            self.content_length,
            &self.last_modified,
            self.e_tag.as_deref(),
        );
        build_response(builder, S3ResponseBody::from_bytes(self.body))
    }
}

impl IntoS3Response for HeadObjectOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let builder = object_headers(
            self.content_length,
            &self.last_modified,
            self.e_tag.as_deref(),
        );
        build_response(builder, S3ResponseBody::empty())
    }
}

impl IntoS3Response for GetObjectAclOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        xml_response("AccessControlPolicy", &self)
    }
}

impl IntoS3Response for PutObjectOutput {
    fn into_s3_response(self) -> Result<http::Response<S3ResponseBody>, S3Error> {
        let builder = http::Response::builder().status(http::StatusCode::OK);
        let builder = set_optional_header(builder, "ETag", self.e_tag.as_deref());
        build_response(builder, S3ResponseBody::empty())
    }
}

/// Convert an [`S3Error`] into an XML error response.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str) -> http::Response<S3ResponseBody> {
    let xml = error_to_xml(
        err.code.as_str(),
        &err.message,
        err.bucket_name.as_deref(),
        err.resource.as_deref(),
        request_id,
    );

    let mut response = http::Response::new(S3ResponseBody::from_bytes(Bytes::from(xml)));
    *response.status_mut() = err.status_code;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/xml"),
    );
    response
}
