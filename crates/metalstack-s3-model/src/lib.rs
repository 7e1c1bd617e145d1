//! S3 wire model for the MetalStack storage server.
//!
//! Covers the subset of the S3 REST API the storage server speaks: bucket
//! listing and creation, ListObjectsV2, object get/head/put, and object ACL
//! reads. XML rendering lives in `metalstack-s3-xml`.

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use operations::S3Operation;

/// Timestamp layout used in S3 XML documents (`2006-02-03T16:45:09.000Z`).
pub const S3_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a timestamp the way S3 XML documents expect.
#[must_use]
pub fn format_s3_time(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format(S3_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_should_format_s3_timestamp_with_millis() {
        let ts = chrono::Utc
            .with_ymd_and_hms(2024, 3, 9, 7, 5, 1)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(format_s3_time(&ts), "2024-03-09T07:05:01.042Z");
    }
}
