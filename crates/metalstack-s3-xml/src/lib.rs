//! S3 XML serialization for MetalStack.
//!
//! Converts the response types of `metalstack-s3-model` into the S3
//! RestXml wire format:
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 with milliseconds (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`
//!
//! Errors use a flat `<Error>` root with no wrapper element.

pub mod error;
pub mod serialize;

pub use error::{XmlError, error_to_xml};
pub use serialize::{S3_NAMESPACE, S3Serialize, to_xml};
