//! Storage and request handling behind the MetalStack S3 server.
//!
//! # Architecture
//!
//! ```text
//! metalstack-s3-http (routing, XML, headers)
//!        |
//!        v
//! MetalStackS3 (handle_* operations)
//!        |
//!        v
//! ObjectStore / BucketStore (filesystem or in-memory)
//! ```
//!
//! Buckets are never deleted and objects are never removed; the server only
//! lists, reads, and writes.

pub mod config;
pub mod error;
pub mod provider;
pub mod store;
pub mod validation;

pub use config::S3Config;
pub use provider::MetalStackS3;
pub use store::{BucketInfo, BucketStore, ObjectInfo, ObjectStore, StoredObject};
