//! The MetalStack storage server: an S3 subset over the filesystem.
//!
//! The binary wires [`handler::MetalStackHandler`] into the hyper service
//! from `metalstack-s3-http` and drives it with [`server::serve`]. Both are
//! exposed here so the service can be started in-process by tests.

pub mod handler;
pub mod server;

pub use handler::MetalStackHandler;
pub use server::{run_health_check, serve};
