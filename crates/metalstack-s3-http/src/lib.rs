//! S3 HTTP routing, request parsing, response serialization, and hyper service.
//!
//! - **Routing** ([`router`]): maps path-style requests to S3 operations.
//! - **Request deserialization** ([`request`]): builds typed inputs from the
//!   routed request.
//! - **Response serialization** ([`response`]): turns typed outputs into
//!   HTTP responses.
//! - **Dispatch** ([`dispatch`]): the [`S3Handler`] boundary to the provider.
//! - **Service** ([`service`]): the hyper [`S3HttpService`].
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> S3HttpService (hyper Service)
//!     -> Health check interception
//!     -> S3Router (operation identification)
//!     -> Body collection
//!     -> dispatch_operation (S3Handler trait)
//!     -> Common response headers (x-amz-request-id, Server)
//!   <- HTTP Response
//! ```

// S3Error travels in nearly every Result here; boxing it buys nothing.
#![allow(clippy::result_large_err)]

pub mod body;
pub mod dispatch;
pub mod request;
pub mod response;
pub mod router;
pub mod service;

pub use body::S3ResponseBody;
pub use dispatch::{NotImplementedHandler, S3Handler};
pub use request::FromS3Request;
pub use response::IntoS3Response;
pub use router::{RoutingContext, S3Router};
pub use service::S3HttpService;
