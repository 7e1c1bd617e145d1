//! The S3 HTTP service implementing hyper's `Service` trait.
//!
//! [`S3HttpService`] handles:
//!
//! 1. Health check interception (`GET /healthz`)
//! 2. S3 request routing via [`S3Router`]
//! 3. Request body collection, capped at a configurable size
//! 4. Operation dispatch to the [`S3Handler`]
//! 5. Common response headers (`x-amz-request-id`, `Server`)
//! 6. Error response formatting

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::header::HeaderValue;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::service::Service;
use metalstack_s3_model::error::S3Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::body::S3ResponseBody;
use crate::dispatch::{S3Handler, dispatch_operation};
use crate::response::error_to_response;
use crate::router::S3Router;

/// Path answered by the built-in health check.
pub const HEALTH_CHECK_PATH: &str = "/healthz";

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = "MetalStack";

/// Largest request body accepted unless overridden (256 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024 * 1024;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a request body could not be collected.
#[derive(Debug)]
enum BodyError {
    TooLarge,
    Read(BoxError),
}

/// The S3 HTTP service.
#[derive(Debug)]
pub struct S3HttpService<H: S3Handler> {
    handler: Arc<H>,
    router: S3Router,
    body_limit: usize,
}

impl<H: S3Handler> S3HttpService<H> {
    /// Create a new S3 HTTP service around `handler`.
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self::from_shared(Arc::new(handler))
    }

    /// Create a new S3 HTTP service from a shared handler.
    #[must_use]
    pub fn from_shared(handler: Arc<H>) -> Self {
        Self {
            handler,
            router: S3Router::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Reject request bodies larger than `limit` bytes with `EntityTooLarge`.
    #[must_use]
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Run a request through the full S3 pipeline, including the common
    /// response headers.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<S3ResponseBody>
    where
        B: http_body::Body + Send,
        B::Error: Into<BoxError>,
    {
        let request_id = Uuid::new_v4().to_string();
        let response = process_request(
            req,
            self.handler.as_ref(),
            &self.router,
            self.body_limit,
            &request_id,
        )
        .await;
        add_common_headers(response, &request_id)
    }
}

impl<H: S3Handler> Clone for S3HttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            router: self.router,
            body_limit: self.body_limit,
        }
    }
}

impl<H: S3Handler> Service<http::Request<Incoming>> for S3HttpService<H> {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

/// Process an incoming HTTP request through the S3 pipeline.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    router: &S3Router,
    body_limit: usize,
    request_id: &str,
) -> http::Response<S3ResponseBody>
where
    H: S3Handler,
    B: http_body::Body + Send,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let uri = req.uri().clone();
    debug!(%method, %uri, request_id, "processing S3 request");

    if is_health_check(&method, uri.path()) {
        return health_check_response();
    }

    let ctx = match router.resolve(&req) {
        Ok(ctx) => ctx,
        Err(err) => {
            warn!(%method, %uri, error = %err, request_id, "failed to route S3 request");
            return error_to_response(&err, request_id);
        }
    };

    info!(
        %method,
        %uri,
        operation = %ctx.operation,
        request_id,
        "routed S3 request"
    );

    let (parts, incoming) = req.into_parts();
    let body = match collect_body(incoming, body_limit).await {
        Ok(body) => body,
        Err(BodyError::TooLarge) => {
            warn!(limit = body_limit, request_id, "request body exceeds limit");
            return error_to_response(&S3Error::entity_too_large(body_limit), request_id);
        }
        Err(BodyError::Read(err)) => {
            error!(error = %err, request_id, "failed to collect request body");
            let s3_err = S3Error::internal_error("Failed to read request body");
            return error_to_response(&s3_err, request_id);
        }
    };

    match dispatch_operation(handler, parts, body, ctx).await {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, request_id, "S3 operation returned error");
            error_to_response(&err, request_id)
        }
    }
}

/// Collect the full request body into `Bytes`, reading at most `limit` bytes.
async fn collect_body<B>(body: B, limit: usize) -> Result<Bytes, BodyError>
where
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    Limited::new(body, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                BodyError::TooLarge
            } else {
                BodyError::Read(e)
            }
        })
}

/// Check if the request is a health check.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && path == HEALTH_CHECK_PATH
}

/// Produce a health check response.
fn health_check_response() -> http::Response<S3ResponseBody> {
    let mut response = http::Response::new(S3ResponseBody::from_string(r#"{"status":"ok"}"#));
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Add common response headers to every S3 response.
fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();
    if let Ok(hv) = HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv);
    }
    headers.insert(http::header::SERVER, HeaderValue::from_static(SERVER_NAME));
    response
}
