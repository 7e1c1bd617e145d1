//! S3 operation dispatch: the boundary between HTTP and the provider.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use metalstack_s3_model::S3Operation;
use metalstack_s3_model::error::S3Error;

use crate::body::S3ResponseBody;
use crate::router::RoutingContext;

/// Future returned by [`S3Handler::handle_operation`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send>>;

/// Trait that the business logic provider must implement.
///
/// Boxed futures keep the trait object-safe so the service can hold any
/// handler behind an `Arc`.
pub trait S3Handler: Send + Sync + 'static {
    /// Handle an S3 operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: Bytes,
        ctx: RoutingContext,
    ) -> HandlerFuture;
}

/// Dispatch a routed S3 request to the handler.
pub async fn dispatch_operation<H: S3Handler>(
    handler: &H,
    parts: http::request::Parts,
    body: Bytes,
    ctx: RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let op = ctx.operation;
    tracing::debug!(operation = %op, bucket = ?ctx.bucket, key = ?ctx.key, "dispatching S3 operation");
    handler.handle_operation(op, parts, body, ctx).await
}

/// A handler that answers every operation with `NotImplemented`.
///
/// Useful for exercising routing and the service layer in isolation.
#[derive(Debug, Clone, Default)]
pub struct NotImplementedHandler;

impl S3Handler for NotImplementedHandler {
    fn handle_operation(
        &self,
        op: S3Operation,
        _parts: http::request::Parts,
        _body: Bytes,
        _ctx: RoutingContext,
    ) -> HandlerFuture {
        Box::pin(async move { Err(S3Error::not_implemented(op.as_str())) })
    }
}

#[cfg(test)]
mod tests {
    use metalstack_s3_model::S3ErrorCode;

    use super::*;

    #[tokio::test]
    async fn test_should_return_not_implemented_for_default_handler() {
        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri("/state")
            .body(())
            .expect("valid request")
            .into_parts();
        let ctx = RoutingContext {
            bucket: Some("state".to_owned()),
            key: None,
            operation: S3Operation::ListObjectsV2,
            query_params: vec![],
        };

        let err = dispatch_operation(&NotImplementedHandler, parts, Bytes::new(), ctx)
            .await
            .unwrap_err();
        assert_eq!(err.code, S3ErrorCode::NotImplemented);
        assert_eq!(err.resource.as_deref(), Some("ListObjectsV2"));
    }
}
