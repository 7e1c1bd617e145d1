//! S3 operation handler implementation for [`MetalStackS3`].
//!
//! Bridges the HTTP layer (`metalstack-s3-http`) and the provider
//! (`metalstack-s3-core`): each operation is parsed with [`FromS3Request`],
//! handed to the matching `handle_*` method, and rendered with
//! [`IntoS3Response`].

use std::future::Future;

use bytes::Bytes;
use metalstack_s3_core::MetalStackS3;
use metalstack_s3_core::error::S3ServiceError;
use metalstack_s3_http::body::S3ResponseBody;
use metalstack_s3_http::dispatch::{HandlerFuture, S3Handler};
use metalstack_s3_http::request::FromS3Request;
use metalstack_s3_http::response::IntoS3Response;
use metalstack_s3_http::router::RoutingContext;
use metalstack_s3_model::S3Operation;
use metalstack_s3_model::error::S3Error;

/// Wrapper that implements [`S3Handler`] by delegating to [`MetalStackS3`].
#[derive(Debug, Clone)]
pub struct MetalStackHandler(pub MetalStackS3);

impl S3Handler for MetalStackHandler {
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: Bytes,
        ctx: RoutingContext,
    ) -> HandlerFuture {
        let provider = self.0.clone();
        Box::pin(async move {
            let bucket = ctx.bucket.as_deref();
            let key = ctx.key.as_deref();
            let query_params = &ctx.query_params;

            match op {
                S3Operation::ListBuckets => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_list_buckets(input)
                    })
                    .await
                }
                S3Operation::CreateBucket => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_create_bucket(input)
                    })
                    .await
                }
                S3Operation::HeadBucket => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_head_bucket(input)
                    })
                    .await
                }
                S3Operation::ListObjectsV2 => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_list_objects_v2(input)
                    })
                    .await
                }
                S3Operation::GetObject => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_get_object(input)
                    })
                    .await
                }
                S3Operation::HeadObject => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_head_object(input)
                    })
                    .await
                }
                S3Operation::GetObjectAcl => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_get_object_acl(input)
                    })
                    .await
                }
                S3Operation::PutObject => {
                    dispatch_output(&parts, bucket, key, query_params, body, |input| {
                        provider.handle_put_object(input)
                    })
                    .await
                }
            }
        })
    }
}

/// Parse the input, run the provider method, and render its output.
async fn dispatch_output<I, O, F, Fut>(
    parts: &http::request::Parts,
    bucket: Option<&str>,
    key: Option<&str>,
    query_params: &[(String, String)],
    body: Bytes,
    handler_fn: F,
) -> Result<http::Response<S3ResponseBody>, S3Error>
where
    I: FromS3Request,
    O: IntoS3Response,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = Result<O, S3ServiceError>>,
{
    let input = I::from_s3_request(parts, bucket, key, query_params, body)?;
    let output = handler_fn(input).await?;
    output.into_s3_response()
}

#[cfg(test)]
mod tests {
    use metalstack_s3_core::S3Config;
    use metalstack_s3_http::S3HttpService;

    use super::*;

    fn service() -> S3HttpService<MetalStackHandler> {
        S3HttpService::new(MetalStackHandler(MetalStackS3::in_memory(
            S3Config::default(),
        )))
    }

    fn request(method: &str, uri: &str, body: &'static str) -> http::Request<String> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(body.to_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_should_route_bucket_and_object_operations() {
        let service = service();

        let resp = service.handle(request("PUT", "/photos", "")).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers()["location"], "/photos");

        let resp = service.handle(request("PUT", "/photos/a.txt", "hello")).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(resp.headers().contains_key("etag"));

        let resp = service.handle(request("HEAD", "/photos/a.txt", "")).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "5");

        let resp = service.handle(request("HEAD", "/photos", "")).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_map_provider_errors_to_status_codes() {
        let service = service();

        let resp = service.handle(request("GET", "/missing", "")).await;
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);

        service.handle(request("PUT", "/b", "")).await;
        let resp = service.handle(request("PUT", "/b", "")).await;
        assert_eq!(resp.status(), http::StatusCode::CONFLICT);

        let resp = service.handle(request("GET", "/b/nope", "")).await;
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
    }
}
