//! Error response integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_return_no_such_bucket() {
        let server = TestServer::start().await;

        let (status, body) = server.get_text("/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<Code>NoSuchBucket</Code>"));
        assert!(body.contains("<BucketName>missing</BucketName>"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_return_no_such_key() {
        let server = TestServer::start().await;
        server.create_bucket("data").await;

        let resp = server.client().get(server.url("/data/nope")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().contains_key("x-amz-request-id"));
        let body = resp.text().await.unwrap();
        assert!(body.contains("<Code>NoSuchKey</Code>"));
        assert!(body.contains("<Resource>/data/nope</Resource>"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_bucket() {
        let server = TestServer::start().await;
        server.create_bucket("data").await;

        let resp = server.client().put(server.url("/data")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(resp.text().await.unwrap().contains("<Code>BucketAlreadyExists</Code>"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_encoded_slash_in_bucket_name() {
        let server = TestServer::start().await;

        let resp = server.client().put(server.url("/a%2fb")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_unsupported_method() {
        let server = TestServer::start().await;
        server.create_bucket("data").await;

        let resp = server.client().delete(server.url("/data")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_answer_health_check() {
        let server = TestServer::start().await;

        let (status, body) = server.get_text("/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "{\"status\":\"ok\"}");

        server.stop().await;
    }
}
