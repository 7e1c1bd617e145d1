//! Bucket integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_create_and_list_buckets() {
        let server = TestServer::start().await;
        server.create_bucket("zeta").await;
        server.create_bucket("alpha").await;

        let (status, body) = server.get_text("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<ListAllMyBucketsResult"));
        let alpha = body.find("<Name>alpha</Name>").unwrap();
        let zeta = body.find("<Name>zeta</Name>").unwrap();
        assert!(alpha < zeta);
        assert!(body.contains("<ID>metalstack</ID>"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_head_bucket() {
        let server = TestServer::start().await;
        server.create_bucket("state").await;

        let resp = server.client().head(server.url("/state")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = server.client().head(server.url("/nothing")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_persist_buckets_across_restarts() {
        let server = TestServer::start().await;
        server.create_bucket("kept").await;
        server.put_object("kept", "cluster/spec", b"v1").await;
        let dir = server.stop().await.unwrap();

        let server = TestServer::start_in(dir.path()).await;
        assert_eq!(server.storage_dir(), dir.path());
        let (status, body) = server.get_text("/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<Name>kept</Name>"));

        let (status, body) = server.get_text("/kept/cluster/spec").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "v1");

        server.stop().await;
    }
}
