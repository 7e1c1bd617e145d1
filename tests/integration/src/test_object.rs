//! Object integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_put_and_get_object() {
        let server = TestServer::start().await;
        server.create_bucket("data").await;

        let resp = server
            .client()
            .put(server.url("/data/config/cluster.yaml"))
            .body("hello world")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()["etag"],
            "\"5eb63bbbe01eeed093cb22bb8f5acdc3\""
        );

        let resp = server
            .client()
            .get(server.url("/data/config/cluster.yaml"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "11");
        assert_eq!(resp.headers()["content-type"], "application/octet-stream");
        assert!(resp.headers().contains_key("last-modified"));
        assert_eq!(resp.text().await.unwrap(), "hello world");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_overwrite_object() {
        let server = TestServer::start().await;
        server.create_bucket("data").await;
        server.put_object("data", "k", b"first").await;
        server.put_object("data", "k", b"second").await;

        let (_, body) = server.get_text("/data/k").await;
        assert_eq!(body, "second");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_head_object_without_body() {
        let server = TestServer::start().await;
        server.create_bucket("data").await;
        server.put_object("data", "blob", b"12345").await;

        let resp = server.client().head(server.url("/data/blob")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "5");
        assert!(resp.bytes().await.unwrap().is_empty());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_return_owner_acl() {
        let server = TestServer::start().await;
        server.create_bucket("data").await;
        server.put_object("data", "blob", b"x").await;

        let (status, body) = server.get_text("/data/blob?acl").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<AccessControlPolicy"));
        assert!(body.contains("<ID>metalstack</ID>"));
        assert!(body.contains("xsi:type=\"CanonicalUser\""));
        assert!(body.contains("<Permission>FULL_CONTROL</Permission>"));

        server.stop().await;
    }
}
