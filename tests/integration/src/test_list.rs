//! List objects integration tests.

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use crate::TestServer;

    async fn populated() -> TestServer {
        let server = TestServer::start().await;
        server.create_bucket("state").await;
        for key in [
            "cluster/config",
            "cluster/instancegroup/nodes",
            "cluster/instancegroup/master",
            "cluster/secrets/admin",
            "other/file",
        ] {
            server.put_object("state", key, b"x").await;
        }
        server
    }

    #[tokio::test]
    async fn test_should_list_all_keys_in_order() {
        let server = populated().await;

        let (status, body) = server.get_text("/state").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<ListBucketResult"));
        assert!(body.contains("<Name>state</Name>"));
        assert!(body.contains("<KeyCount>5</KeyCount>"));
        assert!(body.contains("<IsTruncated>false</IsTruncated>"));
        let first = body.find("<Key>cluster/config</Key>").unwrap();
        let last = body.find("<Key>other/file</Key>").unwrap();
        assert!(first < last);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_list_with_prefix_and_delimiter() {
        let server = populated().await;

        let (status, body) = server
            .get_text("/state?list-type=2&prefix=cluster/&delimiter=/")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<Prefix>cluster/</Prefix>"));
        assert!(body.contains("<Key>cluster/config</Key>"));
        assert!(!body.contains("<Key>cluster/instancegroup/nodes</Key>"));
        assert!(body.contains(
            "<CommonPrefixes><Prefix>cluster/instancegroup/</Prefix></CommonPrefixes>"
        ));
        assert!(body.contains(
            "<CommonPrefixes><Prefix>cluster/secrets/</Prefix></CommonPrefixes>"
        ));
        assert!(body.contains("<KeyCount>1</KeyCount>"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_list_empty_prefix_match() {
        let server = populated().await;

        let (status, body) = server.get_text("/state?prefix=nothing/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<KeyCount>0</KeyCount>"));
        assert!(!body.contains("<Contents>"));

        server.stop().await;
    }
}
