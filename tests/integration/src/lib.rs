//! End-to-end tests for the MetalStack storage server.
//!
//! Each test starts the full HTTP stack in-process on an ephemeral port,
//! backed by a filesystem store in a temporary directory, and talks to it
//! with `reqwest`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Once;

use metalstack_s3_core::{MetalStackS3, S3Config};
use metalstack_s3_http::S3HttpService;
use metalstack_storage_server::{MetalStackHandler, serve};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

mod test_bucket;
mod test_error;
mod test_list;
mod test_object;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A storage server running inside the test process.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    storage_dir: PathBuf,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<anyhow::Result<()>>,
    client: reqwest::Client,
    tempdir: Option<TempDir>,
}

impl TestServer {
    /// Start a server over a fresh temporary directory.
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut server = Self::start_in(dir.path()).await;
        server.tempdir = Some(dir);
        server
    }

    /// Start a server over an existing storage directory.
    pub async fn start_in(storage_dir: &Path) -> Self {
        init_tracing();

        let config = S3Config::builder()
            .storage_dir(Some(storage_dir.display().to_string()))
            .build();
        let provider = MetalStackS3::open(config).await.unwrap();
        let service = S3HttpService::new(MetalStackHandler(provider));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, rx) = oneshot::channel();
        let task = tokio::spawn(serve(listener, service, async {
            rx.await.ok();
        }));

        Self {
            addr,
            storage_dir: storage_dir.to_path_buf(),
            shutdown,
            task,
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            tempdir: None,
        }
    }

    /// Absolute URL for `path` on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The HTTP client bound to this server.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Directory the server stores its data in.
    #[must_use]
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// `PUT /{bucket}`, asserting success.
    pub async fn create_bucket(&self, bucket: &str) {
        let resp = self
            .client
            .put(self.url(&format!("/{bucket}")))
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success(), "create {bucket}: {}", resp.status());
    }

    /// `PUT /{bucket}/{key}`, asserting success.
    pub async fn put_object(&self, bucket: &str, key: &str, body: &'static [u8]) {
        let resp = self
            .client
            .put(self.url(&format!("/{bucket}/{key}")))
            .body(body)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success(), "put {key}: {}", resp.status());
    }

    /// `GET` a path and return status and body text.
    pub async fn get_text(&self, path: &str) -> (reqwest::StatusCode, String) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.text().await.unwrap())
    }

    /// Stop the server and wait for its connections to drain.
    pub async fn stop(self) -> Option<TempDir> {
        self.shutdown.send(()).ok();
        self.task.await.unwrap().unwrap();
        self.tempdir
    }
}
