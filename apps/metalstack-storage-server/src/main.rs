//! MetalStack storage server binary.
//!
//! # Usage
//!
//! ```text
//! metalstack-storage-server --http-listen 127.0.0.1:8443 --storage-dir /var/lib/metalstack
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `HTTP_LISTEN` | *(unset)* | Bind address, overridden by `--http-listen` |
//! | `STORAGE_DIR` | *(unset)* | Data directory, overridden by `--storage-dir` |
//! | `S3_OWNER_ID` | `metalstack` | Canonical owner of new buckets |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use metalstack_core::MetalStackConfig;
use metalstack_s3_core::{MetalStackS3, S3Config};
use metalstack_s3_http::S3HttpService;
use metalstack_storage_server::{MetalStackHandler, run_health_check, serve};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// S3-compatible object storage server.
#[derive(Debug, Parser)]
#[command(name = "metalstack-storage-server", version)]
struct Cli {
    /// Endpoint on which to serve HTTP requests.
    #[arg(long)]
    http_listen: Option<String>,

    /// Directory in which to store data.
    #[arg(long)]
    storage_dir: Option<String>,

    /// Probe a running server's health endpoint and exit.
    #[arg(long)]
    health_check: bool,
}

impl Cli {
    /// Layer the flags over the environment configuration.
    fn apply(&self, core: &mut MetalStackConfig) {
        if let Some(v) = &self.http_listen {
            core.http_listen = Some(v.clone());
        }
        if let Some(v) = &self.storage_dir {
            core.storage_dir = Some(v.clone());
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut core = MetalStackConfig::from_env();
    cli.apply(&mut core);

    let listen = core.require_http_listen()?.to_owned();

    if cli.health_check {
        return run_health_check(&listen.replace("0.0.0.0", "127.0.0.1")).await;
    }

    core.require_storage_dir()?;
    init_tracing(&core.log_level)?;

    let mut config = S3Config::from_env();
    config.http_listen.clone_from(&core.http_listen);
    config.storage_dir.clone_from(&core.storage_dir);

    info!(
        http_listen = %listen,
        storage_dir = ?config.storage_dir,
        owner_id = %config.owner_id,
        version = VERSION,
        "starting MetalStack storage server",
    );

    let provider = MetalStackS3::open(config)
        .await
        .context("error initializing storage")?;
    let service = S3HttpService::new(MetalStackHandler(provider));

    let addr: SocketAddr = listen
        .parse()
        .with_context(|| format!("invalid bind address: {listen}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service, async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    })
    .await
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
