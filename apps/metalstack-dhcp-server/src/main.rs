//! MetalStack DHCP responder binary.
//!
//! Every flag falls back to its `DHCP_*` environment variable and then to
//! the built-in default network `10.123.45.0/24`.
//!
//! ```text
//! metalstack-dhcp-server --listen 0.0.0.0:67 --network 10.123.45.0/24 --dns 10.123.45.1,1.1.1.1
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use metalstack_core::MetalStackConfig;
use metalstack_dhcp::{DhcpConfig, Responder, bind, serve};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// DHCPv4 responder handing out MAC-derived addresses.
#[derive(Debug, Parser)]
#[command(name = "metalstack-dhcp-server", version)]
struct Cli {
    /// UDP endpoint to listen on.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Address reported as the DHCP server identifier.
    #[arg(long)]
    server_ip: Option<Ipv4Addr>,

    /// Network handed out, in CIDR form (e.g. `10.123.45.0/24`).
    #[arg(long)]
    network: Option<String>,

    /// Default gateway offered to clients.
    #[arg(long)]
    gateway: Option<Ipv4Addr>,

    /// Comma-separated DNS servers offered to clients.
    #[arg(long)]
    dns: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut DhcpConfig) {
        if let Some(v) = self.listen {
            config.listen = v;
        }
        if let Some(v) = self.server_ip {
            config.server_ip = v;
        }
        if let Some(v) = self.network.as_deref() {
            config.set_network(v);
        }
        if let Some(v) = self.gateway {
            config.gateway = v;
        }
        if let Some(v) = self.dns.as_deref() {
            config.set_dns(v);
        }
    }
}

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
    init_tracing(&MetalStackConfig::from_env().log_level)?;

    let mut config = DhcpConfig::from_env();
    cli.apply(&mut config);

    info!(
        listen = %config.listen,
        server_ip = %config.server_ip,
        network = %config.network,
        netmask = %config.netmask,
        gateway = %config.gateway,
        dns = ?config.dns,
        lease_secs = config.lease.as_secs(),
        "starting MetalStack DHCP responder",
    );

    let socket = bind(config.listen)
        .await
        .context("error starting DHCP responder")?;
    let responder = Responder::new(config);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::signal::ctrl_c().await.ok();
            info!("received shutdown signal");
            shutdown.cancel();
        }
    });

    serve(&socket, &responder, shutdown)
        .await
        .context("DHCP responder failed")
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
