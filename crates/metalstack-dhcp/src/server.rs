//! UDP receive loop.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{DhcpError, DhcpResult};
use crate::packet::Packet;
use crate::responder::Responder;

const SERVER_PORT: u16 = 67;
const CLIENT_PORT: u16 = 68;
const MAX_DATAGRAM: usize = 1500;

/// Bind a broadcast-capable UDP socket on `addr`.
pub async fn bind(addr: SocketAddr) -> DhcpResult<UdpSocket> {
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|source| DhcpError::Bind { addr, source })?;
    socket.set_broadcast(true)?;
    Ok(socket)
}

/// Where to send the reply to `request`, received from `from`.
///
/// Relayed requests go back to the relay's server port. Clients without an
/// address are reached by broadcast; anyone else gets a unicast reply.
#[must_use]
pub fn reply_target(request: &Packet, from: SocketAddr) -> SocketAddr {
    if !request.giaddr.is_unspecified() {
        SocketAddr::from((request.giaddr, SERVER_PORT))
    } else if request.ciaddr.is_unspecified() {
        SocketAddr::from((Ipv4Addr::BROADCAST, CLIENT_PORT))
    } else {
        from
    }
}

/// Datagram transport under [`serve`].
trait Transport {
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;
}

impl Transport for UdpSocket {
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }

    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target).await
    }
}

/// Serve DHCP requests on `socket` until `shutdown` is cancelled.
///
/// Receive errors, malformed datagrams and failed sends are logged and
/// skipped; only cancellation ends the loop.
pub async fn serve(
    socket: &UdpSocket,
    responder: &Responder,
    shutdown: CancellationToken,
) -> DhcpResult<()> {
    info!(addr = ?socket.local_addr().ok(), "serving DHCP");
    serve_on(socket, responder, shutdown).await
}

async fn serve_on<T: Transport>(
    socket: &T,
    responder: &Responder,
    shutdown: CancellationToken,
) -> DhcpResult<()> {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let received = tokio::select! {
            () = shutdown.cancelled() => {
                info!("DHCP responder shutting down");
                return Ok(());
            }
            received = socket.recv_from(&mut buf) => received,
        };
        let (len, from) = match received {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "failed to receive DHCP datagram");
                continue;
            }
        };

        let request = match Packet::parse(&buf[..len]) {
            Ok(request) => request,
            Err(e) => {
                debug!(%from, error = %e, "dropping malformed DHCP packet");
                continue;
            }
        };

        let Some(reply) = responder.handle(&request) else {
            continue;
        };

        let target = reply_target(&request, from);
        if let Err(e) = socket.send_to(&reply.encode(), target).await {
            warn!(%target, xid = reply.xid, error = %e, "failed to send DHCP reply");
        }
    }
}
