//! DHCP error types.

use std::net::SocketAddr;

/// Errors raised while decoding packets or running the responder.
#[derive(Debug, thiserror::Error)]
pub enum DhcpError {
    /// The datagram is shorter than the fixed BOOTP header plus cookie.
    #[error("packet too short: {len} bytes, need at least {min}")]
    TooShort {
        /// Received length.
        len: usize,
        /// Minimum length.
        min: usize,
    },

    /// The options area does not start with the DHCP magic cookie.
    #[error("bad magic cookie {0:?}")]
    BadMagicCookie([u8; 4]),

    /// An option's length byte or value runs past the end of the packet.
    #[error("option {code} is truncated")]
    TruncatedOption {
        /// Option code.
        code: u8,
    },

    /// An option's length does not fit its type.
    #[error("option {code} has invalid length {len}")]
    InvalidOptionLength {
        /// Option code.
        code: u8,
        /// Length found on the wire.
        len: usize,
    },

    /// Binding the UDP socket failed.
    #[error("failed to bind DHCP socket on {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A socket operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for DHCP operations.
pub type DhcpResult<T> = Result<T, DhcpError>;
