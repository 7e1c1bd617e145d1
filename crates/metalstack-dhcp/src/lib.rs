//! A small DHCPv4 responder for bare-metal test networks.
//!
//! Every client is offered the address formed from the configured network
//! prefix and the last byte of its hardware address, together with a fixed
//! gateway, DNS server, netmask, and lease time. There is no lease database.
//!
//! ```text
//! UDP socket -> Packet::parse -> Responder::handle -> Packet::encode -> reply target
//! ```

mod config;
mod error;
pub mod packet;
mod responder;
mod server;

pub use config::DhcpConfig;
pub use error::{DhcpError, DhcpResult};
pub use packet::{DhcpOption, MessageType, Packet};
pub use responder::Responder;
pub use server::{bind, reply_target, serve};
