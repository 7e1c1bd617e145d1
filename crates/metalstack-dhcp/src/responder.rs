//! Turns client requests into replies.

use tracing::{debug, info};

use crate::config::DhcpConfig;
use crate::packet::{BOOTREPLY, BOOTREQUEST, DhcpOption, MessageType, Packet, format_hardware_address};

/// Answers DISCOVER with OFFER and REQUEST with ACK.
#[derive(Debug, Clone)]
pub struct Responder {
    config: DhcpConfig,
}

impl Responder {
    /// Create a responder for `config`.
    #[must_use]
    pub fn new(config: DhcpConfig) -> Self {
        Self { config }
    }

    /// The responder configuration.
    #[must_use]
    pub fn config(&self) -> &DhcpConfig {
        &self.config
    }

    /// Build the reply to `request`, or `None` when it should be ignored.
    #[must_use]
    pub fn handle(&self, request: &Packet) -> Option<Packet> {
        if request.op != BOOTREQUEST {
            debug!(op = request.op, xid = request.xid, "ignoring non-BOOTREQUEST packet");
            return None;
        }

        let reply_type = match request.message_type() {
            Some(MessageType::Discover) => MessageType::Offer,
            Some(MessageType::Request) => MessageType::Ack,
            other => {
                info!(message_type = ?other, xid = request.xid, "ignoring unsupported DHCP message");
                return None;
            }
        };

        let Some(&last_byte) = request.hardware_address().and_then(<[u8]>::last) else {
            info!(hlen = request.hlen, xid = request.xid, "ignoring request without hardware address");
            return None;
        };
        let yiaddr = self.config.client_address(last_byte);

        info!(
            xid = request.xid,
            mac = %request.hardware_address().map(format_hardware_address).unwrap_or_default(),
            address = %yiaddr,
            reply = ?reply_type,
            "answering DHCP request"
        );

        let config = &self.config;
        Some(Packet {
            op: BOOTREPLY,
            htype: request.htype,
            hlen: request.hlen,
            hops: 0,
            xid: request.xid,
            secs: 0,
            flags: request.flags,
            ciaddr: request.ciaddr,
            yiaddr,
            siaddr: config.server_ip,
            giaddr: request.giaddr,
            chaddr: request.chaddr,
            sname: [0; 64],
            file: [0; 128],
            options: vec![
                DhcpOption::MessageType(reply_type),
                DhcpOption::ServerIdentifier(config.server_ip),
                DhcpOption::SubnetMask(config.netmask),
                DhcpOption::Router(vec![config.gateway]),
                DhcpOption::DomainNameServer(config.dns.clone()),
                DhcpOption::LeaseTime(u32::try_from(config.lease.as_secs()).unwrap_or(u32::MAX)),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::packet::tests::discover;

    fn responder() -> Responder {
        Responder::new(DhcpConfig::default())
    }

    #[test]
    fn test_should_offer_mac_derived_address() {
        let request = discover([0x52, 0x54, 0, 0x12, 0x34, 0x56]);
        let reply = responder().handle(&request).unwrap();

        assert_eq!(reply.op, BOOTREPLY);
        assert_eq!(reply.xid, request.xid);
        assert_eq!(reply.flags, request.flags);
        assert_eq!(reply.chaddr, request.chaddr);
        assert_eq!(reply.yiaddr, Ipv4Addr::new(10, 123, 45, 0x56));
        assert_eq!(reply.siaddr, Ipv4Addr::new(10, 123, 45, 1));
        assert_eq!(reply.message_type(), Some(MessageType::Offer));
        assert_eq!(
            reply.options,
            vec![
                DhcpOption::MessageType(MessageType::Offer),
                DhcpOption::ServerIdentifier(Ipv4Addr::new(10, 123, 45, 1)),
                DhcpOption::SubnetMask(Ipv4Addr::new(255, 255, 255, 0)),
                DhcpOption::Router(vec![Ipv4Addr::new(10, 123, 45, 1)]),
                DhcpOption::DomainNameServer(vec![Ipv4Addr::new(10, 123, 45, 1)]),
                DhcpOption::LeaseTime(14_400),
            ]
        );
    }

    #[test]
    fn test_should_ack_request() {
        let mut request = discover([0, 0, 0, 0, 0, 7]);
        request.options = vec![DhcpOption::MessageType(MessageType::Request)];
        let reply = responder().handle(&request).unwrap();
        assert_eq!(reply.message_type(), Some(MessageType::Ack));
        assert_eq!(reply.yiaddr, Ipv4Addr::new(10, 123, 45, 7));
    }

    #[test]
    fn test_should_ignore_other_message_types() {
        let mut request = discover([1; 6]);
        for t in [MessageType::Release, MessageType::Inform, MessageType::Other(42)] {
            request.options = vec![DhcpOption::MessageType(t)];
            assert!(responder().handle(&request).is_none());
        }
        request.options.clear();
        assert!(responder().handle(&request).is_none());
    }

    #[test]
    fn test_should_ignore_replies_and_missing_hardware_address() {
        let mut request = discover([1; 6]);
        request.op = BOOTREPLY;
        assert!(responder().handle(&request).is_none());

        let mut request = discover([1; 6]);
        request.hlen = 0;
        assert!(responder().handle(&request).is_none());
    }

    #[test]
    fn test_should_preserve_relay_address() {
        let mut request = discover([9; 6]);
        request.giaddr = Ipv4Addr::new(10, 0, 0, 1);
        let reply = responder().handle(&request).unwrap();
        assert_eq!(reply.giaddr, Ipv4Addr::new(10, 0, 0, 1));
    }
}
