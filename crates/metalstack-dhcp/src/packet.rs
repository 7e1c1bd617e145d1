//! DHCPv4 packet codec (RFC 2131 header, RFC 2132 options).

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{DhcpError, DhcpResult};

/// `op` value of a client message.
pub const BOOTREQUEST: u8 = 1;
/// `op` value of a server message.
pub const BOOTREPLY: u8 = 2;

/// The four bytes that open the options area.
pub const MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

/// Size of the fixed BOOTP header.
const HEADER_LEN: usize = 236;
/// Replies are padded to the classic BOOTP minimum.
const MIN_PACKET_LEN: usize = 300;

const OPT_PAD: u8 = 0;
const OPT_SUBNET_MASK: u8 = 1;
const OPT_ROUTER: u8 = 3;
const OPT_DNS: u8 = 6;
const OPT_LEASE_TIME: u8 = 51;
const OPT_MESSAGE_TYPE: u8 = 53;
const OPT_SERVER_ID: u8 = 54;
const OPT_PARAMETER_REQUEST_LIST: u8 = 55;
const OPT_END: u8 = 255;

/// DHCP message type (option 53).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// DHCPDISCOVER.
    Discover,
    /// DHCPOFFER.
    Offer,
    /// DHCPREQUEST.
    Request,
    /// DHCPDECLINE.
    Decline,
    /// DHCPACK.
    Ack,
    /// DHCPNAK.
    Nak,
    /// DHCPRELEASE.
    Release,
    /// DHCPINFORM.
    Inform,
    /// Anything else.
    Other(u8),
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Discover,
            2 => Self::Offer,
            3 => Self::Request,
            4 => Self::Decline,
            5 => Self::Ack,
            6 => Self::Nak,
            7 => Self::Release,
            8 => Self::Inform,
            other => Self::Other(other),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(value: MessageType) -> Self {
        match value {
            MessageType::Discover => 1,
            MessageType::Offer => 2,
            MessageType::Request => 3,
            MessageType::Decline => 4,
            MessageType::Ack => 5,
            MessageType::Nak => 6,
            MessageType::Release => 7,
            MessageType::Inform => 8,
            MessageType::Other(other) => other,
        }
    }
}

/// A decoded DHCP option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DhcpOption {
    /// 1: subnet mask.
    SubnetMask(Ipv4Addr),
    /// 3: routers, in order of preference.
    Router(Vec<Ipv4Addr>),
    /// 6: DNS servers, in order of preference.
    DomainNameServer(Vec<Ipv4Addr>),
    /// 51: lease time in seconds.
    LeaseTime(u32),
    /// 53: message type.
    MessageType(MessageType),
    /// 54: server identifier.
    ServerIdentifier(Ipv4Addr),
    /// 55: option codes the client asks for.
    ParameterRequestList(Vec<u8>),
    /// Any option this codec does not interpret.
    Unknown {
        /// Option code.
        code: u8,
        /// Raw value.
        data: Vec<u8>,
    },
}

impl DhcpOption {
    /// The option code.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::SubnetMask(_) => OPT_SUBNET_MASK,
            Self::Router(_) => OPT_ROUTER,
            Self::DomainNameServer(_) => OPT_DNS,
            Self::LeaseTime(_) => OPT_LEASE_TIME,
            Self::MessageType(_) => OPT_MESSAGE_TYPE,
            Self::ServerIdentifier(_) => OPT_SERVER_ID,
            Self::ParameterRequestList(_) => OPT_PARAMETER_REQUEST_LIST,
            Self::Unknown { code, .. } => *code,
        }
    }

    fn decode(code: u8, data: &[u8]) -> DhcpResult<Self> {
        let bad_len = || DhcpError::InvalidOptionLength {
            code,
            len: data.len(),
        };
        let option = match code {
            OPT_SUBNET_MASK => Self::SubnetMask(ipv4(data).ok_or_else(bad_len)?),
            OPT_ROUTER => Self::Router(ipv4_list(data).ok_or_else(bad_len)?),
            OPT_DNS => Self::DomainNameServer(ipv4_list(data).ok_or_else(bad_len)?),
            OPT_LEASE_TIME => {
                let raw: [u8; 4] = data.try_into().map_err(|_| bad_len())?;
                Self::LeaseTime(u32::from_be_bytes(raw))
            }
            OPT_MESSAGE_TYPE => match data {
                [t] => Self::MessageType(MessageType::from(*t)),
                _ => return Err(bad_len()),
            },
            OPT_SERVER_ID => Self::ServerIdentifier(ipv4(data).ok_or_else(bad_len)?),
            OPT_PARAMETER_REQUEST_LIST => Self::ParameterRequestList(data.to_vec()),
            _ => Self::Unknown {
                code,
                data: data.to_vec(),
            },
        };
        Ok(option)
    }

    fn encode(&self, buf: &mut BytesMut) {
        let mut value = Vec::new();
        match self {
            Self::SubnetMask(addr) | Self::ServerIdentifier(addr) => {
                value.extend_from_slice(&addr.octets());
            }
            Self::Router(addrs) | Self::DomainNameServer(addrs) => {
                for addr in addrs {
                    value.extend_from_slice(&addr.octets());
                }
            }
            Self::LeaseTime(secs) => value.extend_from_slice(&secs.to_be_bytes()),
            Self::MessageType(t) => value.push(u8::from(*t)),
            Self::ParameterRequestList(codes) => value.extend_from_slice(codes),
            Self::Unknown { data, .. } => value.extend_from_slice(data),
        }
        // Values longer than 255 bytes would need RFC 3396 splitting; nothing
        // this responder emits comes close.
        let len = u8::try_from(value.len()).unwrap_or(u8::MAX);
        buf.put_u8(self.code());
        buf.put_u8(len);
        buf.put_slice(&value[..usize::from(len)]);
    }
}

fn ipv4(data: &[u8]) -> Option<Ipv4Addr> {
    let raw: [u8; 4] = data.try_into().ok()?;
    Some(Ipv4Addr::from(raw))
}

fn ipv4_list(data: &[u8]) -> Option<Vec<Ipv4Addr>> {
    if data.is_empty() || data.len() % 4 != 0 {
        return None;
    }
    Some(data.chunks_exact(4).filter_map(ipv4).collect())
}

/// A DHCP packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Message op code: [`BOOTREQUEST`] or [`BOOTREPLY`].
    pub op: u8,
    /// Hardware address type (1 = Ethernet).
    pub htype: u8,
    /// Hardware address length.
    pub hlen: u8,
    /// Relay hop count.
    pub hops: u8,
    /// Transaction ID chosen by the client.
    pub xid: u32,
    /// Seconds since the client began acquisition.
    pub secs: u16,
    /// Flags; the top bit asks for a broadcast reply.
    pub flags: u16,
    /// Client's current address, if bound.
    pub ciaddr: Ipv4Addr,
    /// Address offered to the client.
    pub yiaddr: Ipv4Addr,
    /// Next server address.
    pub siaddr: Ipv4Addr,
    /// Relay agent address.
    pub giaddr: Ipv4Addr,
    /// Client hardware address, zero padded.
    pub chaddr: [u8; 16],
    /// Optional server host name.
    pub sname: [u8; 64],
    /// Boot file name.
    pub file: [u8; 128],
    /// Options in wire order, without pad and end markers.
    pub options: Vec<DhcpOption>,
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            op: BOOTREQUEST,
            htype: 1,
            hlen: 6,
            hops: 0,
            xid: 0,
            secs: 0,
            flags: 0,
            ciaddr: Ipv4Addr::UNSPECIFIED,
            yiaddr: Ipv4Addr::UNSPECIFIED,
            siaddr: Ipv4Addr::UNSPECIFIED,
            giaddr: Ipv4Addr::UNSPECIFIED,
            chaddr: [0; 16],
            sname: [0; 64],
            file: [0; 128],
            options: Vec::new(),
        }
    }
}

impl Packet {
    /// Decode a packet from a datagram.
    ///
    /// # Errors
    ///
    /// Fails when the datagram is shorter than the header and cookie, the
    /// cookie is wrong, or an option is truncated or has a bad length.
    pub fn parse(datagram: &[u8]) -> DhcpResult<Self> {
        let min = HEADER_LEN + MAGIC_COOKIE.len();
        if datagram.len() < min {
            return Err(DhcpError::TooShort {
                len: datagram.len(),
                min,
            });
        }

        let mut buf = datagram;
        let op = buf.get_u8();
        let htype = buf.get_u8();
        let hlen = buf.get_u8();
        let hops = buf.get_u8();
        let xid = buf.get_u32();
        let secs = buf.get_u16();
        let flags = buf.get_u16();
        let ciaddr = Ipv4Addr::from(buf.get_u32());
        let yiaddr = Ipv4Addr::from(buf.get_u32());
        let siaddr = Ipv4Addr::from(buf.get_u32());
        let giaddr = Ipv4Addr::from(buf.get_u32());
        let mut chaddr = [0; 16];
        buf.copy_to_slice(&mut chaddr);
        let mut sname = [0; 64];
        buf.copy_to_slice(&mut sname);
        let mut file = [0; 128];
        buf.copy_to_slice(&mut file);

        let mut cookie = [0; 4];
        buf.copy_to_slice(&mut cookie);
        if cookie != MAGIC_COOKIE {
            return Err(DhcpError::BadMagicCookie(cookie));
        }

        Ok(Self {
            op,
            htype,
            hlen,
            hops,
            xid,
            secs,
            flags,
            ciaddr,
            yiaddr,
            siaddr,
            giaddr,
            chaddr,
            sname,
            file,
            options: parse_options(buf)?,
        })
    }

    /// Encode the packet, terminated by an end option and padded to the
    /// BOOTP minimum length.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MIN_PACKET_LEN);
        buf.put_u8(self.op);
        buf.put_u8(self.htype);
        buf.put_u8(self.hlen);
        buf.put_u8(self.hops);
        buf.put_u32(self.xid);
        buf.put_u16(self.secs);
        buf.put_u16(self.flags);
        buf.put_slice(&self.ciaddr.octets());
        buf.put_slice(&self.yiaddr.octets());
        buf.put_slice(&self.siaddr.octets());
        buf.put_slice(&self.giaddr.octets());
        buf.put_slice(&self.chaddr);
        buf.put_slice(&self.sname);
        buf.put_slice(&self.file);
        buf.put_slice(&MAGIC_COOKIE);
        for option in &self.options {
            option.encode(&mut buf);
        }
        buf.put_u8(OPT_END);
        if buf.len() < MIN_PACKET_LEN {
            buf.resize(MIN_PACKET_LEN, OPT_PAD);
        }
        buf.freeze()
    }

    /// The message type from option 53, if present.
    #[must_use]
    pub fn message_type(&self) -> Option<MessageType> {
        self.options.iter().find_map(|opt| match opt {
            DhcpOption::MessageType(t) => Some(*t),
            _ => None,
        })
    }

    /// The client hardware address, `hlen` bytes long when `hlen` is sane.
    #[must_use]
    pub fn hardware_address(&self) -> Option<&[u8]> {
        match usize::from(self.hlen) {
            0 => None,
            len if len <= self.chaddr.len() => Some(&self.chaddr[..len]),
            _ => None,
        }
    }
}

fn parse_options(mut buf: &[u8]) -> DhcpResult<Vec<DhcpOption>> {
    let mut options = Vec::new();
    while buf.has_remaining() {
        let code = buf.get_u8();
        match code {
            OPT_PAD => {}
            OPT_END => break,
            _ => {
                if !buf.has_remaining() {
                    return Err(DhcpError::TruncatedOption { code });
                }
                let len = usize::from(buf.get_u8());
                if buf.remaining() < len {
                    return Err(DhcpError::TruncatedOption { code });
                }
                options.push(DhcpOption::decode(code, &buf[..len])?);
                buf.advance(len);
            }
        }
    }
    Ok(options)
}

/// Format a hardware address as colon-separated hex.
#[must_use]
pub fn format_hardware_address(addr: &[u8]) -> String {
    addr.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn discover(mac: [u8; 6]) -> Packet {
        let mut chaddr = [0; 16];
        chaddr[..6].copy_from_slice(&mac);
        Packet {
            xid: 0xdead_beef,
            flags: 0x8000,
            chaddr,
            options: vec![
                DhcpOption::MessageType(MessageType::Discover),
                DhcpOption::ParameterRequestList(vec![1, 3, 6, 51]),
            ],
            ..Packet::default()
        }
    }

    #[test]
    fn test_should_round_trip_discover() {
        let packet = discover([0x52, 0x54, 0, 0x12, 0x34, 0x56]);
        let wire = packet.encode();
        assert_eq!(wire.len(), MIN_PACKET_LEN);
        assert_eq!(&wire[236..240], &MAGIC_COOKIE);

        let parsed = Packet::parse(&wire).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(parsed.message_type(), Some(MessageType::Discover));
        assert_eq!(
            parsed.hardware_address(),
            Some(&[0x52, 0x54, 0, 0x12, 0x34, 0x56][..])
        );
    }

    #[test]
    fn test_should_reject_short_packet() {
        assert!(matches!(
            Packet::parse(&[0; 100]),
            Err(DhcpError::TooShort { len: 100, .. })
        ));
    }

    #[test]
    fn test_should_reject_bad_cookie() {
        let mut wire = discover([1; 6]).encode().to_vec();
        wire[236] = 0;
        assert!(matches!(
            Packet::parse(&wire),
            Err(DhcpError::BadMagicCookie(_))
        ));
    }

    #[test]
    fn test_should_reject_truncated_option() {
        let mut wire = Packet::default().encode().to_vec();
        wire.truncate(240);
        wire.extend_from_slice(&[OPT_ROUTER, 8, 10, 0, 0, 1]);
        assert!(matches!(
            Packet::parse(&wire),
            Err(DhcpError::TruncatedOption { code: OPT_ROUTER })
        ));

        wire.truncate(240);
        wire.push(OPT_LEASE_TIME);
        assert!(matches!(
            Packet::parse(&wire),
            Err(DhcpError::TruncatedOption { .. })
        ));
    }

    #[test]
    fn test_should_reject_bad_option_length() {
        let mut wire = Packet::default().encode().to_vec();
        wire.truncate(240);
        wire.extend_from_slice(&[OPT_SUBNET_MASK, 3, 255, 255, 255, OPT_END]);
        assert!(matches!(
            Packet::parse(&wire),
            Err(DhcpError::InvalidOptionLength { code: 1, len: 3 })
        ));
    }

    #[test]
    fn test_should_skip_pad_and_keep_unknown_options() {
        let mut wire = Packet::default().encode().to_vec();
        wire.truncate(240);
        wire.extend_from_slice(&[OPT_PAD, OPT_PAD, 12, 3, b'n', b'o', b'd', OPT_END, 99]);
        let parsed = Packet::parse(&wire).unwrap();
        assert_eq!(
            parsed.options,
            vec![DhcpOption::Unknown {
                code: 12,
                data: b"nod".to_vec()
            }]
        );
    }

    #[test]
    fn test_should_format_hardware_address() {
        assert_eq!(
            format_hardware_address(&[0x52, 0x54, 0, 0xab, 0xcd, 0xef]),
            "52:54:00:ab:cd:ef"
        );
    }
}
