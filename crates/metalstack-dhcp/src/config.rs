//! DHCP responder configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use metalstack_core::MetalStackConfig;
use tracing::warn;

/// Default lease handed to every client.
pub const DEFAULT_LEASE: Duration = Duration::from_secs(4 * 60 * 60);

/// DHCP responder configuration.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use metalstack_dhcp::DhcpConfig;
///
/// let config = DhcpConfig::default();
/// assert_eq!(config.network, Ipv4Addr::new(10, 123, 45, 0));
/// assert_eq!(config.lease.as_secs(), 4 * 60 * 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpConfig {
    /// UDP endpoint to listen on.
    pub listen: SocketAddr,
    /// Server identifier (option 54) and `siaddr`.
    pub server_ip: Ipv4Addr,
    /// Network whose prefix client addresses are drawn from.
    pub network: Ipv4Addr,
    /// Router advertised to clients.
    pub gateway: Ipv4Addr,
    /// DNS servers advertised to clients.
    pub dns: Vec<Ipv4Addr>,
    /// Subnet mask advertised to clients.
    pub netmask: Ipv4Addr,
    /// Lease time advertised to clients.
    pub lease: Duration,
}

impl Default for DhcpConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 67)),
            server_ip: Ipv4Addr::new(10, 123, 45, 1),
            network: Ipv4Addr::new(10, 123, 45, 0),
            gateway: Ipv4Addr::new(10, 123, 45, 1),
            dns: vec![Ipv4Addr::new(10, 123, 45, 1)],
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            lease: DEFAULT_LEASE,
        }
    }
}

impl DhcpConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `DHCP_LISTEN` | `0.0.0.0:67` |
    /// | `DHCP_SERVER_IP` | `10.123.45.1` |
    /// | `DHCP_NETWORK` | `10.123.45.0/24` |
    /// | `DHCP_GATEWAY` | `10.123.45.1` |
    /// | `DHCP_DNS` | `10.123.45.1` (comma separated) |
    /// | `DHCP_NETMASK` | `255.255.255.0` |
    /// | `DHCP_LEASE_SECONDS` | `14400` |
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let core = MetalStackConfig::from_env();
        set_parsed(&mut config.listen, "DHCP_LISTEN", &core.dhcp_listen);

        if let Ok(v) = std::env::var("DHCP_SERVER_IP") {
            set_parsed(&mut config.server_ip, "DHCP_SERVER_IP", &v);
        }
        if let Ok(v) = std::env::var("DHCP_NETWORK") {
            config.set_network(&v);
        }
        if let Ok(v) = std::env::var("DHCP_GATEWAY") {
            set_parsed(&mut config.gateway, "DHCP_GATEWAY", &v);
        }
        if let Ok(v) = std::env::var("DHCP_DNS") {
            config.set_dns(&v);
        }
        if let Ok(v) = std::env::var("DHCP_NETMASK") {
            set_parsed(&mut config.netmask, "DHCP_NETMASK", &v);
        }
        if let Ok(v) = std::env::var("DHCP_LEASE_SECONDS") {
            match v.parse::<u64>() {
                Ok(secs) => config.lease = Duration::from_secs(secs),
                Err(e) => warn!(value = %v, error = %e, "ignoring invalid DHCP_LEASE_SECONDS"),
            }
        }

        config
    }

    /// Set the network from `a.b.c.d` or `a.b.c.d/len`. A prefix length
    /// also replaces the netmask.
    pub fn set_network(&mut self, value: &str) {
        let (addr, prefix) = match value.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (value, None),
        };
        set_parsed(&mut self.network, "DHCP_NETWORK", addr);
        if let Some(len) = prefix {
            match len.parse::<u8>() {
                Ok(len) if len <= 32 => self.netmask = prefix_to_netmask(len),
                _ => warn!(value = %value, "ignoring invalid network prefix length"),
            }
        }
    }

    /// Set the DNS servers from a comma separated list.
    pub fn set_dns(&mut self, value: &str) {
        let parsed: Result<Vec<Ipv4Addr>, _> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect();
        match parsed {
            Ok(dns) if !dns.is_empty() => self.dns = dns,
            _ => warn!(value = %value, "ignoring invalid DNS server list"),
        }
    }

    /// The address assigned to a client whose hardware address ends in
    /// `last_byte`: the network prefix with the host bits set from that byte.
    #[must_use]
    pub fn client_address(&self, last_byte: u8) -> Ipv4Addr {
        let mask = u32::from(self.netmask);
        let prefix = u32::from(self.network) & mask;
        Ipv4Addr::from(prefix | (u32::from(last_byte) & !mask))
    }
}

fn set_parsed<T: std::str::FromStr>(slot: &mut T, name: &str, value: &str)
where
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(variable = name, value = %value, error = %e, "ignoring invalid value"),
    }
}

fn prefix_to_netmask(len: u8) -> Ipv4Addr {
    let bits = u32::MAX.checked_shl(32 - u32::from(len)).unwrap_or(0);
    Ipv4Addr::from(bits)
}
