//! One full query/response exchange with a nameserver: encode, UDP
//! round-trip, decode, and the TCP retry when the upstream truncated
//! its answer. The transports themselves guarantee the reply matches
//! the query's transaction ID.

use crate::dns::codec;
use crate::dns::transport::tcp::TcpTransport;
use crate::dns::transport::udp::UdpTransport;
use crate::dns::transport::DnsTransport;
use async_trait::async_trait;
use rootward_domain::{DnsError, DnsPacket};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::debug;

pub const DNS_PORT: u16 = 53;

/// Seam between the resolver's state machine and the network. Tests
/// swap in scripted implementations.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn exchange(&self, server: IpAddr, query: &DnsPacket) -> Result<DnsPacket, DnsError>;
}

pub struct WireExchange {
    port: u16,
    timeout: Duration,
}

impl WireExchange {
    pub fn new(timeout: Duration) -> Self {
        Self {
            port: DNS_PORT,
            timeout,
        }
    }

    /// Talks to upstreams on a non-standard port. Only mock servers in
    /// tests listen anywhere but 53.
    pub fn with_port(timeout: Duration, port: u16) -> Self {
        Self { port, timeout }
    }
}

#[async_trait]
impl Exchange for WireExchange {
    async fn exchange(&self, server: IpAddr, query: &DnsPacket) -> Result<DnsPacket, DnsError> {
        let query_bytes = codec::encode_packet(query)?;
        let server_addr = SocketAddr::new(server, self.port);

        let udp = UdpTransport::new(server_addr);
        let response = udp.send(&query_bytes, self.timeout).await?;

        match codec::decode_packet(&response.bytes) {
            Ok(packet) => {
                debug!(server = %server_addr, header = %packet.header, protocol = response.protocol_used, "response decoded");
                Ok(packet)
            }
            Err(DnsError::Truncated) => {
                debug!(server = %server_addr, "UDP response truncated, retrying over TCP");
                let tcp = TcpTransport::new(server_addr);
                let response = tcp.send(&query_bytes, self.timeout).await?;
                let packet = codec::decode_packet(&response.bytes)?;
                debug!(server = %server_addr, header = %packet.header, protocol = response.protocol_used, "response decoded");
                Ok(packet)
            }
            Err(e) => Err(e),
        }
    }
}
