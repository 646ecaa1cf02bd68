//! UDP transport for upstream DNS queries (RFC 1035 §4.2.1).
//!
//! Messages go out unframed on a socket owned by the call. The receive
//! loop holds one deadline for the whole round-trip and drops anything
//! that is not the reply to this query: datagrams from another source,
//! or replies under a foreign transaction ID. If the accepted reply
//! carries TC=1 the caller retries the same query over TCP.

use super::{validate_response_id, DnsTransport, TransportResponse};
use async_trait::async_trait;
use rootward_domain::DnsError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0).
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    /// Ephemeral local endpoint in the server's address family.
    fn local_endpoint(&self) -> SocketAddr {
        if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        let deadline = Instant::now() + timeout;

        let socket = UdpSocket::bind(self.local_endpoint())
            .await
            .map_err(|e| DnsError::Transport(format!("failed to bind UDP socket: {}", e)))?;

        timeout_at(deadline, socket.send_to(message_bytes, self.server_addr))
            .await
            .map_err(|_| {
                DnsError::Transport(format!("timeout sending UDP query to {}", self.server_addr))
            })?
            .map_err(|e| {
                DnsError::Transport(format!(
                    "failed to send UDP query to {}: {}",
                    self.server_addr, e
                ))
            })?;

        let mut reply = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let (len, source) = timeout_at(deadline, socket.recv_from(&mut reply))
                .await
                .map_err(|_| {
                    DnsError::Transport(format!(
                        "timeout waiting for UDP response from {}",
                        self.server_addr
                    ))
                })?
                .map_err(|e| {
                    DnsError::Transport(format!(
                        "failed to receive UDP response from {}: {}",
                        self.server_addr, e
                    ))
                })?;

            if source.ip() != self.server_addr.ip() {
                warn!(
                    expected = %self.server_addr,
                    received_from = %source,
                    "dropping datagram from unexpected source"
                );
                continue;
            }

            if let Err(e) = validate_response_id(message_bytes, &reply[..len], self.server_addr) {
                warn!(error = %e, "dropping reply that does not match the query");
                continue;
            }

            debug!(server = %self.server_addr, len, "UDP response received");
            return Ok(TransportResponse {
                bytes: reply[..len].to_vec(),
                protocol_used: "UDP",
            });
        }
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_endpoint_matches_server_family() {
        let v4 = UdpTransport::new("198.41.0.4:53".parse().unwrap());
        assert!(v4.local_endpoint().is_ipv4());

        let v6 = UdpTransport::new("[2001:503:ba3e::2:30]:53".parse().unwrap());
        assert!(v6.local_endpoint().is_ipv6());
        assert_eq!(v6.protocol_name(), "UDP");
    }

    #[tokio::test]
    async fn mismatched_replies_are_dropped_until_the_real_one() {
        let upstream = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let upstream_addr = upstream.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (n, from) = upstream.recv_from(&mut buf).await.unwrap();
            assert!(n >= 12);
            // A reply under someone else's transaction ID first, then
            // the real one.
            let decoy = [buf[0].wrapping_add(1), buf[1], 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0];
            upstream.send_to(&decoy, from).await.unwrap();
            let reply = [buf[0], buf[1], 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0];
            upstream.send_to(&reply, from).await.unwrap();
        });

        let transport = UdpTransport::new(upstream_addr);
        let query = [0x13, 0x37, 0x01, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        let response = transport.send(&query, Duration::from_secs(2)).await.unwrap();

        assert_eq!(response.bytes[..2], [0x13, 0x37]);
        assert_eq!(response.protocol_used, "UDP");
    }
}
