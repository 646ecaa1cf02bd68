pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use rootward_domain::DnsError;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,
    pub protocol_used: &'static str,
}

/// One upstream round-trip. Implementations own their socket for the
/// duration of the call, release it on every exit path, and only hand
/// back bytes that echo the query's transaction ID.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError>;

    fn protocol_name(&self) -> &'static str;
}

/// Checks that a response echoes the query's transaction ID. A
/// mismatched reply is someone else's (or forged) and must be dropped.
pub(crate) fn validate_response_id(
    query: &[u8],
    response: &[u8],
    server: SocketAddr,
) -> Result<(), DnsError> {
    if query.len() < 2 || response.len() < 2 {
        return Err(DnsError::Transport(format!(
            "message from {} too short to carry a transaction ID",
            server
        )));
    }
    if query[..2] != response[..2] {
        return Err(DnsError::Transport(format!(
            "transaction ID mismatch from {}: sent {:02x}{:02x}, got {:02x}{:02x}",
            server, query[0], query[1], response[0], response[1]
        )));
    }
    Ok(())
}
