//! TCP transport with RFC 1035 §4.2.2 two-byte length framing, used
//! when a UDP response came back truncated. One connection per call;
//! connect, send, and read all share a single deadline.

use super::{validate_response_id, DnsTransport, TransportResponse};
use async_trait::async_trait;
use rootward_domain::DnsError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    fn timeout_error(&self, stage: &str) -> DnsError {
        DnsError::Transport(format!("timeout {} TCP server {}", stage, self.server_addr))
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DnsError> {
        if message_bytes.len() > u16::MAX as usize {
            return Err(DnsError::Transport(format!(
                "query of {} bytes does not fit a TCP length prefix",
                message_bytes.len()
            )));
        }

        let deadline = Instant::now() + timeout;

        let mut stream = timeout_at(deadline, TcpStream::connect(self.server_addr))
            .await
            .map_err(|_| self.timeout_error("connecting to"))?
            .map_err(|e| {
                DnsError::Transport(format!(
                    "connection to TCP server {} failed: {}",
                    self.server_addr, e
                ))
            })?;

        timeout_at(deadline, write_frame(&mut stream, message_bytes))
            .await
            .map_err(|_| self.timeout_error("sending query to"))??;

        let response = timeout_at(deadline, read_frame(&mut stream))
            .await
            .map_err(|_| self.timeout_error("reading response from"))??;

        validate_response_id(message_bytes, &response, self.server_addr)?;

        debug!(
            server = %self.server_addr,
            response_len = response.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: response,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

async fn write_frame<S>(stream: &mut S, message: &[u8]) -> Result<(), DnsError>
where
    S: AsyncWriteExt + Unpin,
{
    stream
        .write_all(&(message.len() as u16).to_be_bytes())
        .await
        .map_err(|e| DnsError::Transport(format!("failed to write length prefix: {}", e)))?;
    stream
        .write_all(message)
        .await
        .map_err(|e| DnsError::Transport(format!("failed to write DNS message: {}", e)))?;
    stream
        .flush()
        .await
        .map_err(|e| DnsError::Transport(format!("failed to flush stream: {}", e)))
}

async fn read_frame<S>(stream: &mut S) -> Result<Vec<u8>, DnsError>
where
    S: AsyncReadExt + Unpin,
{
    let mut prefix = [0u8; 2];
    stream
        .read_exact(&mut prefix)
        .await
        .map_err(|e| DnsError::Transport(format!("failed to read response length: {}", e)))?;

    let mut frame = vec![0u8; u16::from_be_bytes(prefix) as usize];
    stream
        .read_exact(&mut frame)
        .await
        .map_err(|e| DnsError::Transport(format!("failed to read response body: {}", e)))?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_carry_a_big_endian_length_prefix() {
        let (mut near, mut far) = tokio::io::duplex(256);

        write_frame(&mut near, b"abc").await.unwrap();
        let mut raw = [0u8; 5];
        far.read_exact(&mut raw).await.unwrap();
        assert_eq!(raw, [0, 3, b'a', b'b', b'c']);

        write_frame(&mut far, b"hello").await.unwrap();
        let frame = read_frame(&mut near).await.unwrap();
        assert_eq!(frame, b"hello");
    }

    #[tokio::test]
    async fn short_frame_is_an_error() {
        let (mut near, mut far) = tokio::io::duplex(256);
        near.write_all(&[0, 9, b'x']).await.unwrap();
        drop(near);
        assert!(read_frame(&mut far).await.is_err());
    }

    #[tokio::test]
    async fn oversized_query_is_refused_before_connecting() {
        let transport = TcpTransport::new("192.0.2.1:53".parse().unwrap());
        let huge = vec![0u8; u16::MAX as usize + 1];
        let err = transport
            .send(&huge, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, DnsError::Transport(_)));
    }
}
