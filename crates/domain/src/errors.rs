use crate::{DnsRecord, ResponseCode};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("malformed packet: {0}")]
    Format(String),

    /// The upstream set TC=1. Internal signal for the TCP retry, never
    /// surfaced to a client.
    #[error("response truncated by upstream")]
    Truncated,

    #[error("transport error: {0}")]
    Transport(String),

    /// Non-zero RCODE from an upstream server. For NXDOMAIN the
    /// authority SOA records ride along so negative answers keep their
    /// provenance.
    #[error("upstream answered {code}")]
    Upstream {
        code: ResponseCode,
        authority: Vec<DnsRecord>,
    },

    #[error("recursion depth exceeded")]
    DepthExceeded,

    #[error("no reachable nameserver for referral")]
    NoNameserver,

    #[error("unsupported query: {0}")]
    Unsupported(String),

    #[error("cannot encode packet: {0}")]
    Encode(String),
}
