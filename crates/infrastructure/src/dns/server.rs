//! Packet-level entry point: validates one client query, runs the
//! resolver from a random root, and assembles the wire response. Every
//! per-query failure becomes a response code, never a crash.

use crate::dns::codec;
use crate::dns::resolver::RecursiveResolver;
use crate::dns::root_hints;
use rootward_domain::{DnsError, DnsHeader, DnsPacket, DnsRecord, ResponseCode};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct DnsServerHandler {
    resolver: Arc<RecursiveResolver>,
}

impl DnsServerHandler {
    pub fn new(resolver: Arc<RecursiveResolver>) -> Self {
        Self { resolver }
    }

    /// Handles one raw client datagram. Returns the serialised response,
    /// or `None` when the query is too mangled to even echo an ID back.
    pub async fn handle(&self, query_buf: &[u8]) -> Option<Vec<u8>> {
        let query = match codec::decode_packet(query_buf) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "failed to decode client query");
                return format_error_response(query_buf);
            }
        };

        let response = self.respond(&query).await;
        match codec::encode_packet(&response) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!(error = %e, "failed to encode response");
                None
            }
        }
    }

    async fn respond(&self, query: &DnsPacket) -> DnsPacket {
        let mut response = DnsPacket {
            header: DnsHeader {
                id: query.header.id,
                response: true,
                opcode: query.header.opcode,
                recursion_desired: query.header.recursion_desired,
                recursion_available: true,
                ..Default::default()
            },
            questions: query.questions.clone(),
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        };

        match self.resolve_question(query).await {
            Ok(answers) => {
                response.answers = answers;
            }
            Err(DnsError::Upstream { code, authority }) => {
                debug!(rcode = %code, "propagating upstream response code");
                response.header.rcode = code;
                response.authorities = authority;
            }
            Err(DnsError::Unsupported(reason)) => {
                warn!(reason = %reason, "rejecting unsupported query");
                response.header.rcode = ResponseCode::NotImplemented;
            }
            Err(e) => {
                error!(error = %e, "resolution failed");
                response.header.rcode = ResponseCode::ServerFailure;
            }
        }

        // Echo the client's OPT record so EDNS-aware clients get their
        // pseudo-record back (no negotiation beyond the echo).
        for rec in &query.additionals {
            if let DnsRecord::OPT { .. } = rec {
                response.additionals.push(rec.clone());
            }
        }

        response.sync_counts();
        response
    }

    async fn resolve_question(&self, query: &DnsPacket) -> Result<Vec<DnsRecord>, DnsError> {
        if query.header.opcode != 0 {
            return Err(DnsError::Unsupported(format!(
                "opcode {}",
                query.header.opcode
            )));
        }
        if query.header.qdcount != 1 || query.questions.len() != 1 {
            return Err(DnsError::Unsupported(format!(
                "{} questions",
                query.questions.len()
            )));
        }

        let question = &query.questions[0];
        let root = root_hints::random_root_server();
        info!(question = %question, root = %root, "resolving client query");
        self.resolver
            .resolve(root, &question.name, question.qtype, 0)
            .await
    }
}

/// Builds a FORMERR reply when the client's ID is still readable from
/// the first two bytes; anything shorter is dropped.
fn format_error_response(query_buf: &[u8]) -> Option<Vec<u8>> {
    if query_buf.len() < 2 {
        return None;
    }
    let response = DnsPacket {
        header: DnsHeader {
            id: u16::from_be_bytes([query_buf[0], query_buf[1]]),
            response: true,
            recursion_available: true,
            rcode: ResponseCode::FormatError,
            ..Default::default()
        },
        ..Default::default()
    };
    codec::encode_packet(&response).ok()
}
