//! The recursive state machine. Starting from a root server it follows
//! referrals down the hierarchy, chases CNAMEs, and harvests glue, with
//! a depth counter as the sole termination guard.

use super::exchange::Exchange;
use crate::dns::root_hints;
use futures::future::BoxFuture;
use rootward_domain::{
    DnsClass, DnsError, DnsHeader, DnsPacket, DnsQuestion, DnsRecord, RecordType, ResponseCode,
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RecursiveResolver {
    exchange: Arc<dyn Exchange>,
    /// Every recursive step (referral, CNAME, glue lookup, root
    /// fallback) consumes one unit of depth.
    max_depth: u8,
}

impl RecursiveResolver {
    pub fn new(exchange: Arc<dyn Exchange>, max_depth: u8) -> Self {
        Self { exchange, max_depth }
    }

    /// Asks `server` for `(domain, qtype)` and interprets the response:
    /// a direct answer is returned whole, a CNAME is chased on the same
    /// server, a referral recurses onto a delegated nameserver, and an
    /// empty referral restarts from the root hints.
    pub fn resolve<'a>(
        &'a self,
        server: IpAddr,
        domain: &'a str,
        qtype: RecordType,
        depth: u8,
    ) -> BoxFuture<'a, Result<Vec<DnsRecord>, DnsError>> {
        Box::pin(async move {
            if depth >= self.max_depth {
                return Err(DnsError::DepthExceeded);
            }

            debug!(server = %server, domain, qtype = %qtype, depth, "querying nameserver");
            let query = build_query(domain, qtype);
            let response = self.exchange.exchange(server, &query).await?;

            if response.header.rcode != ResponseCode::NoError {
                // On NXDOMAIN the authority SOAs travel with the error
                // so callers can hand out the negative answer.
                let authority = if response.header.rcode == ResponseCode::NameError {
                    response
                        .authorities
                        .iter()
                        .filter(|rec| rec.rtype() == RecordType::SOA)
                        .cloned()
                        .collect()
                } else {
                    Vec::new()
                };
                return Err(DnsError::Upstream {
                    code: response.header.rcode,
                    authority,
                });
            }

            // A record matching the question means the whole answer
            // section goes back, parallel records included.
            let direct_hit = response
                .answers
                .iter()
                .any(|rec| rec.rtype() == qtype && rec.name().eq_ignore_ascii_case(domain));
            if direct_hit {
                return Ok(response.answers);
            }

            // CNAME chase, trying the same server first.
            if let Some(cname) = response
                .answers
                .iter()
                .find(|rec| rec.rtype() == RecordType::CNAME)
            {
                if let DnsRecord::CNAME { target, .. } = cname {
                    debug!(domain, target = %target, "following CNAME");
                    let mut chain = vec![cname.clone()];
                    let resolved = self.resolve(server, target, qtype, depth + 1).await?;
                    chain.extend(resolved);
                    return Ok(chain);
                }
            }

            // Referral: NS hosts from the authority section, glue
            // addresses from the additional section.
            let mut ns_hosts: HashMap<String, Vec<IpAddr>> = HashMap::new();
            for rec in &response.authorities {
                if let DnsRecord::NS { host, .. } = rec {
                    ns_hosts.insert(host.to_ascii_lowercase(), Vec::new());
                }
            }
            for rec in &response.additionals {
                let (name, address) = match rec {
                    DnsRecord::A {
                        preamble, address, ..
                    } => (&preamble.name, IpAddr::V4(*address)),
                    DnsRecord::AAAA {
                        preamble, address, ..
                    } => (&preamble.name, IpAddr::V6(*address)),
                    _ => continue,
                };
                if let Some(addresses) = ns_hosts.get_mut(&name.to_ascii_lowercase()) {
                    addresses.push(address);
                }
            }

            if ns_hosts.is_empty() {
                warn!(domain, "response carried no answer and no referral, restarting from a root");
                let root = root_hints::random_root_server();
                return self.resolve(root, domain, qtype, depth + 1).await;
            }

            let next_server = self.select_nameserver(&ns_hosts, depth).await?;
            self.resolve(next_server, domain, qtype, depth + 1).await
        })
    }

    /// Picks a random NS host from a referral. A host without glue is
    /// re-resolved through the roots (out-of-bailiwick delegation);
    /// IPv4 addresses are preferred over IPv6.
    async fn select_nameserver(
        &self,
        ns_hosts: &HashMap<String, Vec<IpAddr>>,
        depth: u8,
    ) -> Result<IpAddr, DnsError> {
        let hosts: Vec<&String> = ns_hosts.keys().collect();
        let host = hosts[fastrand::usize(..hosts.len())];
        let glue = &ns_hosts[host];

        if !glue.is_empty() {
            return pick_address(glue).ok_or(DnsError::NoNameserver);
        }

        debug!(host = %host, "nameserver came without glue, resolving it from the roots");
        let root = root_hints::random_root_server();
        let records = match self.resolve(root, host, RecordType::A, depth + 1).await {
            Ok(records) => records,
            Err(e) => {
                warn!(host = %host, error = %e, "failed to resolve nameserver address");
                Vec::new()
            }
        };
        let addresses: Vec<IpAddr> = records
            .iter()
            .filter_map(|rec| match rec {
                DnsRecord::A { address, .. } => Some(IpAddr::V4(*address)),
                DnsRecord::AAAA { address, .. } => Some(IpAddr::V6(*address)),
                _ => None,
            })
            .collect();
        pick_address(&addresses).ok_or(DnsError::NoNameserver)
    }
}

/// Uniformly random IPv4 address, falling back to IPv6 only when no
/// IPv4 candidate exists.
fn pick_address(addresses: &[IpAddr]) -> Option<IpAddr> {
    let v4: Vec<IpAddr> = addresses.iter().copied().filter(IpAddr::is_ipv4).collect();
    if !v4.is_empty() {
        return Some(v4[fastrand::usize(..v4.len())]);
    }
    if addresses.is_empty() {
        None
    } else {
        Some(addresses[fastrand::usize(..addresses.len())])
    }
}

fn build_query(domain: &str, qtype: RecordType) -> DnsPacket {
    DnsPacket {
        header: DnsHeader {
            id: fastrand::u16(..),
            recursion_desired: true,
            qdcount: 1,
            ..Default::default()
        },
        questions: vec![DnsQuestion::new(domain, qtype, DnsClass::IN)],
        answers: Vec::new(),
        authorities: Vec::new(),
        additionals: Vec::new(),
    }
}
