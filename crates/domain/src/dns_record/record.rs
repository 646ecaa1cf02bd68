use super::RecordType;
use crate::DnsClass;
use std::net::{Ipv4Addr, Ipv6Addr};

/// The owner name, class, and TTL shared by every ordinary record.
/// The record type lives in the `DnsRecord` variant tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPreamble {
    pub name: String,
    pub class: DnsClass,
    pub ttl: u32,
}

impl RecordPreamble {
    pub fn new(name: impl Into<String>, class: DnsClass, ttl: u32) -> Self {
        Self {
            name: name.into(),
            class,
            ttl,
        }
    }
}

/// A single EDNS(0) option from an OPT record's RDATA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

/// A resource record, tagged by type.
///
/// OPT is the odd one out: its owner name is always the root and its
/// CLASS/TTL preamble fields are overloaded (RFC 6891), so it carries
/// the reinterpreted fields instead of a `RecordPreamble`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsRecord {
    A {
        preamble: RecordPreamble,
        address: Ipv4Addr,
    },
    AAAA {
        preamble: RecordPreamble,
        address: Ipv6Addr,
    },
    NS {
        preamble: RecordPreamble,
        host: String,
    },
    CNAME {
        preamble: RecordPreamble,
        target: String,
    },
    PTR {
        preamble: RecordPreamble,
        target: String,
    },
    TXT {
        preamble: RecordPreamble,
        text: Vec<u8>,
    },
    MX {
        preamble: RecordPreamble,
        preference: u16,
        exchange: String,
    },
    SOA {
        preamble: RecordPreamble,
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    OPT {
        udp_payload_size: u16,
        ext_rcode: u8,
        version: u8,
        dnssec_ok: bool,
        z: u16,
        options: Vec<EdnsOption>,
    },
}

impl DnsRecord {
    pub fn rtype(&self) -> RecordType {
        match self {
            DnsRecord::A { .. } => RecordType::A,
            DnsRecord::AAAA { .. } => RecordType::AAAA,
            DnsRecord::NS { .. } => RecordType::NS,
            DnsRecord::CNAME { .. } => RecordType::CNAME,
            DnsRecord::PTR { .. } => RecordType::PTR,
            DnsRecord::TXT { .. } => RecordType::TXT,
            DnsRecord::MX { .. } => RecordType::MX,
            DnsRecord::SOA { .. } => RecordType::SOA,
            DnsRecord::OPT { .. } => RecordType::OPT,
        }
    }

    /// Owner name; the root (`""`) for OPT.
    pub fn name(&self) -> &str {
        match self {
            DnsRecord::A { preamble, .. }
            | DnsRecord::AAAA { preamble, .. }
            | DnsRecord::NS { preamble, .. }
            | DnsRecord::CNAME { preamble, .. }
            | DnsRecord::PTR { preamble, .. }
            | DnsRecord::TXT { preamble, .. }
            | DnsRecord::MX { preamble, .. }
            | DnsRecord::SOA { preamble, .. } => &preamble.name,
            DnsRecord::OPT { .. } => "",
        }
    }
}
