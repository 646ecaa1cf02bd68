use crate::ResponseCode;
use std::fmt;

/// The fixed 12-byte message header (RFC 1035 §4.1.1).
///
/// Flag fields are `bool`s; the encoder packs them into bytes 2 and 3.
/// The four counts are authoritative for the decoder and validated
/// against the section lengths by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DnsHeader {
    pub id: u16,
    /// QR bit: query (false) or response (true).
    pub response: bool,
    /// 4-bit kind of query; only 0 (standard query) is served.
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    /// Reserved bit, must be zero on the wire.
    pub z: bool,
    pub authentic_data: bool,
    pub checking_disabled: bool,
    pub rcode: ResponseCode,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl fmt::Display for DnsHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} {} opcode={} rcode={} qd={} an={} ns={} ar={}",
            self.id,
            if self.response { "response" } else { "query" },
            self.opcode,
            self.rcode,
            self.qdcount,
            self.ancount,
            self.nscount,
            self.arcount
        )
    }
}
