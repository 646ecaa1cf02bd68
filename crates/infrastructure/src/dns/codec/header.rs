//! Header (de)serialisation. Bytes 2 and 3 carry the nine flag bits,
//! the opcode, and the RCODE, packed exactly as RFC 1035 §4.1.1 lays
//! them out.

use rootward_domain::{DnsError, DnsHeader, ResponseCode};

pub(super) const HEADER_LEN: usize = 12;

pub(super) fn encode_header(buf: &mut Vec<u8>, header: &DnsHeader) -> Result<(), DnsError> {
    if header.opcode > 0xF {
        return Err(DnsError::Encode(format!(
            "opcode {} does not fit 4 bits",
            header.opcode
        )));
    }

    let flags_hi = (header.response as u8) << 7
        | (header.opcode & 0xF) << 3
        | (header.authoritative as u8) << 2
        | (header.truncated as u8) << 1
        | header.recursion_desired as u8;
    let flags_lo = (header.recursion_available as u8) << 7
        | (header.z as u8) << 6
        | (header.authentic_data as u8) << 5
        | (header.checking_disabled as u8) << 4
        | (header.rcode.to_u8() & 0xF);

    buf.extend_from_slice(&header.id.to_be_bytes());
    buf.push(flags_hi);
    buf.push(flags_lo);
    buf.extend_from_slice(&header.qdcount.to_be_bytes());
    buf.extend_from_slice(&header.ancount.to_be_bytes());
    buf.extend_from_slice(&header.nscount.to_be_bytes());
    buf.extend_from_slice(&header.arcount.to_be_bytes());
    Ok(())
}

pub(super) fn decode_header(buf: &[u8]) -> Result<DnsHeader, DnsError> {
    if buf.len() < HEADER_LEN {
        return Err(DnsError::Format(format!(
            "packet of {} bytes is shorter than the {}-byte header",
            buf.len(),
            HEADER_LEN
        )));
    }

    let rcode_raw = buf[3] & 0xF;
    let rcode = ResponseCode::from_u8(rcode_raw)
        .ok_or_else(|| DnsError::Format(format!("unknown response code {}", rcode_raw)))?;

    Ok(DnsHeader {
        id: u16::from_be_bytes([buf[0], buf[1]]),
        response: buf[2] >> 7 & 1 == 1,
        opcode: buf[2] >> 3 & 0xF,
        authoritative: buf[2] >> 2 & 1 == 1,
        truncated: buf[2] >> 1 & 1 == 1,
        recursion_desired: buf[2] & 1 == 1,
        recursion_available: buf[3] >> 7 & 1 == 1,
        z: buf[3] >> 6 & 1 == 1,
        authentic_data: buf[3] >> 5 & 1 == 1,
        checking_disabled: buf[3] >> 4 & 1 == 1,
        rcode,
        qdcount: u16::from_be_bytes([buf[4], buf[5]]),
        ancount: u16::from_be_bytes([buf[6], buf[7]]),
        nscount: u16::from_be_bytes([buf[8], buf[9]]),
        arcount: u16::from_be_bytes([buf[10], buf[11]]),
    })
}
