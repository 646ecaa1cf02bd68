//! Resource-record (de)serialisation: shared preamble, then a payload
//! keyed by TYPE. Names inside RDATA take part in packet-wide
//! compression, so payloads are written straight into the packet buffer
//! and RDLENGTH is patched in afterwards.

use super::name::{decode_name, encode_name};
use rootward_domain::{DnsClass, DnsError, DnsRecord, EdnsOption, RecordPreamble, RecordType};
use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

pub(super) fn encode_record(
    buf: &mut Vec<u8>,
    record: &DnsRecord,
    offsets: &mut HashMap<String, usize>,
) -> Result<(), DnsError> {
    if let DnsRecord::OPT {
        udp_payload_size,
        ext_rcode,
        version,
        dnssec_ok,
        z,
        options,
    } = record
    {
        return encode_opt(
            buf,
            *udp_payload_size,
            *ext_rcode,
            *version,
            *dnssec_ok,
            *z,
            options,
        );
    }

    encode_name(buf, record.name(), offsets)?;
    buf.extend_from_slice(&record.rtype().to_u16().to_be_bytes());

    let (class, ttl) = match record {
        DnsRecord::A { preamble, .. }
        | DnsRecord::AAAA { preamble, .. }
        | DnsRecord::NS { preamble, .. }
        | DnsRecord::CNAME { preamble, .. }
        | DnsRecord::PTR { preamble, .. }
        | DnsRecord::TXT { preamble, .. }
        | DnsRecord::MX { preamble, .. }
        | DnsRecord::SOA { preamble, .. } => (preamble.class, preamble.ttl),
        DnsRecord::OPT { .. } => unreachable!("handled above"),
    };
    buf.extend_from_slice(&class.to_u16().to_be_bytes());
    buf.extend_from_slice(&ttl.to_be_bytes());

    let rdlength_at = buf.len();
    buf.extend_from_slice(&[0, 0]);

    match record {
        DnsRecord::A { address, .. } => buf.extend_from_slice(&address.octets()),
        DnsRecord::AAAA { address, .. } => buf.extend_from_slice(&address.octets()),
        DnsRecord::NS { host, .. } => encode_name(buf, host, offsets)?,
        DnsRecord::CNAME { target, .. } => encode_name(buf, target, offsets)?,
        DnsRecord::PTR { target, .. } => encode_name(buf, target, offsets)?,
        DnsRecord::TXT { text, .. } => buf.extend_from_slice(text),
        DnsRecord::MX {
            preference,
            exchange,
            ..
        } => {
            buf.extend_from_slice(&preference.to_be_bytes());
            encode_name(buf, exchange, offsets)?;
        }
        DnsRecord::SOA {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
            ..
        } => {
            encode_name(buf, mname, offsets)?;
            encode_name(buf, rname, offsets)?;
            for field in [serial, refresh, retry, expire, minimum] {
                buf.extend_from_slice(&field.to_be_bytes());
            }
        }
        DnsRecord::OPT { .. } => unreachable!("handled above"),
    }

    patch_rdlength(buf, rdlength_at)
}

fn encode_opt(
    buf: &mut Vec<u8>,
    udp_payload_size: u16,
    ext_rcode: u8,
    version: u8,
    dnssec_ok: bool,
    z: u16,
    options: &[EdnsOption],
) -> Result<(), DnsError> {
    buf.push(0); // root owner name
    buf.extend_from_slice(&RecordType::OPT.to_u16().to_be_bytes());
    buf.extend_from_slice(&udp_payload_size.to_be_bytes());

    let ttl = (ext_rcode as u32) << 24
        | (version as u32) << 16
        | (dnssec_ok as u32) << 15
        | (z as u32 & 0x7FFF);
    buf.extend_from_slice(&ttl.to_be_bytes());

    let rdlength_at = buf.len();
    buf.extend_from_slice(&[0, 0]);
    for option in options {
        if option.data.len() > u16::MAX as usize {
            return Err(DnsError::Encode(format!(
                "EDNS option {} data exceeds 65535 bytes",
                option.code
            )));
        }
        buf.extend_from_slice(&option.code.to_be_bytes());
        buf.extend_from_slice(&(option.data.len() as u16).to_be_bytes());
        buf.extend_from_slice(&option.data);
    }

    patch_rdlength(buf, rdlength_at)
}

fn patch_rdlength(buf: &mut [u8], rdlength_at: usize) -> Result<(), DnsError> {
    let rdlength = buf.len() - rdlength_at - 2;
    if rdlength > u16::MAX as usize {
        return Err(DnsError::Encode(format!(
            "RDATA of {} bytes exceeds 65535",
            rdlength
        )));
    }
    buf[rdlength_at..rdlength_at + 2].copy_from_slice(&(rdlength as u16).to_be_bytes());
    Ok(())
}

/// Decodes the record starting at `start`. `buf` is the whole packet so
/// RDATA-embedded names can chase pointers anywhere earlier in it.
/// Returns the record and the position just past its RDATA.
pub(super) fn decode_record(buf: &[u8], start: usize) -> Result<(DnsRecord, usize), DnsError> {
    let (name, pos) = decode_name(buf, start)?;

    if pos + 10 > buf.len() {
        return Err(DnsError::Format(
            "record preamble runs past end of packet".to_string(),
        ));
    }
    let rtype_raw = u16::from_be_bytes([buf[pos], buf[pos + 1]]);
    let class_raw = u16::from_be_bytes([buf[pos + 2], buf[pos + 3]]);
    let ttl = u32::from_be_bytes([buf[pos + 4], buf[pos + 5], buf[pos + 6], buf[pos + 7]]);
    let rdlength = u16::from_be_bytes([buf[pos + 8], buf[pos + 9]]) as usize;

    let rdata_start = pos + 10;
    let rdata_end = rdata_start + rdlength;
    if rdata_end > buf.len() {
        return Err(DnsError::Format(format!(
            "RDATA of {} bytes runs past end of packet",
            rdlength
        )));
    }
    let rdata = &buf[rdata_start..rdata_end];

    let rtype = RecordType::from_u16(rtype_raw)
        .ok_or_else(|| DnsError::Format(format!("unknown record type {}", rtype_raw)))?;

    if rtype == RecordType::OPT {
        let record = decode_opt(&name, class_raw, ttl, rdata)?;
        return Ok((record, rdata_end));
    }

    let class = DnsClass::from_u16(class_raw)
        .ok_or_else(|| DnsError::Format(format!("unknown class {}", class_raw)))?;
    let preamble = RecordPreamble { name, class, ttl };

    let record = match rtype {
        RecordType::A => DnsRecord::A {
            preamble,
            address: Ipv4Addr::from(ipv4_octets(rdata)?),
        },
        RecordType::AAAA => DnsRecord::AAAA {
            preamble,
            address: Ipv6Addr::from(ipv6_octets(rdata)?),
        },
        RecordType::NS => DnsRecord::NS {
            preamble,
            host: decode_name(buf, rdata_start)?.0,
        },
        RecordType::CNAME => DnsRecord::CNAME {
            preamble,
            target: decode_name(buf, rdata_start)?.0,
        },
        RecordType::PTR => DnsRecord::PTR {
            preamble,
            target: decode_name(buf, rdata_start)?.0,
        },
        RecordType::TXT => DnsRecord::TXT {
            preamble,
            text: rdata.to_vec(),
        },
        RecordType::MX => {
            if rdata.len() < 2 {
                return Err(DnsError::Format(
                    "MX RDATA shorter than its preference field".to_string(),
                ));
            }
            DnsRecord::MX {
                preamble,
                preference: u16::from_be_bytes([rdata[0], rdata[1]]),
                exchange: decode_name(buf, rdata_start + 2)?.0,
            }
        }
        RecordType::SOA => {
            let (mname, pos) = decode_name(buf, rdata_start)?;
            let (rname, pos) = decode_name(buf, pos)?;
            if pos + 20 > buf.len() {
                return Err(DnsError::Format(
                    "SOA RDATA runs past end of packet".to_string(),
                ));
            }
            let field = |i: usize| {
                u32::from_be_bytes([buf[pos + i], buf[pos + i + 1], buf[pos + i + 2], buf[pos + i + 3]])
            };
            DnsRecord::SOA {
                preamble,
                mname,
                rname,
                serial: field(0),
                refresh: field(4),
                retry: field(8),
                expire: field(12),
                minimum: field(16),
            }
        }
        RecordType::SRV | RecordType::CAA | RecordType::ANY => {
            return Err(DnsError::Format(format!(
                "unsupported record type {} in a record section",
                rtype
            )));
        }
        RecordType::OPT => unreachable!("handled above"),
    };

    Ok((record, rdata_end))
}

fn decode_opt(name: &str, class_raw: u16, ttl: u32, rdata: &[u8]) -> Result<DnsRecord, DnsError> {
    if !name.is_empty() {
        return Err(DnsError::Format(format!(
            "OPT owner name must be the root, got '{}'",
            name
        )));
    }

    let mut options = Vec::new();
    let mut i = 0;
    while i + 4 <= rdata.len() {
        let code = u16::from_be_bytes([rdata[i], rdata[i + 1]]);
        let length = u16::from_be_bytes([rdata[i + 2], rdata[i + 3]]) as usize;
        if i + 4 + length > rdata.len() {
            return Err(DnsError::Format(format!(
                "EDNS option {} runs past end of RDATA",
                code
            )));
        }
        options.push(EdnsOption {
            code,
            data: rdata[i + 4..i + 4 + length].to_vec(),
        });
        i += 4 + length;
    }
    if i != rdata.len() {
        return Err(DnsError::Format(
            "trailing bytes after last EDNS option".to_string(),
        ));
    }

    Ok(DnsRecord::OPT {
        udp_payload_size: class_raw,
        ext_rcode: (ttl >> 24) as u8,
        version: (ttl >> 16) as u8,
        dnssec_ok: ttl & 0x8000 != 0,
        z: (ttl & 0x7FFF) as u16,
        options,
    })
}

fn ipv4_octets(rdata: &[u8]) -> Result<[u8; 4], DnsError> {
    rdata
        .try_into()
        .map_err(|_| DnsError::Format(format!("A RDATA must be 4 bytes, got {}", rdata.len())))
}

fn ipv6_octets(rdata: &[u8]) -> Result<[u8; 16], DnsError> {
    rdata
        .try_into()
        .map_err(|_| DnsError::Format(format!("AAAA RDATA must be 16 bytes, got {}", rdata.len())))
}
