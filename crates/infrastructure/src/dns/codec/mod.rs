//! DNS wire codec: `encode_packet` and `decode_packet` are duals; any
//! packet whose header counts match its sections decodes back to itself.
//!
//! Compression state is per-encoding scratch: every call starts with an
//! empty suffix→offset map scoped to the packet being built.

mod header;
mod name;
mod question;
mod record;

use header::{decode_header, encode_header, HEADER_LEN};
use question::{decode_question, encode_question};
use record::{decode_record, encode_record};
use rootward_domain::{DnsError, DnsPacket, DnsRecord};
use std::collections::HashMap;

pub fn encode_packet(packet: &DnsPacket) -> Result<Vec<u8>, DnsError> {
    let header = &packet.header;
    let counts = [
        ("QDCOUNT", header.qdcount, packet.questions.len()),
        ("ANCOUNT", header.ancount, packet.answers.len()),
        ("NSCOUNT", header.nscount, packet.authorities.len()),
        ("ARCOUNT", header.arcount, packet.additionals.len()),
    ];
    for (field, declared, actual) in counts {
        if declared as usize != actual {
            return Err(DnsError::Encode(format!(
                "{} is {} but the section holds {} entries",
                field, declared, actual
            )));
        }
    }

    let mut buf = Vec::with_capacity(512);
    let mut offsets: HashMap<String, usize> = HashMap::new();

    encode_header(&mut buf, header)?;
    for question in &packet.questions {
        encode_question(&mut buf, question, &mut offsets)?;
    }
    for section in [&packet.answers, &packet.authorities, &packet.additionals] {
        for rec in section {
            encode_record(&mut buf, rec, &mut offsets)?;
        }
    }
    Ok(buf)
}

pub fn decode_packet(buf: &[u8]) -> Result<DnsPacket, DnsError> {
    let header = decode_header(buf)?;

    // The truncation flag is surfaced as its own error so the transport
    // can retry the same query over TCP.
    if header.truncated {
        return Err(DnsError::Truncated);
    }

    let mut pos = HEADER_LEN;

    let mut questions = Vec::with_capacity(header.qdcount as usize);
    for _ in 0..header.qdcount {
        let (question, next) = decode_question(buf, pos)?;
        questions.push(question);
        pos = next;
    }

    let decode_section = |count: u16, pos: &mut usize| -> Result<Vec<DnsRecord>, DnsError> {
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (rec, next) = decode_record(buf, *pos)?;
            records.push(rec);
            *pos = next;
        }
        Ok(records)
    };

    let answers = decode_section(header.ancount, &mut pos)?;
    let authorities = decode_section(header.nscount, &mut pos)?;
    let additionals = decode_section(header.arcount, &mut pos)?;

    Ok(DnsPacket {
        header,
        questions,
        answers,
        authorities,
        additionals,
    })
}
