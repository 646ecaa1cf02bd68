use super::name::{decode_name, encode_name};
use rootward_domain::{DnsClass, DnsError, DnsQuestion, RecordType};
use std::collections::HashMap;

pub(super) fn encode_question(
    buf: &mut Vec<u8>,
    question: &DnsQuestion,
    offsets: &mut HashMap<String, usize>,
) -> Result<(), DnsError> {
    encode_name(buf, &question.name, offsets)?;
    buf.extend_from_slice(&question.qtype.to_u16().to_be_bytes());
    buf.extend_from_slice(&question.class.to_u16().to_be_bytes());
    Ok(())
}

pub(super) fn decode_question(buf: &[u8], start: usize) -> Result<(DnsQuestion, usize), DnsError> {
    let (name, pos) = decode_name(buf, start)?;

    if pos + 4 > buf.len() {
        return Err(DnsError::Format(
            "question runs past end of packet".to_string(),
        ));
    }
    let qtype_raw = u16::from_be_bytes([buf[pos], buf[pos + 1]]);
    let class_raw = u16::from_be_bytes([buf[pos + 2], buf[pos + 3]]);

    let qtype = RecordType::from_u16(qtype_raw)
        .ok_or_else(|| DnsError::Format(format!("unknown record type {}", qtype_raw)))?;
    let class = DnsClass::from_u16(class_raw)
        .ok_or_else(|| DnsError::Format(format!("unknown class {}", class_raw)))?;

    Ok((DnsQuestion { name, qtype, class }, pos + 4))
}
