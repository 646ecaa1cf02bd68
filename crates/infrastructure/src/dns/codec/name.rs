//! Domain-name wire form: length-prefixed labels with RFC 1035 §4.1.4
//! backward compression pointers.

use rootward_domain::DnsError;
use std::collections::HashMap;

pub(super) const MAX_LABEL_LEN: usize = 63;
pub(super) const MAX_NAME_LEN: usize = 255;

/// Top two bits set marks a 2-byte compression pointer.
const POINTER_MASK: u8 = 0xC0;
/// Largest offset a 14-bit pointer can address.
const MAX_POINTER_OFFSET: usize = 0x3FFF;
/// Bound on pointer chains while decoding a single name.
const MAX_POINTER_JUMPS: usize = 8;

/// Appends `name` to the packet buffer, compressing against suffixes
/// already written anywhere earlier in the same packet.
///
/// `offsets` maps each previously written suffix ("mail.example.com",
/// "example.com", "com") to its absolute position in `buf`. On a hit a
/// pointer is emitted and the name ends there; otherwise the label is
/// written literally and its suffix registered at the current offset.
pub(super) fn encode_name(
    buf: &mut Vec<u8>,
    name: &str,
    offsets: &mut HashMap<String, usize>,
) -> Result<(), DnsError> {
    if name.is_empty() {
        buf.push(0);
        return Ok(());
    }

    let labels: Vec<&str> = name.split('.').collect();

    let mut encoded_len = 1; // terminating zero
    for label in &labels {
        if label.is_empty() {
            return Err(DnsError::Encode(format!("empty label in name '{}'", name)));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(DnsError::Encode(format!(
                "label '{}' exceeds {} bytes",
                label, MAX_LABEL_LEN
            )));
        }
        encoded_len += label.len() + 1;
    }
    if encoded_len > MAX_NAME_LEN {
        return Err(DnsError::Encode(format!(
            "name '{}' exceeds {} bytes",
            name, MAX_NAME_LEN
        )));
    }

    for (i, label) in labels.iter().enumerate() {
        let suffix = labels[i..].join(".");
        if let Some(&offset) = offsets.get(&suffix) {
            let pointer = 0xC000 | offset as u16;
            buf.extend_from_slice(&pointer.to_be_bytes());
            return Ok(());
        }
        // Offsets past the 14-bit range can never be pointed at.
        if buf.len() <= MAX_POINTER_OFFSET {
            offsets.insert(suffix, buf.len());
        }
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
    Ok(())
}

/// Decodes the name starting at `start`, following pointers anywhere
/// earlier in `buf`. Returns the name and the position immediately
/// after it (after the first pointer, when one was followed).
pub(super) fn decode_name(buf: &[u8], start: usize) -> Result<(String, usize), DnsError> {
    let mut labels: Vec<String> = Vec::new();
    let mut pos = start;
    let mut resume_at: Option<usize> = None;
    let mut jumps = 0;
    let mut decoded_len = 0;

    loop {
        let len_byte = *buf
            .get(pos)
            .ok_or_else(|| DnsError::Format("name runs past end of packet".to_string()))?;

        if len_byte == 0 {
            pos += 1;
            break;
        }

        if len_byte & POINTER_MASK == POINTER_MASK {
            let low = *buf.get(pos + 1).ok_or_else(|| {
                DnsError::Format("compression pointer runs past end of packet".to_string())
            })?;
            let target = ((len_byte & !POINTER_MASK) as usize) << 8 | low as usize;
            if target >= pos {
                return Err(DnsError::Format(format!(
                    "compression pointer at {} jumps forward to {}",
                    pos, target
                )));
            }
            jumps += 1;
            if jumps > MAX_POINTER_JUMPS {
                return Err(DnsError::Format(
                    "compression pointer chain too deep".to_string(),
                ));
            }
            if resume_at.is_none() {
                resume_at = Some(pos + 2);
            }
            pos = target;
            continue;
        }

        if len_byte & POINTER_MASK != 0 {
            return Err(DnsError::Format(format!(
                "reserved label type {:#04x}",
                len_byte
            )));
        }

        let end = pos + 1 + len_byte as usize;
        if end > buf.len() {
            return Err(DnsError::Format("label runs past end of packet".to_string()));
        }
        decoded_len += len_byte as usize + 1;
        if decoded_len + 1 > MAX_NAME_LEN {
            return Err(DnsError::Format(format!(
                "name exceeds {} bytes",
                MAX_NAME_LEN
            )));
        }
        let label = std::str::from_utf8(&buf[pos + 1..end])
            .map_err(|_| DnsError::Format("label is not valid UTF-8".to_string()))?;
        labels.push(label.to_string());
        pos = end;
    }

    Ok((labels.join("."), resume_at.unwrap_or(pos)))
}
