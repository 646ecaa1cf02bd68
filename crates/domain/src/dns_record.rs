mod record;
mod record_type;

pub use record::{DnsRecord, EdnsOption, RecordPreamble};
pub use record_type::RecordType;
