use crate::{DnsClass, RecordType};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuestion {
    /// Dot-separated owner name; `""` is the root.
    pub name: String,
    pub qtype: RecordType,
    pub class: DnsClass,
}

impl DnsQuestion {
    pub fn new(name: impl Into<String>, qtype: RecordType, class: DnsClass) -> Self {
        Self {
            name: name.into(),
            qtype,
            class,
        }
    }
}

impl fmt::Display for DnsQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.class, self.qtype)
    }
}
