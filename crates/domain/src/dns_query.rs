use super::RecordType;
use std::sync::Arc;

/// A single question handed to a resolver. `domain` is expected to be
/// fully qualified (trailing dot); the message builder rejects it otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub domain: Arc<str>,
    pub record_type: RecordType,
}

impl DnsQuery {
    pub fn new(domain: impl Into<Arc<str>>, record_type: RecordType) -> Self {
        Self {
            domain: domain.into(),
            record_type,
        }
    }

    /// Appends the root label when the caller passed a relative name.
    pub fn fqdn(domain: &str, record_type: RecordType) -> Self {
        if domain.ends_with('.') {
            Self::new(domain, record_type)
        } else {
            Self::new(format!("{}.", domain), record_type)
        }
    }
}
