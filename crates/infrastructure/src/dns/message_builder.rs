//! DNS Message Builder
//!
//! Constructs DNS query messages in wire format using `hickory-proto`.

use super::record_type_map::RecordTypeMapper;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;
use warden_domain::{DnsQuery, ResolverError};

/// Builds canonical DoH query messages.
///
/// The message ID is always 0 so identical questions produce identical
/// bytes, and HTTP caches along the way can match them. RD is set and the
/// message carries a single IN-class question.
pub struct MessageBuilder;

impl MessageBuilder {
    pub fn build_message(query: &DnsQuery) -> Result<Message, ResolverError> {
        if query.domain.is_empty() {
            return Err(ResolverError::Encode("empty domain name".to_string()));
        }

        let name = Name::from_str(&query.domain).map_err(|e| {
            ResolverError::Encode(format!("Invalid domain '{}': {}", query.domain, e))
        })?;

        if !name.is_fqdn() {
            return Err(ResolverError::Encode(format!(
                "Domain '{}' is not fully qualified",
                query.domain
            )));
        }

        let mut question = Query::new();
        question.set_name(name);
        question.set_query_type(RecordTypeMapper::to_hickory(&query.record_type));
        question.set_query_class(DNSClass::IN);

        let mut message = Message::new(0, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(question);
        Ok(message)
    }

    /// Build a query message and serialize it to wire format bytes
    pub fn build_query(query: &DnsQuery) -> Result<Vec<u8>, ResolverError> {
        let message = Self::build_message(query)?;
        Self::serialize_message(&message)
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, ResolverError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            ResolverError::Encode(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
