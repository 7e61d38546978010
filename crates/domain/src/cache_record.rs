use crate::{DnsQuery, RecordType, ResolverInfo};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{RData, Record};
use std::net::IpAddr;
use std::sync::Arc;

/// Outcome of one resolved query, ready to be stored and served by a cache.
///
/// Fields are private: a record never changes after it is built. The domain
/// and question echo the query that was asked, not the reply's question
/// section. Nothing here checks that the answers actually belong to that
/// question; the resolver is trusted as far as its TLS identity goes.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    domain: Arc<str>,
    question: RecordType,
    rcode: ResponseCode,
    answer: Vec<Record>,
    ns: Vec<Record>,
    extra: Vec<Record>,
    resolver: ResolverInfo,
}

impl CacheRecord {
    /// Builds a record from a decoded reply. `resolver` is copied.
    pub fn from_reply(query: &DnsQuery, reply: &Message, resolver: &ResolverInfo) -> Self {
        Self {
            domain: Arc::clone(&query.domain),
            question: query.record_type,
            rcode: reply.response_code(),
            answer: reply.answers().to_vec(),
            ns: reply.name_servers().to_vec(),
            extra: reply.additionals().to_vec(),
            resolver: resolver.clone(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn question(&self) -> RecordType {
        self.question
    }

    pub fn rcode(&self) -> ResponseCode {
        self.rcode
    }

    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    pub fn ns(&self) -> &[Record] {
        &self.ns
    }

    pub fn extra(&self) -> &[Record] {
        &self.extra
    }

    pub fn resolver(&self) -> &ResolverInfo {
        &self.resolver
    }

    /// A and AAAA data from the answer section, in reply order.
    pub fn addresses(&self) -> Vec<IpAddr> {
        self.answer
            .iter()
            .filter_map(|record| match record.data() {
                RData::A(a) => Some(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
                _ => None,
            })
            .collect()
    }

    /// Lowest TTL across all three sections.
    pub fn min_ttl(&self) -> Option<u32> {
        self.answer
            .iter()
            .chain(self.ns.iter())
            .chain(self.extra.iter())
            .map(|record| record.ttl())
            .min()
    }

    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }
}
