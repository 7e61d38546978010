#![allow(dead_code)]

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use warden_application::ports::SecureResolver;
use warden_domain::{CacheRecord, DnsQuery, ResolverDescriptor, ResolverError, ResolverInfo};

/// Resolver that answers every query with a fixed outcome and counts calls.
pub struct MockResolver {
    info: ResolverInfo,
    outcome: Result<(), ResolverError>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn answering(address: &str) -> Arc<Self> {
        Arc::new(Self {
            info: ResolverDescriptor::new(address, "/dns-query").info,
            outcome: Ok(()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(address: &str, error: ResolverError) -> Arc<Self> {
        Arc::new(Self {
            info: ResolverDescriptor::new(address, "/dns-query").info,
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecureResolver for MockResolver {
    fn info(&self) -> &ResolverInfo {
        &self.info
    }

    async fn query(
        &self,
        query: &DnsQuery,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(ResolverError::Cancelled);
        }
        self.outcome.clone()?;
        let reply = Message::new(0, MessageType::Response, OpCode::Query);
        Ok(CacheRecord::from_reply(query, &reply, &self.info))
    }
}
