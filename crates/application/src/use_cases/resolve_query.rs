use crate::ports::SecureResolver;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use warden_domain::{CacheRecord, DnsQuery, ResolverError};

/// Use case: resolve one query, failing over across resolvers in order.
///
/// Each resolver gets exactly one attempt. Cancellation and encoding errors
/// end the search immediately since another resolver cannot fix them.
pub struct ResolveQueryUseCase {
    resolvers: Vec<Arc<dyn SecureResolver>>,
}

impl ResolveQueryUseCase {
    pub fn new(resolvers: Vec<Arc<dyn SecureResolver>>) -> Self {
        Self { resolvers }
    }

    pub async fn execute(
        &self,
        query: &DnsQuery,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord, ResolverError> {
        let mut last_error =
            ResolverError::InvalidConfig("no resolvers configured".to_string());

        for resolver in &self.resolvers {
            match resolver.query(query, cancel).await {
                Ok(record) => {
                    debug!(
                        domain = %query.domain,
                        record_type = %query.record_type,
                        resolver = %resolver.info().id(),
                        rcode = %record.rcode(),
                        "Query resolved"
                    );
                    return Ok(record);
                }
                Err(e) if e.is_cancelled() || matches!(e, ResolverError::Encode(_)) => {
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        domain = %query.domain,
                        resolver = %resolver.info().id(),
                        error = %e,
                        "Resolver failed, trying next"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
