use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use warden_domain::{CacheRecord, DnsQuery, ResolverError, ResolverInfo};

#[async_trait]
pub trait SecureResolver: Send + Sync {
    /// Identity stamped onto the records this resolver produces.
    fn info(&self) -> &ResolverInfo;

    /// Sends exactly one request for `query`. Cancelling `cancel` aborts the
    /// exchange with [`ResolverError::Cancelled`].
    async fn query(
        &self,
        query: &DnsQuery,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord, ResolverError>;
}
