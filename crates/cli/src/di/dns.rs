use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use warden_application::ports::SecureResolver;
use warden_application::use_cases::ResolveQueryUseCase;
use warden_domain::Config;
use warden_infrastructure::HttpsResolver;

pub struct DnsServices {
    pub resolve_query: Arc<ResolveQueryUseCase>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let descriptors = config
            .dns
            .resolver_descriptors()
            .map_err(anyhow::Error::msg)?;
        let timeout = Duration::from_millis(config.dns.query_timeout_ms);

        let mut resolvers: Vec<Arc<dyn SecureResolver>> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let resolver = HttpsResolver::builder(descriptor)
                .with_timeout(timeout)
                .with_pool_max_idle_per_host(config.dns.pool_max_idle_per_host)
                .build()?;
            info!(resolver = %resolver.info(), "DoH resolver configured");
            resolvers.push(Arc::new(resolver));
        }

        Ok(Self {
            resolve_query: Arc::new(ResolveQueryUseCase::new(resolvers)),
        })
    }
}
