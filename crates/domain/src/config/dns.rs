use crate::resolver::ResolverDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// DoH resolvers, e.g. `https://9.9.9.9/dns-query?verify=dns.quad9.net&name=Quad9`.
    #[serde(default = "default_resolvers")]
    pub resolvers: Vec<String>,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            resolvers: default_resolvers(),
            query_timeout_ms: default_query_timeout_ms(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
        }
    }
}

impl DnsConfig {
    /// Parses every configured resolver URL, failing on the first bad one.
    pub fn resolver_descriptors(&self) -> Result<Vec<ResolverDescriptor>, String> {
        self.resolvers.iter().map(|s| s.parse()).collect()
    }
}

fn default_resolvers() -> Vec<String> {
    vec![
        "https://9.9.9.9/dns-query?verify=dns.quad9.net&name=Quad9".to_string(),
        "https://1.1.1.1/dns-query?verify=cloudflare-dns.com&name=Cloudflare".to_string(),
    ]
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

fn default_pool_max_idle_per_host() -> usize {
    4
}
