//! DNS-over-HTTPS resolver (RFC 8484, GET form)
//!
//! Each query is one HTTP GET:
//! ```text
//! GET /dns-query?dns=<base64url, no padding> HTTP/2
//! Accept: application/dns-message
//! ```
//! The response body is the raw DNS wire format reply.
//!
//! Nothing checks that the reply's question matches the query; answers are
//! trusted as far as the TLS identity of the resolver goes.

use super::message_builder::MessageBuilder;
use super::tls;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hickory_proto::op::Message;
use rustls::RootCertStore;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use warden_application::ports::SecureResolver;
use warden_domain::{
    CacheRecord, DnsQuery, HttpsEndpoint, ResolverDescriptor, ResolverError, ResolverInfo,
};

const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 4;

pub struct HttpsResolverBuilder {
    descriptor: ResolverDescriptor,
    timeout: Duration,
    pool_max_idle_per_host: usize,
    roots: Option<RootCertStore>,
    pinned_addr: Option<SocketAddr>,
}

impl HttpsResolverBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pool_max_idle_per_host(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    /// Replaces the webpki roots used to verify the resolver.
    pub fn with_root_certificates(mut self, roots: RootCertStore) -> Self {
        self.roots = Some(roots);
        self
    }

    /// Connects to `addr` instead of resolving the request host.
    pub fn with_pinned_addr(mut self, addr: SocketAddr) -> Self {
        self.pinned_addr = Some(addr);
        self
    }

    pub fn build(self) -> Result<HttpsResolver, ResolverError> {
        let mut endpoint = self.descriptor.endpoint()?;
        if self.pinned_addr.is_some() {
            endpoint.pinned_addr = self.pinned_addr;
        }

        let roots = self.roots.unwrap_or_else(tls::webpki_root_store);
        let tls_config = tls::client_config(roots)?;

        let mut builder = reqwest::Client::builder()
            .use_preconfigured_tls(tls_config)
            .pool_max_idle_per_host(self.pool_max_idle_per_host);
        if let Some(addr) = endpoint.pinned_addr {
            builder = builder.resolve(&endpoint.tls_name, addr);
        }

        let client = builder.build().map_err(|e| {
            ResolverError::InvalidConfig(format!(
                "Failed to build HTTP client for {}: {}",
                self.descriptor.address, e
            ))
        })?;

        Ok(HttpsResolver {
            descriptor: self.descriptor,
            endpoint,
            client,
            timeout: self.timeout,
        })
    }
}

/// Secure resolver for one configured DoH upstream.
///
/// The inner client pools connections and is safe to share between
/// concurrent queries.
pub struct HttpsResolver {
    descriptor: ResolverDescriptor,
    endpoint: HttpsEndpoint,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpsResolver {
    pub fn builder(descriptor: ResolverDescriptor) -> HttpsResolverBuilder {
        HttpsResolverBuilder {
            descriptor,
            timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            roots: None,
            pinned_addr: None,
        }
    }

    pub fn new(descriptor: ResolverDescriptor) -> Result<Self, ResolverError> {
        Self::builder(descriptor).build()
    }

    pub fn descriptor(&self) -> &ResolverDescriptor {
        &self.descriptor
    }

    pub fn endpoint(&self) -> &HttpsEndpoint {
        &self.endpoint
    }

    /// `https://<authority><path>?dns=<message>`
    pub fn query_url(&self, message: &[u8]) -> String {
        let separator = if self.descriptor.path.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "https://{}{}{}dns={}",
            self.endpoint.authority,
            self.descriptor.path,
            separator,
            URL_SAFE_NO_PAD.encode(message)
        )
    }

    async fn exchange(&self, url: &str) -> Result<Vec<u8>, ResolverError> {
        let server = self.descriptor.info.id();

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| ResolverError::Transport {
                server: server.clone(),
                reason: error_chain(&e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::HttpStatus {
                server,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| ResolverError::Body {
            server: server.clone(),
            reason: error_chain(&e),
        })?;

        Ok(body.to_vec())
    }
}

/// Flattens an error and its sources so TLS failures show their cause.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl SecureResolver for HttpsResolver {
    fn info(&self) -> &ResolverInfo {
        &self.descriptor.info
    }

    async fn query(
        &self,
        query: &DnsQuery,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord, ResolverError> {
        let message = MessageBuilder::build_query(query)?;
        let url = self.query_url(&message);

        debug!(
            resolver = %self.descriptor.info.id(),
            domain = %query.domain,
            record_type = %query.record_type,
            message_len = message.len(),
            "Sending DoH query"
        );

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ResolverError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.exchange(&url)) => {
                result.map_err(|_| ResolverError::Timeout {
                    server: self.descriptor.info.id(),
                })??
            }
        };

        let reply = Message::from_vec(&body)
            .map_err(|e| ResolverError::Decode(format!("{} ({} bytes)", e, body.len())))?;

        debug!(
            resolver = %self.descriptor.info.id(),
            domain = %query.domain,
            rcode = %reply.response_code(),
            answers = reply.answers().len(),
            "DoH response received"
        );

        Ok(CacheRecord::from_reply(query, &reply, &self.descriptor.info))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::RecordType;

    fn resolver(url: &str) -> HttpsResolver {
        HttpsResolver::new(url.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_query_url_hostname() {
        let r = resolver("https://dns.example/dns-query");
        let url = r.query_url(&[0x00, 0x00, 0x01, 0x00]);
        assert_eq!(url, "https://dns.example/dns-query?dns=AAABAA");
    }

    #[test]
    fn test_query_url_uses_verify_domain_for_ip() {
        let r = resolver("https://9.9.9.9/dns-query?verify=dns.quad9.net");
        assert!(r.query_url(&[0xff]).starts_with("https://dns.quad9.net/dns-query?dns="));
        assert_eq!(r.endpoint().pinned_addr, Some("9.9.9.9:443".parse().unwrap()));
    }

    #[test]
    fn test_query_url_existing_query_string() {
        let r = HttpsResolver::new(ResolverDescriptor::new("dns.example", "/resolve?ct=1")).unwrap();
        assert_eq!(r.query_url(&[0xfb]), "https://dns.example/resolve?ct=1&dns=-w");
    }

    #[test]
    fn test_base64url_round_trip() {
        let query = DnsQuery::new("example.com.", RecordType::A);
        let bytes = MessageBuilder::build_query(&query).unwrap();

        let r = resolver("https://dns.example/dns-query");
        let url = r.query_url(&bytes);
        let encoded = url.split("dns=").nth(1).unwrap();

        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(URL_SAFE_NO_PAD.decode(encoded).unwrap(), bytes);
    }

    #[test]
    fn test_builder_rejects_mismatched_verify_domain() {
        let descriptor = ResolverDescriptor::new("dns.example", "/dns-query")
            .with_verify_domain("other.example");
        assert!(matches!(
            HttpsResolver::new(descriptor),
            Err(ResolverError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_relative_name_fails_before_network() {
        let r = resolver("https://dns.example/dns-query");
        let err = r
            .query(
                &DnsQuery::new("example.com", RecordType::A),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::Encode(_)));
    }
}
