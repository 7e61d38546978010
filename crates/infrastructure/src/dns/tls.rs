//! TLS client configuration for DoH resolvers.
//!
//! Resolvers verify the server against the configured identity using the
//! webpki root set unless a custom root store is supplied. TLS 1.2 is the
//! floor.

use rustls::RootCertStore;
use std::sync::{Arc, LazyLock};
use warden_domain::ResolverError;

/// ALPN ids offered to resolvers, most preferred first.
const ALPN_PROTOCOLS: [&[u8]; 2] = [b"h2", b"http/1.1"];

static WEBPKI_ROOTS: LazyLock<RootCertStore> = LazyLock::new(|| {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    root_store
});

pub fn webpki_root_store() -> RootCertStore {
    WEBPKI_ROOTS.clone()
}

pub fn client_config(roots: RootCertStore) -> Result<rustls::ClientConfig, ResolverError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut config = rustls::ClientConfig::builder_with_provider(provider)
        .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])
        .map_err(|e| ResolverError::InvalidConfig(format!("TLS setup failed: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    config.alpn_protocols = ALPN_PROTOCOLS.iter().map(|p| p.to_vec()).collect();
    Ok(config)
}
