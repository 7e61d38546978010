#![allow(dead_code)]

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::RootCertStore;
use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use warden_domain::ResolverDescriptor;
use warden_infrastructure::HttpsResolver;

/// How the stub answers every request.
#[derive(Clone)]
pub enum StubBehavior {
    /// 200 with this body as `application/dns-message`.
    Reply(Vec<u8>),
    /// Empty body with this status.
    Status(u16),
    /// Never answers.
    Hang,
}

/// Local DNS-over-HTTPS server on HTTP/1.1 over TLS with a self-signed
/// certificate for `dns.example` and `localhost`.
pub struct DohStub {
    addr: SocketAddr,
    cert: CertificateDer<'static>,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown: CancellationToken,
}

impl DohStub {
    pub async fn start(behavior: StubBehavior) -> Self {
        let rcgen::CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(vec![
            "dns.example".to_string(),
            "localhost".to_string(),
        ])
        .unwrap();
        let cert_der = cert.der().clone();
        let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

        let mut server_config = rustls::ServerConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der.clone()], key_der)
        .unwrap();
        server_config.alpn_protocols = vec![b"http/1.1".to_vec()];

        let acceptor = TlsAcceptor::from(Arc::new(server_config));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = CancellationToken::new();
        let behavior = Arc::new(behavior);

        let server_requests = Arc::clone(&requests);
        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                let stream = tokio::select! {
                    _ = server_shutdown.cancelled() => break,
                    accepted = listener.accept() => match accepted {
                        Ok((stream, _)) => stream,
                        Err(_) => continue,
                    },
                };

                let acceptor = acceptor.clone();
                let behavior = Arc::clone(&behavior);
                let requests = Arc::clone(&server_requests);
                tokio::spawn(async move {
                    let Ok(tls) = acceptor.accept(stream).await else {
                        return;
                    };
                    let service = service_fn(move |req| {
                        handle(req, Arc::clone(&behavior), Arc::clone(&requests))
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(tls), service)
                        .await;
                });
            }
        });

        Self {
            addr,
            cert: cert_der,
            requests,
            shutdown,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn root_store(&self) -> RootCertStore {
        let mut roots = RootCertStore::empty();
        roots.add(self.cert.clone()).unwrap();
        roots
    }

    /// Request targets (path and query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// A resolver for `descriptor` that trusts this stub and connects to it.
    pub fn resolver(&self, descriptor: ResolverDescriptor) -> HttpsResolver {
        self.resolver_with_timeout(descriptor, Duration::from_secs(10))
    }

    pub fn resolver_with_timeout(
        &self,
        descriptor: ResolverDescriptor,
        timeout: Duration,
    ) -> HttpsResolver {
        HttpsResolver::builder(descriptor)
            .with_root_certificates(self.root_store())
            .with_pinned_addr(self.addr)
            .with_timeout(timeout)
            .build()
            .unwrap()
    }
}

impl Drop for DohStub {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle(
    req: Request<Incoming>,
    behavior: Arc<StubBehavior>,
    requests: Arc<Mutex<Vec<String>>>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    requests.lock().unwrap().push(req.uri().to_string());

    let response = match &*behavior {
        StubBehavior::Reply(body) => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", "application/dns-message")
            .body(Full::new(Bytes::from(body.clone())))
            .unwrap(),
        StubBehavior::Status(code) => Response::builder()
            .status(*code)
            .body(Full::new(Bytes::new()))
            .unwrap(),
        StubBehavior::Hang => std::future::pending().await,
    };
    Ok(response)
}

fn encode_name(name: &str, out: &mut Vec<u8>) {
    for label in name.trim_end_matches('.').split('.') {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
}

/// Reply for `owner` with one A answer and one A record in the additional
/// section (192.0.2.1, TTL 30).
pub fn canned_a_reply(owner: &str, answer: Ipv4Addr, ttl: u32) -> Vec<u8> {
    let mut reply = Vec::with_capacity(128);
    reply.extend_from_slice(&[0x12, 0x34]); // id
    reply.extend_from_slice(&[0x81, 0x80]); // QR RD RA, NOERROR
    reply.extend_from_slice(&[0x00, 0x01]); // QDCOUNT
    reply.extend_from_slice(&[0x00, 0x01]); // ANCOUNT
    reply.extend_from_slice(&[0x00, 0x00]); // NSCOUNT
    reply.extend_from_slice(&[0x00, 0x01]); // ARCOUNT

    encode_name(owner, &mut reply);
    reply.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);

    reply.extend_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);
    reply.extend_from_slice(&ttl.to_be_bytes());
    reply.extend_from_slice(&[0x00, 0x04]);
    reply.extend_from_slice(&answer.octets());

    reply.extend_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);
    reply.extend_from_slice(&30u32.to_be_bytes());
    reply.extend_from_slice(&[0x00, 0x04, 192, 0, 2, 1]);

    reply
}

/// NXDOMAIN reply for `owner` with empty sections.
pub fn canned_nxdomain(owner: &str) -> Vec<u8> {
    let mut reply = Vec::with_capacity(64);
    reply.extend_from_slice(&[0x00, 0x00, 0x81, 0x83]);
    reply.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    encode_name(owner, &mut reply);
    reply.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
    reply
}
