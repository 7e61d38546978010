use crate::errors::ResolverError;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DOH_PATH: &str = "/dns-query";
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Where a resolver entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolverSource {
    #[default]
    Configured,
    Operator,
}

impl ResolverSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configured => "configured",
            Self::Operator => "operator",
        }
    }
}

/// Provenance identity stamped onto every cache record a resolver produces.
///
/// All fields are owned, so a clone is a full copy that shares nothing with
/// the descriptor it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolverInfo {
    pub name: String,
    pub protocol: String,
    pub source: ResolverSource,
    pub address: String,
    pub verify_domain: Option<String>,
}

impl ResolverInfo {
    pub fn id(&self) -> String {
        format!("{}://{}", self.protocol, self.address)
    }
}

impl fmt::Display for ResolverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}://{})", self.name, self.protocol, self.address)
    }
}

/// How the transport should reach a resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpsEndpoint {
    /// Host (and optional port) placed in the request URL.
    pub authority: String,
    /// Name the server certificate must be valid for.
    pub tls_name: String,
    /// Fixed socket address for `authority`, bypassing name resolution.
    pub pinned_addr: Option<SocketAddr>,
}

/// A configured DNS-over-HTTPS upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverDescriptor {
    pub address: String,
    pub path: String,
    pub verify_domain: Option<String>,
    pub info: ResolverInfo,
}

enum ParsedAddress<'a> {
    Ip(IpAddr, u16),
    Host(&'a str, Option<u16>),
}

fn parse_address(address: &str) -> Option<ParsedAddress<'_>> {
    if address.is_empty() {
        return None;
    }
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Some(ParsedAddress::Ip(addr.ip(), addr.port()));
    }
    let unbracketed = address
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(address);
    if let Ok(ip) = unbracketed.parse::<IpAddr>() {
        return Some(ParsedAddress::Ip(ip, DEFAULT_HTTPS_PORT));
    }
    match address.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str.parse::<u16>().ok()?;
            if host.is_empty() {
                return None;
            }
            Some(ParsedAddress::Host(host, Some(port)))
        }
        None => Some(ParsedAddress::Host(address, None)),
    }
}

impl ResolverDescriptor {
    pub fn new(address: impl Into<String>, path: impl Into<String>) -> Self {
        let address = address.into();
        let mut path = path.into();
        if path.is_empty() {
            path = DEFAULT_DOH_PATH.to_string();
        }
        let info = ResolverInfo {
            name: address.clone(),
            protocol: "https".to_string(),
            source: ResolverSource::Configured,
            address: address.clone(),
            verify_domain: None,
        };
        Self {
            address,
            path,
            verify_domain: None,
            info,
        }
    }

    pub fn with_verify_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.info.verify_domain = Some(domain.clone());
        self.verify_domain = Some(domain);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.info.name = name.into();
        self
    }

    pub fn with_source(mut self, source: ResolverSource) -> Self {
        self.info.source = source;
        self
    }

    /// Works out URL authority, TLS identity and address pinning.
    ///
    /// An IP address with a verify domain is reached by putting the verify
    /// domain in the URL and pinning it to the IP. A hostname address must
    /// match its verify domain.
    pub fn endpoint(&self) -> Result<HttpsEndpoint, ResolverError> {
        let parsed = parse_address(&self.address).ok_or_else(|| {
            ResolverError::InvalidConfig(format!("Invalid resolver address '{}'", self.address))
        })?;

        match parsed {
            ParsedAddress::Ip(ip, port) => match &self.verify_domain {
                Some(verify) => Ok(HttpsEndpoint {
                    authority: verify.clone(),
                    tls_name: verify.clone(),
                    pinned_addr: Some(SocketAddr::new(ip, port)),
                }),
                None => {
                    let host = match ip {
                        IpAddr::V4(v4) => v4.to_string(),
                        IpAddr::V6(v6) => format!("[{}]", v6),
                    };
                    let authority = if port == DEFAULT_HTTPS_PORT {
                        host
                    } else {
                        format!("{}:{}", host, port)
                    };
                    Ok(HttpsEndpoint {
                        authority,
                        tls_name: ip.to_string(),
                        pinned_addr: None,
                    })
                }
            },
            ParsedAddress::Host(host, _) => {
                if let Some(verify) = &self.verify_domain {
                    if !verify.eq_ignore_ascii_case(host) {
                        return Err(ResolverError::InvalidConfig(format!(
                            "Resolver host '{}' does not match verify domain '{}'",
                            host, verify
                        )));
                    }
                }
                Ok(HttpsEndpoint {
                    authority: self.address.clone(),
                    tls_name: host.to_string(),
                    pinned_addr: None,
                })
            }
        }
    }
}

impl FromStr for ResolverDescriptor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("https://")
            .or_else(|| s.strip_prefix("doh://"))
            .ok_or_else(|| {
                format!(
                    "Invalid resolver '{}'. Expected 'https://HOST[:PORT][/PATH][?verify=NAME&name=LABEL]'",
                    s
                )
            })?;

        let (location, params) = match rest.split_once('?') {
            Some((location, params)) => (location, Some(params)),
            None => (rest, None),
        };

        let (address, path) = match location.find('/') {
            Some(idx) => (&location[..idx], &location[idx..]),
            None => (location, DEFAULT_DOH_PATH),
        };

        if parse_address(address).is_none() {
            return Err(format!("Invalid resolver address '{}' in '{}'", address, s));
        }

        let mut descriptor = ResolverDescriptor::new(address, path);

        for param in params.into_iter().flat_map(|p| p.split('&')) {
            if param.is_empty() {
                continue;
            }
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| format!("Invalid resolver parameter '{}' in '{}'", param, s))?;
            if value.is_empty() {
                return Err(format!("Empty value for '{}' in '{}'", key, s));
            }
            descriptor = match key {
                "verify" => descriptor.with_verify_domain(value),
                "name" => descriptor.with_name(value),
                _ => return Err(format!("Unknown resolver parameter '{}' in '{}'", key, s)),
            };
        }

        Ok(descriptor)
    }
}

impl fmt::Display for ResolverDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://{}{}", self.address, self.path)?;
        let mut sep = '?';
        if let Some(verify) = &self.verify_domain {
            write!(f, "{}verify={}", sep, verify)?;
            sep = '&';
        }
        if self.info.name != self.address {
            write!(f, "{}name={}", sep, self.info.name)?;
        }
        Ok(())
    }
}
