//! Warden Domain Layer
pub mod cache_record;
pub mod config;
pub mod dns_query;
pub mod errors;
pub mod interception;
pub mod record_type;
pub mod resolver;

pub use cache_record::CacheRecord;
pub use config::{CliOverrides, Config, ConfigError};
pub use dns_query::DnsQuery;
pub use errors::{
    DistributionError, DriverCommand, DriverError, InterceptionError, ResolverError,
};
pub use interception::{
    BandwidthUpdate, ConnectionKey, ConnectionVerdict, Direction, DriverVersion,
    InterceptionState, Packet, TransportProtocol, Verdict,
};
pub use record_type::RecordType;
pub use resolver::{
    HttpsEndpoint, ResolverDescriptor, ResolverInfo, ResolverSource, DEFAULT_DOH_PATH,
};
