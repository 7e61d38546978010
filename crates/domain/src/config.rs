pub mod dns;
pub mod errors;
pub mod interception;
pub mod logging;
pub mod root;

pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use interception::InterceptionConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
