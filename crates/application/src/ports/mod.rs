mod capture_engine;
mod platform_files;
mod secure_resolver;

pub use capture_engine::{CaptureEngine, DriverEvent};
pub use platform_files::PlatformFiles;
pub use secure_resolver::SecureResolver;

// Re-export for convenience
pub use warden_domain::{CacheRecord, DnsQuery};
