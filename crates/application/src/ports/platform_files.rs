use async_trait::async_trait;
use std::path::PathBuf;
use warden_domain::DistributionError;

/// Port to the service that ships platform-specific artifacts such as the
/// driver image.
#[async_trait]
pub trait PlatformFiles: Send + Sync {
    /// Returns a local path to `name` for the running platform.
    async fn get_platform_file(&self, name: &str) -> Result<PathBuf, DistributionError>;
}
