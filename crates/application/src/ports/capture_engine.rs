use async_trait::async_trait;
use std::path::Path;
use warden_domain::{BandwidthUpdate, ConnectionVerdict, DriverError, DriverVersion, Packet};

/// Something the driver delivered on its packet stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Packet(Packet),
    Bandwidth(Vec<BandwidthUpdate>),
}

/// Port to the kernel capture engine.
///
/// One engine exists per process and is shared behind an `Arc`. Commands may
/// be issued concurrently; implementations whose transport is not safe for
/// concurrent senders must serialize internally.
#[async_trait]
pub trait CaptureEngine: Send + Sync {
    /// Opens the driver from the image at `driver_path`.
    async fn init(&self, driver_path: &Path) -> Result<(), DriverError>;

    async fn start(&self) -> Result<(), DriverError>;

    /// Releases kernel resources.
    async fn stop(&self) -> Result<(), DriverError>;

    /// Waits for the next packet or bandwidth batch.
    ///
    /// Must be cancel safe: dropping the future before it completes loses
    /// no event.
    async fn next_event(&self) -> Result<DriverEvent, DriverError>;

    async fn send_bandwidth_stats_request(&self) -> Result<(), DriverError>;

    async fn send_log_request(&self) -> Result<(), DriverError>;

    /// Drops every cached verdict so connections are evaluated again.
    async fn clear_cache(&self) -> Result<(), DriverError>;

    async fn update_verdict(&self, verdict: &ConnectionVerdict) -> Result<(), DriverError>;

    async fn get_version(&self) -> Result<DriverVersion, DriverError>;
}
