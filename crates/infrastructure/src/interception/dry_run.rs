use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};
use warden_application::ports::{CaptureEngine, DriverEvent};
use warden_domain::{ConnectionVerdict, DriverError, DriverVersion};

const DRY_RUN_VERSION: DriverVersion = DriverVersion {
    major: 0,
    minor: 0,
    revision: 0,
    build: 0,
};

/// Capture engine that never touches the kernel.
///
/// Lifecycle calls and commands are logged and counted, no packets are
/// ever produced, and the version is always `0.0.0.0`.
#[derive(Default)]
pub struct DryRunCaptureEngine {
    driver_path: Mutex<Option<PathBuf>>,
    bandwidth_requests: AtomicU64,
    log_requests: AtomicU64,
    verdicts: AtomicU64,
}

impl DryRunCaptureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn driver_path(&self) -> Option<PathBuf> {
        self.driver_path.lock().ok().and_then(|p| p.clone())
    }

    pub fn bandwidth_requests(&self) -> u64 {
        self.bandwidth_requests.load(Ordering::Relaxed)
    }

    pub fn log_requests(&self) -> u64 {
        self.log_requests.load(Ordering::Relaxed)
    }

    pub fn verdicts(&self) -> u64 {
        self.verdicts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CaptureEngine for DryRunCaptureEngine {
    async fn init(&self, driver_path: &Path) -> Result<(), DriverError> {
        info!(path = %driver_path.display(), "Dry run: driver init");
        let mut slot = self
            .driver_path
            .lock()
            .map_err(|_| DriverError::Io("driver path lock poisoned".to_string()))?;
        *slot = Some(driver_path.to_path_buf());
        Ok(())
    }

    async fn start(&self) -> Result<(), DriverError> {
        info!("Dry run: driver start");
        Ok(())
    }

    async fn stop(&self) -> Result<(), DriverError> {
        info!(
            bandwidth_requests = self.bandwidth_requests(),
            log_requests = self.log_requests(),
            verdicts = self.verdicts(),
            "Dry run: driver stop"
        );
        Ok(())
    }

    async fn next_event(&self) -> Result<DriverEvent, DriverError> {
        std::future::pending().await
    }

    async fn send_bandwidth_stats_request(&self) -> Result<(), DriverError> {
        self.bandwidth_requests.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn send_log_request(&self) -> Result<(), DriverError> {
        self.log_requests.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn clear_cache(&self) -> Result<(), DriverError> {
        debug!("Dry run: verdict cache cleared");
        Ok(())
    }

    async fn update_verdict(&self, verdict: &ConnectionVerdict) -> Result<(), DriverError> {
        self.verdicts.fetch_add(1, Ordering::Relaxed);
        debug!(
            connection = %verdict.connection,
            verdict = verdict.verdict.as_str(),
            "Dry run: verdict update"
        );
        Ok(())
    }

    async fn get_version(&self) -> Result<DriverVersion, DriverError> {
        Ok(DRY_RUN_VERSION)
    }
}
