use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use warden_domain::{BandwidthUpdate, Config};
use warden_infrastructure::{DryRunCaptureEngine, InterceptionSupervisor, LocalDriverStore};

pub struct InterceptionServices {
    pub supervisor: Arc<InterceptionSupervisor>,
    pub bandwidth_rx: mpsc::Receiver<Vec<BandwidthUpdate>>,
}

impl InterceptionServices {
    pub fn new(config: &Config, dry_run: bool) -> anyhow::Result<Self> {
        if !dry_run {
            anyhow::bail!(
                "no kernel capture engine is available for {}; run with --dry-run",
                std::env::consts::OS
            );
        }

        let store = LocalDriverStore::new(&config.interception.driver_store);
        info!(
            store = %store.platform_dir().display(),
            artifact = %config.interception.driver_artifact,
            "Using dry-run capture engine"
        );

        let (bandwidth_tx, bandwidth_rx) = mpsc::channel(config.interception.bandwidth_queue_size);

        let supervisor = InterceptionSupervisor::new(
            Arc::new(DryRunCaptureEngine::new()),
            Arc::new(store),
        )
        .with_driver_artifact(config.interception.driver_artifact.clone())
        .with_poll_interval(Duration::from_millis(config.interception.poll_interval_ms))
        .with_bandwidth_sink(bandwidth_tx);

        Ok(Self {
            supervisor: Arc::new(supervisor),
            bandwidth_rx,
        })
    }
}
