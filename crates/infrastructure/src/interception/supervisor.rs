use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock, RwLockReadGuard};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use warden_application::ports::{CaptureEngine, PlatformFiles};
use warden_domain::{
    BandwidthUpdate, ConnectionVerdict, DriverCommand, InterceptionError, InterceptionState,
    Packet,
};
use warden_jobs::{DriverPollJob, JobRunner, PacketRelayJob, RunningJobs, WorkerFailure};

const DEFAULT_DRIVER_ARTIFACT: &str = "kext/warden-kext.sys";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

struct Inner {
    state: InterceptionState,
    workers: Option<RunningJobs>,
}

/// Owns the capture engine lifecycle and its background workers.
///
/// `start` and `stop` are serialized against each other and against driver
/// commands. Commands issued while the engine is not running fail with
/// [`InterceptionError::NotRunning`] and never reach the driver.
pub struct InterceptionSupervisor {
    engine: Arc<dyn CaptureEngine>,
    platform_files: Arc<dyn PlatformFiles>,
    driver_artifact: String,
    poll_interval: Duration,
    bandwidth_sink: Option<mpsc::Sender<Vec<BandwidthUpdate>>>,
    inner: RwLock<Inner>,
    failures_tx: mpsc::UnboundedSender<WorkerFailure>,
    failures_rx: Mutex<mpsc::UnboundedReceiver<WorkerFailure>>,
}

impl InterceptionSupervisor {
    pub fn new(engine: Arc<dyn CaptureEngine>, platform_files: Arc<dyn PlatformFiles>) -> Self {
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();
        Self {
            engine,
            platform_files,
            driver_artifact: DEFAULT_DRIVER_ARTIFACT.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            bandwidth_sink: None,
            inner: RwLock::new(Inner {
                state: InterceptionState::Uninitialized,
                workers: None,
            }),
            failures_tx,
            failures_rx: Mutex::new(failures_rx),
        }
    }

    pub fn with_driver_artifact(mut self, name: impl Into<String>) -> Self {
        self.driver_artifact = name.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bandwidth batches the driver attaches to its packet stream go here.
    pub fn with_bandwidth_sink(mut self, sink: mpsc::Sender<Vec<BandwidthUpdate>>) -> Self {
        self.bandwidth_sink = Some(sink);
        self
    }

    pub async fn state(&self) -> InterceptionState {
        self.inner.read().await.state
    }

    /// Fetches the driver image, initializes and starts the engine, then
    /// spawns the packet relay and both pollers. Returns once the workers are
    /// spawned; packets arrive on `packets`.
    ///
    /// After a start failure the engine stays initialized and `start` may be
    /// called again.
    pub async fn start(&self, packets: mpsc::Sender<Packet>) -> Result<(), InterceptionError> {
        let mut inner = self.inner.write().await;

        match inner.state {
            InterceptionState::Uninitialized | InterceptionState::Initialized => {}
            other => {
                return Err(InterceptionError::InvalidState {
                    operation: "start",
                    state: other.as_str(),
                })
            }
        }

        if inner.state == InterceptionState::Uninitialized {
            let path = self
                .platform_files
                .get_platform_file(&self.driver_artifact)
                .await
                .map_err(|e| {
                    error!(artifact = %self.driver_artifact, error = %e, "Driver image unavailable");
                    InterceptionError::DriverUnavailable(e)
                })?;

            self.engine.init(&path).await.map_err(|e| {
                error!(path = %path.display(), error = %e, "Driver init failed");
                InterceptionError::DriverInitFailed(e)
            })?;
            inner.state = InterceptionState::Initialized;
        }

        self.engine.start().await.map_err(|e| {
            error!(error = %e, "Driver start failed");
            InterceptionError::DriverStartFailed(e)
        })?;

        let relay = PacketRelayJob::new(Arc::clone(&self.engine), packets);
        let relay = match &self.bandwidth_sink {
            Some(sink) => relay.with_bandwidth_sink(sink.clone()),
            None => relay,
        };

        let workers = JobRunner::new()
            .with_packet_relay(relay)
            .with_bandwidth_poller(
                DriverPollJob::bandwidth(Arc::clone(&self.engine)).with_interval(self.poll_interval),
            )
            .with_log_poller(
                DriverPollJob::logs(Arc::clone(&self.engine)).with_interval(self.poll_interval),
            )
            .with_shutdown_token(CancellationToken::new())
            .with_failure_sink(self.failures_tx.clone())
            .start();

        inner.workers = Some(workers);
        inner.state = InterceptionState::Running;
        info!(artifact = %self.driver_artifact, "Interception started");
        Ok(())
    }

    /// Cancels and joins the workers, then stops the engine.
    ///
    /// Valid after a full or partial start. A failed stop leaves the
    /// supervisor in `StopFailed` and may be retried.
    pub async fn stop(&self) -> Result<(), InterceptionError> {
        let mut inner = self.inner.write().await;

        match inner.state {
            InterceptionState::Uninitialized | InterceptionState::Stopped => {
                return Err(InterceptionError::NotRunning)
            }
            InterceptionState::Initialized
            | InterceptionState::Running
            | InterceptionState::StopFailed => {}
        }

        if let Some(workers) = inner.workers.take() {
            workers.shutdown().await;
        }

        match self.engine.stop().await {
            Ok(()) => {
                inner.state = InterceptionState::Stopped;
                info!("Interception stopped");
                Ok(())
            }
            Err(e) => {
                inner.state = InterceptionState::StopFailed;
                error!(error = %e, "Driver stop failed");
                Err(InterceptionError::DriverStopFailed(e))
            }
        }
    }

    /// Makes the driver forget every cached verdict so all connections are
    /// evaluated again.
    pub async fn reset_all_verdicts(&self) -> Result<(), InterceptionError> {
        let _running = self.ensure_running().await?;
        self.engine
            .clear_cache()
            .await
            .map_err(|e| InterceptionError::command(DriverCommand::ClearCache, e))
    }

    pub async fn update_verdict(&self, verdict: &ConnectionVerdict) -> Result<(), InterceptionError> {
        let _running = self.ensure_running().await?;
        self.engine
            .update_verdict(verdict)
            .await
            .map_err(|e| InterceptionError::command(DriverCommand::UpdateVerdict, e))
    }

    pub async fn get_driver_version(&self) -> Result<String, InterceptionError> {
        let _running = self.ensure_running().await?;
        let version = self
            .engine
            .get_version()
            .await
            .map_err(|e| InterceptionError::command(DriverCommand::GetVersion, e))?;
        Ok(version.to_string())
    }

    /// Waits for the next worker that ended with an error.
    pub async fn next_failure(&self) -> Option<WorkerFailure> {
        self.failures_rx.lock().await.recv().await
    }

    async fn ensure_running(&self) -> Result<RwLockReadGuard<'_, Inner>, InterceptionError> {
        let inner = self.inner.read().await;
        if inner.state != InterceptionState::Running {
            warn!(state = %inner.state, "Driver command rejected");
            return Err(InterceptionError::NotRunning);
        }
        Ok(inner)
    }
}
