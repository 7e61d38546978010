use crate::{DriverPollJob, PacketRelayJob};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use warden_domain::InterceptionError;

/// A worker that ended with an error instead of being cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub worker: &'static str,
    pub error: InterceptionError,
}

pub type FailureSink = mpsc::UnboundedSender<WorkerFailure>;

pub(crate) fn report_failure(
    sink: &Option<FailureSink>,
    worker: &'static str,
    error: InterceptionError,
) {
    let Some(sink) = sink else {
        return;
    };
    if sink.send(WorkerFailure { worker, error }).is_err() {
        debug!(worker, "Failure receiver gone, failure not reported");
    }
}

pub trait SpawnableJob: Send + Sync + 'static {
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn with_failure_sink(self, sink: FailureSink) -> Self;
    fn name(&self) -> &'static str;
    fn start_job(self: Arc<Self>) -> JoinHandle<()>;
}

macro_rules! impl_spawnable_job {
    ($t:ty) => {
        impl SpawnableJob for $t {
            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn with_failure_sink(self, sink: FailureSink) -> Self {
                self.with_failure_sink(sink)
            }

            fn name(&self) -> &'static str {
                self.name()
            }

            fn start_job(self: Arc<Self>) -> JoinHandle<()> {
                tokio::spawn(async move { self.start().await })
            }
        }
    };
}

impl_spawnable_job!(PacketRelayJob);
impl_spawnable_job!(DriverPollJob);

fn spawn_job<J: SpawnableJob>(
    job: Option<J>,
    shutdown: &CancellationToken,
    failures: &Option<FailureSink>,
    handles: &mut Vec<(&'static str, JoinHandle<()>)>,
) {
    if let Some(job) = job {
        let job = job.with_cancellation(shutdown.clone());
        let job = match failures {
            Some(sink) => job.with_failure_sink(sink.clone()),
            None => job,
        };
        let name = job.name();
        handles.push((name, Arc::new(job).start_job()));
    }
}

/// Spawns the interception workers under one cancellation token.
pub struct JobRunner {
    packet_relay: Option<PacketRelayJob>,
    bandwidth_poller: Option<DriverPollJob>,
    log_poller: Option<DriverPollJob>,
    shutdown: Option<CancellationToken>,
    failures: Option<FailureSink>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            packet_relay: None,
            bandwidth_poller: None,
            log_poller: None,
            shutdown: None,
            failures: None,
        }
    }

    pub fn with_packet_relay(mut self, job: PacketRelayJob) -> Self {
        self.packet_relay = Some(job);
        self
    }

    pub fn with_bandwidth_poller(mut self, job: DriverPollJob) -> Self {
        self.bandwidth_poller = Some(job);
        self
    }

    pub fn with_log_poller(mut self, job: DriverPollJob) -> Self {
        self.log_poller = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Workers that end with an error report it here.
    pub fn with_failure_sink(mut self, sink: FailureSink) -> Self {
        self.failures = Some(sink);
        self
    }

    /// Spawns every configured job and returns their handles. A runner
    /// without a shutdown token gets a fresh one.
    pub fn start(self) -> RunningJobs {
        info!("Starting interception workers");

        let shutdown = self.shutdown.unwrap_or_default();
        let mut handles = Vec::with_capacity(3);

        spawn_job(self.packet_relay, &shutdown, &self.failures, &mut handles);
        spawn_job(self.bandwidth_poller, &shutdown, &self.failures, &mut handles);
        spawn_job(self.log_poller, &shutdown, &self.failures, &mut handles);

        info!(workers = handles.len(), "All interception workers started");
        RunningJobs { shutdown, handles }
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Handles to spawned workers. Dropping this does not stop them; call
/// [`RunningJobs::shutdown`].
pub struct RunningJobs {
    shutdown: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl RunningJobs {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Cancels every worker and waits for all of them to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for (worker, handle) in self.handles {
            match handle.await {
                Ok(()) => debug!(worker, "Worker exited"),
                Err(e) => warn!(worker, error = %e, "Worker panicked or was aborted"),
            }
        }
        info!("Interception workers stopped");
    }
}
