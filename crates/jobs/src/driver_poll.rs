use crate::runner::{report_failure, FailureSink};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use warden_application::ports::CaptureEngine;
use warden_domain::{DriverCommand, InterceptionError};

const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// What a poller asks the driver for on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    BandwidthStats,
    Logs,
}

impl PollCommand {
    pub fn worker_name(&self) -> &'static str {
        match self {
            PollCommand::BandwidthStats => "bandwidth-poller",
            PollCommand::Logs => "log-poller",
        }
    }

    pub fn driver_command(&self) -> DriverCommand {
        match self {
            PollCommand::BandwidthStats => DriverCommand::BandwidthStatsRequest,
            PollCommand::Logs => DriverCommand::LogRequest,
        }
    }
}

/// Issues one poll command to the capture engine per interval.
///
/// A failed command ends the job and is reported on the failure sink; the
/// job never restarts itself.
pub struct DriverPollJob {
    engine: Arc<dyn CaptureEngine>,
    command: PollCommand,
    interval: Duration,
    shutdown: CancellationToken,
    failures: Option<FailureSink>,
}

impl DriverPollJob {
    pub fn new(engine: Arc<dyn CaptureEngine>, command: PollCommand) -> Self {
        Self {
            engine,
            command,
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            shutdown: CancellationToken::new(),
            failures: None,
        }
    }

    pub fn bandwidth(engine: Arc<dyn CaptureEngine>) -> Self {
        Self::new(engine, PollCommand::BandwidthStats)
    }

    pub fn logs(engine: Arc<dyn CaptureEngine>) -> Self {
        Self::new(engine, PollCommand::Logs)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn with_failure_sink(mut self, sink: FailureSink) -> Self {
        self.failures = Some(sink);
        self
    }

    pub fn name(&self) -> &'static str {
        self.command.worker_name()
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            worker = self.name(),
            interval_ms = self.interval.as_millis() as u64,
            "Starting driver poller"
        );

        if let Err(e) = self.run().await {
            error!(worker = self.name(), error = %e, "Driver poller stopped");
            report_failure(&self.failures, self.name(), e);
        }
    }

    /// Polls until cancelled or until a command fails.
    pub async fn run(&self) -> Result<(), InterceptionError> {
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!(worker = self.name(), "Driver poller: shutting down");
                    return Ok(());
                }
                _ = interval.tick() => {
                    self.poll_once().await?;
                }
            }
        }
    }

    async fn poll_once(&self) -> Result<(), InterceptionError> {
        let result = match self.command {
            PollCommand::BandwidthStats => self.engine.send_bandwidth_stats_request().await,
            PollCommand::Logs => self.engine.send_log_request().await,
        };
        result.map_err(|e| InterceptionError::command(self.command.driver_command(), e))
    }
}
