use crate::runner::{report_failure, FailureSink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use warden_application::ports::{CaptureEngine, DriverEvent};
use warden_domain::{BandwidthUpdate, DriverCommand, InterceptionError, Packet};

/// Moves packets from the capture engine into the policy engine's channel.
///
/// Delivery blocks on a full channel until there is room or the job is
/// cancelled; packets are never dropped to relieve backpressure. Bandwidth
/// batches the driver interleaves with packets go to the optional bandwidth
/// sink under the same rule.
pub struct PacketRelayJob {
    engine: Arc<dyn CaptureEngine>,
    packets: mpsc::Sender<Packet>,
    bandwidth: Option<mpsc::Sender<Vec<BandwidthUpdate>>>,
    shutdown: CancellationToken,
    failures: Option<FailureSink>,
}

impl PacketRelayJob {
    pub const NAME: &'static str = "packet-relay";

    pub fn new(engine: Arc<dyn CaptureEngine>, packets: mpsc::Sender<Packet>) -> Self {
        Self {
            engine,
            packets,
            bandwidth: None,
            shutdown: CancellationToken::new(),
            failures: None,
        }
    }

    pub fn with_bandwidth_sink(mut self, sink: mpsc::Sender<Vec<BandwidthUpdate>>) -> Self {
        self.bandwidth = Some(sink);
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
        Self::NAME
    }

    pub async fn start(self: Arc<Self>) {
        info!(worker = Self::NAME, "Starting packet relay");

        if let Err(e) = self.run().await {
            error!(worker = Self::NAME, error = %e, "Packet relay stopped");
            report_failure(&self.failures, Self::NAME, e);
        }
    }

    /// Relays until cancelled, until the driver read fails, or until the
    /// packet receiver goes away.
    pub async fn run(&self) -> Result<(), InterceptionError> {
        let mut bandwidth = self.bandwidth.clone();
        let mut relayed: u64 = 0;

        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = self.engine.next_event() => event
                    .map_err(|e| InterceptionError::command(DriverCommand::ReadPacket, e))?,
            };

            match event {
                DriverEvent::Packet(packet) => {
                    trace!(id = packet.id, connection = %packet.connection, "Relaying packet");
                    tokio::select! {
                        biased;
                        _ = self.shutdown.cancelled() => break,
                        sent = self.packets.send(packet) => {
                            if sent.is_err() {
                                return Err(InterceptionError::RelayFailed(
                                    "packet receiver dropped".to_string(),
                                ));
                            }
                            relayed += 1;
                        }
                    }
                }
                DriverEvent::Bandwidth(updates) => {
                    let Some(sink) = &bandwidth else {
                        trace!(count = updates.len(), "No bandwidth sink, discarding updates");
                        continue;
                    };
                    tokio::select! {
                        biased;
                        _ = self.shutdown.cancelled() => break,
                        sent = sink.send(updates) => {
                            if sent.is_err() {
                                warn!("Bandwidth receiver dropped, no longer forwarding updates");
                                bandwidth = None;
                            }
                        }
                    }
                }
            }
        }

        debug!(worker = Self::NAME, relayed, "Packet relay: shutting down");
        Ok(())
    }
}
