use crate::di::InterceptionServices;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use warden_domain::{BandwidthUpdate, Config, ConnectionVerdict, Packet, Verdict};
use warden_infrastructure::InterceptionSupervisor;

/// Runs interception with an accept-everything policy until Ctrl-C or the
/// first worker failure, then stops the driver.
pub async fn run(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let InterceptionServices {
        supervisor,
        bandwidth_rx,
    } = InterceptionServices::new(config, dry_run)?;

    let (packet_tx, packet_rx) = mpsc::channel(config.interception.packet_queue_size);
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Could not listen for Ctrl-C");
        }
    };

    supervise(&supervisor, packet_tx, packet_rx, bandwidth_rx, ctrl_c).await
}

/// Once `start` succeeds, every exit path goes through `stop`.
async fn supervise<F>(
    supervisor: &InterceptionSupervisor,
    packet_tx: mpsc::Sender<Packet>,
    mut packet_rx: mpsc::Receiver<Packet>,
    mut bandwidth_rx: mpsc::Receiver<Vec<BandwidthUpdate>>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    supervisor.start(packet_tx).await?;

    match supervisor.get_driver_version().await {
        Ok(version) => info!(
            driver_version = %version,
            "Interception running, press Ctrl-C to stop"
        ),
        Err(e) => warn!(
            error = %e,
            "Interception running without a driver version, press Ctrl-C to stop"
        ),
    }

    tokio::pin!(shutdown);

    let outcome = loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break Ok(());
            }
            failure = supervisor.next_failure() => {
                if let Some(failure) = failure {
                    error!(worker = failure.worker, error = %failure.error, "Interception worker failed");
                    break Err(anyhow::anyhow!("{} failed: {}", failure.worker, failure.error));
                }
            }
            Some(packet) = packet_rx.recv() => {
                debug!(id = packet.id, connection = %packet.connection, "Packet intercepted");
                let verdict = ConnectionVerdict::new(packet.connection, Verdict::Accept);
                if let Err(e) = supervisor.update_verdict(&verdict).await {
                    warn!(error = %e, "Verdict update failed");
                }
            }
            Some(updates) = bandwidth_rx.recv() => {
                debug!(connections = updates.len(), "Bandwidth update");
            }
        }
    };

    let stopped = supervisor.stop().await;
    outcome?;
    stopped?;
    Ok(())
}
