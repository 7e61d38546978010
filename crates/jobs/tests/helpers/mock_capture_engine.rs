#![allow(dead_code)]

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex};
use warden_application::ports::{CaptureEngine, DriverEvent};
use warden_domain::{
    BandwidthUpdate, ConnectionKey, ConnectionVerdict, Direction, DriverError, DriverVersion,
    Packet, TransportProtocol,
};

type EventResult = Result<DriverEvent, DriverError>;

/// Capture engine double: counts commands and serves queued events.
pub struct MockCaptureEngine {
    bandwidth_requests: AtomicUsize,
    log_requests: AtomicUsize,
    fail_bandwidth: AtomicBool,
    fail_logs: AtomicBool,
    events_tx: mpsc::UnboundedSender<EventResult>,
    events_rx: Mutex<mpsc::UnboundedReceiver<EventResult>>,
}

impl MockCaptureEngine {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            bandwidth_requests: AtomicUsize::new(0),
            log_requests: AtomicUsize::new(0),
            fail_bandwidth: AtomicBool::new(false),
            fail_logs: AtomicBool::new(false),
            events_tx,
            events_rx: Mutex::new(events_rx),
        }
    }

    pub fn push_packet(&self, packet: Packet) {
        let _ = self.events_tx.send(Ok(DriverEvent::Packet(packet)));
    }

    pub fn push_bandwidth(&self, updates: Vec<BandwidthUpdate>) {
        let _ = self.events_tx.send(Ok(DriverEvent::Bandwidth(updates)));
    }

    pub fn push_read_error(&self, error: DriverError) {
        let _ = self.events_tx.send(Err(error));
    }

    pub fn set_fail_bandwidth(&self, fail: bool) {
        self.fail_bandwidth.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_logs(&self, fail: bool) {
        self.fail_logs.store(fail, Ordering::SeqCst);
    }

    pub fn bandwidth_request_count(&self) -> usize {
        self.bandwidth_requests.load(Ordering::SeqCst)
    }

    pub fn log_request_count(&self) -> usize {
        self.log_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureEngine for MockCaptureEngine {
    async fn init(&self, _driver_path: &Path) -> Result<(), DriverError> {
        Ok(())
    }

    async fn start(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn next_event(&self) -> Result<DriverEvent, DriverError> {
        let mut rx = self.events_rx.lock().await;
        match rx.recv().await {
            Some(event) => event,
            None => std::future::pending().await,
        }
    }

    async fn send_bandwidth_stats_request(&self) -> Result<(), DriverError> {
        self.bandwidth_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_bandwidth.load(Ordering::SeqCst) {
            return Err(DriverError::Io("device detached".to_string()));
        }
        Ok(())
    }

    async fn send_log_request(&self) -> Result<(), DriverError> {
        self.log_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_logs.load(Ordering::SeqCst) {
            return Err(DriverError::Io("device detached".to_string()));
        }
        Ok(())
    }

    async fn clear_cache(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn update_verdict(&self, _verdict: &ConnectionVerdict) -> Result<(), DriverError> {
        Ok(())
    }

    async fn get_version(&self) -> Result<DriverVersion, DriverError> {
        Ok(DriverVersion::default())
    }
}

pub fn make_connection(remote_port: u16) -> ConnectionKey {
    ConnectionKey {
        protocol: TransportProtocol::Tcp,
        direction: Direction::Outbound,
        local_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        local_port: 50_000,
        remote_ip: IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
        remote_port,
        process_id: Some(1234),
    }
}

pub fn make_packet(id: u64) -> Packet {
    Packet {
        id,
        connection: make_connection(443),
        payload: vec![0x45, 0x00, id as u8],
    }
}
