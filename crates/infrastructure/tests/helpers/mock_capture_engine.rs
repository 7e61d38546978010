#![allow(dead_code)]

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{mpsc, Mutex};
use warden_application::ports::{CaptureEngine, DriverEvent};
use warden_domain::{
    ConnectionKey, ConnectionVerdict, Direction, DriverError, DriverVersion, Packet,
    TransportProtocol,
};

type EventResult = Result<DriverEvent, DriverError>;

/// Capture engine double that journals every call it receives.
pub struct MockCaptureEngine {
    calls: std::sync::Mutex<Vec<&'static str>>,
    fail_init: AtomicBool,
    start_failures: AtomicUsize,
    stop_failures: AtomicUsize,
    fail_commands: AtomicBool,
    fail_bandwidth: AtomicBool,
    events_tx: mpsc::UnboundedSender<EventResult>,
    events_rx: Mutex<mpsc::UnboundedReceiver<EventResult>>,
}

impl MockCaptureEngine {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            fail_init: AtomicBool::new(false),
            start_failures: AtomicUsize::new(0),
            stop_failures: AtomicUsize::new(0),
            fail_commands: AtomicBool::new(false),
            fail_bandwidth: AtomicBool::new(false),
            events_tx,
            events_rx: Mutex::new(events_rx),
        }
    }

    pub fn set_fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    /// The next `times` calls to `start` fail.
    pub fn fail_start_times(&self, times: usize) {
        self.start_failures.store(times, Ordering::SeqCst);
    }

    /// The next `times` calls to `stop` fail.
    pub fn fail_stop_times(&self, times: usize) {
        self.stop_failures.store(times, Ordering::SeqCst);
    }

    pub fn set_fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_bandwidth(&self, fail: bool) {
        self.fail_bandwidth.store(fail, Ordering::SeqCst);
    }

    pub fn push_packet(&self, packet: Packet) {
        let _ = self.events_tx.send(Ok(DriverEvent::Packet(packet)));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn command_result(&self) -> Result<(), DriverError> {
        if self.fail_commands.load(Ordering::SeqCst) {
            Err(DriverError::Rejected("busy".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CaptureEngine for MockCaptureEngine {
    async fn init(&self, _driver_path: &Path) -> Result<(), DriverError> {
        self.record("init");
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(DriverError::Io("access denied".to_string()));
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), DriverError> {
        self.record("start");
        if Self::take_failure(&self.start_failures) {
            return Err(DriverError::Rejected("already started".to_string()));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), DriverError> {
        self.record("stop");
        if Self::take_failure(&self.stop_failures) {
            return Err(DriverError::Io("handle busy".to_string()));
        }
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
        self.record("bandwidth_stats_request");
        if self.fail_bandwidth.load(Ordering::SeqCst) {
            return Err(DriverError::Closed);
        }
        Ok(())
    }

    async fn send_log_request(&self) -> Result<(), DriverError> {
        self.record("log_request");
        Ok(())
    }

    async fn clear_cache(&self) -> Result<(), DriverError> {
        self.record("clear_cache");
        self.command_result()
    }

    async fn update_verdict(&self, _verdict: &ConnectionVerdict) -> Result<(), DriverError> {
        self.record("update_verdict");
        self.command_result()
    }

    async fn get_version(&self) -> Result<DriverVersion, DriverError> {
        self.record("get_version");
        self.command_result()?;
        Ok(DriverVersion {
            major: 1,
            minor: 2,
            revision: 0,
            build: 7,
        })
    }
}

pub fn make_connection() -> ConnectionKey {
    ConnectionKey {
        protocol: TransportProtocol::Udp,
        direction: Direction::Outbound,
        local_ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        local_port: 53_000,
        remote_ip: IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9)),
        remote_port: 53,
        process_id: Some(4242),
    }
}

pub fn make_packet(id: u64) -> Packet {
    Packet {
        id,
        connection: make_connection(),
        payload: vec![0x45, 0x00],
    }
}
