use std::fmt;
use std::net::IpAddr;

/// Supervisor lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterceptionState {
    Uninitialized,
    Initialized,
    Running,
    /// A stop attempt failed after workers were shut down; stop may be retried.
    StopFailed,
    Stopped,
}

impl InterceptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::StopFailed => "stop-failed",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for InterceptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    Tcp,
    Udp,
    Icmp,
    IcmpV6,
    Other(u8),
}

impl TransportProtocol {
    pub fn from_ip_number(number: u8) -> Self {
        match number {
            6 => Self::Tcp,
            17 => Self::Udp,
            1 => Self::Icmp,
            58 => Self::IcmpV6,
            other => Self::Other(other),
        }
    }

    pub fn ip_number(&self) -> u8 {
        match self {
            Self::Tcp => 6,
            Self::Udp => 17,
            Self::Icmp => 1,
            Self::IcmpV6 => 58,
            Self::Other(n) => *n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Identity of a connection as the driver sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub protocol: TransportProtocol,
    pub direction: Direction,
    pub local_ip: IpAddr,
    pub local_port: u16,
    pub remote_ip: IpAddr,
    pub remote_port: u16,
    pub process_id: Option<u32>,
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            Direction::Outbound => "->",
            Direction::Inbound => "<-",
        };
        write!(
            f,
            "{:?} {}:{} {} {}:{}",
            self.protocol, self.local_ip, self.local_port, arrow, self.remote_ip, self.remote_port
        )
    }
}

/// One intercepted packet waiting for a policy decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Driver-assigned id used to release or drop the held packet.
    pub id: u64,
    pub connection: ConnectionKey,
    pub payload: Vec<u8>,
}

/// Traffic counters the driver attaches to its packet stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandwidthUpdate {
    pub connection: ConnectionKey,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Verdicts understood by the driver. Their meaning belongs to the policy
/// engine; this crate only carries them across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Undecided,
    Undeterminable,
    Accept,
    Block,
    Drop,
    RerouteToNameserver,
    RerouteToTunnel,
    Failed,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undecided => "undecided",
            Self::Undeterminable => "undeterminable",
            Self::Accept => "accept",
            Self::Block => "block",
            Self::Drop => "drop",
            Self::RerouteToNameserver => "reroute-to-nameserver",
            Self::RerouteToTunnel => "reroute-to-tunnel",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionVerdict {
    pub connection: ConnectionKey,
    pub verdict: Verdict,
}

impl ConnectionVerdict {
    pub fn new(connection: ConnectionKey, verdict: Verdict) -> Self {
        Self {
            connection,
            verdict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
    pub build: u8,
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.revision, self.build
        )
    }
}
