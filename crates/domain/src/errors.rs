use std::fmt;
use thiserror::Error;

/// Commands the supervisor forwards to a running capture engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverCommand {
    BandwidthStatsRequest,
    LogRequest,
    ClearCache,
    UpdateVerdict,
    GetVersion,
    ReadPacket,
}

impl DriverCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverCommand::BandwidthStatsRequest => "bandwidth-stats-request",
            DriverCommand::LogRequest => "log-request",
            DriverCommand::ClearCache => "clear-cache",
            DriverCommand::UpdateVerdict => "update-verdict",
            DriverCommand::GetVersion => "get-version",
            DriverCommand::ReadPacket => "read-packet",
        }
    }
}

impl fmt::Display for DriverCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a capture engine implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("driver I/O error: {0}")]
    Io(String),

    #[error("driver rejected request: {0}")]
    Rejected(String),

    #[error("driver handle is closed")]
    Closed,
}

/// Failure reported by the driver distribution service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributionError {
    #[error("platform file not found: {0}")]
    NotFound(String),

    #[error("I/O error while locating {name}: {reason}")]
    Io { name: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterceptionError {
    #[error("interception: could not get driver image: {0}")]
    DriverUnavailable(#[source] DistributionError),

    #[error("interception: could not init driver: {0}")]
    DriverInitFailed(#[source] DriverError),

    #[error("interception: could not start driver: {0}")]
    DriverStartFailed(#[source] DriverError),

    #[error("interception: could not stop driver: {0}")]
    DriverStopFailed(#[source] DriverError),

    #[error("interception is not running")]
    NotRunning,

    #[error("interception cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("driver command {command} failed: {source}")]
    Command {
        command: DriverCommand,
        #[source]
        source: DriverError,
    },

    #[error("packet relay stopped: {0}")]
    RelayFailed(String),
}

impl InterceptionError {
    pub fn command(command: DriverCommand, source: DriverError) -> Self {
        InterceptionError::Command { command, source }
    }

    /// Init, start and stop failures.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            InterceptionError::DriverInitFailed(_)
                | InterceptionError::DriverStartFailed(_)
                | InterceptionError::DriverStopFailed(_)
        )
    }

    pub fn is_command(&self) -> bool {
        matches!(self, InterceptionError::Command { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Invalid resolver configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to encode DNS query: {0}")]
    Encode(String),

    #[error("Transport error talking to {server}: {reason}")]
    Transport { server: String, reason: String },

    #[error("Transport timeout talking to {server}")]
    Timeout { server: String },

    #[error("Resolver {server} returned HTTP {status}")]
    HttpStatus { server: String, status: u16 },

    #[error("Failed to read response body from {server}: {reason}")]
    Body { server: String, reason: String },

    #[error("Failed to decode DNS reply: {0}")]
    Decode(String),

    #[error("Query cancelled")]
    Cancelled,
}

impl ResolverError {
    /// Network, TLS and timeout failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ResolverError::Transport { .. } | ResolverError::Timeout { .. }
        )
    }

    /// Non-2xx responses, unreadable bodies and undecodable replies.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            ResolverError::HttpStatus { .. } | ResolverError::Body { .. } | ResolverError::Decode(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolverError::Cancelled)
    }
}
