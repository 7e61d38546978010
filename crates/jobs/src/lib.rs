pub mod driver_poll;
pub mod packet_relay;
pub mod runner;

pub use driver_poll::{DriverPollJob, PollCommand};
pub use packet_relay::PacketRelayJob;
pub use runner::{FailureSink, JobRunner, RunningJobs, WorkerFailure};
