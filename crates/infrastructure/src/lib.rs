//! Warden Infrastructure Layer
pub mod dns;
pub mod interception;

pub use dns::HttpsResolver;
pub use interception::{DryRunCaptureEngine, InterceptionSupervisor, LocalDriverStore};
