pub mod driver_store;
pub mod dry_run;
pub mod supervisor;

pub use driver_store::LocalDriverStore;
pub use dry_run::DryRunCaptureEngine;
pub use supervisor::InterceptionSupervisor;
