mod doh_stub;
mod mock_capture_engine;
mod mock_platform_files;

pub use doh_stub::*;
pub use mock_capture_engine::*;
pub use mock_platform_files::*;
