mod mock_capture_engine;

pub use mock_capture_engine::*;
