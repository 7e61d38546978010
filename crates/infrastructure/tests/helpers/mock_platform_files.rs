#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use warden_application::ports::PlatformFiles;
use warden_domain::DistributionError;

pub struct MockPlatformFiles {
    result: Result<PathBuf, DistributionError>,
    lookups: AtomicUsize,
}

impl MockPlatformFiles {
    pub fn serving(path: &str) -> Self {
        Self {
            result: Ok(PathBuf::from(path)),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            result: Err(DistributionError::NotFound("kext/warden-kext.sys".to_string())),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformFiles for MockPlatformFiles {
    async fn get_platform_file(&self, _name: &str) -> Result<PathBuf, DistributionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
