use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;
use warden_application::ports::PlatformFiles;
use warden_domain::DistributionError;

/// Serves platform files from a local directory laid out as
/// `<root>/<os>_<arch>/<name>`.
pub struct LocalDriverStore {
    root: PathBuf,
    platform: String,
}

impl LocalDriverStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            platform: current_platform(),
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn platform_dir(&self) -> PathBuf {
        self.root.join(&self.platform)
    }
}

pub fn current_platform() -> String {
    format!("{}_{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// Only plain relative paths may be looked up.
fn is_contained(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[async_trait]
impl PlatformFiles for LocalDriverStore {
    async fn get_platform_file(&self, name: &str) -> Result<PathBuf, DistributionError> {
        if !is_contained(name) {
            return Err(DistributionError::NotFound(name.to_string()));
        }

        let path = self.platform_dir().join(name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                debug!(name, path = %path.display(), "Platform file found");
                Ok(path)
            }
            Ok(_) => Err(DistributionError::NotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DistributionError::NotFound(name.to_string()))
            }
            Err(e) => Err(DistributionError::Io {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
