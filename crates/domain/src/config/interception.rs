use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterceptionConfig {
    /// Logical name of the driver image, resolved by the driver store.
    #[serde(default = "default_driver_artifact")]
    pub driver_artifact: String,

    /// Root directory the driver store looks in.
    #[serde(default = "default_driver_store")]
    pub driver_store: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_queue_size")]
    pub packet_queue_size: usize,

    #[serde(default = "default_queue_size")]
    pub bandwidth_queue_size: usize,
}

impl Default for InterceptionConfig {
    fn default() -> Self {
        Self {
            driver_artifact: default_driver_artifact(),
            driver_store: default_driver_store(),
            poll_interval_ms: default_poll_interval_ms(),
            packet_queue_size: default_queue_size(),
            bandwidth_queue_size: default_queue_size(),
        }
    }
}

fn default_driver_artifact() -> String {
    "kext/warden-kext.sys".to_string()
}

fn default_driver_store() -> String {
    "/var/lib/warden/updates".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_queue_size() -> usize {
    1000
}
