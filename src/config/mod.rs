pub mod settings;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::{DEFAULT_HOST_NAME, SESSION_WAKE_LIMIT};

/// Settings of the native shell. The transfer cap and bundle extension are
/// fixed and deliberately not part of this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Where the application runtime's UI surface is served from.
    pub runtime_url: String,
    pub window_size: (f64, f64),
    pub window_position: (f64, f64),
    /// Length of the background execution window after the shell loses focus.
    pub background_grace_secs: u64,
    /// Longest a session may hold its wake assertion. The notice outlives it.
    pub session_wake_limit_secs: u64,
    /// Host label used when `startService` is called without `hostName`.
    pub default_host_name: String,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl ShellConfig {
    pub fn load() -> Result<Self> {
        settings::load_config(None)
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            runtime_url: "http://localhost:1420".to_string(),
            window_size: (1100.0, 760.0),
            window_position: (100.0, 100.0),
            background_grace_secs: 30,
            session_wake_limit_secs: SESSION_WAKE_LIMIT.as_secs(),
            default_host_name: DEFAULT_HOST_NAME.to_string(),
            log_filter: "info".to_string(),
        }
    }
}
