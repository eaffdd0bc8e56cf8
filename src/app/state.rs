//! Defines the central, mutable state of the shell.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ShellConfig;
use crate::core::{KeepAlive, KeepAliveBackend, TransferGate};

/// Holds the complete, mutable state of the shell.
///
/// Wrapped in an `Arc<Mutex<...>>` and shared between the event loop, the
/// IPC handler and timer tasks. The transfer gate carries its own lock, so
/// intake never blocks on this one.
pub struct AppState {
    /// The shell's configuration settings.
    pub config: ShellConfig,
    /// Pending transfer payload and the runtime binding.
    pub transfer: Arc<TransferGate>,
    /// Session notice, wake assertions and the background window.
    pub keep_alive: KeepAlive<Box<dyn KeepAliveBackend>>,
}

impl AppState {
    pub fn new(config: ShellConfig, backend: Box<dyn KeepAliveBackend>) -> Self {
        Self {
            config,
            transfer: Arc::new(TransferGate::new()),
            keep_alive: KeepAlive::new(backend),
        }
    }

    pub fn background_grace(&self) -> Duration {
        Duration::from_secs(self.config.background_grace_secs)
    }

    pub fn session_wake_limit(&self) -> Duration {
        Duration::from_secs(self.config.session_wake_limit_secs)
    }
}
