//! Process-wide `tracing` setup.
//!
//! The subscriber is installed before the config file is read, so messages
//! from config loading are not lost. The configured filter is swapped in
//! afterwards through a reload handle.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

const BOOT_FILTER: &str = "info";

/// Handle to the live log filter.
pub struct LogFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    env_override: bool,
}

impl LogFilter {
    fn new(initial: EnvFilter, env_override: bool) -> (reload::Layer<EnvFilter, Registry>, Self) {
        let (layer, handle) = reload::Layer::new(initial);
        (
            layer,
            Self {
                handle,
                env_override,
            },
        )
    }

    /// Applies the `log_filter` directive from the config file.
    /// `RUST_LOG`, when set, keeps precedence.
    pub fn apply_configured(&self, directive: &str) {
        if self.env_override {
            tracing::debug!("RUST_LOG is set; ignoring configured log filter.");
            return;
        }
        match EnvFilter::try_new(directive) {
            Ok(filter) => {
                if let Err(e) = self.handle.reload(filter) {
                    tracing::error!("Failed to apply log filter {:?}: {}", directive, e);
                }
            }
            Err(e) => tracing::warn!("Invalid log filter {:?} in config: {}", directive, e),
        }
    }
}

/// Installs the global subscriber, filtered by `RUST_LOG` or `info`.
pub fn init() -> LogFilter {
    let (filter, env_override) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(BOOT_FILTER), false),
    };
    let (layer, log_filter) = LogFilter::new(filter, env_override);
    tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer())
        .init();
    log_filter
}
