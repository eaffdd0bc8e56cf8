use tracing_subscriber::EnvFilter;

/// Routes shell logs into the test harness output.
///
/// Honors `RUST_LOG` and otherwise shows this crate's debug output. Repeated
/// calls are harmless: only the first one installs a subscriber.
pub fn setup_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("monkeyssh_shell=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Returns true when the current process runs as root (UID 0).
/// Permission-based tests cannot provoke read failures as root.
#[cfg(test)]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: libc call has no side effects; used for testing only.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
