//! Platform-specific integration helpers.
//!
//! Keep OS quirks here to avoid leaking them into the shell's core logic.
//! Everything is a no-op on targets without a native implementation.

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "macos")]
pub use macos::activity::{begin_activity, end_activity, ActivityToken};

#[cfg(not(target_os = "macos"))]
use crate::core::WakeReason;

/// Placeholder for targets where process liveness needs no OS assertion.
#[cfg(not(target_os = "macos"))]
#[derive(Debug)]
pub struct ActivityToken(WakeReason);

#[cfg(not(target_os = "macos"))]
pub fn begin_activity(reason: WakeReason) -> ActivityToken {
    tracing::debug!("No native wake assertion on this platform ({}).", reason.tag());
    ActivityToken(reason)
}

#[cfg(not(target_os = "macos"))]
pub fn end_activity(token: ActivityToken) {
    tracing::debug!("Released wake bookkeeping ({}).", token.0.tag());
}

/// Prepares the native menu bar before the webview is created.
///
/// `on_disconnect` backs the "Disconnect" menu item where the platform has a
/// menu bar. Elsewhere the keyboard shortcut in `app::shortcuts` is the only
/// route to it.
pub fn prepare_menus(app_name: &str, on_disconnect: impl Fn() + Send + Sync + 'static) {
    #[cfg(target_os = "macos")]
    macos::menu::install_standard_menus(app_name, on_disconnect);
    #[cfg(not(target_os = "macos"))]
    let _ = (app_name, on_disconnect);
}
