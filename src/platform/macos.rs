//! macOS-specific helpers.
//!
//! wry forwards `keyDown:` to `NSApp.mainMenu`, so a main menu must exist
//! before the webview is created; see [`menu::install_standard_menus`].

pub mod activity;
pub mod menu;
