#![allow(deprecated)] // Keep Cocoa warnings localized
#![allow(unexpected_cfgs)] // `sel!` in older `objc` crates

use std::sync::OnceLock;

use cocoa::appkit::{NSApp, NSApplication, NSEventModifierFlags, NSMenu, NSMenuItem};
use cocoa::base::{id, nil, YES};
use cocoa::foundation::NSString;
use objc::declare::ClassDecl;
use objc::runtime::{Class, Object, Sel};
use objc::{class, msg_send, sel, sel_impl};

use crate::core::DISCONNECT_ACTION_LABEL;

const CMD: NSEventModifierFlags = NSEventModifierFlags::NSCommandKeyMask;
const TARGET_CLASS: &str = "MonkeySSHSessionMenuTarget";

type DisconnectHandler = Box<dyn Fn() + Send + Sync>;

static DISCONNECT_HANDLER: OnceLock<DisconnectHandler> = OnceLock::new();

extern "C" fn disconnect_selected(_this: &Object, _cmd: Sel, _sender: id) {
    match DISCONNECT_HANDLER.get() {
        Some(handler) => handler(),
        None => tracing::warn!("Disconnect selected before a handler was installed."),
    }
}

/// Objective-C class whose instances receive the Session menu's actions.
fn session_target_class() -> &'static Class {
    if let Some(class) = Class::get(TARGET_CLASS) {
        return class;
    }
    let mut decl = match ClassDecl::new(TARGET_CLASS, class!(NSObject)) {
        Some(decl) => decl,
        // Registered concurrently under the same name.
        None => return class!(MonkeySSHSessionMenuTarget),
    };
    unsafe {
        decl.add_method(
            sel!(disconnect:),
            disconnect_selected as extern "C" fn(&Object, Sel, id),
        );
    }
    decl.register()
}

/// One row of a menu. `None` as title renders a separator.
struct Entry {
    title: Option<String>,
    action: Option<Sel>,
    key: &'static str,
    mask: Option<NSEventModifierFlags>,
}

impl Entry {
    fn item(title: impl Into<String>, action: Sel, key: &'static str, mask: Option<NSEventModifierFlags>) -> Self {
        Self {
            title: Some(title.into()),
            action: Some(action),
            key,
            mask,
        }
    }

    fn separator() -> Self {
        Self {
            title: None,
            action: None,
            key: "",
            mask: None,
        }
    }
}

fn ns(s: &str) -> id {
    unsafe { NSString::alloc(nil).init_str(s) }
}

unsafe fn append_submenu(menubar: id, title: &str, entries: &[Entry]) -> id {
    let menu = NSMenu::alloc(nil).initWithTitle_(ns(title));
    let holder = NSMenuItem::new(nil);
    holder.setSubmenu_(menu);
    menubar.addItem_(holder);

    for entry in entries {
        match (&entry.title, entry.action) {
            (Some(title), Some(action)) => {
                let item = NSMenuItem::alloc(nil).initWithTitle_action_keyEquivalent_(
                    ns(title),
                    action,
                    ns(entry.key),
                );
                if let Some(mask) = entry.mask {
                    item.setKeyEquivalentModifierMask_(mask);
                }
                menu.addItem_(item);
            }
            _ => menu.addItem_(NSMenuItem::separatorItem(nil)),
        }
    }
    menu
}

/// Installs the App, Edit, Session and Window menus. Edit is required for
/// copy/paste shortcuts to reach the terminal inside the webview. Session
/// carries the keep-alive notice's "Disconnect" action, which runs
/// `on_disconnect`.
pub fn install_standard_menus(app_name: &str, on_disconnect: impl Fn() + Send + Sync + 'static) {
    if DISCONNECT_HANDLER.set(Box::new(on_disconnect)).is_err() {
        tracing::warn!("Menus already installed; keeping the first disconnect handler.");
    }

    unsafe {
        let menubar = NSMenu::new(nil);
        NSApp().setMainMenu_(menubar);

        append_submenu(
            menubar,
            app_name,
            &[
                Entry::item(format!("About {}", app_name), sel!(orderFrontStandardAboutPanel:), "", None),
                Entry::separator(),
                Entry::item(format!("Hide {}", app_name), sel!(hide:), "h", Some(CMD)),
                Entry::item("Show All", sel!(unhideAllApplications:), "", None),
                Entry::separator(),
                Entry::item(format!("Quit {}", app_name), sel!(terminate:), "q", Some(CMD)),
            ],
        );

        append_submenu(
            menubar,
            "Edit",
            &[
                Entry::item("Undo", sel!(undo:), "z", Some(CMD)),
                Entry::item("Redo", sel!(redo:), "Z", Some(CMD | NSEventModifierFlags::NSShiftKeyMask)),
                Entry::separator(),
                Entry::item("Cut", sel!(cut:), "x", Some(CMD)),
                Entry::item("Copy", sel!(copy:), "c", Some(CMD)),
                Entry::item("Paste", sel!(paste:), "v", Some(CMD)),
                Entry::item("Select All", sel!(selectAll:), "a", Some(CMD)),
            ],
        );

        let session_menu = append_submenu(
            menubar,
            "Session",
            &[Entry::item(
                DISCONNECT_ACTION_LABEL,
                sel!(disconnect:),
                "d",
                Some(CMD | NSEventModifierFlags::NSShiftKeyMask),
            )],
        );
        let target: id = msg_send![session_target_class(), new];
        let disconnect_item: id = msg_send![session_menu, itemAtIndex: 0isize];
        let () = msg_send![disconnect_item, setTarget: target];

        let window_menu = append_submenu(
            menubar,
            "Window",
            &[
                Entry::item("Minimize", sel!(performMiniaturize:), "m", Some(CMD)),
                Entry::item("Zoom", sel!(performZoom:), "", None),
            ],
        );
        NSApp().setWindowsMenu_(window_menu);

        menubar.setAutoenablesItems(YES);
    }
}
