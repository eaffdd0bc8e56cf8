#![allow(unexpected_cfgs)] // `msg_send!` in older `objc` crates

use cocoa::base::{id, nil};
use cocoa::foundation::NSString;
use objc::{class, msg_send, sel, sel_impl};

use crate::core::WakeReason;

// NSActivityOptions
const NS_ACTIVITY_USER_INITIATED: u64 = 0x00FF_FFFF;
const NS_ACTIVITY_IDLE_SYSTEM_SLEEP_DISABLED: u64 = 1 << 20;

/// A retained `NSProcessInfo` activity object.
#[derive(Debug)]
pub struct ActivityToken(id);

// SAFETY: the activity object is opaque and immutable; it is only handed
// back to `endActivity:`, which Foundation documents as thread-safe.
unsafe impl Send for ActivityToken {}

fn options_for(reason: WakeReason) -> u64 {
    match reason {
        // Keeps the CPU running for keepalives, like a partial wake lock.
        WakeReason::Session => NS_ACTIVITY_USER_INITIATED,
        // Only opts out of App Nap; the system may still idle-sleep.
        WakeReason::Background => NS_ACTIVITY_USER_INITIATED & !NS_ACTIVITY_IDLE_SYSTEM_SLEEP_DISABLED,
    }
}

pub fn begin_activity(reason: WakeReason) -> ActivityToken {
    unsafe {
        let info: id = msg_send![class!(NSProcessInfo), processInfo];
        let label = NSString::alloc(nil).init_str(reason.tag());
        let options = options_for(reason);
        let activity: id = msg_send![info, beginActivityWithOptions: options reason: label];
        let activity: id = msg_send![activity, retain];
        ActivityToken(activity)
    }
}

pub fn end_activity(token: ActivityToken) {
    unsafe {
        let info: id = msg_send![class!(NSProcessInfo), processInfo];
        let _: () = msg_send![info, endActivity: token.0];
        let _: () = msg_send![token.0, release];
    }
}
