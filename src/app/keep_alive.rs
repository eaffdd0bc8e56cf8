//! Desktop backend for the session keep-alive.
//!
//! The session notice is mirrored into the window title through the event
//! loop; wake assertions map to native process activities.

use std::collections::HashMap;

use super::events::UserEvent;
use super::proxy::EventProxy;
use crate::core::{KeepAliveBackend, SessionNotice, WakeReason};
use crate::platform::{self, ActivityToken};

pub struct ShellKeepAliveBackend<P: EventProxy> {
    proxy: P,
    activities: HashMap<WakeReason, ActivityToken>,
}

impl<P: EventProxy> ShellKeepAliveBackend<P> {
    pub fn new(proxy: P) -> Self {
        Self {
            proxy,
            activities: HashMap::new(),
        }
    }
}

impl<P: EventProxy> KeepAliveBackend for ShellKeepAliveBackend<P> {
    fn show_notice(&mut self, notice: &SessionNotice) {
        self.proxy
            .send_event(UserEvent::SessionNoticeChanged(Some(notice.clone())));
    }

    fn dismiss_notice(&mut self) {
        self.proxy.send_event(UserEvent::SessionNoticeChanged(None));
    }

    fn acquire_wake(&mut self, reason: WakeReason) {
        if self.activities.contains_key(&reason) {
            return;
        }
        self.activities.insert(reason, platform::begin_activity(reason));
    }

    fn release_wake(&mut self, reason: WakeReason) {
        if let Some(token) = self.activities.remove(&reason) {
            platform::end_activity(token);
        }
    }
}

impl<P: EventProxy> Drop for ShellKeepAliveBackend<P> {
    fn drop(&mut self) {
        for (_, token) in self.activities.drain() {
            platform::end_activity(token);
        }
    }
}
