//! Keeps the process alive while an SSH session is active.
//!
//! Two independent "held / not held" concerns:
//! - the session keep-alive: a persistent notice naming the host plus a wake
//!   assertion, held between `startService` and `stopService`. The wake
//!   assertion is capped at [`SESSION_WAKE_LIMIT`]; the notice is not;
//! - the background window: a single bounded execution token taken when the
//!   shell is backgrounded and released on foregrounding or expiry.

use std::time::Duration;

pub const DEFAULT_HOST_NAME: &str = "SSH server";
pub const DISCONNECT_ACTION_LABEL: &str = "Disconnect";
/// Upper bound on a single session wake assertion.
pub const SESSION_WAKE_LIMIT: Duration = Duration::from_secs(24 * 60 * 60);
pub const BACKGROUND_TASK_NAME: &str = "SSHKeepAlive";
pub const SESSION_WAKE_TAG: &str = "monkeyssh:ssh_background";

/// Which wake assertion is being taken or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeReason {
    Session,
    Background,
}

impl WakeReason {
    pub fn tag(self) -> &'static str {
        match self {
            WakeReason::Session => SESSION_WAKE_TAG,
            WakeReason::Background => BACKGROUND_TASK_NAME,
        }
    }
}

/// The persistent, silent notice shown while a session is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNotice {
    pub host_name: String,
    pub title: String,
    pub text: String,
    /// Label of the action that ends the session.
    pub action_label: String,
}

impl SessionNotice {
    pub fn for_host(host_name: &str) -> Self {
        Self {
            host_name: host_name.to_string(),
            title: format!("Connected to {}", host_name),
            text: "SSH session is active".to_string(),
            action_label: DISCONNECT_ACTION_LABEL.to_string(),
        }
    }
}

/// The OS side of keep-alive: notices and wake assertions.
pub trait KeepAliveBackend: Send {
    fn show_notice(&mut self, notice: &SessionNotice);
    fn dismiss_notice(&mut self);
    fn acquire_wake(&mut self, reason: WakeReason);
    fn release_wake(&mut self, reason: WakeReason);
}

impl<B: KeepAliveBackend + ?Sized> KeepAliveBackend for Box<B> {
    fn show_notice(&mut self, notice: &SessionNotice) {
        (**self).show_notice(notice)
    }
    fn dismiss_notice(&mut self) {
        (**self).dismiss_notice()
    }
    fn acquire_wake(&mut self, reason: WakeReason) {
        (**self).acquire_wake(reason)
    }
    fn release_wake(&mut self, reason: WakeReason) {
        (**self).release_wake(reason)
    }
}

/// A granted background execution window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundToken {
    pub id: u64,
    pub grace: Duration,
}

/// A granted session wake assertion. It must be released through
/// [`KeepAlive::expire_session_wake`] once `limit` has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWakeToken {
    pub id: u64,
    pub limit: Duration,
}

pub struct KeepAlive<B> {
    backend: B,
    notice: Option<SessionNotice>,
    session_wake: Option<SessionWakeToken>,
    background: Option<BackgroundToken>,
    next_token_id: u64,
}

impl<B: KeepAliveBackend> KeepAlive<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            notice: None,
            session_wake: None,
            background: None,
            next_token_id: 1,
        }
    }

    /// Posts (or re-posts) the session notice and takes the session wake
    /// assertion unless it is already held.
    ///
    /// Returns the new wake token when one was taken; the caller schedules
    /// its expiry after `wake_limit`.
    pub fn start_session(&mut self, host_name: &str, wake_limit: Duration) -> Option<SessionWakeToken> {
        let notice = SessionNotice::for_host(host_name);
        self.backend.show_notice(&notice);
        self.notice = Some(notice);
        tracing::info!("Session keep-alive started for {}.", host_name);

        if self.session_wake.is_some() {
            return None;
        }
        let token = SessionWakeToken {
            id: self.next_token_id(),
            limit: wake_limit,
        };
        self.backend.acquire_wake(WakeReason::Session);
        self.session_wake = Some(token);
        Some(token)
    }

    pub fn stop_session(&mut self) {
        let had_notice = self.notice.take().is_some();
        if had_notice {
            self.backend.dismiss_notice();
        }
        let had_wake = self.release_session_wake();
        if had_notice || had_wake {
            tracing::info!("Session keep-alive stopped.");
        }
    }

    /// Releases the session wake assertion if `token_id` is still the current
    /// one. The notice stays up; the session itself is still active.
    pub fn expire_session_wake(&mut self, token_id: u64) -> bool {
        match self.session_wake {
            Some(token) if token.id == token_id => {
                tracing::warn!(
                    "Session wake assertion {} reached its {:?} limit; releasing it.",
                    token_id,
                    token.limit
                );
                self.release_session_wake();
                true
            }
            _ => false,
        }
    }

    /// Whether a session is active, i.e. its notice is showing.
    pub fn is_session_held(&self) -> bool {
        self.notice.is_some()
    }

    pub fn is_session_wake_held(&self) -> bool {
        self.session_wake.is_some()
    }

    fn release_session_wake(&mut self) -> bool {
        if self.session_wake.take().is_some() {
            self.backend.release_wake(WakeReason::Session);
            true
        } else {
            false
        }
    }

    fn next_token_id(&mut self) -> u64 {
        let id = self.next_token_id;
        self.next_token_id += 1;
        id
    }

    pub fn notice(&self) -> Option<&SessionNotice> {
        self.notice.as_ref()
    }

    /// Begins a new background window, ending any previous one first.
    /// The caller is responsible for calling [`Self::expire_background`]
    /// once `grace` has elapsed.
    pub fn enter_background(&mut self, grace: Duration) -> BackgroundToken {
        self.end_background();

        let token = BackgroundToken {
            id: self.next_token_id(),
            grace,
        };
        self.backend.acquire_wake(WakeReason::Background);
        self.background = Some(token);
        tracing::debug!("Background window {} begun ({:?}).", token.id, grace);
        token
    }

    pub fn enter_foreground(&mut self) {
        self.end_background();
    }

    /// Releases the window if `token_id` is still the current one.
    /// Returns `false` for stale expiries.
    pub fn expire_background(&mut self, token_id: u64) -> bool {
        match self.background {
            Some(token) if token.id == token_id => {
                tracing::info!("Background window {} expired.", token_id);
                self.end_background();
                true
            }
            _ => false,
        }
    }

    pub fn is_background_held(&self) -> bool {
        self.background.is_some()
    }

    fn end_background(&mut self) {
        if let Some(token) = self.background.take() {
            self.backend.release_wake(WakeReason::Background);
            tracing::debug!("Background window {} ended.", token.id);
        }
    }

    /// Drops every held assertion, e.g. on shutdown.
    pub fn release_all(&mut self) {
        self.stop_session();
        self.end_background();
    }
}
