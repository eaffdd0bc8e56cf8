//! Contains the handlers behind the method channels and OS lifecycle events.
//!
//! Runtime-initiated handlers return a [`MethodResult`]; the dispatcher in
//! `app::mod` sends it back as a reply. Lifecycle handlers are called from
//! the event loop.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::channels::{ON_DISCONNECT_REQUESTED, SESSION_CHANNEL};
use super::events::{MethodResult, UserEvent};
use super::helpers::{transfer_gate, with_state};
use super::proxy::{ChannelNotifier, EventProxy};
use super::state::AppState;
use crate::core::{IncomingFile, TransferEndpoint};

/// `startService`: begins the session keep-alive for `hostName`.
///
/// A missing or non-string `hostName` falls back to the configured default.
/// A newly taken wake assertion is released again once the configured limit
/// has passed.
pub fn start_service<P: EventProxy>(
    arguments: &Value,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) -> MethodResult {
    let wake = with_state(state, |s| {
        let host_name = arguments
            .get("hostName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| s.config.default_host_name.clone());
        let limit = s.session_wake_limit();
        s.keep_alive.start_session(&host_name, limit)
    });
    if let Some(token) = wake {
        send_after(proxy.clone(), token.limit, UserEvent::SessionWakeExpired(token.id));
    }
    MethodResult::success()
}

/// `stopService`: ends the session keep-alive.
pub fn stop_service(state: &Arc<Mutex<AppState>>) -> MethodResult {
    with_state(state, |s| s.keep_alive.stop_session());
    MethodResult::success()
}

/// `consumeIncomingTransferPayload`: hands the pending payload to the
/// runtime and clears it. Replies `null` when nothing is pending.
pub fn consume_incoming_transfer_payload(state: &Arc<Mutex<AppState>>) -> MethodResult {
    let payload = transfer_gate(state).consume();
    MethodResult::Ok(json!(payload))
}

/// Feeds OS-delivered files through the intake gate in delivery order.
/// Returns how many were accepted.
pub fn open_incoming_files(files: &[IncomingFile], state: &Arc<Mutex<AppState>>) -> usize {
    let gate = transfer_gate(state);
    files
        .iter()
        .filter(|file| gate.try_accept_file(file))
        .count()
}

/// Binds the runtime surface to the transfer channel.
pub fn attach_runtime<P: EventProxy>(proxy: P, state: &Arc<Mutex<AppState>>) {
    transfer_gate(state).attach(Arc::new(ChannelNotifier::new(proxy)));
}

pub fn detach_runtime(state: &Arc<Mutex<AppState>>) {
    transfer_gate(state).detach();
}

/// Starts a background window and schedules its expiry on the tokio runtime.
pub fn enter_background<P: EventProxy>(proxy: P, state: &Arc<Mutex<AppState>>) {
    let token = with_state(state, |s| {
        let grace = s.background_grace();
        s.keep_alive.enter_background(grace)
    });

    send_after(proxy, token.grace, UserEvent::BackgroundWindowExpired(token.id));
}

fn send_after<P: EventProxy>(proxy: P, delay: Duration, event: UserEvent) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        proxy.send_event(event);
    });
}

pub fn enter_foreground(state: &Arc<Mutex<AppState>>) {
    with_state(state, |s| s.keep_alive.enter_foreground());
}

/// Releases the background window `token_id` if it is still current.
pub fn expire_background(token_id: u64, state: &Arc<Mutex<AppState>>) -> bool {
    with_state(state, |s| s.keep_alive.expire_background(token_id))
}

/// Releases the session wake assertion `token_id` if it is still current.
pub fn expire_session_wake(token_id: u64, state: &Arc<Mutex<AppState>>) -> bool {
    with_state(state, |s| s.keep_alive.expire_session_wake(token_id))
}

/// The session notice's "Disconnect" action: tells the runtime to stop the
/// session and drops the keep-alive. Does nothing without an active session.
pub fn request_disconnect<P: EventProxy>(proxy: &P, state: &Arc<Mutex<AppState>>) -> bool {
    let was_held = with_state(state, |s| {
        let held = s.keep_alive.is_session_held();
        s.keep_alive.stop_session();
        held
    });
    if was_held {
        proxy.send_event(UserEvent::InvokeMethod {
            channel: SESSION_CHANNEL,
            method: ON_DISCONNECT_REQUESTED,
            arguments: Value::Null,
        });
    }
    was_held
}

/// Tears down the runtime binding and every held assertion.
///
/// Nothing is pushed to the runtime: its page goes away with the window.
pub fn shutdown(state: &Arc<Mutex<AppState>>) {
    detach_runtime(state);
    with_state(state, |s| s.keep_alive.release_all());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::channels::{ON_INCOMING_TRANSFER_PAYLOAD, TRANSFER_CHANNEL};
    use crate::app::keep_alive::ShellKeepAliveBackend;
    use crate::config::ShellConfig;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};
    use tokio::sync::mpsc;

    // A mock EventProxy for capturing events sent to the event loop.
    #[derive(Clone)]
    struct TestEventProxy {
        sender: mpsc::UnboundedSender<UserEvent>,
    }

    impl EventProxy for TestEventProxy {
        fn send_event(&self, event: UserEvent) {
            self.sender.send(event).expect("Test receiver dropped");
        }
    }

    struct TestHarness {
        state: Arc<Mutex<AppState>>,
        proxy: TestEventProxy,
        event_rx: mpsc::UnboundedReceiver<UserEvent>,
        _temp_dir: TempDir,
        root_path: PathBuf,
    }

    impl TestHarness {
        fn new() -> Self {
            Self::with_config(ShellConfig::default())
        }

        fn with_config(config: ShellConfig) -> Self {
            let temp_dir = tempdir().expect("Failed to create temp dir");
            let root_path = temp_dir.path().to_path_buf();
            let (tx, rx) = mpsc::unbounded_channel();
            let proxy = TestEventProxy { sender: tx };
            let backend = Box::new(ShellKeepAliveBackend::new(proxy.clone()));

            Self {
                state: Arc::new(Mutex::new(AppState::new(config, backend))),
                proxy,
                event_rx: rx,
                _temp_dir: temp_dir,
                root_path,
            }
        }

        fn create_file(&self, name: &str, content: &str) -> IncomingFile {
            let path = self.root_path.join(name);
            fs::write(&path, content).unwrap();
            IncomingFile::from_path(path)
        }

        fn drain_events(&mut self) -> Vec<UserEvent> {
            let mut events = Vec::new();
            while let Ok(event) = self.event_rx.try_recv() {
                events.push(event);
            }
            events
        }

        async fn get_next_event(&mut self) -> Option<UserEvent> {
            tokio::time::timeout(std::time::Duration::from_secs(2), self.event_rx.recv())
                .await
                .ok()
                .flatten()
        }
    }

    fn push_of(content: &str) -> UserEvent {
        UserEvent::InvokeMethod {
            channel: TRANSFER_CHANNEL,
            method: ON_INCOMING_TRANSFER_PAYLOAD,
            arguments: json!(content),
        }
    }

    #[test]
    fn test_consume_returns_null_when_empty() {
        let harness = TestHarness::new();
        assert_eq!(
            consume_incoming_transfer_payload(&harness.state),
            MethodResult::Ok(Value::Null)
        );
    }

    #[test]
    fn test_open_then_consume_once() {
        let harness = TestHarness::new();
        let file = harness.create_file("session.monkeysshx", r#"{"host":"a"}"#);

        assert_eq!(open_incoming_files(&[file], &harness.state), 1);
        assert_eq!(
            consume_incoming_transfer_payload(&harness.state),
            MethodResult::Ok(json!(r#"{"host":"a"}"#))
        );
        assert_eq!(
            consume_incoming_transfer_payload(&harness.state),
            MethodResult::Ok(Value::Null)
        );
    }

    #[test]
    fn test_batch_open_keeps_last_accepted() {
        let harness = TestHarness::new();
        let files = vec![
            harness.create_file("a.monkeysshx", "A"),
            harness.create_file("b.monkeysshx", "B"),
            harness.create_file("notes.txt", "not me"),
        ];

        assert_eq!(open_incoming_files(&files, &harness.state), 2);
        assert_eq!(
            consume_incoming_transfer_payload(&harness.state),
            MethodResult::Ok(json!("B"))
        );
    }

    #[test]
    fn test_attached_runtime_receives_push() {
        let mut harness = TestHarness::new();
        attach_runtime(harness.proxy.clone(), &harness.state);
        let file = harness.create_file("push.monkeysshx", "pushed");

        open_incoming_files(&[file], &harness.state);

        assert_eq!(harness.drain_events(), vec![push_of("pushed")]);
        // The push is a hint; the payload is still there to pull.
        assert_eq!(
            consume_incoming_transfer_payload(&harness.state),
            MethodResult::Ok(json!("pushed"))
        );
    }

    #[test]
    fn test_detached_runtime_gets_no_push_but_can_pull_after_reattach() {
        let mut harness = TestHarness::new();
        attach_runtime(harness.proxy.clone(), &harness.state);
        detach_runtime(&harness.state);
        let file = harness.create_file("cold.monkeysshx", "cold");

        open_incoming_files(&[file], &harness.state);
        assert!(harness.drain_events().is_empty());

        attach_runtime(harness.proxy.clone(), &harness.state);
        assert_eq!(harness.drain_events(), vec![push_of("cold")]);
        assert_eq!(
            consume_incoming_transfer_payload(&harness.state),
            MethodResult::Ok(json!("cold"))
        );
    }

    #[tokio::test]
    async fn test_start_service_uses_host_argument() {
        let mut harness = TestHarness::new();

        start_service(&json!({ "hostName": "bastion" }), &harness.proxy, &harness.state);

        let events = harness.drain_events();
        match events.as_slice() {
            [UserEvent::SessionNoticeChanged(Some(notice))] => {
                assert_eq!(notice.title, "Connected to bastion");
            }
            other => panic!("Unexpected events: {other:?}"),
        }
        assert!(with_state(&harness.state, |s| s.keep_alive.is_session_held()));
    }

    #[tokio::test]
    async fn test_start_service_defaults_host_name() {
        let mut harness = TestHarness::new();

        start_service(&Value::Null, &harness.proxy, &harness.state);
        start_service(&json!({ "hostName": 42 }), &harness.proxy, &harness.state);

        for event in harness.drain_events() {
            match event {
                UserEvent::SessionNoticeChanged(Some(notice)) => {
                    assert_eq!(notice.host_name, "SSH server");
                }
                other => panic!("Unexpected event: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_stop_service_dismisses_notice() {
        let mut harness = TestHarness::new();
        start_service(&Value::Null, &harness.proxy, &harness.state);
        harness.drain_events();

        assert_eq!(stop_service(&harness.state), MethodResult::success());

        assert_eq!(
            harness.drain_events(),
            vec![UserEvent::SessionNoticeChanged(None)]
        );
        assert!(!with_state(&harness.state, |s| s.keep_alive.is_session_held()));
    }

    #[tokio::test]
    async fn test_disconnect_action_notifies_runtime_once() {
        let mut harness = TestHarness::new();
        start_service(&json!({ "hostName": "h" }), &harness.proxy, &harness.state);
        harness.drain_events();

        assert!(request_disconnect(&harness.proxy, &harness.state));
        assert!(!request_disconnect(&harness.proxy, &harness.state));

        assert_eq!(
            harness.drain_events(),
            vec![
                UserEvent::SessionNoticeChanged(None),
                UserEvent::InvokeMethod {
                    channel: SESSION_CHANNEL,
                    method: ON_DISCONNECT_REQUESTED,
                    arguments: Value::Null,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_background_window_expiry_is_delivered() {
        let mut harness = TestHarness::with_config(ShellConfig {
            background_grace_secs: 0,
            ..Default::default()
        });

        enter_background(harness.proxy.clone(), &harness.state);
        assert!(with_state(&harness.state, |s| s.keep_alive.is_background_held()));

        let event = harness.get_next_event().await;
        let Some(UserEvent::BackgroundWindowExpired(id)) = event else {
            panic!("Expected expiry event, got {event:?}");
        };
        assert!(expire_background(id, &harness.state));
        assert!(!with_state(&harness.state, |s| s.keep_alive.is_background_held()));
    }

    #[tokio::test]
    async fn test_session_wake_limit_releases_wake_but_keeps_session() {
        let mut harness = TestHarness::with_config(ShellConfig {
            session_wake_limit_secs: 0,
            ..Default::default()
        });

        start_service(&json!({ "hostName": "long" }), &harness.proxy, &harness.state);
        assert!(matches!(
            harness.get_next_event().await,
            Some(UserEvent::SessionNoticeChanged(Some(_)))
        ));

        let event = harness.get_next_event().await;
        let Some(UserEvent::SessionWakeExpired(id)) = event else {
            panic!("Expected wake expiry, got {event:?}");
        };
        assert!(expire_session_wake(id, &harness.state));
        assert!(!with_state(&harness.state, |s| s.keep_alive.is_session_wake_held()));
        assert!(with_state(&harness.state, |s| s.keep_alive.is_session_held()));

        // The notice's Disconnect action still ends the session.
        assert!(request_disconnect(&harness.proxy, &harness.state));
    }

    #[tokio::test]
    async fn test_restart_with_wake_held_schedules_no_second_expiry() {
        let mut harness = TestHarness::with_config(ShellConfig {
            session_wake_limit_secs: 0,
            ..Default::default()
        });

        start_service(&Value::Null, &harness.proxy, &harness.state);
        start_service(&Value::Null, &harness.proxy, &harness.state);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let expiries = harness
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, UserEvent::SessionWakeExpired(_)))
            .count();
        assert_eq!(expiries, 1);
    }

    #[tokio::test]
    async fn test_expiry_after_foreground_is_ignored() {
        let mut harness = TestHarness::with_config(ShellConfig {
            background_grace_secs: 0,
            ..Default::default()
        });

        enter_background(harness.proxy.clone(), &harness.state);
        enter_foreground(&harness.state);

        let Some(UserEvent::BackgroundWindowExpired(id)) = harness.get_next_event().await else {
            panic!("Expected expiry event");
        };
        assert!(!expire_background(id, &harness.state));
    }

    #[tokio::test]
    async fn test_shutdown_detaches_and_releases() {
        let mut harness = TestHarness::new();
        attach_runtime(harness.proxy.clone(), &harness.state);
        start_service(&Value::Null, &harness.proxy, &harness.state);
        harness.drain_events();

        shutdown(&harness.state);

        assert!(!transfer_gate(&harness.state).is_attached());
        assert!(!with_state(&harness.state, |s| s.keep_alive.is_session_held()));
        assert_eq!(
            harness.drain_events(),
            vec![UserEvent::SessionNoticeChanged(None)]
        );
    }
}
