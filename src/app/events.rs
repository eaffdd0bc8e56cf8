//! Defines the event and message structures for communication between the shell and the runtime.

use serde::{Deserialize, Serialize};

use crate::core::SessionNotice;

/// Events posted to the `tao` event loop, which owns the webview.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// Reply to a runtime-initiated method call.
    MethodResult { id: u64, result: MethodResult },
    /// Native-initiated method call pushed to the runtime.
    InvokeMethod {
        channel: &'static str,
        method: &'static str,
        arguments: serde_json::Value,
    },
    /// The session notice changed; `None` removes it.
    SessionNoticeChanged(Option<SessionNotice>),
    /// A background execution window ran out.
    BackgroundWindowExpired(u64),
    /// A session wake assertion reached its time limit.
    SessionWakeExpired(u64),
    /// The user picked the session notice's "Disconnect" action.
    DisconnectRequested,
}

/// A method call received from the runtime over the webview IPC channel.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct IpcMessage {
    /// Correlates the reply with the pending promise in the runtime.
    pub id: u64,
    /// Channel name, e.g. `xyz.depollsoft.monkeyssh/transfer`.
    pub channel: String,
    /// The name of the method to execute.
    pub method: String,
    /// Method arguments as a JSON value.
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Outcome of a method call, serialized as `{"ok": ...}` or `{"error": "..."}`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MethodResult {
    Ok(serde_json::Value),
    Error(String),
}

impl MethodResult {
    pub fn success() -> Self {
        MethodResult::Ok(serde_json::Value::Null)
    }
}
