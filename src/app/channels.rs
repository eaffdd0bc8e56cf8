//! Named method channels between the shell and the runtime.
//!
//! The runtime calls into the shell with `window.ipc.postMessage` and
//! receives replies and pushes through scripts evaluated by the shell.
//! [`BRIDGE_SCRIPT`] installs the runtime-facing half of that protocol.

use thiserror::Error;

use super::events::{IpcMessage, MethodResult};

pub const SESSION_CHANNEL: &str = "xyz.depollsoft.monkeyssh/ssh_service";
pub const TRANSFER_CHANNEL: &str = "xyz.depollsoft.monkeyssh/transfer";

pub const START_SERVICE: &str = "startService";
pub const STOP_SERVICE: &str = "stopService";
pub const ON_DISCONNECT_REQUESTED: &str = "onDisconnectRequested";
pub const CONSUME_INCOMING_TRANSFER_PAYLOAD: &str = "consumeIncomingTransferPayload";
pub const ON_INCOMING_TRANSFER_PAYLOAD: &str = "onIncomingTransferPayload";

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Malformed IPC message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Method {method} is not implemented on channel {channel}")]
    NotImplemented { channel: String, method: String },
}

/// Decodes a raw IPC string from the webview.
pub fn parse_message(raw: &str) -> Result<IpcMessage, ChannelError> {
    Ok(serde_json::from_str(raw)?)
}

/// Script delivering a reply to the runtime's pending call `id`.
pub fn reply_script(id: u64, result: &MethodResult) -> String {
    let body = serde_json::to_string(result).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize method result: {}", e);
        r#"{"error":"serialization failed"}"#.to_string()
    });
    format!("window.__monkeysshChannels.resolve({}, {});", id, body)
}

/// Script invoking a native-to-runtime method.
pub fn push_script(channel: &str, method: &str, arguments: &serde_json::Value) -> String {
    // `Value` and `&str` serialization cannot fail.
    let channel = serde_json::Value::from(channel);
    let method = serde_json::Value::from(method);
    format!(
        "window.__monkeysshChannels.emit({}, {}, {});",
        channel, method, arguments
    )
}

/// Installed into every page before the runtime loads.
///
/// Pushes that arrive before the runtime registers a handler for their
/// channel are held, latest per method, and delivered on registration.
pub const BRIDGE_SCRIPT: &str = r#"
(function () {
  if (window.__monkeysshChannels) { return; }
  let nextId = 1;
  const pending = new Map();
  const handlers = new Map();
  const held = new Map();
  window.__monkeysshChannels = {
    invokeMethod(channel, method, args) {
      const id = nextId++;
      return new Promise((resolve, reject) => {
        pending.set(id, { resolve, reject });
        window.ipc.postMessage(JSON.stringify({ id, channel, method, arguments: args ?? null }));
      });
    },
    setMethodCallHandler(channel, handler) {
      if (!handler) { handlers.delete(channel); return; }
      handlers.set(channel, handler);
      const backlog = held.get(channel);
      held.delete(channel);
      if (backlog) { backlog.forEach((call) => handler(call)); }
    },
    resolve(id, reply) {
      const call = pending.get(id);
      if (!call) { return; }
      pending.delete(id);
      if ("error" in reply) { call.reject(new Error(reply.error)); } else { call.resolve(reply.ok); }
    },
    emit(channel, method, args) {
      const call = { method, arguments: args };
      const handler = handlers.get(channel);
      if (handler) { handler(call); return; }
      if (!held.has(channel)) { held.set(channel, new Map()); }
      held.get(channel).set(method, call);
    },
  };
})();
"#;
