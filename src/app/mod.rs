//! Glue between the `tao`/`wry` shell and the core transfer and keep-alive logic.

pub mod channels;
pub mod commands;
pub mod events;
pub mod helpers;
pub mod keep_alive;
pub mod launch;
pub mod proxy;
pub mod shortcuts;
pub mod state;

use std::sync::{Arc, Mutex};

use tao::window::Window;
use wry::{PageLoadEvent, WebView};

use channels::{ChannelError, SESSION_CHANNEL, TRANSFER_CHANNEL};
use events::{IpcMessage, MethodResult, UserEvent};
use proxy::EventProxy;
use state::AppState;

use crate::core::SessionNotice;

pub const APP_NAME: &str = "MonkeySSH";

/// Entry point for every IPC message posted by the runtime.
///
/// Malformed messages carry no usable id and are dropped; everything else
/// gets exactly one reply.
pub fn handle_ipc_message<P: EventProxy>(message: String, proxy: P, state: Arc<Mutex<AppState>>) {
    let msg = match channels::parse_message(&message) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::warn!("Dropping IPC message: {}", e);
            return;
        }
    };

    let id = msg.id;
    let result = dispatch(msg, &proxy, &state).unwrap_or_else(|e| {
        tracing::warn!("{}", e);
        MethodResult::Error(e.to_string())
    });
    proxy.send_event(UserEvent::MethodResult { id, result });
}

fn dispatch<P: EventProxy>(
    msg: IpcMessage,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) -> Result<MethodResult, ChannelError> {
    tracing::debug!("IPC call {} on {}", msg.method, msg.channel);
    match (msg.channel.as_str(), msg.method.as_str()) {
        (SESSION_CHANNEL, channels::START_SERVICE) => {
            Ok(commands::start_service(&msg.arguments, proxy, state))
        }
        (SESSION_CHANNEL, channels::STOP_SERVICE) => Ok(commands::stop_service(state)),
        (TRANSFER_CHANNEL, channels::CONSUME_INCOMING_TRANSFER_PAYLOAD) => {
            Ok(commands::consume_incoming_transfer_payload(state))
        }
        _ => Err(ChannelError::NotImplemented {
            channel: msg.channel,
            method: msg.method,
        }),
    }
}

/// Follows the runtime page's lifecycle: a navigation or reload tears the
/// old runtime down, and the transfer channel is bound again once the new
/// page has loaded.
pub fn handle_page_load<P: EventProxy>(
    event: PageLoadEvent,
    url: &str,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) {
    match event {
        PageLoadEvent::Started => {
            tracing::debug!("Runtime page loading: {}", url);
            commands::detach_runtime(state);
        }
        PageLoadEvent::Finished => {
            tracing::debug!("Runtime page loaded: {}", url);
            commands::attach_runtime(proxy.clone(), state);
        }
    }
}

/// Title of the main window, carrying the session notice while one is shown.
pub fn window_title(notice: Option<&SessionNotice>) -> String {
    match notice {
        Some(notice) => format!("{} ({}) - {}", notice.title, notice.text, APP_NAME),
        None => APP_NAME.to_string(),
    }
}

/// Renders the script an event needs evaluated in the webview, if any.
pub fn script_for_event(event: &UserEvent) -> Option<String> {
    match event {
        UserEvent::MethodResult { id, result } => Some(channels::reply_script(*id, result)),
        UserEvent::InvokeMethod {
            channel,
            method,
            arguments,
        } => Some(channels::push_script(channel, method, arguments)),
        UserEvent::SessionNoticeChanged(_)
        | UserEvent::BackgroundWindowExpired(_)
        | UserEvent::SessionWakeExpired(_)
        | UserEvent::DisconnectRequested => None,
    }
}

/// Handles events from the shell, running on the event loop thread.
pub fn handle_user_event<P: EventProxy>(
    event: UserEvent,
    webview: &WebView,
    window: &Window,
    proxy: &P,
    state: &Arc<Mutex<AppState>>,
) {
    if let Some(script) = script_for_event(&event) {
        if let Err(e) = webview.evaluate_script(&script) {
            tracing::error!("Failed to evaluate script in webview: {}", e);
        }
        return;
    }

    match event {
        UserEvent::SessionNoticeChanged(notice) => {
            window.set_title(&window_title(notice.as_ref()));
        }
        UserEvent::BackgroundWindowExpired(id) => {
            commands::expire_background(id, state);
        }
        UserEvent::SessionWakeExpired(id) => {
            commands::expire_session_wake(id, state);
        }
        UserEvent::DisconnectRequested => {
            if !commands::request_disconnect(proxy, state) {
                tracing::debug!("Disconnect requested without an active session.");
            }
        }
        UserEvent::MethodResult { .. } | UserEvent::InvokeMethod { .. } => {}
    }
}
