//! Defines an abstraction over the event sending mechanism.

use serde_json::json;
use tao::event_loop::EventLoopProxy;

use super::channels::{ON_INCOMING_TRANSFER_PAYLOAD, TRANSFER_CHANNEL};
use super::events::UserEvent;
use crate::core::TransferNotifier;

/// A trait that abstracts the sending of user events.
/// This is "fire-and-forget" and doesn't return a result, simplifying its use.
pub trait EventProxy: Send + Sync + Clone + 'static {
    fn send_event(&self, event: UserEvent);
}

impl EventProxy for EventLoopProxy<UserEvent> {
    fn send_event(&self, event: UserEvent) {
        // Fails only once the event loop has exited.
        if let Err(e) = EventLoopProxy::send_event(self, event) {
            tracing::warn!("Failed to send event to event loop: {}", e);
        }
    }
}

/// Pushes incoming transfer payloads to the runtime through the event loop.
pub struct ChannelNotifier<P: EventProxy> {
    proxy: P,
}

impl<P: EventProxy> ChannelNotifier<P> {
    pub fn new(proxy: P) -> Self {
        Self { proxy }
    }
}

impl<P: EventProxy> TransferNotifier for ChannelNotifier<P> {
    fn notify_incoming_transfer_payload(&self, content: &str) {
        self.proxy.send_event(UserEvent::InvokeMethod {
            channel: TRANSFER_CHANNEL,
            method: ON_INCOMING_TRANSFER_PAYLOAD,
            arguments: json!(content),
        });
    }
}
