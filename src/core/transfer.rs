//! The single-slot hand-off between the shell and the application runtime.
//!
//! [`TransferGate`] owns the pending payload and the currently attached
//! notifier. Both live behind one mutex; a payload becomes visible (or is
//! replaced, or cleared) in one step.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::intake::IncomingFile;

/// Push capability of an attached runtime surface.
///
/// Implementations must be fire-and-forget: the gate treats a notify as a
/// hint and keeps the payload until it is consumed.
pub trait TransferNotifier: Send + Sync {
    fn notify_incoming_transfer_payload(&self, content: &str);
}

/// Inbound commands, independent of the OS callback that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferCommand {
    Consume,
    IncomingFile(IncomingFile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferReply {
    Payload(Option<String>),
    Accepted(bool),
}

/// The operations every platform adapter funnels into.
pub trait TransferEndpoint {
    /// Ingests an OS-supplied file. Returns `true` when a new payload was installed.
    fn try_accept_file(&self, file: &IncomingFile) -> bool;

    /// Takes the pending payload, leaving the slot empty.
    fn consume(&self) -> Option<String>;

    fn handle(&self, command: TransferCommand) -> TransferReply {
        match command {
            TransferCommand::Consume => TransferReply::Payload(self.consume()),
            TransferCommand::IncomingFile(file) => TransferReply::Accepted(self.try_accept_file(&file)),
        }
    }
}

#[derive(Default)]
struct GateInner {
    pending: Option<String>,
    notifier: Option<Arc<dyn TransferNotifier>>,
}

/// Holds at most one pending transfer payload and the runtime binding.
#[derive(Default)]
pub struct TransferGate {
    inner: Mutex<GateInner>,
}

impl TransferGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        // The slot stays consistent across a panic: every write is a single assignment.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds a runtime surface. A payload that arrived while detached is
    /// pushed to the new surface right away and stays available for `consume`.
    pub fn attach(&self, notifier: Arc<dyn TransferNotifier>) {
        let pending = {
            let mut inner = self.lock();
            inner.notifier = Some(notifier.clone());
            inner.pending.clone()
        };
        tracing::info!("Transfer channel attached.");
        if let Some(content) = pending {
            notifier.notify_incoming_transfer_payload(&content);
        }
    }

    /// Releases the runtime surface. Pending payloads are kept.
    pub fn detach(&self) {
        if self.lock().notifier.take().is_some() {
            tracing::info!("Transfer channel detached.");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.lock().notifier.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.lock().pending.is_some()
    }
}

impl TransferEndpoint for TransferGate {
    fn try_accept_file(&self, file: &IncomingFile) -> bool {
        // The read happens outside the lock; only the slot swap is guarded.
        let result = file.read_payload();

        let (content, notifier) = {
            let mut inner = self.lock();
            match result {
                Ok(content) => {
                    inner.pending = Some(content.clone());
                    (content, inner.notifier.clone())
                }
                Err(e) if e.is_unsupported() => {
                    tracing::debug!(
                        "Ignoring open request for {} (type hint {:?}): {}",
                        file.reference,
                        file.type_hint,
                        e
                    );
                    return false;
                }
                Err(e) => {
                    inner.pending = None;
                    tracing::warn!("Rejected transfer bundle {}: {}", file.reference, e);
                    return false;
                }
            }
        };

        tracing::info!(
            "Accepted transfer bundle {} ({} bytes).",
            file.reference,
            content.len()
        );
        match notifier {
            Some(notifier) => notifier.notify_incoming_transfer_payload(&content),
            None => tracing::debug!("No runtime attached; payload waits for consume."),
        }
        true
    }

    fn consume(&self) -> Option<String> {
        self.lock().pending.take()
    }
}
