pub mod error;
pub mod intake;
pub mod keep_alive;
pub mod transfer;

/// File extension of a transfer bundle, compared case-insensitively.
pub const TRANSFER_EXTENSION: &str = "monkeysshx";

/// Largest transfer bundle the shell will read (10 MiB).
pub const MAX_TRANSFER_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub use error::TransferError;
pub use intake::{read_transfer_payload, IncomingFile, TransferReference};
pub use keep_alive::{
    BackgroundToken, KeepAlive, KeepAliveBackend, SessionNotice, SessionWakeToken, WakeReason,
    DEFAULT_HOST_NAME, DISCONNECT_ACTION_LABEL, SESSION_WAKE_LIMIT,
};
pub use transfer::{TransferCommand, TransferEndpoint, TransferGate, TransferNotifier, TransferReply};
