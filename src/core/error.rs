//! Defines the error type for transfer bundle intake.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons an incoming transfer bundle can be rejected.
///
/// These never cross the channel boundary. The runtime only ever observes
/// "no payload available"; the variants exist so the shell can log the cause.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The resource does not carry the bundle extension, or names a location
    /// the shell cannot read from (e.g. a non-`file` URL).
    #[error("Unsupported transfer resource: {0}")]
    UnsupportedResource(String),

    /// The resource exceeds the payload cap. `observed` is either the size
    /// reported by metadata or the byte count read before the read was aborted.
    #[error("Transfer resource {path} is too large ({observed} bytes, limit {limit})")]
    OversizeResource {
        path: PathBuf,
        limit: u64,
        observed: u64,
    },

    /// The resource could not be opened or read.
    #[error("I/O error for path {1}: {0}")]
    UnreadableResource(#[source] std::io::Error, PathBuf),

    /// The resource is not valid UTF-8 text.
    #[error("Transfer resource {path} is not valid UTF-8 (valid up to byte {valid_up_to})")]
    UndecodableResource { path: PathBuf, valid_up_to: usize },
}

impl TransferError {
    /// `true` when the rejection happened before the resource qualified as a
    /// transfer bundle. Such rejections must leave the pending payload alone.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, TransferError::UnsupportedResource(_))
    }
}
