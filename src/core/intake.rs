//! Reading and validating incoming transfer bundles.
//!
//! Every OS entry point (launch argument, open-file/open-URL event, re-delivery
//! to a running instance) produces an [`IncomingFile`]. This module turns it into
//! the bundle's UTF-8 text or a [`TransferError`], never reading more than the
//! payload cap plus one byte.

use std::ffi::OsStr;
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use url::Url;

use super::{TransferError, MAX_TRANSFER_PAYLOAD_BYTES};
use crate::utils::file_detection::{is_transfer_bundle, url_names_transfer_bundle};

/// How the OS named the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferReference {
    Path(PathBuf),
    Url(Url),
}

impl TransferReference {
    /// Interprets a raw launch argument. `file://` URLs are kept as URLs,
    /// anything else is treated as a filesystem path.
    pub fn from_launch_argument(arg: &OsStr) -> Self {
        if let Some(text) = arg.to_str() {
            if let Ok(url) = Url::parse(text) {
                if url.scheme() == "file" {
                    return TransferReference::Url(url);
                }
            }
        }
        TransferReference::Path(PathBuf::from(arg))
    }

    /// Applies the acceptance predicate: the resource must be named `*.monkeysshx`.
    pub fn names_transfer_bundle(&self) -> bool {
        match self {
            TransferReference::Path(path) => is_transfer_bundle(path),
            // Judge the decoded path that will actually be read.
            TransferReference::Url(url) if url.scheme() == "file" => url
                .to_file_path()
                .is_ok_and(|path| is_transfer_bundle(&path)),
            TransferReference::Url(url) => url_names_transfer_bundle(url.path()),
        }
    }

    /// Resolves the reference to a readable local path.
    pub fn to_local_path(&self) -> Result<PathBuf, TransferError> {
        match self {
            TransferReference::Path(path) => Ok(path.clone()),
            TransferReference::Url(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| TransferError::UnsupportedResource(url.to_string())),
            TransferReference::Url(url) => Err(TransferError::UnsupportedResource(url.to_string())),
        }
    }
}

impl std::fmt::Display for TransferReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferReference::Path(path) => write!(f, "{}", path.display()),
            TransferReference::Url(url) => write!(f, "{}", url),
        }
    }
}

/// An OS-delivered "open this" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub reference: TransferReference,
    /// MIME/type hint from the OS, when it supplied one. Informational only;
    /// `tao`'s open events and launch arguments never carry one, so desktop
    /// entry points leave it `None`.
    pub type_hint: Option<String>,
}

impl IncomingFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            reference: TransferReference::Path(path.into()),
            type_hint: None,
        }
    }

    pub fn from_url(url: Url) -> Self {
        Self {
            reference: TransferReference::Url(url),
            type_hint: None,
        }
    }

    pub fn with_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    /// Checks the acceptance predicate, resolves the reference and reads the
    /// bundle text.
    pub fn read_payload(&self) -> Result<String, TransferError> {
        if !self.reference.names_transfer_bundle() {
            return Err(TransferError::UnsupportedResource(self.reference.to_string()));
        }
        let path = self.reference.to_local_path()?;
        read_transfer_payload(&path)
    }
}

/// Reads a transfer bundle from disk, capped at [`MAX_TRANSFER_PAYLOAD_BYTES`].
///
/// Size metadata is consulted first and short-circuits the read when it is
/// already over the cap. The read itself is bounded independently, since
/// metadata can be missing or stale.
///
/// Only regular files are opened. Opening a FIFO or a device blocks until a
/// writer shows up, which would stall the event loop.
pub fn read_transfer_payload(path: &Path) -> Result<String, TransferError> {
    let unreadable = |e: io::Error| TransferError::UnreadableResource(e, path.to_path_buf());

    let metadata = fs::metadata(path).map_err(unreadable)?;
    ensure_regular_file(&metadata).map_err(unreadable)?;

    let file = File::open(path).map_err(unreadable)?;
    // The path may have been swapped between the check and the open.
    let metadata = file.metadata().map_err(unreadable)?;
    ensure_regular_file(&metadata).map_err(unreadable)?;

    read_bounded(file, Some(metadata.len()), MAX_TRANSFER_PAYLOAD_BYTES, path)
}

fn ensure_regular_file(metadata: &Metadata) -> io::Result<()> {
    if metadata.is_file() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ))
    }
}

fn read_bounded<R: Read>(
    reader: R,
    declared_len: Option<u64>,
    limit: u64,
    origin: &Path,
) -> Result<String, TransferError> {
    if let Some(len) = declared_len {
        if len > limit {
            return Err(TransferError::OversizeResource {
                path: origin.to_path_buf(),
                limit,
                observed: len,
            });
        }
    }

    // Never allocate past the cap, even when metadata is wrong.
    let capacity = declared_len.unwrap_or(0).min(limit) as usize;
    let mut buffer = Vec::with_capacity(capacity);
    reader
        .take(limit + 1)
        .read_to_end(&mut buffer)
        .map_err(|e| TransferError::UnreadableResource(e, origin.to_path_buf()))?;

    if buffer.len() as u64 > limit {
        return Err(TransferError::OversizeResource {
            path: origin.to_path_buf(),
            limit,
            observed: buffer.len() as u64,
        });
    }

    String::from_utf8(buffer).map_err(|e| TransferError::UndecodableResource {
        path: origin.to_path_buf(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })
}
