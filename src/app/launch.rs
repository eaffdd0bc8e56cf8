//! Turns OS open requests into [`IncomingFile`]s.
//!
//! Cold-start arguments and runtime open events take different shapes but
//! end up in the same intake path.

use std::ffi::OsString;

use url::Url;

use crate::core::{IncomingFile, TransferReference};

/// Collects candidate files from the process arguments (program name excluded).
///
/// Flags are skipped, including the `-psn_*` process serial number macOS
/// passes to apps launched from Finder.
pub fn incoming_files_from_args<I>(args: I) -> Vec<IncomingFile>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .filter(|arg| !arg.to_string_lossy().starts_with('-'))
        .map(|arg| IncomingFile {
            reference: TransferReference::from_launch_argument(&arg),
            type_hint: None,
        })
        .collect()
}

/// Wraps URLs delivered by an open-file/open-URL event.
pub fn incoming_files_from_urls(urls: Vec<Url>) -> Vec<IncomingFile> {
    urls.into_iter().map(IncomingFile::from_url).collect()
}
