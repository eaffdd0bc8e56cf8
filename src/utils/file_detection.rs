use std::path::Path;

use crate::core::TRANSFER_EXTENSION;

/// Returns `true` if the path names a transfer bundle (`*.monkeysshx`, any casing).
pub fn is_transfer_bundle(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TRANSFER_EXTENSION))
}

/// Same check for a URL path component, where only the last segment matters.
pub fn url_names_transfer_bundle(url_path: &str) -> bool {
    url_path
        .rsplit('/')
        .next()
        .is_some_and(|segment| is_transfer_bundle(Path::new(segment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_matches_any_casing() {
        assert!(is_transfer_bundle(Path::new("session.monkeysshx")));
        assert!(is_transfer_bundle(Path::new("/tmp/Session.MONKEYSSHX")));
        assert!(is_transfer_bundle(Path::new("a.b.MonkeySSHx")));
    }

    #[test]
    fn test_other_names_are_rejected() {
        assert!(!is_transfer_bundle(Path::new("notes.txt")));
        assert!(!is_transfer_bundle(Path::new("monkeysshx")));
        assert!(!is_transfer_bundle(Path::new("session.monkeysshx.bak")));
        assert!(!is_transfer_bundle(Path::new(".monkeysshx.json")));
    }

    #[test]
    fn test_url_path_uses_last_segment() {
        assert!(url_names_transfer_bundle("/Users/me/Downloads/host.monkeysshx"));
        assert!(!url_names_transfer_bundle("/dir.monkeysshx/file.txt"));
        assert!(!url_names_transfer_bundle("/"));
    }
}
