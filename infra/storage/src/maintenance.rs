use crate::engine::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up interrupted catalog writes");
        },
        Err(e) => {
            error!(error = %e, "Temp file cleanup task panicked");
        },
        _ => {},
    }
}

/// Removes stale temp files. Unlike a general purge, empty directories are left
/// alone: an empty `assets/` is still part of a catalog layout.
fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    for entry in WalkDir::new(root).into_iter().flatten().filter(|e| is_tmp(e)) {
        if !is_stale(&entry, now, threshold) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove temp file");
                failed += 1;
            },
        }
    }

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stale_temp_files_are_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let keep = tmp.path().join("index.html");
        let stale = tmp.path().join(format!("config.json{TMP_MARKER}1.1"));
        std::fs::write(&keep, b"<html/>").unwrap();
        std::fs::write(&stale, b"{").unwrap();
        std::fs::create_dir(tmp.path().join("assets")).unwrap();

        let later = SystemTime::now() + Duration::from_secs(3600);
        let (removed, failed) = remove_stale(tmp.path(), later, STALE_AFTER);

        assert_eq!((removed, failed), (1, 0));
        assert!(keep.exists());
        assert!(!stale.exists());
        assert!(tmp.path().join("assets").is_dir(), "empty directories must survive");
    }

    #[test]
    fn fresh_temp_files_are_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let fresh = tmp.path().join(format!("node.json{TMP_MARKER}7.3"));
        std::fs::write(&fresh, b"{").unwrap();

        let (removed, _) = remove_stale(tmp.path(), SystemTime::now(), STALE_AFTER);
        assert_eq!(removed, 0);
        assert!(fresh.exists());
    }
}
