//! Walks the video root on a blocking thread and streams matching files.

use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScannedVideo {
    /// Canonical absolute path. Always valid UTF-8 so it can key the store.
    pub filepath: String,
    /// Base name as found on disk.
    pub filename: String,
}

/// Starts the walker. Matching files arrive on the receiver; the handle
/// resolves to the number of entries skipped because of traversal errors.
pub fn spawn_walker(
    root: PathBuf,
    extensions: Vec<String>,
) -> (mpsc::Receiver<ScannedVideo>, JoinHandle<u64>) {
    let (tx, rx) = mpsc::channel(100);

    let handle = task::spawn_blocking(move || {
        let mut skipped = 0u64;
        for entry in WalkDir::new(&root) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    skipped += 1;
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() || !has_video_extension(path, &extensions) {
                continue;
            }

            // Follows symlinks, so a dangling link surfaces here.
            let meta = match fs::metadata(path) {
                Ok(m) => m,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping entry");
                    skipped += 1;
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }

            let canonical = match fs::canonicalize(path) {
                Ok(p) => p,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "cannot resolve path");
                    skipped += 1;
                    continue;
                }
            };
            // A lossy conversion would fold distinct names onto one key.
            let filepath = match canonical.into_os_string().into_string() {
                Ok(s) => s,
                Err(raw) => {
                    warn!(path = %Path::new(&raw).display(), "skipping non UTF-8 path");
                    skipped += 1;
                    continue;
                }
            };
            let filename = entry.file_name().to_string_lossy().into_owned();

            if tx
                .blocking_send(ScannedVideo {
                    filepath,
                    filename,
                })
                .is_err()
            {
                // Receiver dropped, stop walking.
                break;
            }
        }
        skipped
    });

    (rx, handle)
}

/// Case-insensitive match of the file extension against `extensions`
/// (lowercase, no leading dot).
pub fn has_video_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            extensions.iter().any(|x| *x == e)
        })
        .unwrap_or(false)
}
