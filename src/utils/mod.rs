pub mod http;

use std::{io::ErrorKind, path::Path};

/// Deletes a scratch file. A file that is already gone is not an error.
pub async fn remove_file_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Deletes `dir` only if nothing is left in it; another download may still be writing there.
pub async fn remove_dir_if_empty(dir: &Path) {
    let is_empty = match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(None)),
        Err(_) => return,
    };

    if is_empty {
        if let Err(e) = tokio::fs::remove_dir(dir).await {
            debug!("Kept {}: {}", dir.display(), e);
        }
    }
}
