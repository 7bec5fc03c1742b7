use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use super::FetchedPage;
use crate::error::{Result, ScrapeError};

/// Write the raw page HTML to `dest` so a failed parse can be inspected later.
/// Parent directories are created as needed.
pub async fn save_snapshot(page: &FetchedPage, dest: impl AsRef<Path>) -> Result<PathBuf> {
    let dest = dest.as_ref();
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ScrapeError::io("creating", parent, e))?;
    }
    fs::write(dest, page.body.as_bytes())
        .await
        .map_err(|e| ScrapeError::io("writing", dest, e))?;
    info!(path = %dest.display(), bytes = page.body.len(), "saved page snapshot");
    Ok(dest.to_path_buf())
}
