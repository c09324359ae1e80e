//! Clipboard and file collaborators used by query sessions.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Error, Result};

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_clipboard(&self, text: String) -> Result<()>;
}

#[async_trait]
pub trait FileSaver: Send + Sync {
    async fn save_to_file(&self, path: &Path, text: String) -> Result<()>;
}

/// Saves query files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileSaver;

#[async_trait]
impl FileSaver for FsFileSaver {
    async fn save_to_file(&self, path: &Path, text: String) -> Result<()> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            crate::state::config::atomic_write(&path, text.as_bytes())
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;
        Ok(())
    }
}
