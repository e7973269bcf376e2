use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::domain::TransferError;
use crate::utils::{sanitize_filename, FALLBACK_FILENAME};

/// Local "save to disk" primitive for a finished blob.
#[async_trait]
pub trait BlobSink: Send + Sync {
    async fn save(&self, filename: &str, blob: Bytes) -> Result<PathBuf, TransferError>;
}

/// Saves straight into a download directory without asking.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl BlobSink for DirectorySink {
    async fn save(&self, filename: &str, blob: Bytes) -> Result<PathBuf, TransferError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| TransferError::Save(format!("Failed to create directory: {}", e)))?;

        let filename = match sanitize_filename(filename) {
            name if name.is_empty() => FALLBACK_FILENAME.to_string(),
            name => name,
        };
        let mut partial = write_partial(&self.dir, &blob).await?;

        for attempt in 0u32.. {
            let path = self.dir.join(numbered_name(&filename, attempt));
            match partial.persist_noclobber(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), bytes = blob.len(), "blob saved");
                    return Ok(path);
                }
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => partial = e.path,
                Err(e) => {
                    return Err(TransferError::Save(format!(
                        "Failed to create file: {}",
                        e.error
                    )))
                }
            }
        }

        Err(TransferError::Save("No free file name left".to_string()))
    }
}

/// Asks the user where to save through the platform dialog.
///
/// The dialog runs as its own task. If the transfer is cancelled while the
/// dialog is on screen, the dialog stays up until the user closes it and
/// whatever path they pick receives nothing.
#[derive(Debug, Clone, Default)]
pub struct DialogSink;

#[async_trait]
impl BlobSink for DialogSink {
    async fn save(&self, filename: &str, blob: Bytes) -> Result<PathBuf, TransferError> {
        let dialog = rfd::AsyncFileDialog::new()
            .set_file_name(filename)
            .save_file();
        let handle = tokio::spawn(dialog)
            .await
            .map_err(|e| TransferError::Unexpected(format!("Save dialog failed: {}", e)))?;
        // Dismissing the dialog is a cancellation, not a failure.
        let path = handle
            .map(|handle| handle.path().to_path_buf())
            .ok_or(TransferError::Aborted)?;

        // The dialog already asked about replacing an existing file.
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let partial = write_partial(dir, &blob).await?;
        partial
            .persist(&path)
            .map_err(|e| TransferError::Save(format!("Failed to create file: {}", e.error)))?;

        Ok(path)
    }
}

/// Writes `blob` to a hidden temporary file in `dir`. The file is removed
/// when the returned path is dropped without being persisted, so a dropped
/// or failed save leaves nothing behind.
async fn write_partial(dir: &Path, blob: &[u8]) -> Result<TempPath, TransferError> {
    let (file, partial) = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| TransferError::Save(format!("Failed to create file: {}", e)))?
        .into_parts();

    let mut file = tokio::fs::File::from_std(file);
    file.write_all(blob)
        .await
        .map_err(|e| TransferError::Save(format!("Write error: {}", e)))?;
    file.sync_all()
        .await
        .map_err(|e| TransferError::Save(format!("Failed to sync file: {}", e)))?;

    Ok(partial)
}

/// `name.ext`, `name (1).ext`, `name (2).ext`, ...
fn numbered_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }

    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
        None => format!("{} ({})", stem, attempt),
    }
}
