//! Disk staging for large payloads.
//!
//! A [`StagingFile`] lives inside a shared scratch directory for exactly one
//! upload attempt. It is removed explicitly once the attempt finishes and, as a
//! backstop, when dropped (task cancellation, panic, early return).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::UploadError;

const MAX_STAGED_NAME_LEN: usize = 96;

/// Scratch directory shared by concurrent uploads
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Create the scratch directory if it does not exist yet
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| UploadError::staging("directory creation", e))?;
        Ok(StagingArea { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `payload` to a fresh staging file
    ///
    /// Names combine a millisecond timestamp, a random suffix and the sanitized
    /// original filename. The file is opened with `create_new`, so a clash fails
    /// instead of overwriting another upload's data.
    pub async fn stage(&self, payload: &[u8], filename: &str) -> Result<StagingFile, UploadError> {
        let name = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..8],
            sanitize_filename(filename)
        );
        let path = self.dir.join(name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| UploadError::staging("create", e))?;

        // From here on the guard owns the path, so partial writes are cleaned up.
        let mut staged = StagingFile {
            path,
            size: 0,
            removed: false,
        };

        file.write_all(payload)
            .await
            .map_err(|e| UploadError::staging("write", e))?;
        file.sync_all()
            .await
            .map_err(|e| UploadError::staging("sync", e))?;
        drop(file);

        staged.size = fs::metadata(&staged.path)
            .await
            .map_err(|e| UploadError::staging("metadata", e))?
            .len();

        tracing::debug!(
            path = %staged.path.display(),
            size_bytes = staged.size,
            "Payload staged to disk"
        );

        Ok(staged)
    }
}

/// Temporary on-disk copy of one payload
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    size: u64,
    removed: bool,
}

impl StagingFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte count on disk
    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn open(&self) -> Result<File, UploadError> {
        File::open(&self.path)
            .await
            .map_err(|e| UploadError::staging("open", e))
    }

    /// Delete the file; a file that is already gone counts as removed
    pub async fn remove(mut self) -> std::io::Result<()> {
        self.removed = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove staging file on drop"
                );
            }
        }
    }
}

/// Reduce a client-supplied filename to a safe single path component
fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STAGED_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn entry_count(dir: &Path) -> usize {
        let mut entries = fs::read_dir(dir).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("clip.mov"), "clip.mov");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\videos\\my show.mp4"), "my_show.mp4");
        assert_eq!(sanitize_filename(".."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename(&"a".repeat(300)).len(), MAX_STAGED_NAME_LEN);
    }

    #[tokio::test]
    async fn test_stage_writes_payload_and_remove_deletes_it() {
        let dir = tempdir().unwrap();
        let area = StagingArea::new(dir.path().join("scratch")).await.unwrap();

        let staged = area.stage(b"concert footage", "show.mp4").await.unwrap();
        assert_eq!(staged.size(), 15);
        assert!(staged.path().starts_with(area.dir()));
        assert!(staged
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("-show.mp4"));
        assert_eq!(fs::read(staged.path()).await.unwrap(), b"concert footage");

        staged.remove().await.unwrap();
        assert_eq!(entry_count(area.dir()).await, 0);
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = tempdir().unwrap();
        let area = StagingArea::new(dir.path()).await.unwrap();

        let staged = area.stage(b"abc", "a.txt").await.unwrap();
        let path = staged.path().to_path_buf();
        drop(staged);

        assert!(!path.exists());
        assert_eq!(entry_count(area.dir()).await, 0);
    }

    #[tokio::test]
    async fn test_identical_names_do_not_collide() {
        let dir = tempdir().unwrap();
        let area = StagingArea::new(dir.path()).await.unwrap();

        let first = area.stage(b"one", "same.mov").await.unwrap();
        let second = area.stage(b"two", "same.mov").await.unwrap();
        assert_ne!(first.path(), second.path());
        assert_eq!(entry_count(area.dir()).await, 2);
    }
}
