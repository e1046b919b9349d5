//! Spooling of uploaded spreadsheets to local disk.
//!
//! An upload lives only for the duration of one import. [`TempUpload`] owns
//! the file and removes it when dropped, so every exit path cleans up.

mod error;

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::warn;

pub use error::UploadError;

use crate::file_kind::extension;

/// Longest stem kept in a stored file name, in characters.
pub const MAX_STEM_LEN: usize = 100;

/// Default upload size cap: 5 MB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Timestamps tried before giving up on a free stored name.
const MAX_NAME_ATTEMPTS: i64 = 1000;

/// Directory-backed store for in-flight uploads.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_size: u64,
}

impl UploadStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub async fn new(dir: impl Into<PathBuf>, max_size: u64) -> Result<Self, UploadError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir, max_size })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Copy `reader` to a new file named after `original_name`.
    ///
    /// Fails with [`UploadError::TooLarge`] as soon as more than `max_size`
    /// bytes have been read; the partial file is removed.
    pub async fn save<R>(&self, original_name: &str, mut reader: R) -> Result<TempUpload, UploadError>
    where
        R: AsyncRead + Unpin,
    {
        let (upload, mut file) = self
            .create_unique(original_name, chrono::Utc::now().timestamp_millis())
            .await?;

        let mut buf = vec![0u8; 64 * 1024];
        let mut total: u64 = 0;
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            total += n as u64;
            if total > self.max_size {
                // `upload` is dropped here and takes the partial file with it.
                return Err(UploadError::TooLarge {
                    limit: self.max_size,
                });
            }
            file.write_all(&buf[..n]).await?;
        }
        file.flush().await?;

        Ok(upload)
    }

    /// Open a fresh file for `original_name`, moving the timestamp forward
    /// past names already taken by concurrent uploads.
    async fn create_unique(
        &self,
        original_name: &str,
        unix_millis: i64,
    ) -> Result<(TempUpload, fs::File), UploadError> {
        for offset in 0..MAX_NAME_ATTEMPTS {
            let stored_name = stored_file_name(original_name, unix_millis + offset);
            let path = self.dir.join(&stored_name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                // Only a file we created is ours to remove.
                Ok(file) => return Ok((TempUpload::from_path(path, stored_name), file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free upload name for {original_name:?}"),
        )
        .into())
    }
}

/// `"{unix_millis}-{stem}{ext}"`, with the stem reduced to
/// `[A-Za-z0-9_-]` and the extension lowercased.
pub fn stored_file_name(original_name: &str, unix_millis: i64) -> String {
    let base = Path::new(original_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let ext = extension(base).unwrap_or_default();
    let stem = &base[..base.len() - ext.len()];

    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();

    format!("{unix_millis}-{stem}{ext}")
}

/// A spooled upload that is deleted when dropped.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    stored_name: String,
    removed: bool,
}

impl TempUpload {
    /// Take ownership of an existing file.
    pub fn from_path(path: impl Into<PathBuf>, stored_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            stored_name: stored_name.into(),
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stored_name(&self) -> &str {
        &self.stored_name
    }

    /// Remove the file now. A file that is already gone is not an error.
    pub async fn cleanup(mut self) {
        self.removed = true;
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove upload"),
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != io::ErrorKind::NotFound
        {
            warn!(path = %self.path.display(), error = %e, "Failed to remove upload");
        }
    }
}
