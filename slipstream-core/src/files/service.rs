//! Filesystem access rooted at the download directory.

use std::io::SeekFrom;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, stream};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::{EntryKind, FileError, FileInfo, FsEntry};

/// Serves file metadata, listings, and lazy byte streams.
///
/// Every request path resolves strictly under the download root; paths
/// that would escape it (absolute paths, `..` components) are treated as
/// nonexistent.
#[derive(Debug, Clone)]
pub struct FileService {
    root: PathBuf,
    chunk_size: usize,
}

impl FileService {
    pub fn new(root: PathBuf, chunk_size: usize) -> Self {
        Self { root, chunk_size }
    }

    /// Resolves a client-supplied relative path under the root.
    ///
    /// # Errors
    /// - `FileError::NotFound` - Path would escape the download root
    fn resolve(&self, relative: &str) -> Result<PathBuf, FileError> {
        let candidate = Path::new(relative);
        let escapes = candidate.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if escapes {
            return Err(FileError::NotFound {
                path: PathBuf::from(relative),
            });
        }
        Ok(self.root.join(candidate))
    }

    /// Lists a user's download tree.
    ///
    /// A nonexistent user directory yields an empty list - the user simply
    /// has no downloads yet.
    ///
    /// # Errors
    /// - `FileError::Io` - Directory exists but could not be read
    pub async fn list_user_files(&self, username: &str) -> Result<Vec<FsEntry>, FileError> {
        let user_dir = self.resolve(username)?;
        if !user_dir.is_dir() {
            tracing::debug!("No download directory for user {username}");
            return Ok(Vec::new());
        }
        self.scan_directory(user_dir).await
    }

    /// Recursively scans a directory into an entry tree.
    fn scan_directory(
        &self,
        dir: PathBuf,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<Vec<FsEntry>, FileError>> + Send + '_>> {
        Box::pin(async move {
            let mut entries = Vec::new();
            let mut reader = tokio::fs::read_dir(&dir).await?;

            while let Some(entry) = reader.next_entry().await? {
                let path = entry.path();
                let metadata = entry.metadata().await?;
                let name = entry.file_name().to_string_lossy().into_owned();
                let relative = path
                    .strip_prefix(&self.root)
                    .unwrap_or(&path)
                    .to_path_buf();

                if metadata.is_dir() {
                    let children = self.scan_directory(path).await?;
                    entries.push(FsEntry {
                        name,
                        kind: EntryKind::Directory,
                        size: metadata.len(),
                        path: relative,
                        mime_type: None,
                        children: Some(children),
                    });
                } else {
                    entries.push(FsEntry {
                        name,
                        kind: EntryKind::File,
                        size: metadata.len(),
                        path: relative,
                        mime_type: Some(mime_for(&path)),
                        children: None,
                    });
                }
            }

            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
    }

    /// Metadata for one file on the serving path.
    ///
    /// # Errors
    /// - `FileError::NotFound` - Missing path or not a regular file
    /// - `FileError::Io` - Other filesystem failure
    pub async fn file_info(&self, relative: &str) -> Result<FileInfo, FileError> {
        let path = self.resolve(relative)?;
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FileError::NotFound { path: path.clone() }
            } else {
                FileError::Io(e)
            }
        })?;

        if !metadata.is_file() {
            return Err(FileError::NotFound { path });
        }

        Ok(FileInfo {
            mime_type: mime_for(&path),
            size: metadata.len(),
        })
    }

    /// Opens a lazy byte stream over `[start, start + length)` of a file.
    ///
    /// Chunks are read on demand so the file is never buffered whole; the
    /// underlying handle is released when the stream is dropped, including
    /// on client disconnect.
    ///
    /// # Errors
    /// - `FileError::NotFound` - Missing path
    /// - `FileError::Io` - Open or seek failure
    pub async fn open_stream(
        &self,
        relative: &str,
        start: u64,
        length: u64,
    ) -> Result<impl Stream<Item = std::io::Result<Bytes>> + Send + 'static, FileError> {
        let path = self.resolve(relative)?;
        let mut file = File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FileError::NotFound { path: path.clone() }
            } else {
                FileError::Io(e)
            }
        })?;

        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }

        let chunk_size = self.chunk_size;
        Ok(stream::unfold(
            (file, length),
            move |(mut file, remaining)| async move {
                if remaining == 0 {
                    return None;
                }

                let cap = chunk_size.min(usize::try_from(remaining).unwrap_or(chunk_size));
                let mut buf = vec![0u8; cap];
                match file.read(&mut buf).await {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        Some((Ok(Bytes::from(buf)), (file, remaining - n as u64)))
                    }
                    Err(e) => Some((Err(e), (file, 0))),
                }
            },
        ))
    }
}

fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
