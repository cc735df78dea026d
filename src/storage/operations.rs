//! Storage operations
//!
//! The file operation engine: read, overwrite, append, delete, copy and move
//! on paths relative to the storage root.
//!
//! There is no coordination between requests. Two operations on the same path
//! may interleave arbitrarily; each filesystem primitive is as atomic as the
//! host makes it and nothing more. Check-then-act windows are kept small by
//! preferring primitives that check and act in one call (append without
//! create, `remove_file`, exclusive-create for copy/move destinations).

use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::StorageError;
use crate::error::handlers::log_storage_error;
use crate::storage::naming;
use crate::storage::results::{FailureKind, OperationRequest, OperationResult};
use crate::storage::validation::StorageRoot;

/// Executes file operations confined to one storage root.
///
/// Holds no per-request state; clones share the same root.
#[derive(Debug, Clone)]
pub struct FileEngine {
    root: Arc<StorageRoot>,
}

impl FileEngine {
    pub fn new(root: StorageRoot) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    /// Reads a whole file as text. Invalid UTF-8 is replaced, not rejected.
    pub async fn read(&self, path: &str) -> Result<String, StorageError> {
        let full = self.root.resolve_file(path)?;
        let rel = self.root.relative_display(&full);

        let bytes = fs::read(&full)
            .await
            .map_err(|e| StorageError::from_io(rel.clone(), e))?;

        info!("Read {} ({} bytes)", rel, bytes.len());
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Replaces the file's content, creating it and any missing parent
    /// directories.
    ///
    /// Directories created here are kept even if the write itself fails.
    pub async fn overwrite(&self, path: &str, data: &str) -> Result<(), StorageError> {
        let full = self.root.resolve_file(path)?;
        let rel = self.root.relative_display(&full);

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::from_io(rel.clone(), e))?;
        }

        fs::write(&full, data)
            .await
            .map_err(|e| StorageError::from_io(rel.clone(), e))?;

        info!("Overwrote {} ({} bytes)", rel, data.len());
        Ok(())
    }

    /// Appends to an existing file. A missing file is not created.
    pub async fn append(&self, path: &str, data: &str) -> Result<(), StorageError> {
        let full = self.root.resolve_file(path)?;
        let rel = self.root.relative_display(&full);

        let mut file = OpenOptions::new()
            .append(true)
            .open(&full)
            .await
            .map_err(|e| StorageError::from_io(rel.clone(), e))?;

        file.write_all(data.as_bytes())
            .await
            .map_err(|e| StorageError::from_io(rel.clone(), e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::from_io(rel.clone(), e))?;

        info!("Appended {} bytes to {}", data.len(), rel);
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full = self.root.resolve_file(path)?;
        let rel = self.root.relative_display(&full);

        fs::remove_file(&full)
            .await
            .map_err(|e| StorageError::from_io(rel.clone(), e))?;

        info!("Deleted {}", rel);
        Ok(())
    }

    /// Copies `path` into the `destination` directory under its own name.
    ///
    /// An existing file at the destination is left alone and the copy gets a
    /// disambiguated name. Returns the path actually written.
    pub async fn copy(&self, path: &str, destination: &str) -> Result<PathBuf, StorageError> {
        let (source, wanted) = self.prepare_transfer(path, destination).await?;
        let rel = self.root.relative_display(&source);

        let (final_path, mut target) = naming::reserve(&wanted)
            .await
            .map_err(|e| StorageError::from_io(self.root.relative_display(&wanted), e))?;

        if let Err(e) = duplicate(&source, &mut target).await {
            drop(target);
            discard(&final_path).await;
            return Err(StorageError::from_io(rel, e));
        }

        info!(
            "Copied {} to {}",
            rel,
            self.root.relative_display(&final_path)
        );
        Ok(final_path)
    }

    /// Moves `path` into the `destination` directory under its own name.
    ///
    /// Collisions are handled as for [`copy`](Self::copy). The destination
    /// name is claimed first, then the source is renamed onto that claim.
    pub async fn move_file(
        &self,
        path: &str,
        destination: &str,
    ) -> Result<PathBuf, StorageError> {
        let (source, wanted) = self.prepare_transfer(path, destination).await?;
        let rel = self.root.relative_display(&source);

        let (final_path, placeholder) = naming::reserve(&wanted)
            .await
            .map_err(|e| StorageError::from_io(self.root.relative_display(&wanted), e))?;
        drop(placeholder);

        if let Err(e) = fs::rename(&source, &final_path).await {
            discard(&final_path).await;
            return Err(StorageError::from_io(rel, e));
        }

        info!(
            "Moved {} to {}",
            rel,
            self.root.relative_display(&final_path)
        );
        Ok(final_path)
    }

    /// Runs one request and renders its outcome for the caller.
    ///
    /// Raw OS error text is logged, never returned.
    pub async fn execute(&self, request: OperationRequest) -> OperationResult {
        let operation = request.name();

        match request {
            OperationRequest::Read { path } => match self.read(&path).await {
                Ok(content) => OperationResult::Success {
                    message: "File read".into(),
                    body: Some(content),
                },
                Err(e) => failure(operation, &e, "File not found", "Error reading file"),
            },
            OperationRequest::Overwrite { path, data } => {
                match self.overwrite(&path, &data).await {
                    Ok(()) => OperationResult::success("File updated"),
                    Err(e) => failure(operation, &e, "File not found", "Error updating file"),
                }
            }
            OperationRequest::Append { path, data } => match self.append(&path, &data).await {
                Ok(()) => OperationResult::success("Data appended to file"),
                Err(e) => failure(
                    operation,
                    &e,
                    "File not found",
                    "Error appending data to file",
                ),
            },
            OperationRequest::Delete { path } => match self.delete(&path).await {
                Ok(()) => OperationResult::success("File deleted"),
                Err(e) => failure(operation, &e, "File not found", "Error deleting file"),
            },
            OperationRequest::Copy { path, destination } => {
                match self.copy(&path, &destination).await {
                    Ok(_) => OperationResult::success("File copied"),
                    Err(e) => failure(operation, &e, "Source file not found", "Error copying file"),
                }
            }
            OperationRequest::Move { path, destination } => {
                match self.move_file(&path, &destination).await {
                    Ok(_) => OperationResult::success("File moved"),
                    Err(e) => failure(operation, &e, "Source file not found", "Error moving file"),
                }
            }
        }
    }

    /// Shared front half of copy and move.
    ///
    /// Resolves both paths, confirms the source is a regular file, then
    /// creates the destination directory. Returns the source and the wanted
    /// destination file path.
    async fn prepare_transfer(
        &self,
        path: &str,
        destination: &str,
    ) -> Result<(PathBuf, PathBuf), StorageError> {
        let source = self.root.resolve_file(path)?;
        let dest_dir = self.root.resolve(destination)?;
        let rel = self.root.relative_display(&source);

        let file_name = source
            .file_name()
            .ok_or_else(|| StorageError::InvalidPath(path.into()))?
            .to_os_string();

        let metadata = fs::metadata(&source)
            .await
            .map_err(|e| StorageError::from_io(rel.clone(), e))?;
        if !metadata.is_file() {
            return Err(StorageError::Io {
                path: rel,
                source: io::Error::other("source is not a regular file"),
            });
        }

        fs::create_dir_all(&dest_dir)
            .await
            .map_err(|e| StorageError::from_io(self.root.relative_display(&dest_dir), e))?;

        Ok((source, dest_dir.join(file_name)))
    }
}

async fn duplicate(source: &Path, target: &mut File) -> io::Result<u64> {
    let mut reader = File::open(source).await?;
    let copied = tokio::io::copy(&mut reader, target).await?;
    target.flush().await?;
    Ok(copied)
}

/// Best-effort removal of a destination claimed by a failed copy or move.
async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!("Failed to remove unused destination {}: {}", path.display(), e);
    }
}

fn failure(
    operation: &str,
    err: &StorageError,
    not_found: &str,
    internal: &str,
) -> OperationResult {
    log_storage_error(operation, err);

    let kind = err.kind();
    let message = match kind {
        FailureKind::InvalidPath => "Invalid path",
        FailureKind::NotFound => not_found,
        FailureKind::Internal => internal,
    };
    OperationResult::failure(kind, message)
}
