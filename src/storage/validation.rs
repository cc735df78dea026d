//! Path validation
//!
//! Confines caller-supplied relative paths to the storage root.

use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// The sandbox directory every file operation is confined to.
///
/// Always absolute. Resolution against it is purely lexical: `..` segments
/// are collapsed and the result must still lie under the root. Symlinks are
/// not followed, so a link planted inside the root can still point elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    path: PathBuf,
}

impl StorageRoot {
    /// Wrap an existing absolute directory path.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(StorageError::InvalidPath(format!(
                "storage root must be absolute: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: normalize(&path),
        })
    }

    /// Create the root directory if needed and canonicalize it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| StorageError::from_io(display.clone(), e))?;
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| StorageError::from_io(display, e))?;

        Self::new(canonical)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Join `relative` onto the root and verify the result stays inside it.
    ///
    /// Leading separators are ignored, so `/a/b` names `a/b` under the root.
    /// The root itself is a valid result.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        if relative.contains('\0') {
            return Err(StorageError::InvalidPath(relative.into()));
        }

        let mut resolved = self.path.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::CurDir | Component::RootDir => {}
                Component::Prefix(_) => {
                    return Err(StorageError::InvalidPath(relative.into()));
                }
            }
        }

        // Component-wise, so `/data` does not admit `/data-other`.
        if !resolved.starts_with(&self.path) {
            return Err(StorageError::InvalidPath(relative.into()));
        }

        Ok(resolved)
    }

    /// Like [`resolve`](Self::resolve), but the result must name an entry
    /// below the root rather than the root itself.
    pub fn resolve_file(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let resolved = self.resolve(relative)?;
        if resolved == self.path {
            return Err(StorageError::InvalidPath(relative.into()));
        }
        Ok(resolved)
    }

    /// Render a resolved path relative to the root, for logs and messages.
    pub fn relative_display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.path) {
            Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
            Ok(rel) => rel.display().to_string(),
            Err(_) => "<outside storage root>".to_string(),
        }
    }
}

/// Lexically collapse `.` and `..` in an absolute path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
