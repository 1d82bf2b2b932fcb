//! File access abstraction for lockfile reading
//!
//! The reader never touches the filesystem directly. It goes through the
//! `Runtime` trait so embedders can serve lockfiles from memory, archives,
//! or a virtual filesystem.
//!
//! ```text
//! LockfileReader
//!   ┌─────────────────┐
//!   │ .is_readable()  │────▶ NativeRuntime ──▶ std::fs
//!   │ .metadata()     │
//!   │ .read_file()    │────▶ MemoryRuntime ──▶ HashMap<PathBuf, Vec<u8>>
//!   └─────────────────┘
//! ```

// NativeRuntime is the only std::fs caller in the crate
#![allow(clippy::disallowed_methods)]

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// File metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
}

/// Synchronous file access used by [`LockfileReader`](crate::LockfileReader).
///
/// Lockfiles are small local documents, so every method blocks until done.
pub trait Runtime: std::fmt::Debug {
    /// Read a file's full contents
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Get file metadata
    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Check that a path names an existing file the runtime can open
    fn is_readable(&self, path: &Path) -> bool;
}

impl<R: Runtime + ?Sized> Runtime for &R {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        (**self).read_file(path)
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        (**self).metadata(path)
    }

    fn is_readable(&self, path: &Path) -> bool {
        (**self).is_readable(path)
    }
}

/// Native filesystem Runtime implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Runtime for NativeRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(format!("Failed to read {}: {}", path.display(), e))
            }
        })
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(format!(
                    "Failed to get metadata for {}: {}",
                    path.display(),
                    e
                ))
            }
        })?;

        Ok(FileMetadata {
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
        })
    }

    /// A path is readable when it is a regular file that opens.
    fn is_readable(&self, path: &Path) -> bool {
        path.is_file() && File::open(path).is_ok()
    }
}

/// In-memory runtime keyed by path.
///
/// Useful for tests and for embedders that already hold the lockfile bytes.
///
/// ```
/// use composer_lock::{LockfileReader, MemoryRuntime};
///
/// let runtime = MemoryRuntime::new().with_file("composer.lock", r#"{"content-hash": "abc"}"#);
/// let reader = LockfileReader::with_runtime("composer.lock", runtime);
/// assert_eq!(reader.hash().unwrap(), Some("abc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRuntime {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn remove(&mut self, path: &Path) -> Option<Vec<u8>> {
        self.files.remove(path)
    }
}

impl Runtime for MemoryRuntime {
    fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let content = self
            .files
            .get(path)
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))?;
        Ok(FileMetadata {
            size: content.len() as u64,
            is_dir: false,
            is_file: true,
        })
    }

    fn is_readable(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}
