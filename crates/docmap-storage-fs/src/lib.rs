//! Local directory origin for the docmap documentation pipeline.
//!
//! Provides [`FsStorage`], which enumerates markup documents below a root
//! directory and reads them from disk.
//!
//! # Scanning Rules
//!
//! - Hidden entries (names starting with `.`) are skipped
//! - Dependency and build directories (`node_modules`, `target`, ...) are skipped
//! - Only files with a document extension (`md`, `mdx`, `markdown`) are listed
//! - Paths are reported relative to the root with forward slashes
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use docmap_storage::Storage;
//! use docmap_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("docs"));
//! let documents = storage.scan()?;
//! ```

mod scanner;

use std::fs;
use std::path::{Component, Path, PathBuf};

use docmap_storage::{DocumentPath, Storage, StorageError, StorageErrorKind};

use crate::scanner::Scanner;

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// Stateless: every [`scan`](Storage::scan) walks the directory tree again.
pub struct FsStorage {
    /// Root directory for document storage.
    source_dir: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `source_dir`.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Root directory this storage reads from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Resolve a document path to a file below the root.
    ///
    /// Rejects any path whose components would leave the root directory.
    fn full_path(&self, path: &DocumentPath) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .at(path.as_str())
                .on_backend(BACKEND));
        }
        Ok(self.source_dir.join(relative))
    }
}

impl Storage for FsStorage {
    fn scan(&self) -> Result<Vec<DocumentPath>, StorageError> {
        if !self.source_dir.is_dir() {
            return Err(StorageError::not_found(self.source_dir.display().to_string())
                .on_backend(BACKEND)
                .caused_by("source directory does not exist"));
        }

        let documents = Scanner::new(&self.source_dir)
            .scan()
            .map_err(|e| e.on_backend(BACKEND))?;
        tracing::debug!(
            source_dir = %self.source_dir.display(),
            count = documents.len(),
            "Scanned local documents"
        );
        Ok(documents)
    }

    fn read(&self, path: &DocumentPath) -> Result<String, StorageError> {
        let full_path = self.full_path(path)?;
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, &full_path).on_backend(BACKEND))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scan_names(storage: &FsStorage) -> Vec<String> {
        let mut names: Vec<_> = storage
            .scan()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_scan_lists_markup_files_recursively() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "README.md", "# Home");
        write(temp.path(), "guide/setup.mdx", "# Setup");
        write(temp.path(), "guide/deep/notes.markdown", "# Notes");
        write(temp.path(), "guide/image.png", "");

        let storage = FsStorage::new(temp.path().to_path_buf());

        assert_eq!(
            scan_names(&storage),
            vec!["README.md", "guide/deep/notes.markdown", "guide/setup.mdx"]
        );
    }

    #[test]
    fn test_scan_skips_hidden_and_dependency_dirs() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "a.md", "");
        write(temp.path(), ".git/b.md", "");
        write(temp.path(), "node_modules/pkg/readme.md", "");
        write(temp.path(), "target/doc.md", "");
        write(temp.path(), ".hidden.md", "");

        let storage = FsStorage::new(temp.path().to_path_buf());

        assert_eq!(scan_names(&storage), vec!["a.md"]);
    }

    #[test]
    fn test_scan_empty_directory_is_empty_ok() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp.path().to_path_buf());

        assert!(storage.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp.path().join("nope"));

        let err = storage.scan().unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_read_returns_content() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "guide/a.md", "# A");
        let storage = FsStorage::new(temp.path().to_path_buf());

        let path = DocumentPath::parse("guide/a.md").unwrap();
        assert_eq!(storage.read(&path).unwrap(), "# A");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp.path().to_path_buf());

        let path = DocumentPath::parse("nope.md").unwrap();
        let err = storage.read(&path).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::NotFound);
    }
}
