//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem or network access.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::path::DocumentPath;
use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores documents in memory. Use the builder methods to configure the mock
/// with test data.
///
/// # Example
///
/// ```ignore
/// use docmap_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("guide.md", "# User Guide\n\nContent.");
///
/// let docs = storage.scan().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<DocumentPath, String>>,
    scan_failure: RwLock<Option<StorageErrorKind>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with content.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid document path or the internal lock is
    /// poisoned.
    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<String>) -> Self {
        let path = DocumentPath::parse(path).expect("invalid document path");
        self.files.write().unwrap().insert(path, content.into());
        self
    }

    /// Add several empty documents at once.
    #[must_use]
    pub fn with_paths<'a>(self, paths: impl IntoIterator<Item = &'a str>) -> Self {
        paths
            .into_iter()
            .fold(self, |storage, path| storage.with_file(path, ""))
    }

    /// Make every subsequent `scan()` fail with the given kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_scan_failure(self, kind: StorageErrorKind) -> Self {
        *self.scan_failure.write().unwrap() = Some(kind);
        self
    }

    /// Replace or add a document after construction.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid document path or the internal lock is
    /// poisoned.
    pub fn insert(&self, path: &str, content: impl Into<String>) {
        let path = DocumentPath::parse(path).expect("invalid document path");
        self.files.write().unwrap().insert(path, content.into());
    }

    /// Remove a document.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove(&self, path: &str) {
        self.files.write().unwrap().remove(path);
    }
}

impl Storage for MockStorage {
    fn scan(&self) -> Result<Vec<DocumentPath>, StorageError> {
        if let Some(kind) = *self.scan_failure.read().unwrap() {
            return Err(StorageError::new(kind)
                .on_backend(BACKEND)
                .caused_by("scan failure requested"));
        }
        Ok(self.files.read().unwrap().keys().cloned().collect())
    }

    fn read(&self, path: &DocumentPath) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path.as_str()).on_backend(BACKEND))
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}
