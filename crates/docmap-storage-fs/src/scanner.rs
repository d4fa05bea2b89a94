//! Document discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

use docmap_storage::{DocumentPath, StorageError};

/// Directories that never hold documentation.
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "dist",
    "build",
    "vendor",
    "__pycache__",
];

/// Walks a directory tree and collects document paths.
pub(crate) struct Scanner<'a> {
    source_dir: &'a Path,
}

impl<'a> Scanner<'a> {
    pub fn new(source_dir: &'a Path) -> Self {
        Self { source_dir }
    }

    /// Walk the whole tree.
    ///
    /// Any unreadable directory aborts the walk: a partial listing is never
    /// returned as success.
    pub fn scan(&self) -> Result<Vec<DocumentPath>, StorageError> {
        let mut documents = Vec::new();
        self.scan_directory(self.source_dir, "", &mut documents)?;
        documents.sort();
        Ok(documents)
    }

    fn scan_directory(
        &self,
        dir_path: &Path,
        prefix: &str,
        documents: &mut Vec<DocumentPath>,
    ) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir_path)
            .map_err(|e| StorageError::io(e, dir_path))?;

        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(e, dir_path))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            let rel = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            if is_dir {
                if SKIPPED_DIRS.contains(&name.to_lowercase().as_str()) {
                    continue;
                }
                let child: PathBuf = entry.path();
                self.scan_directory(&child, &rel, documents)?;
            } else if let Some(path) = DocumentPath::parse(&rel) {
                documents.push(path);
            }
        }
        Ok(())
    }
}
