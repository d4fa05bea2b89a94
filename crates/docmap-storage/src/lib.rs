//! Content origin abstraction for the docmap documentation pipeline.
//!
//! A content origin is anything that can list markup documents and hand back
//! their raw text. Page-map and rendering code only ever see the [`Storage`]
//! trait, so tests run against [`MockStorage`] and the binaries pick a local
//! or remote backend at startup.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `scan()` and `read()` methods
//! - [`DocumentPath`], the normalized relative path every backend produces
//! - [`StorageError`] with semantic [`StorageErrorKind`] categories
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! Backends live in their own crates (`docmap-storage-fs`,
//! `docmap-storage-remote`).
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use docmap_storage::Storage;
//! use docmap_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("docs"));
//! for path in storage.scan()? {
//!     println!("{path}");
//! }
//! ```

#[cfg(feature = "mock")]
mod mock;
mod path;
mod storage;

#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use path::{DOCUMENT_EXTENSIONS, DocumentPath};
pub use storage::{ErrorStatus, Storage, StorageError, StorageErrorKind};
