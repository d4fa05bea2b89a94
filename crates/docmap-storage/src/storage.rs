//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for enumerating and fetching documents,
//! along with [`StorageError`] for unified error handling across origins.
//!
//! # Failure Semantics
//!
//! A failed enumeration is always an error, never an empty list: an empty
//! result means the origin really holds zero documents.

use std::error::Error;
use std::fmt;
use std::path::Path;

use crate::path::DocumentPath;

type Cause = Box<dyn Error + Send + Sync>;

/// What went wrong, independent of the origin.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Document or origin root does not exist.
    NotFound,
    /// Credentials missing or rejected.
    PermissionDenied,
    /// Path cannot be mapped into the origin.
    InvalidPath,
    /// Origin is unreachable or answered with a failure status.
    Unavailable,
    /// Origin asked the caller to slow down.
    RateLimited,
    /// Request exceeded its deadline.
    Timeout,
    /// Anything else.
    Other,
}

impl StorageErrorKind {
    fn describe(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::PermissionDenied => "permission denied",
            Self::InvalidPath => "invalid path",
            Self::Unavailable => "unavailable",
            Self::RateLimited => "rate limited",
            Self::Timeout => "timed out",
            Self::Other => "storage failure",
        }
    }
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Whether repeating the operation could succeed.
///
/// Advisory only: the pipeline itself never retries.
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub enum ErrorStatus {
    /// Repeating gives the same answer.
    #[default]
    Permanent,
    /// May succeed right away (timeouts, dropped connections).
    Temporary,
    /// May succeed after backing off (rate limits, 5xx).
    Persistent,
}

/// Failure to list or fetch documents from an origin.
#[derive(Debug)]
pub struct StorageError {
    /// Failure category.
    pub kind: StorageErrorKind,
    /// Retry hint.
    pub status: ErrorStatus,
    /// Document path, directory or URL involved.
    pub location: Option<String>,
    /// Origin backend (`"Fs"`, `"Remote"`, `"Mock"`).
    pub backend: Option<&'static str>,
    cause: Option<Cause>,
}

impl StorageError {
    /// Error of `kind` with no context attached.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::default(),
            location: None,
            backend: None,
            cause: None,
        }
    }

    /// Missing document or directory.
    #[must_use]
    pub fn not_found(location: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound).at(location)
    }

    /// Classify a filesystem error raised while touching `location`.
    #[must_use]
    pub fn io(err: std::io::Error, location: &Path) -> Self {
        use std::io::ErrorKind;

        let (kind, status) = match err.kind() {
            ErrorKind::NotFound => (StorageErrorKind::NotFound, ErrorStatus::Permanent),
            ErrorKind::PermissionDenied => {
                (StorageErrorKind::PermissionDenied, ErrorStatus::Permanent)
            }
            ErrorKind::TimedOut => (StorageErrorKind::Timeout, ErrorStatus::Temporary),
            ErrorKind::Interrupted | ErrorKind::WouldBlock => {
                (StorageErrorKind::Other, ErrorStatus::Temporary)
            }
            _ => (StorageErrorKind::Other, ErrorStatus::Permanent),
        };
        Self::new(kind)
            .retry(status)
            .at(location.display().to_string())
            .caused_by(err)
    }

    /// Classify a non-success HTTP answer.
    ///
    /// 404 is [`StorageErrorKind::NotFound`], 401/403
    /// [`StorageErrorKind::PermissionDenied`], 429
    /// [`StorageErrorKind::RateLimited`]; every other status is
    /// [`StorageErrorKind::Unavailable`]. The trimmed body, if any, becomes
    /// the cause.
    #[must_use]
    pub fn http_status(status: u16, body: &str) -> Self {
        let (kind, retry) = match status {
            404 => (StorageErrorKind::NotFound, ErrorStatus::Permanent),
            401 | 403 => (StorageErrorKind::PermissionDenied, ErrorStatus::Permanent),
            429 => (StorageErrorKind::RateLimited, ErrorStatus::Persistent),
            500..=599 => (StorageErrorKind::Unavailable, ErrorStatus::Persistent),
            _ => (StorageErrorKind::Unavailable, ErrorStatus::Permanent),
        };
        let body = body.trim();
        let cause = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {body}")
        };
        Self::new(kind).retry(retry).caused_by(cause)
    }

    /// Record where the failure happened.
    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Record which backend failed.
    #[must_use]
    pub fn on_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Override the retry hint.
    #[must_use]
    pub fn retry(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error or a plain message.
    #[must_use]
    pub fn caused_by(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// The underlying error as a concrete type.
    #[must_use]
    pub fn cause_as<E: Error + 'static>(&self) -> Option<&E> {
        self.cause.as_deref()?.downcast_ref()
    }

    /// True unless repeating the operation is pointless.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.status != ErrorStatus::Permanent
    }
}

impl fmt::Display for StorageError {
    /// `"{kind}[ at {location}][: {cause}][ ({backend} origin)]"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(location) = &self.location {
            write!(f, " at {location}")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        if let Some(backend) = self.backend {
            write!(f, " ({backend} origin)")?;
        }
        Ok(())
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}

/// Content origin for document enumeration and retrieval.
///
/// Implementations are stateless between calls: every `scan()` reflects the
/// origin as it is now. Operations may block on I/O; async callers should run
/// them on a blocking thread pool.
pub trait Storage: Send + Sync {
    /// Enumerate every document in the origin.
    ///
    /// Order is not meaningful. Consumers apply their own ordering.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the origin cannot be listed. Never returns
    /// `Ok` with a partial listing.
    fn scan(&self) -> Result<Vec<DocumentPath>, StorageError>;

    /// Fetch raw text for a document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the document doesn't exist or can't be read.
    fn read(&self, path: &DocumentPath) -> Result<String, StorageError>;

    /// Short backend identifier used in logs and error messages.
    fn backend(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use std::io;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_new_error_has_no_context() {
        let err = StorageError::new(StorageErrorKind::Other);

        assert_eq!(err.status, ErrorStatus::Permanent);
        assert!(err.location.is_none());
        assert!(err.backend.is_none());
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "storage failure");
    }

    #[test]
    fn test_io_classification() {
        let denied = StorageError::io(
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
            Path::new("/srv/docs"),
        );
        assert_eq!(denied.kind, StorageErrorKind::PermissionDenied);
        assert_eq!(denied.location.as_deref(), Some("/srv/docs"));
        assert!(!denied.is_retryable());

        let slow = StorageError::io(
            io::Error::new(io::ErrorKind::TimedOut, "timed out"),
            Path::new("a.md"),
        );
        assert_eq!(slow.kind, StorageErrorKind::Timeout);
        assert!(slow.is_retryable());
        assert!(slow.cause_as::<io::Error>().is_some());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(StorageError::http_status(404, "").kind, StorageErrorKind::NotFound);
        assert_eq!(
            StorageError::http_status(401, "").kind,
            StorageErrorKind::PermissionDenied
        );

        let limited = StorageError::http_status(429, "slow down");
        assert_eq!(limited.kind, StorageErrorKind::RateLimited);
        assert_eq!(limited.status, ErrorStatus::Persistent);

        let bad_request = StorageError::http_status(400, "");
        assert_eq!(bad_request.kind, StorageErrorKind::Unavailable);
        assert!(!bad_request.is_retryable());
    }

    #[test]
    fn test_display_with_full_context() {
        let err = StorageError::http_status(500, "boom\n")
            .at("https://raw.example.com/a.md")
            .on_backend("Remote");

        assert_eq!(
            err.to_string(),
            "unavailable at https://raw.example.com/a.md: HTTP 500: boom (Remote origin)"
        );
    }

    #[test]
    fn test_message_cause_is_error_source() {
        let err = StorageError::not_found("guide/a.md").caused_by("removed upstream");

        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("removed upstream"));
        assert!(err.cause_as::<io::Error>().is_none());
    }

    #[test]
    fn test_storage_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StorageError>();
    }
}
