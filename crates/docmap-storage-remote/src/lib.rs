//! Remote versioned-tree origin for the docmap documentation pipeline.
//!
//! [`RemoteStorage`] enumerates documents with a single recursive tree
//! listing call and fetches raw document text by revision. It speaks the
//! GitHub REST and raw-content URL layout; both base URLs are configurable
//! so compatible mirrors work too.
//!
//! Every failure is surfaced as a [`StorageError`]. A truncated listing is an
//! error as well, since silently dropping documents would look like drift.

mod tree;

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use ureq::Agent;

use docmap_storage::{DocumentPath, ErrorStatus, Storage, StorageError, StorageErrorKind};

pub use tree::{TreeEntry, TreeResponse, filter_tree};

/// Backend identifier for error messages.
const BACKEND: &str = "Remote";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default raw content base URL.
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Characters escaped inside a single URL path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Location of a remote content tree.
#[derive(Debug, Clone)]
pub struct RemoteOrigin {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch, tag or commit to read.
    pub revision: String,
    /// Directory inside the repository holding the documents.
    pub base_path: String,
    /// Optional bearer token.
    pub token: Option<String>,
    /// REST API base URL.
    pub api_url: String,
    /// Raw content base URL.
    pub raw_url: String,
    /// Global request timeout.
    pub timeout: Duration,
}

impl RemoteOrigin {
    /// Origin with default endpoints, no token and the default timeout.
    #[must_use]
    pub fn new(owner: &str, repo: &str, revision: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
            revision: revision.to_owned(),
            base_path: String::new(),
            token: None,
            api_url: DEFAULT_API_URL.to_owned(),
            raw_url: DEFAULT_RAW_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
        }
    }
}

/// Remote storage reading a versioned tree over HTTP.
pub struct RemoteStorage {
    agent: Agent,
    origin: RemoteOrigin,
}

impl RemoteStorage {
    /// Create remote storage for the given origin.
    #[must_use]
    pub fn new(origin: RemoteOrigin) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(origin.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent, origin }
    }

    /// URL of the recursive tree listing.
    #[must_use]
    pub fn listing_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.origin.api_url.trim_end_matches('/'),
            encode(&self.origin.owner),
            encode(&self.origin.repo),
            encode(&self.origin.revision),
        )
    }

    /// URL of the raw content for one document.
    #[must_use]
    pub fn raw_url(&self, path: &DocumentPath) -> String {
        let full = path.with_prefix(&self.origin.base_path);
        let encoded: Vec<String> = full.as_str().split('/').map(encode).collect();
        format!(
            "{}/{}/{}/{}/{}",
            self.origin.raw_url.trim_end_matches('/'),
            encode(&self.origin.owner),
            encode(&self.origin.repo),
            encode(&self.origin.revision),
            encoded.join("/"),
        )
    }

    /// Issue a GET request and return the response body reader on success.
    fn get(&self, url: &str, accept: &str) -> Result<ureq::Body, StorageError> {
        let mut request = self.agent.get(url).header("Accept", accept);
        if let Some(token) = &self.origin.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        let response = request.call().map_err(|e| transport_error(e, url))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(StorageError::http_status(status, &error_body)
                .at(url)
                .on_backend(BACKEND));
        }

        Ok(body)
    }
}

impl Storage for RemoteStorage {
    fn scan(&self) -> Result<Vec<DocumentPath>, StorageError> {
        let url = self.listing_url();
        let listing: TreeResponse = self
            .get(&url, "application/vnd.github+json")?
            .read_json()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable)
                    .at(url.as_str())
                    .on_backend(BACKEND)
                    .caused_by(e)
            })?;

        if listing.truncated {
            return Err(StorageError::new(StorageErrorKind::Unavailable)
                .at(url)
                .on_backend(BACKEND)
                .caused_by("tree listing was truncated"));
        }

        let documents = filter_tree(&listing.tree, &self.origin.base_path);
        tracing::info!(
            owner = %self.origin.owner,
            repo = %self.origin.repo,
            revision = %self.origin.revision,
            count = documents.len(),
            "Listed remote documents"
        );
        Ok(documents)
    }

    fn read(&self, path: &DocumentPath) -> Result<String, StorageError> {
        let url = self.raw_url(path);
        tracing::debug!(%url, "Fetching document");
        self.get(&url, "text/plain")?.read_to_string().map_err(|e| {
            StorageError::new(StorageErrorKind::Unavailable)
                .at(url)
                .on_backend(BACKEND)
                .caused_by(e)
        })
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Map a transport-level failure (no HTTP status) to a storage error.
fn transport_error(err: ureq::Error, url: &str) -> StorageError {
    let (kind, status) = match err {
        ureq::Error::Timeout(_) => (StorageErrorKind::Timeout, ErrorStatus::Temporary),
        _ => (StorageErrorKind::Unavailable, ErrorStatus::Temporary),
    };
    StorageError::new(kind)
        .retry(status)
        .at(url)
        .on_backend(BACKEND)
        .caused_by(err)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::*;

    fn storage() -> RemoteStorage {
        let mut origin = RemoteOrigin::new("acme", "handbook", "main");
        origin.base_path = "docs/".to_owned();
        RemoteStorage::new(origin)
    }

    /// Origin pointing at a local port with nothing listening.
    fn unreachable() -> RemoteStorage {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut origin = RemoteOrigin::new("acme", "handbook", "main");
        origin.api_url = format!("http://127.0.0.1:{port}");
        origin.raw_url = format!("http://127.0.0.1:{port}");
        origin.timeout = Duration::from_secs(2);
        RemoteStorage::new(origin)
    }

    /// Origin whose endpoints answer one request with a canned response.
    fn answering(status: &'static str, body: &'static str) -> RemoteStorage {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = stream.read(&mut chunk).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..read]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        let mut origin = RemoteOrigin::new("acme", "handbook", "main");
        origin.base_path = "docs".to_owned();
        origin.api_url = format!("http://127.0.0.1:{port}");
        origin.raw_url = format!("http://127.0.0.1:{port}");
        origin.timeout = Duration::from_secs(5);
        RemoteStorage::new(origin)
    }

    #[test]
    fn test_scan_lists_documents_under_base_path() {
        let storage = answering(
            "200 OK",
            r#"{"tree":[{"path":"docs/guide.md","type":"blob"},{"path":"docs/api","type":"tree"},{"path":"README.md","type":"blob"}],"truncated":false}"#,
        );

        let documents = storage.scan().unwrap();

        assert_eq!(documents, vec![DocumentPath::parse("guide.md").unwrap()]);
    }

    #[test]
    fn test_scan_server_error_is_error() {
        let err = answering("500 Internal Server Error", "boom").scan().unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::Unavailable);
        assert_eq!(err.status, ErrorStatus::Persistent);
        assert!(err.location.as_deref().unwrap().ends_with("/git/trees/main?recursive=1"));
        assert!(err.to_string().contains("HTTP 500: boom"));
    }

    #[test]
    fn test_scan_missing_revision_is_not_found() {
        let err = answering("404 Not Found", r#"{"message":"Not Found"}"#)
            .scan()
            .unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
    }

    #[test]
    fn test_scan_truncated_listing_is_error() {
        let err = answering(
            "200 OK",
            r#"{"tree":[{"path":"docs/a.md","type":"blob"}],"truncated":true}"#,
        )
        .scan()
        .unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::Unavailable);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_scan_malformed_listing_is_error() {
        let err = answering("200 OK", "not json").scan().unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::Unavailable);
    }

    #[test]
    fn test_read_rate_limited() {
        let path = DocumentPath::parse("a.md").unwrap();

        let err = answering("429 Too Many Requests", "").read(&path).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::RateLimited);
    }

    #[test]
    fn test_remote_storage_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RemoteStorage>();
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(
            storage().listing_url(),
            "https://api.github.com/repos/acme/handbook/git/trees/main?recursive=1"
        );
    }

    #[test]
    fn test_raw_url_includes_base_and_encodes_segments() {
        let path = DocumentPath::parse("guide/my page.md").unwrap();

        assert_eq!(
            storage().raw_url(&path),
            "https://raw.githubusercontent.com/acme/handbook/main/docs/guide/my%20page.md"
        );
    }

    #[test]
    fn test_revision_with_slash_is_encoded() {
        let storage = RemoteStorage::new(RemoteOrigin::new("acme", "handbook", "release/1.0"));

        assert!(storage.listing_url().contains("/git/trees/release%2F1.0?"));
    }

    #[test]
    fn test_scan_connection_refused_is_error() {
        let err = unreachable().scan().unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::Unavailable);
        assert_eq!(err.backend, Some("Remote"));
    }

    #[test]
    fn test_read_connection_refused_is_error() {
        let path = DocumentPath::parse("a.md").unwrap();

        let err = unreachable().read(&path).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::Unavailable);
    }
}
