//! Remote artifact store abstraction.
//!
//! The package repository is read as a read-only virtual filesystem: a
//! path opens to a stream of chunks plus some file metadata. `HttpFs` is
//! the real implementation; tests use in-memory stores.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Metadata of an opened remote file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileInfo {
    /// File name to store the content under.
    pub name: String,
    /// Declared content length, when the store knows it.
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
}

/// An opened remote file, read chunk by chunk.
#[async_trait]
pub trait RemoteFile: Send {
    fn info(&self) -> &FileInfo;

    /// Next chunk of content, or `None` at end of file.
    async fn chunk(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Read-only access to a remote package repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// Open a slash-separated path relative to the repository root.
    async fn open(&self, path: &str) -> Result<Box<dyn RemoteFile>>;

    /// Fully qualified URL of a repository path.
    fn url_for(&self, path: &str) -> Result<String>;
}

/// Read a whole remote file into memory.
pub async fn read_all(file: &mut dyn RemoteFile) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    while let Some(chunk) = file.chunk().await? {
        content.extend_from_slice(&chunk);
    }
    Ok(content)
}

/// Errors callers may want to tell apart from generic I/O failures.
#[derive(Debug, PartialEq)]
pub enum RemoteError {
    /// The path does not exist in the store (HTTP 404)
    NotFound(String),
    /// The path is not a valid relative path
    InvalidPath(String),
    /// Any other unsuccessful response
    Status { path: String, status: u16 },
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::NotFound(path) => write!(f, "Not found: {}", path),
            RemoteError::InvalidPath(path) => write!(f, "Invalid remote path: {:?}", path),
            RemoteError::Status { path, status } => {
                write!(f, "Request for {} failed with HTTP {}", path, status)
            }
        }
    }
}

impl std::error::Error for RemoteError {}

/// Whether an error chain reports a missing remote file.
pub fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<RemoteError>(),
        Some(RemoteError::NotFound(_))
    )
}

/// Validates a store path: unrooted, slash separated, and free of empty,
/// `.` or `..` elements.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|element| !element.is_empty() && element != "." && element != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_path() {
        assert!(is_valid_path("repodata/repomd.xml"));
        assert!(is_valid_path("Packages/d/dotnet-host-9.0.1-1.x86_64.rpm"));
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("/etc/passwd"));
        assert!(!is_valid_path("repodata/../secret"));
        assert!(!is_valid_path("./repomd.xml"));
        assert!(!is_valid_path("repodata//repomd.xml"));
        assert!(!is_valid_path("repodata/"));
    }

    #[test]
    fn test_is_not_found() {
        let err = anyhow::Error::from(RemoteError::NotFound("x".into()));
        assert!(is_not_found(&err));
        assert!(is_not_found(&err.context("while opening")));

        let err = anyhow::Error::from(RemoteError::Status {
            path: "x".into(),
            status: 500,
        });
        assert!(!is_not_found(&err));
        assert!(!is_not_found(&anyhow::anyhow!("connection reset")));
    }

    #[test]
    fn test_remote_error_display() {
        assert_eq!(
            RemoteError::NotFound("a/b.rpm".into()).to_string(),
            "Not found: a/b.rpm"
        );
        assert_eq!(
            RemoteError::Status {
                path: "a".into(),
                status: 503
            }
            .to_string(),
            "Request for a failed with HTTP 503"
        );
    }
}
