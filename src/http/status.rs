//! Mapping of unsuccessful HTTP responses onto remote error kinds.

use reqwest::StatusCode;

use crate::remote::RemoteError;

/// Classifies a response status for `path`.
/// Returns `None` for statuses the caller may read a body from (2xx and 3xx).
pub fn classify_status(path: &str, status: StatusCode) -> Option<RemoteError> {
    if status.is_success() || status.is_redirection() {
        return None;
    }
    if status == StatusCode::NOT_FOUND {
        return Some(RemoteError::NotFound(path.to_string()));
    }
    Some(RemoteError::Status {
        path: path.to_string(),
        status: status.as_u16(),
    })
}

/// Converts an unsuccessful response into an error carrying its remote kind.
pub fn check_status(path: &str, response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    match classify_status(path, response.status()) {
        None => Ok(response),
        Some(err) => Err(anyhow::Error::from(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        assert_eq!(classify_status("a", StatusCode::OK), None);
        assert_eq!(classify_status("a", StatusCode::NO_CONTENT), None);
        assert_eq!(classify_status("a", StatusCode::NOT_MODIFIED), None);
    }

    #[test]
    fn test_classify_not_found() {
        assert_eq!(
            classify_status("repodata/repomd.xml", StatusCode::NOT_FOUND),
            Some(RemoteError::NotFound("repodata/repomd.xml".to_string()))
        );
    }

    #[test]
    fn test_classify_other_errors() {
        assert_eq!(
            classify_status("a", StatusCode::FORBIDDEN),
            Some(RemoteError::Status {
                path: "a".to_string(),
                status: 403
            })
        );
        assert_eq!(
            classify_status("a", StatusCode::BAD_GATEWAY),
            Some(RemoteError::Status {
                path: "a".to_string(),
                status: 502
            })
        );
    }
}
