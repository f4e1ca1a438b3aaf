//! Errors raised while talking to the content API

use thiserror::Error;

/// Failure to fetch or decode content from the CMS.
///
/// A missing document is not an error: lookups return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not the expected JSON.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API root did not advertise a master ref.
    #[error("no master ref advertised by {0}")]
    MissingMasterRef(String),

    /// A cursor that cannot be turned into a request.
    #[error("invalid cursor {0:?}")]
    InvalidCursor(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        let server_error = FetchError::Status {
            status: 503,
            url: "https://blog.cdn.prismic.io/api/v2".to_string(),
        };
        let client_error = FetchError::Status {
            status: 404,
            url: "https://blog.cdn.prismic.io/api/v2".to_string(),
        };
        assert!(server_error.is_transient());
        assert!(!client_error.is_transient());
        assert!(!FetchError::InvalidCursor(String::new()).is_transient());
    }

    #[test]
    fn test_display_includes_url() {
        let err = FetchError::Status {
            status: 401,
            url: "https://blog.cdn.prismic.io/api/v2".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("blog.cdn.prismic.io"));
    }
}
