//! Error type shared by every stage of the snapshot crawl.

/// All errors that can abort a crawl.
///
/// The metadata lookup never surfaces these to its caller; it logs them and
/// degrades to empty values instead.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    #[error("Only \"SNAPSHOT\" version is supported")]
    UnsupportedVersion,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to serialize job config: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_message() {
        let err = SnapshotError::UnsupportedVersion;
        assert_eq!(err.to_string(), "Only \"SNAPSHOT\" version is supported");
    }

    #[test]
    fn test_status_error_carries_url() {
        let err = SnapshotError::Status {
            url: "https://example.com/x86/".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Request to https://example.com/x86/ returned HTTP 404"
        );
    }
}
