//! Error types for domlist.

use thiserror::Error;

/// Error type for domlist operations.
///
/// Classification and reduction never fail; every variant here belongs to
/// the driver side (loading sources, reading configs, writing lists).
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error (manifest)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),

    /// Remote server answered with a non-success status
    #[error("HTTP {status} while fetching {locator}")]
    HttpStatus { locator: String, status: u16 },

    /// Local source file does not exist
    #[error("source not found: {0}")]
    SourceNotFound(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// No blocked domains could be extracted from a source
    #[error("no domains extracted from {0}")]
    EmptyResult(String),
}

/// Result type alias for domlist operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::HttpStatus {
            locator: "https://example.com/list.txt".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "HTTP 404 while fetching https://example.com/list.txt"
        );

        let err = Error::EmptyResult("AdGuard DNS filter".to_string());
        assert_eq!(err.to_string(), "no domains extracted from AdGuard DNS filter");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
