//! Filter sources and how their text is loaded.
//!
//! A [`FilterSource`] names one upstream list. Loading it is delegated to a
//! [`Fetch`] implementation: [`FileFetcher`] for local paths, [`HttpFetcher`]
//! for `http://` / `https://` URLs, and [`SourceLoader`] dispatching between
//! the two. Gzip-compressed bodies are decompressed transparently.

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// How a source's entries are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Regular filter list: block rules block, exception rules allow
    #[default]
    Blocklist,
    /// Allow list: every extracted domain is allowed
    Allowlist,
}

/// One upstream list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSource {
    /// URL or local path
    pub locator: String,
    /// Human readable name, also used to derive output file names
    #[serde(rename = "name")]
    pub display_name: String,
    /// Interpretation of the list
    #[serde(default)]
    pub kind: SourceKind,
}

impl FilterSource {
    /// Create a block-list source.
    pub fn new(locator: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            display_name: display_name.into(),
            kind: SourceKind::Blocklist,
        }
    }

    /// Create an allow-list source.
    pub fn allowlist(locator: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Allowlist,
            ..Self::new(locator, display_name)
        }
    }

    /// Whether the locator is a remote URL.
    pub fn is_remote(&self) -> bool {
        is_url(&self.locator)
    }
}

/// Loads the raw text behind a locator.
pub trait Fetch: Send + Sync {
    /// Fetch the full text of `locator`.
    fn fetch(&self, locator: &str) -> Result<String>;
}

/// Reads local files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl Fetch for FileFetcher {
    fn fetch(&self, locator: &str) -> Result<String> {
        let path = Path::new(locator);
        if !path.exists() {
            return Err(Error::SourceNotFound(locator.to_string()));
        }
        let raw = fs::read(path)?;
        decode_body(raw)
    }
}

/// Downloads lists over HTTP(S).
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("domlist/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, locator: &str) -> Result<String> {
        log::debug!("Downloading {}", locator);

        let response = self.client.get(locator).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                locator: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let raw = response.bytes()?.to_vec();
        log::debug!("Downloaded {} bytes from {}", raw.len(), locator);
        decode_body(raw)
    }
}

/// Dispatches to the HTTP or file fetcher based on the locator.
pub struct SourceLoader {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceLoader {
    /// Create a loader whose downloads time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
            file: FileFetcher,
        })
    }
}

impl Fetch for SourceLoader {
    fn fetch(&self, locator: &str) -> Result<String> {
        if is_url(locator) {
            self.http.fetch(locator)
        } else {
            self.file.fetch(locator)
        }
    }
}

fn is_url(locator: &str) -> bool {
    let lower = locator.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Check if data is gzip compressed.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

/// Decompress if needed and decode as UTF-8 (lossily).
fn decode_body(raw: Vec<u8>) -> Result<String> {
    let data = if is_gzip(&raw) {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        log::debug!("Decompressed {} -> {} bytes", raw.len(), data.len());
        data
    } else {
        raw
    };

    Ok(match String::from_utf8(data) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/list.txt"));
        assert!(is_url("HTTP://example.com/list.txt"));
        assert!(!is_url("/etc/hosts"));
        assert!(!is_url("lists/https.txt"));
    }

    #[test]
    fn test_file_fetcher_plain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "||a.test^\n").unwrap();

        let text = FileFetcher.fetch(path.to_str().unwrap()).unwrap();
        assert_eq!(text, "||a.test^\n");
    }

    #[test]
    fn test_file_fetcher_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.txt.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"0.0.0.0 a.test\n").unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let text = FileFetcher.fetch(path.to_str().unwrap()).unwrap();
        assert_eq!(text, "0.0.0.0 a.test\n");
    }

    #[test]
    fn test_file_fetcher_missing() {
        let err = FileFetcher.fetch("/nonexistent/list.txt").unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[test]
    fn test_source_kind_deserialize() {
        let source: FilterSource =
            serde_yaml::from_str("locator: a.txt\nname: A\nkind: allowlist\n").unwrap();
        assert_eq!(source.kind, SourceKind::Allowlist);

        let source: FilterSource = serde_yaml::from_str("locator: a.txt\nname: A\n").unwrap();
        assert_eq!(source.kind, SourceKind::Blocklist);
        assert_eq!(source.display_name, "A");
    }

    #[test]
    fn test_source_constructors() {
        let source = FilterSource::allowlist("https://example.com/allow.txt", "Allow");
        assert_eq!(source.kind, SourceKind::Allowlist);
        assert!(source.is_remote());
        assert!(!FilterSource::new("local.txt", "Local").is_remote());
    }
}
