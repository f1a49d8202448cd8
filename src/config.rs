//! Batch conversion configuration.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::FilterSource;
use crate::{Error, Result};

/// Configuration for converting a set of sources in one run.
///
/// ```yaml
/// output_dir: lists
/// workers: 4
/// sources:
///   - locator: https://adguardteam.github.io/AdGuardSDNSFilter/Filter.txt
///     name: AdGuard DNS filter
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory receiving the domain list files
    pub output_dir: PathBuf,
    /// Maximum number of sources processed concurrently
    pub workers: usize,
    /// Download timeout in seconds
    pub timeout_secs: u64,
    /// Write a list file even when no blocked domain was extracted
    pub write_empty: bool,
    /// Also write the union of all sources as `combined`
    pub merge: bool,
    /// Lists to convert
    pub sources: Vec<FilterSource>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            workers: 4,
            timeout_secs: 60,
            write_empty: false,
            merge: false,
            sources: Vec::new(),
        }
    }
}

impl ConvertConfig {
    /// Create a config with defaults writing to `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a config from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ConvertConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        if let Some(source) = self.sources.iter().find(|s| s.locator.trim().is_empty()) {
            return Err(Error::Config(format!(
                "source {:?} has an empty locator",
                source.display_name
            )));
        }
        Ok(())
    }

    /// Download timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.workers, 4);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(!config.write_empty);
        assert!(!config.merge);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
output_dir: lists
workers: 2
merge: true
sources:
  - locator: https://example.com/filter.txt
    name: Example
  - locator: ./allow.txt
    name: Local allow
    kind: allowlist
"#;
        let config = ConvertConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("lists"));
        assert_eq!(config.workers, 2);
        assert_eq!(config.timeout_secs, 60);
        assert!(config.merge);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].kind, SourceKind::Allowlist);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            ConvertConfig::from_yaml("workers: 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ConvertConfig::from_yaml("timeout_secs: 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ConvertConfig::from_yaml("sources:\n  - locator: ''\n    name: Empty\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("domlist.yaml");
        fs::write(&path, "output_dir: out\n").unwrap();
        let config = ConvertConfig::load(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.sources.is_empty());
    }
}
