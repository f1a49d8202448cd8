//! Run manifest recording what was written and when.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One written list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub locator: String,
    pub blocked: usize,
    pub allowed: usize,
    #[serde(with = "system_time_serde")]
    pub generated_at: Option<SystemTime>,
}

impl ManifestEntry {
    /// Create an entry stamped with the current time.
    pub fn now(
        name: impl Into<String>,
        locator: impl Into<String>,
        blocked: usize,
        allowed: usize,
    ) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
            blocked,
            allowed,
            generated_at: Some(SystemTime::now()),
        }
    }
}

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time.map(|t| t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs())
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(|s| UNIX_EPOCH + Duration::from_secs(s)))
    }
}

/// All lists written into one output directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub lists: Vec<ManifestEntry>,
}

impl Manifest {
    /// Load the manifest from a file.
    ///
    /// Returns an empty manifest if the file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the manifest to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Insert an entry, replacing any previous entry with the same name.
    pub fn upsert(&mut self, entry: ManifestEntry) {
        match self.lists.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.lists.push(entry),
        }
    }

    /// Look up an entry by list name.
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.lists.iter().find(|e| e.name == name)
    }
}
