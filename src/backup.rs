//! AdGuard Home configuration backup reader.
//!
//! Locates filter subscriptions and free-form user rules inside an
//! `AdGuardHome.yaml` backup. The file is parsed as YAML instead of scanning
//! for the next top-level key, so nested or reordered sections are bounded
//! correctly.

use serde::Deserialize;

use crate::source::FilterSource;
use crate::Result;

/// AdGuard Home configuration backup.
///
/// Newer releases nest the filter settings under `filtering`; both layouts
/// are accepted and merged.
#[derive(Debug, Default, Deserialize)]
pub struct AdGuardBackup {
    /// Block-list subscriptions
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
    /// Allow-list subscriptions
    #[serde(default)]
    pub whitelist_filters: Vec<FilterEntry>,
    /// Free-form custom rules
    #[serde(default)]
    pub user_rules: Vec<String>,
    #[serde(default)]
    filtering: Option<FilteringSection>,
}

#[derive(Debug, Default, Deserialize)]
struct FilteringSection {
    #[serde(default)]
    filters: Vec<FilterEntry>,
    #[serde(default)]
    whitelist_filters: Vec<FilterEntry>,
    #[serde(default)]
    user_rules: Vec<String>,
}

/// One filter subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterEntry {
    /// Whether the subscription is active
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// List URL (or local path)
    pub url: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// AdGuard Home filter id
    #[serde(default)]
    pub id: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl FilterEntry {
    fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.trim().to_string();
        }
        match self.id {
            Some(id) => format!("filter-{}", id),
            None => self.url.clone(),
        }
    }
}

impl AdGuardBackup {
    /// Parse a backup from YAML text.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        let mut backup: AdGuardBackup = serde_yaml::from_str(yaml_content)?;

        if let Some(section) = backup.filtering.take() {
            backup.filters.extend(section.filters);
            backup.whitelist_filters.extend(section.whitelist_filters);
            backup.user_rules.extend(section.user_rules);
        }

        Ok(backup)
    }

    /// Enabled subscriptions as filter sources, block lists first.
    pub fn sources(&self) -> Vec<FilterSource> {
        let mut sources = Vec::new();

        for entry in &self.filters {
            if entry.enabled {
                sources.push(FilterSource::new(&entry.url, entry.display_name()));
            } else {
                log::debug!("Skipping disabled filter: {}", entry.display_name());
            }
        }

        for entry in &self.whitelist_filters {
            if entry.enabled {
                sources.push(FilterSource::allowlist(&entry.url, entry.display_name()));
            } else {
                log::debug!("Skipping disabled allow list: {}", entry.display_name());
            }
        }

        sources
    }

    /// The custom rule block, one rule per line.
    pub fn custom_rules(&self) -> &[String] {
        &self.user_rules
    }
}
