//! Source-to-file conversion driver.
//!
//! Each source runs through fetch → classify → reduce on its own. Sources are
//! independent, so [`Pipeline::process_all`] fans them out over a bounded set
//! of worker threads and joins the results in source order before anything
//! is written.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::manifest::{Manifest, ManifestEntry, MANIFEST_FILE};
use crate::sink::{DomainListWriter, WrittenList};
use crate::source::{Fetch, FilterSource, SourceKind};
use crate::{classify, extract_anchored_domains, ClassifiedEntry, DomainSet, Error, Result};
use crate::{RuleListResult, RuleSetReducer};

/// Name used for the union of all sources in merge mode.
pub const COMBINED_LIST: &str = "combined";

/// Name used for the custom rules of a configuration backup.
pub const CUSTOM_RULES_LIST: &str = "custom rules";

/// Outcome of processing one source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: FilterSource,
    pub result: Result<RuleListResult>,
}

/// Options controlling what gets written.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Write a list file even when no blocked domain was extracted
    pub write_empty: bool,
    /// Also write the union of all successful sources
    pub merge: bool,
}

/// Summary of a write run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Lists written to disk
    pub written: Vec<WrittenList>,
    /// Sources that produced no blocked domains
    pub empty: Vec<String>,
    /// Sources that could not be loaded
    pub failed: Vec<(String, Error)>,
}

impl RunSummary {
    /// Whether every source was loaded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Classify and reduce the text of one list.
///
/// For allow-list sources every extracted domain is reduced into `allowed`.
pub fn process_text(text: &str, kind: SourceKind) -> RuleListResult {
    let mut reducer = RuleSetReducer::new();

    for line in text.lines() {
        let entry = match (kind, classify(line)) {
            (SourceKind::Allowlist, ClassifiedEntry::Blocked(domain)) => {
                ClassifiedEntry::Allowed(domain)
            }
            (_, entry) => entry,
        };
        reducer.push(entry);
    }

    log::debug!("Ignored {} lines", reducer.ignored_count());
    reducer.finish()
}

/// Conversion pipeline over a [`Fetch`] implementation.
pub struct Pipeline<F: Fetch> {
    fetcher: F,
    workers: usize,
}

impl<F: Fetch> Pipeline<F> {
    /// Create a pipeline running at most `workers` sources at once.
    pub fn new(fetcher: F, workers: usize) -> Self {
        Self {
            fetcher,
            workers: workers.max(1),
        }
    }

    /// Fetch, classify and reduce one source.
    pub fn process_source(&self, source: &FilterSource) -> Result<RuleListResult> {
        log::debug!(
            "{} {} ({})",
            if source.is_remote() { "Downloading" } else { "Reading" },
            source.display_name,
            source.locator
        );

        let text = self.fetcher.fetch(&source.locator)?;
        let result = process_text(&text, source.kind);

        if result.is_empty() && source.kind == SourceKind::Blocklist {
            log::warn!("No domains extracted from {}", source.display_name);
        }
        log::debug!(
            "{}: {} blocked, {} allowed",
            source.display_name,
            result.blocked.len(),
            result.allowed.len()
        );

        Ok(result)
    }

    /// Process every source, in parallel up to the worker limit.
    ///
    /// Outcomes are returned in the same order as `sources`. A failing source
    /// never stops the others.
    pub fn process_all(&self, sources: &[FilterSource]) -> Vec<SourceOutcome> {
        let slots: Mutex<Vec<Option<Result<RuleListResult>>>> =
            Mutex::new((0..sources.len()).map(|_| None).collect());
        let next = AtomicUsize::new(0);
        let workers = self.workers.min(sources.len());

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let idx = next.fetch_add(1, Ordering::SeqCst);
                    if idx >= sources.len() {
                        break;
                    }
                    let result = self.process_source(&sources[idx]);
                    if let Err(e) = &result {
                        log::warn!("Failed to process {}: {}", sources[idx].display_name, e);
                    }
                    slots.lock()[idx] = Some(result);
                });
            }
        });

        sources
            .iter()
            .cloned()
            .zip(slots.into_inner())
            .map(|(source, slot)| SourceOutcome {
                result: slot.unwrap_or_else(|| {
                    Err(Error::Config(format!("{} was not processed", source.display_name)))
                }),
                source,
            })
            .collect()
    }

    /// Extract anchored domains from an already bounded custom rule block.
    pub fn process_custom_rules<I, S>(&self, block: I) -> DomainSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extract_anchored_domains(block)
    }

    /// Process every source and write the results.
    ///
    /// Per-source failures are collected in the summary; only output errors
    /// (unwritable directory, manifest) abort the run.
    pub fn write_all(
        &self,
        sources: &[FilterSource],
        writer: &DomainListWriter,
        options: WriteOptions,
    ) -> Result<RunSummary> {
        let manifest_path = writer.output_dir().join(MANIFEST_FILE);
        let mut manifest = Manifest::load(&manifest_path)?;
        let mut summary = RunSummary::default();
        let mut combined = RuleListResult::new();
        let mut merged_locators = Vec::new();

        for outcome in self.process_all(sources) {
            let name = outcome.source.display_name;
            let result = match outcome.result {
                Ok(result) => result,
                Err(e) => {
                    summary.failed.push((name, e));
                    continue;
                }
            };

            let no_domains = match outcome.source.kind {
                SourceKind::Blocklist => result.is_empty(),
                SourceKind::Allowlist => result.allowed.is_empty(),
            };
            if no_domains {
                summary.empty.push(name.clone());
            }
            if result.blocked.is_empty() && result.allowed.is_empty() && !options.write_empty {
                continue;
            }

            let written = writer.write(&name, &result)?;
            manifest.upsert(ManifestEntry::now(
                &name,
                &outcome.source.locator,
                result.blocked.len(),
                result.allowed.len(),
            ));
            summary.written.push(written);

            if options.merge {
                merged_locators.push(outcome.source.locator);
                combined.merge(result);
            }
        }

        if options.merge && (!combined.is_empty() || options.write_empty) {
            let locator = merged_locators.join(",");
            let written = writer.write(COMBINED_LIST, &combined)?;
            manifest.upsert(ManifestEntry::now(
                COMBINED_LIST,
                locator,
                combined.blocked.len(),
                combined.allowed.len(),
            ));
            summary.written.push(written);
        }

        manifest.save(&manifest_path)?;
        Ok(summary)
    }

    /// Extract and write a custom rule block as `custom-rules.txt`.
    ///
    /// Returns `None` when the block held no domains and
    /// `write_empty` is off.
    pub fn write_custom_rules<I, S>(
        &self,
        block: I,
        writer: &DomainListWriter,
        write_empty: bool,
    ) -> Result<Option<PathBuf>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = self.process_custom_rules(block);
        if domains.is_empty() && !write_empty {
            return Ok(None);
        }

        let written = writer.write_set(CUSTOM_RULES_LIST, &domains)?;

        let manifest_path = writer.output_dir().join(MANIFEST_FILE);
        let mut manifest = Manifest::load(&manifest_path)?;
        manifest.upsert(ManifestEntry::now(
            CUSTOM_RULES_LIST,
            "user_rules",
            domains.len(),
            0,
        ));
        manifest.save(&manifest_path)?;

        Ok(Some(written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    /// In-memory fetcher keyed by locator.
    struct MapFetcher(HashMap<String, String>);

    impl MapFetcher {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }
    }

    impl Fetch for MapFetcher {
        fn fetch(&self, locator: &str) -> Result<String> {
            self.0
                .get(locator)
                .cloned()
                .ok_or_else(|| Error::SourceNotFound(locator.to_string()))
        }
    }

    #[test]
    fn test_process_text_blocklist() {
        let result = process_text(
            "! Title: test\n||ads.test^\n@@||ok.test^\r\n0.0.0.0 track.test\n",
            SourceKind::Blocklist,
        );
        assert_eq!(result.blocked.to_vec(), vec!["ads.test", "track.test"]);
        assert_eq!(result.allowed.to_vec(), vec!["ok.test"]);
    }

    #[test]
    fn test_process_text_allowlist() {
        let result = process_text("||a.test^\n@@||b.test^\nc.test\n", SourceKind::Allowlist);
        assert!(result.blocked.is_empty());
        assert_eq!(result.allowed.to_vec(), vec!["a.test", "b.test", "c.test"]);
    }

    #[test]
    fn test_process_all_keeps_order_and_failures() {
        let fetcher = MapFetcher::new(&[("one", "||a.test^"), ("three", "b.test\n")]);
        let pipeline = Pipeline::new(fetcher, 2);
        let sources = vec![
            FilterSource::new("one", "One"),
            FilterSource::new("two", "Two"),
            FilterSource::new("three", "Three"),
        ];

        let outcomes = pipeline.process_all(&sources);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].source.display_name, "One");
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(Error::SourceNotFound(_))));
        assert_eq!(
            outcomes[2].result.as_ref().unwrap().blocked.to_vec(),
            vec!["b.test"]
        );
    }

    #[test]
    fn test_process_all_empty() {
        let pipeline = Pipeline::new(MapFetcher::new(&[]), 4);
        assert!(pipeline.process_all(&[]).is_empty());
    }

    #[test]
    fn test_write_all_merge() {
        let dir = tempdir().unwrap();
        let writer = DomainListWriter::new(dir.path()).unwrap();
        let fetcher = MapFetcher::new(&[
            ("a", "||x.test^\n||y.test^\n"),
            ("b", "0.0.0.0 y.test\n@@||ok.test^\n"),
            ("empty", "! nothing here\n"),
        ]);
        let pipeline = Pipeline::new(fetcher, 3);
        let sources = vec![
            FilterSource::new("a", "List A"),
            FilterSource::new("b", "List B"),
            FilterSource::new("empty", "Empty"),
            FilterSource::new("missing", "Missing"),
        ];

        let summary = pipeline
            .write_all(
                &sources,
                &writer,
                WriteOptions {
                    write_empty: false,
                    merge: true,
                },
            )
            .unwrap();

        assert_eq!(summary.written.len(), 3);
        assert_eq!(summary.empty, vec!["Empty".to_string()]);
        assert_eq!(summary.failed.len(), 1);
        assert!(!summary.is_success());
        assert!(!dir.path().join("empty.txt").exists());

        let combined = fs::read_to_string(dir.path().join("combined.txt")).unwrap();
        assert_eq!(combined, "x.test\ny.test\n");
        let combined_allow = fs::read_to_string(dir.path().join("combined.allow.txt")).unwrap();
        assert_eq!(combined_allow, "ok.test\n");

        let manifest = Manifest::load(dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.get("List A").unwrap().blocked, 2);
        assert_eq!(manifest.get(COMBINED_LIST).unwrap().allowed, 1);
    }

    #[test]
    fn test_exceptions_only_blocklist_reported_empty() {
        let dir = tempdir().unwrap();
        let writer = DomainListWriter::new(dir.path()).unwrap();
        let fetcher = MapFetcher::new(&[
            ("exceptions", "@@||ok.test^\n"),
            ("allow", "||allowed.test^\n"),
        ]);
        let pipeline = Pipeline::new(fetcher, 2);
        let sources = vec![
            FilterSource::new("exceptions", "Exceptions"),
            FilterSource::allowlist("allow", "Allow"),
        ];

        let summary = pipeline
            .write_all(&sources, &writer, WriteOptions::default())
            .unwrap();

        assert_eq!(summary.empty, vec!["Exceptions".to_string()]);
        assert_eq!(summary.written.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("exceptions.allow.txt")).unwrap(),
            "ok.test\n"
        );
    }

    #[test]
    fn test_combined_locator_lists_merged_sources_only() {
        let dir = tempdir().unwrap();
        let writer = DomainListWriter::new(dir.path()).unwrap();
        let fetcher = MapFetcher::new(&[("a", "||a.test^\n"), ("blank", "! nothing\n"), ("b", "b.test\n")]);
        let pipeline = Pipeline::new(fetcher, 2);
        let sources = vec![
            FilterSource::new("a", "A"),
            FilterSource::new("missing", "Missing"),
            FilterSource::new("blank", "Blank"),
            FilterSource::new("b", "B"),
        ];

        pipeline
            .write_all(
                &sources,
                &writer,
                WriteOptions {
                    write_empty: false,
                    merge: true,
                },
            )
            .unwrap();

        let manifest = Manifest::load(dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.get(COMBINED_LIST).unwrap().locator, "a,b");
        assert_eq!(manifest.get(COMBINED_LIST).unwrap().blocked, 2);
    }

    #[test]
    fn test_write_custom_rules() {
        let dir = tempdir().unwrap();
        let writer = DomainListWriter::new(dir.path()).unwrap();
        let pipeline = Pipeline::new(MapFetcher::new(&[]), 1);

        let written = pipeline
            .write_custom_rules(["||b.test^ ||a.test^"], &writer, false)
            .unwrap()
            .unwrap();
        assert_eq!(fs::read_to_string(written).unwrap(), "a.test\nb.test\n");

        let none = pipeline
            .write_custom_rules(["no rules here"], &writer, false)
            .unwrap();
        assert!(none.is_none());
    }
}
