//! Sorted, deduplicated domain collection.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::{ClassifiedEntry, Disposition};

/// A set of domain strings.
///
/// Equality is exact string equality (case-sensitive). Iteration yields
/// domains in ascending byte order, which for ASCII input is the same as
/// `LC_ALL=C sort -u`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    domains: BTreeSet<String>,
}

impl DomainSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a domain. Returns `false` if it was already present.
    pub fn insert(&mut self, domain: impl Into<String>) -> bool {
        self.domains.insert(domain.into())
    }

    /// Check whether a domain is present.
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Number of distinct domains.
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether the set holds no domains.
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Iterate domains in sorted order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.domains.iter()
    }

    /// Add every domain of `other` into this set.
    pub fn union_with(&mut self, other: DomainSet) {
        self.domains.extend(other.domains);
    }

    /// Turn the set back into classified entries with the given disposition.
    pub fn into_entries(self, disposition: Disposition) -> impl Iterator<Item = ClassifiedEntry> {
        self.domains
            .into_iter()
            .map(move |d| ClassifiedEntry::new(disposition, d))
    }

    /// Sorted domains as an owned vector.
    pub fn to_vec(&self) -> Vec<String> {
        self.domains.iter().cloned().collect()
    }

    /// Write one domain per line, each terminated by `\n`.
    pub fn write_lines<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for domain in &self.domains {
            writer.write_all(domain.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()
    }
}

impl<S: Into<String>> FromIterator<S> for DomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            domains: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for DomainSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.domains.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for DomainSet {
    type Item = String;
    type IntoIter = btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.into_iter()
    }
}

impl<'a> IntoIterator for &'a DomainSet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_sort() {
        let set: DomainSet = ["b.test", "a.test", "b.test", "A.test"].into_iter().collect();
        assert_eq!(set.len(), 3);
        // Uppercase sorts before lowercase in byte order
        assert_eq!(set.to_vec(), vec!["A.test", "a.test", "b.test"]);
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut set = DomainSet::new();
        assert!(set.insert("x.test"));
        assert!(!set.insert("x.test"));
        assert!(set.contains("x.test"));
        assert!(!set.contains("X.test"));
    }

    #[test]
    fn test_write_lines() {
        let set: DomainSet = ["z.test", "a.test"].into_iter().collect();
        let mut out = Vec::new();
        set.write_lines(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a.test\nz.test\n");
    }

    #[test]
    fn test_write_lines_empty() {
        let mut out = Vec::new();
        DomainSet::new().write_lines(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_into_entries() {
        let set: DomainSet = ["a.test"].into_iter().collect();
        let entries: Vec<_> = set.into_entries(Disposition::Allowed).collect();
        assert_eq!(entries, vec![ClassifiedEntry::Allowed("a.test".to_string())]);
    }
}
