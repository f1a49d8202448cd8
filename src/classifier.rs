//! Line classification for AdGuard, hosts and plain domain lists.
//!
//! A raw line is matched against an ordered table of patterns; the first
//! pattern that matches decides the outcome. The table, highest priority
//! first:
//!
//! 1. blank lines and `!` comments are ignored
//! 2. `@@||domain^` is an exception (allowed)
//! 3. `||domain^` or `||domain^$important` is blocked
//! 4. a line that is only a domain name is blocked
//! 5. `0.0.0.0 domain` / `127.0.0.1 domain` is blocked
//! 6. any other `a.b.c.d domain` hosts line is blocked
//!
//! Domains are returned exactly as written. No lowercasing or trailing-dot
//! stripping happens here.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::Disposition;

/// Result of classifying one raw line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassifiedEntry {
    /// Nothing usable on this line
    Ignored,
    /// Domain to block
    Blocked(String),
    /// Domain to allow
    Allowed(String),
}

impl ClassifiedEntry {
    /// Build an entry from a disposition and a domain.
    ///
    /// `Disposition::Ignored` always yields `ClassifiedEntry::Ignored`.
    pub fn new(disposition: Disposition, domain: impl Into<String>) -> Self {
        match disposition {
            Disposition::Ignored => ClassifiedEntry::Ignored,
            Disposition::Blocked => ClassifiedEntry::Blocked(domain.into()),
            Disposition::Allowed => ClassifiedEntry::Allowed(domain.into()),
        }
    }

    /// Get the disposition of this entry.
    pub fn disposition(&self) -> Disposition {
        match self {
            ClassifiedEntry::Ignored => Disposition::Ignored,
            ClassifiedEntry::Blocked(_) => Disposition::Blocked,
            ClassifiedEntry::Allowed(_) => Disposition::Allowed,
        }
    }

    /// Get the extracted domain, if any.
    pub fn domain(&self) -> Option<&str> {
        match self {
            ClassifiedEntry::Ignored => None,
            ClassifiedEntry::Blocked(d) | ClassifiedEntry::Allowed(d) => Some(d),
        }
    }

    /// Whether this entry carries no domain.
    pub fn is_ignored(&self) -> bool {
        matches!(self, ClassifiedEntry::Ignored)
    }
}

/// One row of the classification table.
struct LinePattern {
    name: &'static str,
    regex: Regex,
    disposition: Disposition,
}

impl LinePattern {
    fn new(name: &'static str, pattern: &str, disposition: Disposition) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap(),
            disposition,
        }
    }

    /// Return the captured `domain` group if the line matches.
    fn extract<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.regex
            .captures(line)
            .and_then(|caps| caps.name("domain"))
            .map(|m| m.as_str())
    }
}

/// Classification table, evaluated top to bottom.
///
/// The exception row must stay ahead of the block row: both are anchored,
/// but `@@||` lines must never be reported as blocked.
static PATTERNS: Lazy<Vec<LinePattern>> = Lazy::new(|| {
    vec![
        LinePattern::new(
            "adguard-exception",
            r"^@@\|\|(?P<domain>[A-Za-z0-9.-]+)\^$",
            Disposition::Allowed,
        ),
        LinePattern::new(
            "adguard-block",
            r"^\|\|(?P<domain>[A-Za-z0-9.-]+)\^(?:\$important)?$",
            Disposition::Blocked,
        ),
        LinePattern::new(
            "bare-domain",
            r"^(?P<domain>[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,})$",
            Disposition::Blocked,
        ),
        LinePattern::new(
            "hosts-loopback",
            r"^(?:0\.0\.0\.0|127\.0\.0\.1)\s+(?P<domain>[A-Za-z0-9.-]+)(?:\s|#|$)",
            Disposition::Blocked,
        ),
        LinePattern::new(
            "hosts",
            r"^[0-9]{1,3}(?:\.[0-9]{1,3}){3}\s+(?P<domain>[A-Za-z0-9.-]+)(?:\s|#|$)",
            Disposition::Blocked,
        ),
    ]
});

/// Classify a single raw line.
///
/// Surrounding whitespace (including a trailing `\r` from CRLF files) is
/// trimmed first. Lines that match no pattern are `Ignored`, never an error.
///
/// # Example
/// ```
/// use domlist::{classify, ClassifiedEntry};
///
/// assert_eq!(
///     classify("||ads.example.com^$important"),
///     ClassifiedEntry::Blocked("ads.example.com".to_string())
/// );
/// assert_eq!(
///     classify("@@||ok.example.com^"),
///     ClassifiedEntry::Allowed("ok.example.com".to_string())
/// );
/// assert_eq!(classify("! comment"), ClassifiedEntry::Ignored);
/// ```
pub fn classify(line: &str) -> ClassifiedEntry {
    let line = line.trim();

    if line.is_empty() || line.starts_with('!') {
        return ClassifiedEntry::Ignored;
    }

    for pattern in PATTERNS.iter() {
        if let Some(domain) = pattern.extract(line) {
            log::trace!("{} matched {:?} as {}", pattern.name, line, pattern.disposition);
            return ClassifiedEntry::new(pattern.disposition, domain);
        }
    }

    ClassifiedEntry::Ignored
}

/// Classify every line of an iterator, dropping ignored lines.
pub fn classify_lines<'a, I>(lines: I) -> impl Iterator<Item = ClassifiedEntry> + 'a
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: 'a,
{
    lines
        .into_iter()
        .map(classify)
        .filter(|entry| !entry.is_ignored())
}
