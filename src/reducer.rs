//! Reduction of classified entries into blocked/allowed domain sets.

use crate::{ClassifiedEntry, DomainSet};

/// Blocked and allowed domains extracted from one source (or several,
/// after [`RuleListResult::merge`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleListResult {
    /// Domains to block
    pub blocked: DomainSet,
    /// Exception domains
    pub allowed: DomainSet,
}

impl RuleListResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no blocked domains were extracted.
    ///
    /// Callers treat this as "no domains extracted": a warning, not a failure.
    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Union another result into this one.
    ///
    /// Merging is associative and commutative, so per-source results can be
    /// combined in any order.
    pub fn merge(&mut self, other: RuleListResult) {
        self.blocked.union_with(other.blocked);
        self.allowed.union_with(other.allowed);
    }
}

/// Streaming reducer.
///
/// Feed entries with [`push`](Self::push) as lines are classified, then take
/// the result with [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct RuleSetReducer {
    result: RuleListResult,
    ignored: usize,
}

impl RuleSetReducer {
    /// Create a new reducer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one classified entry.
    pub fn push(&mut self, entry: ClassifiedEntry) {
        match entry {
            ClassifiedEntry::Ignored => self.ignored += 1,
            ClassifiedEntry::Blocked(domain) => {
                self.result.blocked.insert(domain);
            }
            ClassifiedEntry::Allowed(domain) => {
                self.result.allowed.insert(domain);
            }
        }
    }

    /// Number of ignored entries seen so far.
    pub fn ignored_count(&self) -> usize {
        self.ignored
    }

    /// Finish reduction.
    pub fn finish(self) -> RuleListResult {
        self.result
    }
}

impl Extend<ClassifiedEntry> for RuleSetReducer {
    fn extend<I: IntoIterator<Item = ClassifiedEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// Reduce classified entries into sorted, deduplicated blocked/allowed sets.
///
/// Ignored entries are discarded. The output does not depend on input order.
pub fn reduce<I>(entries: I) -> RuleListResult
where
    I: IntoIterator<Item = ClassifiedEntry>,
{
    let mut reducer = RuleSetReducer::new();
    reducer.extend(entries);
    reducer.finish()
}
