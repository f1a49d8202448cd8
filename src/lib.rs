//! domlist - Convert ad-blocking rule lists into plain domain lists.
//!
//! This crate turns AdGuard filter lists, hosts files, plain domain lists and
//! the custom rules of an AdGuard Home backup into sorted, deduplicated
//! one-domain-per-line files that a DNS blocker can consume.
//!
//! # Features
//!
//! - **Line classification**: AdGuard `||domain^` / `@@||domain^` rules,
//!   hosts-file lines and bare domains, with fixed first-match priority
//! - **Reduction**: blocked and allowed domains collapsed into sorted sets
//! - **Custom rules**: anchored `||domain^` tokens pulled out of free text
//! - **Sources**: local files and HTTP(S) URLs, gzip handled transparently
//! - **Parallel runs**: independent sources processed on a bounded worker pool
//!
//! # Quick Start
//!
//! ```
//! use domlist::{classify, reduce};
//!
//! let lines = [
//!     "||ads.example.com^",
//!     "||ads.example.com^$important",
//!     "@@||ok.example.com^",
//!     "0.0.0.0 track.example.com",
//!     "! comment",
//!     "",
//! ];
//!
//! let result = reduce(lines.iter().map(|l| classify(l)));
//! assert_eq!(result.blocked.to_vec(), vec!["ads.example.com", "track.example.com"]);
//! assert_eq!(result.allowed.to_vec(), vec!["ok.example.com"]);
//! ```
//!
//! # Converting Sources
//!
//! ```ignore
//! use domlist::{DomainListWriter, FilterSource, Pipeline, SourceLoader, WriteOptions};
//! use std::time::Duration;
//!
//! let loader = SourceLoader::new(Duration::from_secs(60))?;
//! let pipeline = Pipeline::new(loader, 4);
//! let writer = DomainListWriter::new("lists")?;
//!
//! let sources = vec![FilterSource::new(
//!     "https://adguardteam.github.io/AdGuardSDNSFilter/Filter.txt",
//!     "AdGuard DNS filter",
//! )];
//! let summary = pipeline.write_all(&sources, &writer, WriteOptions::default())?;
//! ```
//!
//! # Classification Priority
//!
//! 1. Blank lines and `!` comments (ignored)
//! 2. `@@||domain^` exceptions (allowed)
//! 3. `||domain^` and `||domain^$important` (blocked)
//! 4. Bare domain lines (blocked)
//! 5. `0.0.0.0` / `127.0.0.1` hosts lines (blocked)
//! 6. Other IPv4 hosts lines (blocked)

mod classifier;
mod custom;
mod disposition;
mod domain_set;
mod error;
mod reducer;

pub mod backup;
pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod sink;
pub mod source;

// Re-export core types
pub use classifier::{classify, classify_lines, ClassifiedEntry};
pub use custom::extract_anchored_domains;
pub use disposition::Disposition;
pub use domain_set::DomainSet;
pub use error::{Error, Result};
pub use reducer::{reduce, RuleListResult, RuleSetReducer};

// Re-export driver types
pub use backup::AdGuardBackup;
pub use config::ConvertConfig;
pub use manifest::{Manifest, ManifestEntry};
pub use pipeline::{process_text, Pipeline, RunSummary, SourceOutcome, WriteOptions};
pub use sink::{slugify, DomainListWriter, WrittenList};
pub use source::{Fetch, FileFetcher, FilterSource, HttpFetcher, SourceKind, SourceLoader};
