//! Domain list output files.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{DomainSet, Result, RuleListResult};

/// Paths written for one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenList {
    /// File-name stem used for both files
    pub slug: String,
    /// Blocked domains file
    pub blocked_path: PathBuf,
    /// Allowed domains file, only written when there were exceptions
    pub allowed_path: Option<PathBuf>,
}

/// Writes `<slug>.txt` and `<slug>.allow.txt` into an output directory.
pub struct DomainListWriter {
    output_dir: PathBuf,
}

impl DomainListWriter {
    /// Create a writer for `output_dir`, creating the directory if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the result for the list called `name`.
    ///
    /// A stale allow file from an earlier run is removed when the new result
    /// has no exceptions.
    pub fn write(&self, name: &str, result: &RuleListResult) -> Result<WrittenList> {
        let slug = slugify(name);
        let blocked_path = self.output_dir.join(format!("{}.txt", slug));
        let allow_path = self.output_dir.join(format!("{}.allow.txt", slug));

        write_file(&blocked_path, &result.blocked)?;
        log::info!(
            "Wrote {} blocked domains to {:?}",
            result.blocked.len(),
            blocked_path
        );

        let allowed_path = if result.allowed.is_empty() {
            if allow_path.exists() {
                fs::remove_file(&allow_path)?;
            }
            None
        } else {
            write_file(&allow_path, &result.allowed)?;
            log::info!(
                "Wrote {} allowed domains to {:?}",
                result.allowed.len(),
                allow_path
            );
            Some(allow_path)
        };

        Ok(WrittenList {
            slug,
            blocked_path,
            allowed_path,
        })
    }

    /// Write a bare domain set to `<slug>.txt`.
    pub fn write_set(&self, name: &str, domains: &DomainSet) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.txt", slugify(name)));
        write_file(&path, domains)?;
        log::info!("Wrote {} domains to {:?}", domains.len(), path);
        Ok(path)
    }
}

/// Write one domain per line to `path`.
///
/// Goes through a temp file in the same directory, then renames into place,
/// so readers never see a half-written list.
pub fn write_file(path: impl AsRef<Path>, domains: &DomainSet) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir)?;
    domains.write_lines(BufWriter::new(temp.as_file()))?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Turn a display name into a file-name stem.
///
/// ASCII letters and digits are kept (lowercased), every other run of
/// characters becomes a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "list".to_string()
    } else {
        slug
    }
}
