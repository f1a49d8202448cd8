//! Anchored-domain extraction from free-form custom rule blocks.
//!
//! Custom rules (for example the `user_rules` of a configuration backup) are
//! not classified line by line. Every `||token^` occurrence anywhere in a
//! line is taken as a blocked domain, with no regard for `@@`, comments or
//! hosts syntax.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::DomainSet;

/// `||` followed by anything except quotes and `^`, closed by `^`.
static ANCHORED_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\|\|([^'^"]+)\^"#).unwrap());

/// Extract every anchored-domain token from an already bounded block of lines.
///
/// A line may contribute several domains; lines without a token contribute
/// nothing. The result is deduplicated and sorted like any [`DomainSet`].
///
/// # Example
/// ```
/// use domlist::extract_anchored_domains;
///
/// let set = extract_anchored_domains(["some text ||a.test^ more ||b.test^ junk"]);
/// assert_eq!(set.to_vec(), vec!["a.test", "b.test"]);
/// ```
pub fn extract_anchored_domains<I, S>(block: I) -> DomainSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut domains = DomainSet::new();

    for line in block {
        for caps in ANCHORED_TOKEN.captures_iter(line.as_ref()) {
            domains.insert(&caps[1]);
        }
    }

    if domains.is_empty() {
        log::warn!("No anchored domains found in custom rule block");
    }

    domains
}
