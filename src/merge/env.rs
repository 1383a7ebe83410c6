//! Env-file reconciliation
//!
//! Dotenv files are merged line-wise: the existing content is kept verbatim
//! (including comments and ordering), and only freshly generated declaration
//! lines whose key is not already declared are appended, after one blank
//! separator line. Existing values always win - a re-run never rewrites a
//! key the user has changed.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// `KEY=...` declaration at the start of a line, optional `export` prefix.
/// `#` comments never match, so they are ignored for parsing but preserved
/// verbatim as part of the existing content.
fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=").expect("valid env regex")
    })
}

fn declared_key(line: &str) -> Option<&str> {
    declaration_re()
        .captures(line)
        .map(|c| c.get(1).expect("group 1 always present").as_str())
}

/// Merge freshly generated env content into existing env content.
///
/// Returns the final text to write. Idempotent: once every generated key is
/// present, the existing content is returned unchanged.
pub fn merge_env(existing: &str, new: &str) -> String {
    let mut present: HashSet<&str> = existing.lines().filter_map(declared_key).collect();

    let mut additions: Vec<&str> = Vec::new();
    for line in new.lines() {
        if let Some(key) = declared_key(line) {
            if !present.contains(key) {
                present.insert(key);
                additions.push(line);
            }
        }
    }

    if additions.is_empty() {
        return existing.to_string();
    }

    tracing::debug!("env merge: appending {} new key(s)", additions.len());

    let mut result = existing.to_string();
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    // one blank separator line between user content and the generated block
    result.push('\n');
    for line in additions {
        result.push_str(line);
        result.push('\n');
    }
    result
}
