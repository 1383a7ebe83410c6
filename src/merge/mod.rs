//! Reconciliation strategies
//!
//! Decides what happens when freshly rendered content lands on a path that
//! may already exist, per [`FileCategory`]:
//!
//! | category      | merge on | merge off |
//! |---------------|----------|-----------|
//! | `Manifest`    | key-wise JSON union, existing values preserved outside the merged keys (always) | same |
//! | `Env`         | append keys not yet declared (always) | same |
//! | `ModuleSource`| statement-level structural merge | overwrite |
//! | `GenericText` | overwrite | overwrite |
//! | `Binary`      | handled upstream; never rendered or merged |
//!
//! Every structured strategy degrades to overwrite when its input does not
//! parse; the generated content is then the only trustworthy version and a
//! half-merged file would be worse than a clean regeneration.

pub mod env;
pub mod manifest;
pub mod source;

use std::path::Path;

use anyhow::Result;

use crate::classify::FileCategory;
use crate::utils::fs as futils;

/// Compute the final content for a destination, given what is already there.
///
/// Pure function over content; [`reconcile`] wraps it with the file I/O.
pub fn merge_content(
    existing: Option<&str>,
    new: &str,
    category: FileCategory,
    merge: bool,
) -> String {
    let Some(existing) = existing else {
        return new.to_string();
    };
    if existing == new {
        return existing.to_string();
    }

    match category {
        // env files and manifests always merge: regenerating must never
        // clobber local secrets, overrides, or user-owned manifest fields
        FileCategory::Env => env::merge_env(existing, new),
        FileCategory::Manifest => match manifest::merge_manifests(existing, new) {
            Some(merged) => merged,
            None => new.to_string(),
        },
        FileCategory::ModuleSource if merge => match source::merge_modules(existing, new) {
            Some(merged) => merged,
            None => new.to_string(),
        },
        FileCategory::ModuleSource | FileCategory::GenericText | FileCategory::Binary => {
            new.to_string()
        }
    }
}

/// Reconcile rendered content onto `dest`: read what exists, merge per the
/// category, and write atomically. Skips the write when the result matches
/// the current file byte-for-byte.
pub async fn reconcile(
    dest: &Path,
    category: FileCategory,
    new_content: &str,
    merge: bool,
) -> Result<()> {
    let existing = if tokio::fs::try_exists(dest).await? {
        Some(tokio::fs::read_to_string(dest).await?)
    } else {
        None
    };

    let final_content = merge_content(existing.as_deref(), new_content, category, merge);

    if existing.as_deref() == Some(final_content.as_str()) {
        tracing::debug!("unchanged: {}", dest.display());
        return Ok(());
    }

    tracing::debug!(
        "{}: {} ({:?})",
        if existing.is_some() { "update" } else { "create" },
        dest.display(),
        category
    );
    futils::safe_write(dest, &final_content)
}
