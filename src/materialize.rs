//! Directory-tree materialization
//!
//! Walks a template tree deterministically (sorted, no symlink following),
//! renders each text file and its relative path, copies binary files
//! byte-for-byte, and reconciles every output into the destination tree via
//! the per-category merge strategies.
//!
//! Path rules:
//! - the `.tera` suffix is stripped from destination names
//!   (`index.ts.tera` lands as `index.ts`)
//! - relative paths containing directives are themselves rendered, so a
//!   `{{ name }}.service.ts.tera` template names its output after the
//!   context
//! - a rendered path may never be absolute or contain `..`

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as AnyhowContext, Result};
use glob::Pattern;
use tera::Context;
use walkdir::WalkDir;

use crate::classify::{Classifier, FileCategory};
use crate::config::{EngineConfig, TEMPLATE_SUFFIX};
use crate::engine::TreeOptions;
use crate::error::EngineError;
use crate::merge;
use crate::resolver::TemplateResolver;
use crate::templating::{self, HookScope};
use crate::utils::fs as futils;

/// Names skipped in every tree render.
const BASELINE_IGNORES: &[&str] = &["node_modules", ".git", ".hg", ".DS_Store", "Thumbs.db"];

/// One tree-render pass over a source template directory.
pub(crate) struct Materializer<'a> {
    pub config: &'a EngineConfig,
    pub resolver: &'a TemplateResolver,
    pub classifier: &'a Classifier,
    pub hooks: Arc<HashMap<String, PathBuf>>,
}

impl Materializer<'_> {
    /// Render `src_root` into `dest_root`. Returns the number of files
    /// materialized (written or confirmed unchanged).
    pub async fn run(
        &self,
        src_root: &Path,
        dest_root: &Path,
        context: &Context,
        options: &TreeOptions,
    ) -> Result<usize> {
        let matcher = IgnoreMatcher::new(
            BASELINE_IGNORES
                .iter()
                .map(|s| (*s).to_string())
                .chain(self.config.ignore_patterns.iter().cloned())
                .chain(options.exclude.iter().cloned()),
        )?;

        tracing::info!(
            "materializing {} -> {}",
            src_root.display(),
            dest_root.display()
        );

        let mut count = 0usize;
        let walker = WalkDir::new(src_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(src_root)
                    .map(|rel| rel.as_os_str().is_empty() || !matcher.is_ignored(rel))
                    .unwrap_or(true)
            });

        for entry in walker {
            let entry = entry.context("failed to walk template tree")?;
            let rel = entry
                .path()
                .strip_prefix(src_root)
                .context("walked entry outside the source root")?;
            if rel.as_os_str().is_empty() {
                continue;
            }

            let dest_rel = self.render_path(&strip_template_suffix(rel), context)?;

            if entry.file_type().is_dir() {
                // keeps intentionally empty directories in the scaffold
                futils::ensure_dir(&dest_root.join(&dest_rel))?;
                continue;
            }
            if !entry.file_type().is_file() {
                tracing::debug!("skipping non-regular file {}", rel.display());
                continue;
            }

            let dest = dest_root.join(&dest_rel);
            let category = self.classifier.classify(&dest);

            if category == FileCategory::Binary {
                copy_binary(entry.path(), &dest).await?;
                count += 1;
                continue;
            }

            let content = tokio::fs::read_to_string(entry.path())
                .await
                .with_context(|| format!("failed to read template {}", entry.path().display()))?;

            let scope = self.scope_for(entry.path(), rel);
            let reference = rel.display().to_string();
            let rendered = templating::render_str(&content, context, &scope)
                .map_err(|source| EngineError::Render { reference, source })?;

            merge::reconcile(&dest, category, &rendered, options.merge).await?;
            count += 1;
        }

        tracing::info!("materialized {count} file(s) into {}", dest_root.display());
        Ok(count)
    }

    /// Hook scope for one template file: the shared registry plus the
    /// convention snippet directory derived from the template's path inside
    /// its root.
    fn scope_for(&self, template_path: &Path, rel_in_tree: &Path) -> HookScope {
        let convention = self.config.blueprint_root.as_ref().map(|bp| {
            let rel = self
                .resolver
                .relative_to_root(template_path)
                .unwrap_or_else(|| rel_in_tree.to_path_buf());
            HookScope::convention_dir_for(bp, &rel)
        });
        HookScope::new(Arc::clone(&self.hooks), self.resolver.clone(), convention)
    }

    /// Render directives inside a relative path and validate the result
    /// stays under the destination root.
    fn render_path(&self, rel: &Path, context: &Context) -> Result<PathBuf> {
        let raw = rel.to_string_lossy().replace('\\', "/");
        if !raw.contains("{{") && !raw.contains("{%") {
            return Ok(rel.to_path_buf());
        }

        let scope = HookScope::new(Arc::clone(&self.hooks), self.resolver.clone(), None);
        let rendered = templating::render_str(&raw, context, &scope)
            .map_err(|source| EngineError::Render {
                reference: raw.clone(),
                source,
            })?;

        let path = PathBuf::from(&rendered);
        if rendered.trim().is_empty()
            || path.is_absolute()
            || path.components().any(|c| matches!(c, Component::ParentDir))
        {
            bail!("rendered path '{rendered}' (from '{raw}') escapes the destination root");
        }
        tracing::debug!("path rendered: {raw} -> {rendered}");
        Ok(path)
    }
}

/// Copy a binary file byte-for-byte, skipping the write when the destination
/// already holds identical bytes.
async fn copy_binary(src: &Path, dest: &Path) -> Result<()> {
    let bytes = tokio::fs::read(src)
        .await
        .with_context(|| format!("failed to read binary file {}", src.display()))?;

    if tokio::fs::try_exists(dest).await? {
        let current = tokio::fs::read(dest).await?;
        if current == bytes {
            tracing::debug!("unchanged binary: {}", dest.display());
            return Ok(());
        }
    }

    tracing::debug!("copying binary: {}", dest.display());
    futils::atomic_write(dest, &bytes)?;
    Ok(())
}

/// Strip a trailing `.tera` from the file name; inner extensions stay.
fn strip_template_suffix(rel: &Path) -> PathBuf {
    let suffix = format!(".{TEMPLATE_SUFFIX}");
    match rel.file_name().and_then(|n| n.to_str()) {
        Some(name) if name.len() > suffix.len() && name.ends_with(&suffix) => {
            rel.with_file_name(&name[..name.len() - suffix.len()])
        }
        _ => rel.to_path_buf(),
    }
}

/// Ignore matching over relative paths: literal patterns match any path
/// component (so `node_modules` prunes the whole directory anywhere in the
/// tree), wildcard patterns match the full relative path or any component.
struct IgnoreMatcher {
    literals: Vec<String>,
    globs: Vec<Pattern>,
}

impl IgnoreMatcher {
    fn new(patterns: impl Iterator<Item = String>) -> Result<Self> {
        let mut literals = Vec::new();
        let mut globs = Vec::new();
        for pattern in patterns {
            if pattern.contains(['*', '?', '[']) {
                globs.push(
                    Pattern::new(&pattern)
                        .with_context(|| format!("invalid ignore pattern '{pattern}'"))?,
                );
            } else {
                literals.push(pattern);
            }
        }
        Ok(Self { literals, globs })
    }

    fn is_ignored(&self, rel: &Path) -> bool {
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        for literal in &self.literals {
            if rel_str == *literal
                || rel.components().any(|c| c.as_os_str() == literal.as_str())
            {
                return true;
            }
        }
        for glob in &self.globs {
            if glob.matches(&rel_str) {
                return true;
            }
            if rel
                .components()
                .any(|c| glob.matches(&c.as_os_str().to_string_lossy()))
            {
                return true;
            }
        }
        false
    }
}
