//! Template resolution across ordered roots
//!
//! A template reference is either an absolute path (used as-is when it
//! exists) or a path relative to one of the configured template roots.
//! Roots are searched in order and the first match wins, which is what lets
//! a blueprint-local root shadow a shared one. When the reference lacks the
//! template suffix, each root is retried with the suffix appended, so
//! callers can write `module/index.ts` and resolve `module/index.ts.tera`.

use std::path::{Path, PathBuf};

use crate::config::TEMPLATE_SUFFIX;
use crate::error::EngineError;

/// Resolves template references against an ordered list of root directories.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    roots: Vec<PathBuf>,
}

impl TemplateResolver {
    /// Create a resolver over the given roots, highest precedence first.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// The roots this resolver searches, in precedence order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve a reference to an existing path, or `None` when no root
    /// contains it.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let as_path = Path::new(reference);
        if as_path.is_absolute() {
            if as_path.exists() {
                return Some(as_path.to_path_buf());
            }
            return None;
        }

        let has_suffix = reference.ends_with(&format!(".{TEMPLATE_SUFFIX}"));
        for root in &self.roots {
            let candidate = root.join(reference);
            if candidate.exists() {
                tracing::debug!(
                    "resolved '{}' -> {} (root {})",
                    reference,
                    candidate.display(),
                    root.display()
                );
                return Some(candidate);
            }
            if !has_suffix {
                let with_suffix = root.join(format!("{reference}.{TEMPLATE_SUFFIX}"));
                if with_suffix.exists() {
                    tracing::debug!(
                        "resolved '{}' -> {} (suffix retry, root {})",
                        reference,
                        with_suffix.display(),
                        root.display()
                    );
                    return Some(with_suffix);
                }
            }
        }
        None
    }

    /// Resolve a reference, failing with [`EngineError::TemplateNotFound`]
    /// when every root has been exhausted. Direct render calls use this; the
    /// `exists` query goes through [`Self::resolve`] instead.
    pub fn resolve_required(&self, reference: &str) -> Result<PathBuf, EngineError> {
        self.resolve(reference).ok_or_else(|| EngineError::TemplateNotFound {
            reference: reference.to_string(),
            roots: self
                .roots
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Whether the reference resolves against any root.
    pub fn exists(&self, reference: &str) -> bool {
        self.resolve(reference).is_some()
    }

    /// Relative path of a resolved template inside its winning root.
    ///
    /// Used to derive convention hook-snippet directories; absolute
    /// references outside every root have no relative form.
    pub fn relative_to_root(&self, resolved: &Path) -> Option<PathBuf> {
        self.roots
            .iter()
            .find_map(|root| resolved.strip_prefix(root).ok().map(Path::to_path_buf))
    }
}
