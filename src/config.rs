//! Engine configuration
//!
//! Everything the engine consumes from its blueprint/config collaborator:
//! the ordered template-root list, the optional hook registry, extra binary
//! suffixes, and extra ignore patterns. All of it is fixed for the duration
//! of one generation invocation.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The template file suffix. Files carrying it are rendered and have the
/// suffix stripped from their destination path; everything else is treated
/// as a plain (but still rendered) text file.
pub const TEMPLATE_SUFFIX: &str = "tera";

/// Configuration for one [`crate::engine::Engine`] instance.
///
/// Roots are searched in order and the first match wins, so a
/// blueprint-local root must be listed before shared/global roots to enable
/// overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordered template roots, highest precedence first.
    pub template_roots: Vec<PathBuf>,
    /// Blueprint root used to derive convention hook-snippet paths
    /// (`{blueprint_root}/snippets/{template_rel}/{hook}.tera`). When unset,
    /// only explicitly registered hooks resolve.
    pub blueprint_root: Option<PathBuf>,
    /// Explicit hook-name to snippet-path registry from blueprint metadata.
    /// Relative paths are resolved across the template roots.
    pub hooks: HashMap<String, PathBuf>,
    /// Extra file extensions (lowercase, without dot) classified as binary
    /// on top of the built-in set.
    pub binary_extensions: Vec<String>,
    /// Extra ignore patterns applied to every tree render on top of the
    /// built-in baseline.
    pub ignore_patterns: Vec<String>,
}

impl EngineConfig {
    /// Create a configuration with the given template roots and defaults for
    /// everything else.
    pub fn new(template_roots: Vec<PathBuf>) -> Self {
        Self {
            template_roots,
            ..Self::default()
        }
    }

    /// Set the blueprint root used for convention hook-snippet lookup.
    #[must_use]
    pub fn with_blueprint_root(mut self, root: PathBuf) -> Self {
        self.blueprint_root = Some(root);
        self
    }

    /// Register an explicit hook snippet.
    #[must_use]
    pub fn with_hook(mut self, name: impl Into<String>, snippet: PathBuf) -> Self {
        self.hooks.insert(name.into(), snippet);
        self
    }

    /// Add file extensions to treat as binary.
    #[must_use]
    pub fn with_binary_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.binary_extensions
            .extend(extensions.into_iter().map(|e| e.into().to_lowercase()));
        self
    }

    /// Add ignore patterns applied to every tree render.
    #[must_use]
    pub fn with_ignore_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }
}
