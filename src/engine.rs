//! The engine facade
//!
//! [`Engine`] wires the resolver, classifier, templating layer and merge
//! strategies together behind four operations:
//!
//! - [`Engine::render`] - resolve a template reference and render it to a
//!   string
//! - [`Engine::render_to_file`] - render and reconcile onto one destination
//!   file
//! - [`Engine::render_tree`] - materialize a whole template directory into a
//!   destination tree
//! - [`Engine::exists`] - probe whether a reference resolves
//!
//! The engine itself is immutable after construction and safe to share; all
//! per-render state (contexts, hook scopes) lives on the call.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as AnyhowContext, Result};
use tera::Context;

use crate::classify::Classifier;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::materialize::Materializer;
use crate::merge;
use crate::resolver::TemplateResolver;
use crate::templating::{self, HookScope};

/// Per-call options for [`Engine::render_tree`].
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Extra exclude patterns for this render, on top of the engine's
    /// configured ignore patterns and the built-in baseline.
    pub exclude: Vec<String>,
    /// Structurally merge module sources instead of overwriting them.
    /// Manifests and env files merge regardless.
    pub merge: bool,
}

/// Template rendering and reconciliation engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    resolver: TemplateResolver,
    classifier: Classifier,
    hooks: Arc<HashMap<String, PathBuf>>,
}

impl Engine {
    /// Build an engine from its configuration.
    pub fn new(config: EngineConfig) -> Self {
        let resolver = TemplateResolver::new(config.template_roots.clone());
        let classifier = Classifier::new(&config.binary_extensions);
        let hooks = Arc::new(config.hooks.clone());
        Self {
            config,
            resolver,
            classifier,
            hooks,
        }
    }

    /// Whether `reference` resolves against any template root.
    pub fn exists(&self, reference: &str) -> bool {
        self.resolver.exists(reference)
    }

    /// Resolve and render a single template to a string.
    pub async fn render(&self, reference: &str, context: &Context) -> Result<String> {
        let path = self.resolver.resolve_required(reference)?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read template {}", path.display()))?;

        let scope = self.scope_for(&path);
        let rendered =
            templating::render_str(&content, context, &scope).map_err(|source| {
                EngineError::Render {
                    reference: reference.to_string(),
                    source,
                }
            })?;
        Ok(rendered)
    }

    /// Render a template and reconcile the result onto `dest` according to
    /// the destination's file category.
    pub async fn render_to_file(
        &self,
        reference: &str,
        dest: &Path,
        context: &Context,
        merge: bool,
    ) -> Result<()> {
        let rendered = self.render(reference, context).await?;
        let category = self.classifier.classify(dest);
        merge::reconcile(dest, category, &rendered, merge).await
    }

    /// Materialize the template directory `source` into `dest_root`.
    ///
    /// Returns the number of files materialized.
    pub async fn render_tree(
        &self,
        source: &str,
        dest_root: &Path,
        context: &Context,
        options: &TreeOptions,
    ) -> Result<usize> {
        let src_root = self.resolver.resolve_required(source)?;
        if !src_root.is_dir() {
            bail!(
                "template tree '{source}' resolved to {}, which is not a directory",
                src_root.display()
            );
        }

        let materializer = Materializer {
            config: &self.config,
            resolver: &self.resolver,
            classifier: &self.classifier,
            hooks: Arc::clone(&self.hooks),
        };
        materializer.run(&src_root, dest_root, context, options).await
    }

    /// Hook scope for a template resolved at `path`: the configured registry
    /// plus a convention snippet directory when a blueprint root is set.
    fn scope_for(&self, path: &Path) -> HookScope {
        let convention = self.config.blueprint_root.as_ref().and_then(|bp| {
            self.resolver
                .relative_to_root(path)
                .map(|rel| HookScope::convention_dir_for(bp, &rel))
        });
        HookScope::new(Arc::clone(&self.hooks), self.resolver.clone(), convention)
    }
}
