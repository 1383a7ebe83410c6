//! Hook resolution and the `hook`/`has_hook` Tera functions
//!
//! Hook snippets are resolved per render call through a [`HookScope`] that
//! is cloned into the registered functions - there is no process-wide
//! registry, so two concurrent engine instances (or two sequential renders
//! with different scopes) can never observe each other's hooks.
//!
//! Snippet reads are synchronous `std::fs` calls performed inside the Tera
//! function, mirroring how project-file embedding filters do their I/O; the
//! surrounding engine API stays async.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tera::{Context, Value};

use crate::config::TEMPLATE_SUFFIX;
use crate::error::EngineError;
use crate::resolver::TemplateResolver;

/// Maximum nesting depth for recursive hook rendering.
///
/// Prevents infinite loops when snippets invoke each other cyclically.
pub const MAX_HOOK_DEPTH: usize = 10;

/// Everything one render call needs to resolve hook snippets.
///
/// Created fresh per render (per file during a tree render, so convention
/// paths track the file being rendered) and cloned into the Tera functions.
#[derive(Debug, Clone)]
pub struct HookScope {
    /// Explicit hook-name -> snippet-path registry from blueprint metadata.
    registry: Arc<HashMap<String, PathBuf>>,
    /// Resolver for relative registry entries.
    resolver: TemplateResolver,
    /// Directory holding convention snippets for the current template,
    /// `{blueprint_root}/snippets/{template_rel_without_ext}`. `None` when
    /// no blueprint root is configured.
    convention_dir: Option<PathBuf>,
}

impl HookScope {
    /// Build a scope from a shared registry, a resolver and an optional
    /// convention snippet directory.
    pub fn new(
        registry: Arc<HashMap<String, PathBuf>>,
        resolver: TemplateResolver,
        convention_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            registry,
            resolver,
            convention_dir,
        }
    }

    /// Derive the convention snippet directory for a template at
    /// `template_rel` (relative to its root): the template suffix and the
    /// remaining inner extension are stripped, then appended to
    /// `{blueprint_root}/snippets/`.
    ///
    /// `pages/index.ts.tera` under blueprint root `bp` yields
    /// `bp/snippets/pages/index`.
    pub fn convention_dir_for(blueprint_root: &Path, template_rel: &Path) -> PathBuf {
        let mut rel = template_rel.to_path_buf();
        if rel
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(TEMPLATE_SUFFIX))
        {
            rel.set_extension("");
        }
        rel.set_extension("");
        blueprint_root.join("snippets").join(rel)
    }

    /// Find the snippet file for a hook name, or `None` when the hook has no
    /// content (which renders as the empty string - hooks are optional).
    ///
    /// An explicit registry entry that fails to resolve is logged and
    /// treated as absent rather than failing the render.
    fn find_snippet(&self, name: &str) -> Option<PathBuf> {
        if let Some(entry) = self.registry.get(name) {
            let resolved = if entry.is_absolute() {
                entry.exists().then(|| entry.clone())
            } else {
                self.resolver.resolve(&entry.to_string_lossy())
            };
            if resolved.is_none() {
                tracing::warn!(
                    "hook '{}' is registered at '{}' but the snippet does not resolve; \
                     rendering it as empty",
                    name,
                    entry.display()
                );
            }
            return resolved;
        }

        if let Some(dir) = &self.convention_dir {
            let candidate = dir.join(format!("{name}.{TEMPLATE_SUFFIX}"));
            if candidate.is_file() {
                tracing::debug!(
                    "hook '{}' resolved by convention: {}",
                    name,
                    candidate.display()
                );
                return Some(candidate);
            }
        }
        None
    }
}

fn hook_name_arg(args: &HashMap<String, Value>) -> tera::Result<String> {
    args.get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| tera::Error::msg("hook requires a string `name` argument"))
}

/// Create the `hook(name=...)` function for one render call.
///
/// The snippet is read and recursively rendered with the caller's context
/// (cloned) and a fresh hook callable bound to the same scope, so snippets
/// can invoke further hooks up to [`MAX_HOOK_DEPTH`] levels deep.
pub fn create_hook_function(
    scope: HookScope,
    context: Context,
    depth: usize,
) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let name = hook_name_arg(args)?;

        let Some(snippet_path) = scope.find_snippet(&name) else {
            return Ok(Value::String(String::new()));
        };

        if depth + 1 > MAX_HOOK_DEPTH {
            return Err(tera::Error::msg(
                EngineError::HookRecursion {
                    name,
                    max: MAX_HOOK_DEPTH,
                }
                .to_string(),
            ));
        }

        let snippet = match std::fs::read_to_string(&snippet_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(
                    "hook '{}': failed to read snippet {}: {}; rendering it as empty",
                    name,
                    snippet_path.display(),
                    e
                );
                return Ok(Value::String(String::new()));
            }
        };

        let rendered = super::render_at_depth(&snippet, &context, &scope, depth + 1)
            .map_err(|e| {
                tera::Error::msg(format!(
                    "hook '{name}' failed to render: {}",
                    flatten_error(&e)
                ))
            })?;
        Ok(Value::String(rendered))
    }
}

/// Flatten a Tera error chain into one message. `Display` alone shows only
/// the outermost layer (typically the unhelpful `__tera_one_off` wrapper),
/// and the real cause of a nested snippet failure sits at the bottom.
fn flatten_error(error: &tera::Error) -> String {
    use std::error::Error as _;
    let mut messages = vec![error.to_string()];
    let mut source = error.source();
    while let Some(err) = source {
        messages.push(err.to_string());
        source = err.source();
    }
    messages.join(": ")
}

/// Create the `has_hook(name=...)` predicate for one render call.
///
/// True when a snippet file exists for the name; never invokes the hook.
pub fn create_has_hook_function(scope: HookScope) -> impl tera::Function + 'static {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let name = hook_name_arg(args)?;
        Ok(Value::Bool(scope.find_snippet(&name).is_some()))
    }
}
