//! Directive rendering with Tera
//!
//! Templates are rendered with a fresh `Tera::default()` per call (cheap -
//! just empty maps) so the `hook`/`has_hook` functions registered for one
//! render can never leak into a sibling render. The context is a plain
//! [`tera::Context`]; recursive hook renders receive a clone of it plus the
//! hook callable itself, never a mutated original.
//!
//! # Hooks
//!
//! A hook is a named extension point in a template:
//!
//! ```text
//! export class {{ name }}Service {
//!   {{ hook(name="methods") }}
//! }
//! ```
//!
//! The snippet that fills it is looked up in this order:
//! 1. an explicit entry in the blueprint's hook registry,
//! 2. a convention path derived from the current template's relative path
//!    (`{blueprint_root}/snippets/{template_rel}/{name}.tera`),
//! 3. nowhere - hooks are optional and render to the empty string.
//!
//! Snippets are themselves templates and may invoke further hooks; recursion
//! is capped at [`hooks::MAX_HOOK_DEPTH`] levels.
//!
//! `has_hook(name="...")` reports whether rule 1 or 2 would find a snippet,
//! letting templates emit wrapper markup only when the hook has content,
//! without invoking it twice.

pub mod hooks;

pub use hooks::HookScope;

use tera::{Context, Tera};

/// Render a template string against a context, with hook support.
///
/// This is the single rendering entry point; the engine and the materializer
/// both go through it, as do recursive hook snippet renders (via
/// [`hooks::create_hook_function`]).
pub fn render_str(content: &str, context: &Context, scope: &HookScope) -> tera::Result<String> {
    render_at_depth(content, context, scope, 0)
}

/// Render at an explicit hook-recursion depth. Internal to the templating
/// module; depth 0 is a top-level render.
pub(crate) fn render_at_depth(
    content: &str,
    context: &Context,
    scope: &HookScope,
    depth: usize,
) -> tera::Result<String> {
    let mut tera = Tera::default();
    tera.register_function(
        "hook",
        hooks::create_hook_function(scope.clone(), context.clone(), depth),
    );
    tera.register_function("has_hook", hooks::create_has_hook_function(scope.clone()));
    tera.render_str(content, context)
}
