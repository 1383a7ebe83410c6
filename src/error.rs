//! Error handling for the reforge engine
//!
//! Typed failures for the cases callers can meaningfully react to; everything
//! else travels as [`anyhow::Error`] with context attached at the call site.
//!
//! Merge-time parse failures are deliberately NOT represented here: the merge
//! strategies degrade to a full overwrite instead of surfacing an error, so
//! a malformed manifest or source file can never abort a generation run.

use thiserror::Error;

/// Domain errors for template resolution and rendering.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A template reference could not be resolved against any template root.
    ///
    /// Raised only for direct render calls; [`crate::engine::Engine::exists`]
    /// reports the same condition as `false`.
    #[error("template '{reference}' not found in any template root (searched: {roots})")]
    TemplateNotFound {
        /// The reference as the caller supplied it
        reference: String,
        /// Comma-separated list of the roots that were searched
        roots: String,
    },

    /// Tera failed to render a template or a rendered destination path.
    #[error("failed to render template '{reference}'")]
    Render {
        /// The template reference or path expression being rendered
        reference: String,
        #[source]
        source: tera::Error,
    },

    /// Hook expansion recursed past the depth limit, usually a snippet
    /// invoking itself directly or through a cycle.
    #[error("hook '{name}' exceeded the maximum recursion depth of {max}")]
    HookRecursion {
        /// Name of the hook that overflowed
        name: String,
        /// The configured depth limit
        max: usize,
    },
}
