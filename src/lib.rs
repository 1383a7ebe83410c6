//! reforge - Template Rendering & Reconciliation Engine
//!
//! A scaffolding engine that renders Tera templates into a pre-existing,
//! possibly hand-edited, target directory tree and can re-apply the same
//! templates later without destroying prior edits.
//!
//! # Architecture Overview
//!
//! The engine is built from five components, leaves first:
//! - [`resolver`] - resolves a template reference across an ordered list of
//!   template roots (first match wins, so blueprint-local roots override
//!   shared ones)
//! - [`classify`] - maps a destination path to a closed [`classify::FileCategory`]
//!   (manifest / env / module-source / binary / generic-text)
//! - [`merge`] - per-category reconciliation strategies, including the
//!   structural source merge for ECMAScript/TypeScript modules
//! - [`templating`] - Tera-based directive rendering with a recursive
//!   `hook(name=...)` extension-point mechanism
//! - [`materialize`] - walks a template tree, renders or copies each file,
//!   and reconciles the output into the destination
//!
//! [`engine::Engine`] composes all five behind a small async API.
//!
//! # Reconciliation Guarantees
//!
//! - **Idempotent**: re-running a render over its own merged output is a
//!   no-op for every file category.
//! - **Loss-avoiding**: user content is kept verbatim, merged field-wise, or
//!   explicitly wrapped in a superseded comment block - never deleted.
//! - **Degrades safely**: any parse failure during a manifest or structural
//!   merge falls back to a full overwrite instead of erroring out.
//!
//! # Example
//!
//! ```rust,no_run
//! use reforge::config::EngineConfig;
//! use reforge::engine::{Engine, TreeOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = EngineConfig::new(vec![
//!     PathBuf::from("blueprints/api/templates"),
//!     PathBuf::from("blueprints/shared/templates"),
//! ]);
//! let engine = Engine::new(config);
//!
//! let mut context = tera::Context::new();
//! context.insert("name", "billing");
//!
//! engine
//!     .render_tree(
//!         "module",
//!         &PathBuf::from("packages/billing"),
//!         &context,
//!         &TreeOptions { exclude: vec![], merge: true },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod materialize;
pub mod merge;
pub mod resolver;
pub mod templating;
pub mod utils;

pub use config::EngineConfig;
pub use engine::{Engine, TreeOptions};
pub use error::EngineError;
