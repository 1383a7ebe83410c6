//! Integration tests for the reforge engine
//!
//! Each module exercises one slice of the public API end to end, over real
//! temp directories:
//! - `tree` - tree materialization, path rendering, ignores, binaries
//! - `reconcile` - per-category merge behavior over hand-edited targets
//! - `idempotence` - re-running a render over its own output is a no-op
//! - `hooks` - template extension points through the full engine

mod common;

mod hooks;
mod idempotence;
mod reconcile;
mod tree;
