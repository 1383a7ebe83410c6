//! Output classification
//!
//! Maps a destination path to a closed content category by filename and
//! suffix only - no content sniffing. Every merge strategy dispatches on
//! [`FileCategory`] with an exhaustive match, so adding a category forces
//! every call site to decide what to do with it.

use std::collections::HashSet;
use std::path::Path;

/// Package-manifest filenames that get the key-wise JSON merge.
const MANIFEST_FILENAMES: &[&str] = &["package.json"];

/// Suffixes of structured ECMAScript/TypeScript module sources.
const MODULE_SOURCE_EXTENSIONS: &[&str] =
    &["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"];

/// Baseline non-text suffixes: images, fonts, archives, audio/video and
/// executables. Extended per-engine via
/// [`crate::config::EngineConfig::binary_extensions`].
const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "webp", "ico", "bmp", "tiff", "avif",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // archives
    "zip", "gz", "tgz", "tar", "bz2", "xz", "7z", "jar",
    // audio/video
    "mp3", "mp4", "wav", "ogg", "flac", "avi", "mov", "mkv", "webm",
    // misc binary payloads
    "pdf", "wasm", "exe", "dll", "so", "dylib", "bin", "class",
];

/// Content category of a destination file.
///
/// Closed set: the reconcile ladder in [`crate::merge`] matches on it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    /// A JSON package/project descriptor (`package.json`)
    Manifest,
    /// A dotenv-style `KEY=VALUE` file
    Env,
    /// An ECMAScript/TypeScript module eligible for structural merge
    ModuleSource,
    /// A non-text file; copied byte-for-byte, never rendered or merged
    Binary,
    /// Anything else; rendered and overwritten
    GenericText,
}

/// Classifies destination paths, with a configurable binary-suffix set.
#[derive(Debug, Clone)]
pub struct Classifier {
    binary_extensions: HashSet<String>,
}

impl Classifier {
    /// Build a classifier from the baseline binary set plus `extra`
    /// extensions (lowercase, no dot).
    pub fn new(extra_binary_extensions: &[String]) -> Self {
        let mut binary_extensions: HashSet<String> =
            BINARY_EXTENSIONS.iter().map(|e| (*e).to_string()).collect();
        binary_extensions.extend(extra_binary_extensions.iter().cloned());
        Self { binary_extensions }
    }

    /// Classify a destination path by its filename and suffix.
    pub fn classify(&self, path: &Path) -> FileCategory {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        if MANIFEST_FILENAMES.contains(&file_name) {
            return FileCategory::Manifest;
        }
        if is_env_file(file_name) {
            return FileCategory::Env;
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if self.binary_extensions.contains(&extension) {
            FileCategory::Binary
        } else if MODULE_SOURCE_EXTENSIONS.contains(&extension.as_str()) {
            FileCategory::ModuleSource
        } else {
            FileCategory::GenericText
        }
    }
}

/// Environment-file name patterns: `.env`, `.env.<anything>`, `<anything>.env`.
fn is_env_file(file_name: &str) -> bool {
    file_name == ".env" || file_name.starts_with(".env.") || file_name.ends_with(".env")
}
