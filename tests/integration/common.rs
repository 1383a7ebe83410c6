//! Shared fixtures for the integration tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Once;

use tempfile::TempDir;
use walkdir::WalkDir;

static TRACING: Once = Once::new();

/// Route engine logs through the test writer, filtered by `RUST_LOG`.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Create a temp directory populated with the given relative-path/content
/// pairs, creating parent directories as needed.
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    init_tracing();
    let temp = TempDir::new().expect("temp dir");
    for (rel, content) in files {
        let path = temp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dirs");
        }
        fs::write(&path, content).expect("write fixture");
    }
    temp
}

/// Full byte snapshot of a directory tree, keyed by unix-style relative
/// path. Used to assert that a repeated render changed nothing.
pub fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut out = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.expect("walk snapshot");
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .expect("under root")
            .to_string_lossy()
            .replace('\\', "/");
        out.insert(rel, fs::read(entry.path()).expect("read snapshot"));
    }
    out
}

pub fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap_or_else(|e| panic!("read {rel}: {e}"))
}
