//! Tree materialization: suffix stripping, path rendering, ignores and
//! binary passthrough.

use std::fs;

use reforge::{Engine, EngineConfig, TreeOptions};
use tempfile::TempDir;
use tera::Context;

use crate::common::{read, write_tree};

fn context_for(name: &str) -> Context {
    let mut context = Context::new();
    context.insert("name", name);
    context
}

#[tokio::test]
async fn scaffolds_a_fresh_tree_with_rendered_paths() {
    let templates = write_tree(&[
        (
            "module/package.json.tera",
            "{\n  \"name\": \"@app/{{ name }}\"\n}\n",
        ),
        (
            "module/src/{{ name }}.service.ts.tera",
            "export class {{ name | capitalize }}Service {}\n",
        ),
        ("module/.env.tera", "SERVICE_NAME={{ name }}\n"),
        ("module/README.md", "# {{ name }}\n"),
    ]);
    let dest = TempDir::new().unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    let count = engine
        .render_tree(
            "module",
            dest.path(),
            &context_for("billing"),
            &TreeOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(count, 4);

    // template suffix stripped, directives rendered in both paths and bodies
    assert_eq!(
        read(dest.path(), "package.json"),
        "{\n  \"name\": \"@app/billing\"\n}\n"
    );
    assert_eq!(
        read(dest.path(), "src/billing.service.ts"),
        "export class BillingService {}\n"
    );
    assert_eq!(read(dest.path(), ".env"), "SERVICE_NAME=billing\n");
    // files without the suffix are still rendered
    assert_eq!(read(dest.path(), "README.md"), "# billing\n");
}

#[tokio::test]
async fn baseline_ignores_and_call_excludes_are_skipped() {
    let templates = write_tree(&[
        ("module/src/index.ts.tera", "export {};\n"),
        ("module/node_modules/pkg/index.js", "junk\n"),
        ("module/.git/HEAD", "ref: refs/heads/main\n"),
        ("module/draft.txt", "wip\n"),
        ("module/notes.snap", "snapshot\n"),
    ]);
    let dest = TempDir::new().unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    engine
        .render_tree(
            "module",
            dest.path(),
            &Context::new(),
            &TreeOptions {
                exclude: vec!["draft.txt".to_string(), "*.snap".to_string()],
                merge: false,
            },
        )
        .await
        .unwrap();

    assert!(dest.path().join("src/index.ts").exists());
    assert!(!dest.path().join("node_modules").exists());
    assert!(!dest.path().join(".git").exists());
    assert!(!dest.path().join("draft.txt").exists());
    assert!(!dest.path().join("notes.snap").exists());
}

#[tokio::test]
async fn binary_files_pass_through_byte_identical() {
    let templates = write_tree(&[("module/src/index.ts.tera", "export {};\n")]);
    // invalid UTF-8 on purpose; rendering this would fail
    let payload: Vec<u8> = vec![0x89, 0x50, 0x4e, 0x47, 0xff, 0x00, 0xfe, 0x7b, 0x7b];
    fs::create_dir_all(templates.path().join("module/assets")).unwrap();
    fs::write(templates.path().join("module/assets/logo.png"), &payload).unwrap();

    let dest = TempDir::new().unwrap();
    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    engine
        .render_tree("module", dest.path(), &Context::new(), &TreeOptions::default())
        .await
        .unwrap();

    assert_eq!(fs::read(dest.path().join("assets/logo.png")).unwrap(), payload);
}

#[tokio::test]
async fn extra_binary_extensions_are_honored() {
    let templates = write_tree(&[("module/keep.dat", "{{ not_a_directive }}")]);
    let dest = TempDir::new().unwrap();

    let engine = Engine::new(
        EngineConfig::new(vec![templates.path().to_path_buf()])
            .with_binary_extensions(["dat"]),
    );
    engine
        .render_tree("module", dest.path(), &Context::new(), &TreeOptions::default())
        .await
        .unwrap();

    // copied verbatim instead of rendered (which would have failed on the
    // unknown variable)
    assert_eq!(read(dest.path(), "keep.dat"), "{{ not_a_directive }}");
}

#[tokio::test]
async fn missing_tree_reference_fails_with_searched_roots() {
    let templates = write_tree(&[]);
    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    let dest = TempDir::new().unwrap();

    let err = engine
        .render_tree("nope", dest.path(), &Context::new(), &TreeOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("'nope' not found"));
}
