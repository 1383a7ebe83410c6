//! Re-running a render over its own output must change nothing, for every
//! file category and both with and without prior user edits.

use std::fs;

use reforge::{Engine, EngineConfig, TreeOptions};
use tempfile::TempDir;
use tera::Context;

use crate::common::{snapshot, write_tree};

fn fixture_templates() -> TempDir {
    let templates = write_tree(&[
        (
            "module/package.json.tera",
            "{\n  \"name\": \"{{ name }}\",\n  \"dependencies\": {\n    \"express\": \"^5.0.0\"\n  }\n}\n",
        ),
        ("module/.env.tera", "SERVICE={{ name }}\nLOG_LEVEL=info\n"),
        (
            "module/src/index.ts.tera",
            "import { serve } from './serve';\n\nexport const config = {\n  name: '{{ name }}',\n};\n\nexport function main() {\n  serve(config);\n}\n",
        ),
        ("module/README.md", "# {{ name }}\n"),
    ]);
    let payload: &[u8] = &[0x00, 0xff, 0x10, 0x7b, 0x7b, 0x20];
    fs::create_dir_all(templates.path().join("module/assets")).unwrap();
    fs::write(templates.path().join("module/assets/blob.bin"), payload).unwrap();
    templates
}

async fn render(engine: &Engine, dest: &std::path::Path) {
    let mut context = Context::new();
    context.insert("name", "billing");
    engine
        .render_tree(
            "module",
            dest,
            &context,
            &TreeOptions {
                exclude: vec![],
                merge: true,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn fresh_render_is_stable_on_rerun() {
    let templates = fixture_templates();
    let dest = TempDir::new().unwrap();
    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));

    render(&engine, dest.path()).await;
    let first = snapshot(dest.path());
    assert_eq!(first.len(), 5);

    render(&engine, dest.path()).await;
    assert_eq!(snapshot(dest.path()), first);
}

#[tokio::test]
async fn render_over_edited_tree_converges_after_one_merge() {
    let templates = fixture_templates();
    let dest = TempDir::new().unwrap();
    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));

    render(&engine, dest.path()).await;

    // hand edits in every mergeable category
    fs::write(
        dest.path().join("package.json"),
        "{\n  \"name\": \"renamed\",\n  \"private\": true,\n  \"dependencies\": {\n    \"express\": \"^4.0.0\"\n  }\n}\n",
    )
    .unwrap();
    fs::write(dest.path().join(".env"), "SERVICE=custom\n").unwrap();
    fs::write(
        dest.path().join("src/index.ts"),
        "import { serve } from './serve';\n\nexport const config = {\n  name: 'custom',\n  tls: true,\n};\n\nexport function main() {\n  serve(config);\n}\n",
    )
    .unwrap();

    // first merge reconciles the edits; the second must be a no-op
    render(&engine, dest.path()).await;
    let merged = snapshot(dest.path());
    render(&engine, dest.path()).await;
    assert_eq!(snapshot(dest.path()), merged);

    // spot-check that the merge actually kept the edits
    let manifest = String::from_utf8(merged["package.json"].clone()).unwrap();
    assert!(manifest.contains("\"renamed\""));
    assert!(manifest.contains("\"private\""));
    let env = String::from_utf8(merged[".env"].clone()).unwrap();
    assert!(env.contains("SERVICE=custom"));
    assert!(env.contains("LOG_LEVEL=info"));
    let module = String::from_utf8(merged["src/index.ts"].clone()).unwrap();
    assert!(module.contains("name: 'custom'"));
    assert!(module.contains("tls: true"));
}
