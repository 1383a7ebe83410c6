//! Re-applying templates over a hand-edited destination tree.

use std::fs;

use reforge::{Engine, EngineConfig, TreeOptions};
use serde_json::Value;
use tempfile::TempDir;
use tera::Context;

use crate::common::{read, write_tree};

fn merge_options() -> TreeOptions {
    TreeOptions {
        exclude: vec![],
        merge: true,
    }
}

#[tokio::test]
async fn manifest_union_keeps_user_fields_and_versions_win_per_key() {
    let templates = write_tree(&[(
        "module/package.json.tera",
        r#"{
  "name": "generated",
  "main": "dist/index.js",
  "dependencies": {
    "express": "^5.0.0",
    "zod": "^3.23.0"
  },
  "scripts": {
    "build": "tsc -p ."
  }
}
"#,
    )]);
    let dest = TempDir::new().unwrap();
    fs::write(
        dest.path().join("package.json"),
        r#"{
  "name": "my-app",
  "private": true,
  "dependencies": {
    "express": "^4.18.0",
    "lodash": "^4.17.0"
  },
  "scripts": {
    "dev": "nodemon src"
  }
}
"#,
    )
    .unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    engine
        .render_tree("module", dest.path(), &Context::new(), &merge_options())
        .await
        .unwrap();

    let manifest: Value = serde_json::from_str(&read(dest.path(), "package.json")).unwrap();

    // user-owned top-level fields survive; generated-only ones are dropped
    assert_eq!(manifest["name"], "my-app");
    assert_eq!(manifest["private"], true);
    assert!(manifest.get("main").is_none());

    // generated version wins per key, user-only deps survive
    assert_eq!(manifest["dependencies"]["express"], "^5.0.0");
    assert_eq!(manifest["dependencies"]["lodash"], "^4.17.0");
    assert_eq!(manifest["dependencies"]["zod"], "^3.23.0");
    assert_eq!(manifest["scripts"]["dev"], "nodemon src");
    assert_eq!(manifest["scripts"]["build"], "tsc -p .");
}

#[tokio::test]
async fn manifest_union_applies_even_with_merge_off() {
    let templates = write_tree(&[(
        "module/package.json.tera",
        r#"{
  "dependencies": {
    "a": "2.0.0",
    "b": "1.0.0"
  }
}
"#,
    )]);
    let dest = TempDir::new().unwrap();
    fs::write(
        dest.path().join("package.json"),
        r#"{
  "name": "my-app",
  "private": true,
  "dependencies": {
    "a": "1.0.0",
    "lodash": "^4.17.0"
  }
}
"#,
    )
    .unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    // manifest merging applies even with the merge flag off
    engine
        .render_tree(
            "module",
            dest.path(),
            &Context::new(),
            &TreeOptions::default(),
        )
        .await
        .unwrap();

    let manifest: Value = serde_json::from_str(&read(dest.path(), "package.json")).unwrap();
    assert_eq!(manifest["name"], "my-app");
    assert_eq!(manifest["private"], true);
    assert_eq!(manifest["dependencies"]["a"], "2.0.0");
    assert_eq!(manifest["dependencies"]["b"], "1.0.0");
    assert_eq!(manifest["dependencies"]["lodash"], "^4.17.0");
}

#[tokio::test]
async fn env_files_only_gain_missing_keys() {
    let templates = write_tree(&[(
        "module/.env.tera",
        "DATABASE_URL=postgres://generated\nLOG_LEVEL=info\n",
    )]);
    let dest = TempDir::new().unwrap();
    fs::write(
        dest.path().join(".env"),
        "# my local setup\nDATABASE_URL=postgres://localhost/dev\n",
    )
    .unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    // env merging applies even with the merge flag off
    engine
        .render_tree(
            "module",
            dest.path(),
            &Context::new(),
            &TreeOptions::default(),
        )
        .await
        .unwrap();

    let env = read(dest.path(), ".env");
    assert_eq!(
        env,
        "# my local setup\nDATABASE_URL=postgres://localhost/dev\n\nLOG_LEVEL=info\n"
    );
}

#[tokio::test]
async fn module_imports_and_object_fields_union() {
    let templates = write_tree(&[(
        "module/src/config.ts.tera",
        "import { z } from 'zod';\nimport { defaults } from './defaults';\n\nexport const config = {\n  port: 3000,\n  logLevel: 'info',\n};\n",
    )]);
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(dest.path().join("src")).unwrap();
    fs::write(
        dest.path().join("src/config.ts"),
        "import { z } from 'zod';\n\nexport const config = {\n  port: 8080,\n};\n",
    )
    .unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    engine
        .render_tree("module", dest.path(), &Context::new(), &merge_options())
        .await
        .unwrap();

    let merged = read(dest.path(), "src/config.ts");
    // new import inserted once, after the existing import
    assert_eq!(merged.matches("from 'zod'").count(), 1);
    assert!(merged.contains("import { defaults } from './defaults';"));
    // the user's port survives, the generated field is added
    assert!(merged.contains("port: 8080"));
    assert!(!merged.contains("port: 3000"));
    assert!(merged.contains("logLevel: 'info',"));
}

#[tokio::test]
async fn conflicting_declaration_keeps_one_live_copy_and_the_old_text() {
    let templates = write_tree(&[(
        "module/src/handler.ts.tera",
        "export function handle(req: Request): Response {\n  return route(req);\n}\n",
    )]);
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(dest.path().join("src")).unwrap();
    fs::write(
        dest.path().join("src/handler.ts"),
        "export function handle(req: Request): Response {\n  // my workaround\n  return legacyRoute(req);\n}\n",
    )
    .unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    engine
        .render_tree("module", dest.path(), &Context::new(), &merge_options())
        .await
        .unwrap();

    let merged = read(dest.path(), "src/handler.ts");
    assert!(merged.contains("superseded"));
    // no data loss: the user's body is still in the file, inside the comment
    assert!(merged.contains("legacyRoute(req)"));
    // exactly one live definition after the comment closes
    assert_eq!(merged.matches("return route(req);").count(), 1);
    let live = merged.rsplit("*/").next().unwrap();
    assert_eq!(live.matches("export function handle").count(), 1);
}

#[tokio::test]
async fn merge_off_overwrites_module_sources() {
    let templates = write_tree(&[("module/src/index.ts.tera", "export const v = 2;\n")]);
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(dest.path().join("src")).unwrap();
    fs::write(dest.path().join("src/index.ts"), "export const v = 1; // mine\n").unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    engine
        .render_tree(
            "module",
            dest.path(),
            &Context::new(),
            &TreeOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(read(dest.path(), "src/index.ts"), "export const v = 2;\n");
}

#[tokio::test]
async fn unparseable_user_module_is_overwritten() {
    let templates = write_tree(&[("module/src/a.ts.tera", "export const ok = true;\n")]);
    let dest = TempDir::new().unwrap();
    fs::create_dir_all(dest.path().join("src")).unwrap();
    fs::write(dest.path().join("src/a.ts"), "function broken() {\n").unwrap();

    let engine = Engine::new(EngineConfig::new(vec![templates.path().to_path_buf()]));
    engine
        .render_tree("module", dest.path(), &Context::new(), &merge_options())
        .await
        .unwrap();

    assert_eq!(read(dest.path(), "src/a.ts"), "export const ok = true;\n");
}
