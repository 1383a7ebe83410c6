//! Hook extension points exercised through the full engine.

use std::fs;

use reforge::{Engine, EngineConfig, TreeOptions};
use tempfile::TempDir;
use tera::Context;

use crate::common::{read, write_tree};

#[tokio::test]
async fn convention_snippets_fill_hooks_per_template() {
    // blueprint layout: templates under templates/, snippets under snippets/
    let blueprint = write_tree(&[
        (
            "templates/module/src/index.ts.tera",
            "{{ hook(name=\"imports\") }}\nexport class {{ name | capitalize }} {\n  {{ hook(name=\"members\") }}\n}\n",
        ),
        (
            "snippets/module/src/index/imports.tera",
            "import { inject } from 'di';",
        ),
        // no members snippet: that hook renders empty
    ]);
    let dest = TempDir::new().unwrap();

    let config = EngineConfig::new(vec![blueprint.path().join("templates")])
        .with_blueprint_root(blueprint.path().to_path_buf());
    let engine = Engine::new(config);

    let mut context = Context::new();
    context.insert("name", "cart");
    engine
        .render_tree("module", dest.path(), &context, &TreeOptions::default())
        .await
        .unwrap();

    let out = read(dest.path(), "src/index.ts");
    assert!(out.starts_with("import { inject } from 'di';\n"));
    assert!(out.contains("export class Cart {"));
    // the unfilled hook left no residue
    assert!(!out.contains("hook("));
}

#[tokio::test]
async fn registered_hooks_win_and_see_the_context() {
    let blueprint = write_tree(&[
        ("templates/banner.txt.tera", "{{ hook(name=\"header\") }}body\n"),
        ("templates/snips/header.tera", "=== {{ name }} ===\n"),
    ]);
    let dest = TempDir::new().unwrap();

    let config = EngineConfig::new(vec![blueprint.path().join("templates")])
        .with_hook("header", "snips/header.tera".into());
    let engine = Engine::new(config);

    let mut context = Context::new();
    context.insert("name", "cart");
    engine
        .render_to_file("banner.txt", &dest.path().join("banner.txt"), &context, false)
        .await
        .unwrap();

    assert_eq!(read(dest.path(), "banner.txt"), "=== cart ===\nbody\n");
}

#[tokio::test]
async fn has_hook_gates_wrapper_markup() {
    let blueprint = write_tree(&[(
        "templates/page.ts.tera",
        "{% if has_hook(name=\"extra\") %}// extras\n{{ hook(name=\"extra\") }}{% endif %}export {};\n",
    )]);
    let dest = TempDir::new().unwrap();

    let engine = Engine::new(EngineConfig::new(vec![blueprint.path().join("templates")]));
    engine
        .render_to_file(
            "page.ts",
            &dest.path().join("page.ts"),
            &Context::new(),
            false,
        )
        .await
        .unwrap();

    assert_eq!(read(dest.path(), "page.ts"), "export {};\n");
}

#[tokio::test]
async fn cyclic_hooks_fail_instead_of_hanging() {
    let blueprint = write_tree(&[
        ("templates/entry.txt.tera", "{{ hook(name=\"a\") }}"),
        ("templates/a.tera", "{{ hook(name=\"b\") }}"),
        ("templates/b.tera", "{{ hook(name=\"a\") }}"),
    ]);

    let config = EngineConfig::new(vec![blueprint.path().join("templates")])
        .with_hook("a", "a.tera".into())
        .with_hook("b", "b.tera".into());
    let engine = Engine::new(config);

    let err = engine
        .render("entry.txt", &Context::new())
        .await
        .unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("recursion"), "unexpected error chain: {chain}");
}

#[tokio::test]
async fn unresolvable_registered_hook_degrades_to_empty() {
    let blueprint = write_tree(&[("templates/file.txt.tera", "<{{ hook(name=\"gone\") }}>")]);

    let config = EngineConfig::new(vec![blueprint.path().join("templates")])
        .with_hook("gone", "missing/snippet.tera".into());
    let engine = Engine::new(config);

    let out = engine.render("file.txt", &Context::new()).await.unwrap();
    assert_eq!(out, "<>");

    // and the file variant writes the degraded output
    let dest = TempDir::new().unwrap();
    engine
        .render_to_file("file.txt", &dest.path().join("file.txt"), &Context::new(), false)
        .await
        .unwrap();
    assert_eq!(fs::read_to_string(dest.path().join("file.txt")).unwrap(), "<>");
}
