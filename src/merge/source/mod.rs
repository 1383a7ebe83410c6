//! Structural merge for module source files
//!
//! Reconciles a freshly generated ES/TS module against an existing,
//! possibly hand-edited one at statement granularity:
//!
//! - imports union per `(module specifier, type-only)` key; new bindings are
//!   added to the matching statement, brand-new imports are inserted after
//!   the last existing import
//! - re-exports de-duplicate per `(module, namespace-name)` key
//! - named declarations union field-wise when both sides are object literals
//!   or object types; otherwise a textual conflict keeps the generated
//!   declaration live and preserves the previous one inside a superseded
//!   comment block, so nothing is lost silently
//! - unmodeled statements from the generated side are appended unless an
//!   identical statement (modulo whitespace) already exists
//!
//! Untouched statements keep their original bytes; a statement is rewritten
//! only when the merge actually changed it, so re-running the same merge is
//! byte-stable. Returns `None` when either side fails to scan, which the
//! caller treats as a full overwrite.

pub mod parser;

use std::collections::{HashMap, HashSet};

use parser::{
    classify_statement, normalize_ws, Decl, DeclShape, ImportDecl, Module, ObjectBody,
    ObjectEntry, ReExport, Statement, StatementKind,
};

/// Merge generated module source into existing module source.
///
/// `Some(text)` is the reconciled file content; `None` means one side could
/// not be scanned and the generated content should overwrite.
pub fn merge_modules(existing: &str, new: &str) -> Option<String> {
    let mut base = match parser::parse(existing) {
        Ok(module) => module,
        Err(e) => {
            tracing::warn!("existing module did not scan ({e}); overwriting");
            return None;
        }
    };
    let incoming = match parser::parse(new) {
        Ok(module) => module,
        Err(e) => {
            tracing::warn!("generated module did not scan ({e}); overwriting");
            return None;
        }
    };

    let mut changed = false;

    // lookup tables over the existing file
    let mut import_idx: HashMap<(String, bool), usize> = HashMap::new();
    let mut import_sources: HashSet<String> = HashSet::new();
    let mut re_export_idx: HashMap<(String, Option<String>, bool), usize> = HashMap::new();
    let mut decl_idx: HashMap<String, usize> = HashMap::new();
    let mut default_idx: Option<usize> = None;
    let mut norms: HashSet<String> = HashSet::new();
    for (i, stmt) in base.statements.iter().enumerate() {
        norms.insert(normalize_ws(&stmt.text));
        match &stmt.kind {
            StatementKind::Import(imp) => {
                import_sources.insert(imp.source.clone());
                import_idx
                    .entry((imp.source.clone(), imp.type_only))
                    .or_insert(i);
            }
            StatementKind::ReExport(re) => {
                re_export_idx.entry(re.key()).or_insert(i);
            }
            StatementKind::Decl(decl) => {
                decl_idx.entry(decl.name.clone()).or_insert(i);
            }
            StatementKind::DefaultExport => {
                default_idx.get_or_insert(i);
            }
            StatementKind::Other => {}
        }
    }

    let mut new_imports: Vec<ImportDecl> = Vec::new();
    let mut new_re_exports: Vec<ReExport> = Vec::new();
    let mut appended: Vec<Statement> = Vec::new();
    let mut appended_decls: HashSet<String> = HashSet::new();

    for stmt in &incoming.statements {
        match &stmt.kind {
            StatementKind::Import(imp) => {
                if imp.is_side_effect_only() {
                    // any import from the module already triggers its
                    // evaluation, so a side-effect import never doubles up
                    if import_sources.insert(imp.source.clone())
                        && !new_imports.iter().any(|q| q.source == imp.source)
                    {
                        new_imports.push(imp.clone());
                    }
                    continue;
                }
                let key = (imp.source.clone(), imp.type_only);
                if let Some(&i) = import_idx.get(&key) {
                    let target = &mut base.statements[i];
                    let StatementKind::Import(existing_imp) = &target.kind else {
                        continue;
                    };
                    let mut merged = existing_imp.clone();
                    if union_imports(&mut merged, imp) {
                        target.text = merged.serialize();
                        target.kind = StatementKind::Import(merged);
                        changed = true;
                    }
                } else if let Some(queued) = new_imports
                    .iter_mut()
                    .find(|q| q.source == imp.source && q.type_only == imp.type_only)
                {
                    union_imports(queued, imp);
                } else {
                    import_sources.insert(imp.source.clone());
                    new_imports.push(imp.clone());
                }
            }
            StatementKind::ReExport(re) => {
                let key = re.key();
                if let Some(&i) = re_export_idx.get(&key) {
                    let target = &mut base.statements[i];
                    let StatementKind::ReExport(existing_re) = &target.kind else {
                        continue;
                    };
                    let mut merged = existing_re.clone();
                    if union_re_exports(&mut merged, re) {
                        target.text = merged.serialize();
                        target.kind = StatementKind::ReExport(merged);
                        changed = true;
                    }
                } else if !new_re_exports.iter().any(|q| q.key() == key) {
                    new_re_exports.push(re.clone());
                }
            }
            StatementKind::Decl(decl) => {
                if appended_decls.contains(&decl.name) {
                    tracing::debug!("duplicate declaration '{}' in generated module; first wins", decl.name);
                    continue;
                }
                let Some(&i) = decl_idx.get(&decl.name) else {
                    appended_decls.insert(decl.name.clone());
                    norms.insert(normalize_ws(&stmt.text));
                    appended.push(appended_statement(stmt));
                    changed = true;
                    continue;
                };
                if reconcile_decl(&mut base.statements[i], decl, stmt) {
                    changed = true;
                }
            }
            StatementKind::DefaultExport => match default_idx {
                Some(i) if i < base.statements.len() => {
                    let target = &mut base.statements[i];
                    if normalize_ws(&target.text) != normalize_ws(&stmt.text) {
                        target.text = supersede(&target.text, &stmt.text);
                        target.kind = classify_statement(&target.text);
                        changed = true;
                    }
                }
                // a default export was already appended during this run
                Some(_) => {}
                None => {
                    default_idx = Some(usize::MAX);
                    appended.push(appended_statement(stmt));
                    changed = true;
                }
            },
            StatementKind::Other => {
                let norm = normalize_ws(&stmt.text);
                if norms.insert(norm) {
                    appended.push(appended_statement(stmt));
                    changed = true;
                }
            }
        }
    }

    if !new_imports.is_empty() || !new_re_exports.is_empty() {
        insert_header_statements(&mut base, new_imports, new_re_exports);
        changed = true;
    }

    if !changed {
        // byte-stable when there is nothing to do
        return Some(existing.to_string());
    }

    base.statements.extend(appended);
    Some(base.serialize())
}

/// Add bindings from `new` that `base` lacks. An existing default or
/// namespace binding always wins over a differently named generated one.
fn union_imports(base: &mut ImportDecl, new: &ImportDecl) -> bool {
    let mut changed = false;
    if base.default.is_none() && new.default.is_some() {
        base.default = new.default.clone();
        changed = true;
    }
    if base.namespace.is_none() && new.namespace.is_some() {
        base.namespace = new.namespace.clone();
        changed = true;
    }
    for binding in &new.named {
        if !base.named.contains(binding) {
            base.named.push(binding.clone());
            changed = true;
        }
    }
    changed
}

fn union_re_exports(base: &mut ReExport, new: &ReExport) -> bool {
    let (
        ReExport::Named {
            bindings: base_bindings,
            ..
        },
        ReExport::Named {
            bindings: new_bindings,
            ..
        },
    ) = (base, new)
    else {
        // star re-exports with the same key are already identical
        return false;
    };
    let mut changed = false;
    for binding in new_bindings {
        if !base_bindings.contains(binding) {
            base_bindings.push(binding.clone());
            changed = true;
        }
    }
    changed
}

/// Reconcile a generated declaration with the existing one of the same name.
/// Returns whether the existing statement was rewritten.
fn reconcile_decl(target: &mut Statement, new_decl: &Decl, new_stmt: &Statement) -> bool {
    if normalize_ws(&target.text) == normalize_ws(&new_stmt.text) {
        return false;
    }

    let StatementKind::Decl(existing_decl) = &target.kind else {
        return false;
    };

    let unionable = match (&existing_decl.shape, &new_decl.shape) {
        (DeclShape::ObjectVar(base), DeclShape::ObjectVar(new)) => Some((base, new, false)),
        (DeclShape::TypeObject(base), DeclShape::TypeObject(new)) => Some((base, new, true)),
        _ => None,
    };

    if let Some((base_body, new_body, is_type)) = unionable {
        let present: HashSet<&str> = base_body.entries.iter().map(|e| e.key.as_str()).collect();
        let additions: Vec<ObjectEntry> = new_body
            .entries
            .iter()
            .filter(|e| !present.contains(e.key.as_str()))
            .cloned()
            .collect();
        if additions.is_empty() {
            // same fields, different values: the user's values win
            return false;
        }
        tracing::debug!(
            "declaration '{}': adding {} field(s) from the generated module",
            new_decl.name,
            additions.len()
        );
        target.text = insert_entries(&target.text, base_body, &additions, is_type);
        target.kind = classify_statement(&target.text);
        return true;
    }

    // a genuine conflict: keep the generated declaration live, preserve the
    // previous one in a comment so the edit is recoverable
    tracing::warn!(
        "declaration '{}' conflicts with the generated version; previous text kept in a superseded comment",
        new_decl.name
    );
    target.text = supersede(&target.text, &new_stmt.text);
    target.kind = classify_statement(&target.text);
    true
}

/// Wrap the old statement in a comment and place the new one after it. The
/// comment becomes leading trivia on the next scan, so exactly one live
/// declaration remains and a repeat merge is a no-op.
fn supersede(old_text: &str, new_text: &str) -> String {
    let escaped = old_text.replace("*/", "*\\/");
    format!("/* superseded by regeneration:\n{escaped}\n*/\n{new_text}")
}

fn appended_statement(stmt: &Statement) -> Statement {
    let comments = stmt.leading.trim();
    let leading = if comments.is_empty() {
        "\n\n".to_string()
    } else {
        format!("\n\n{comments}\n")
    };
    Statement {
        leading,
        text: stmt.text.clone(),
        kind: stmt.kind.clone(),
    }
}

/// Insert brand-new imports and re-exports after the last existing
/// import/re-export, or at the top of the file when there is none.
fn insert_header_statements(base: &mut Module, imports: Vec<ImportDecl>, re_exports: Vec<ReExport>) {
    let last_header = base
        .statements
        .iter()
        .rposition(|s| matches!(s.kind, StatementKind::Import(_) | StatementKind::ReExport(_)));
    let pos = last_header.map_or(0, |i| i + 1);

    let mut inserted: Vec<Statement> = Vec::new();
    for imp in imports {
        let text = imp.serialize();
        inserted.push(Statement {
            leading: "\n".to_string(),
            text,
            kind: StatementKind::Import(imp),
        });
    }
    for re in re_exports {
        let text = re.serialize();
        inserted.push(Statement {
            leading: "\n".to_string(),
            text,
            kind: StatementKind::ReExport(re),
        });
    }

    if pos == 0 {
        if let Some(first) = inserted.first_mut() {
            first.leading.clear();
        }
        if let Some(next) = base.statements.first_mut() {
            if !next.leading.starts_with('\n') {
                next.leading.insert(0, '\n');
            }
        }
    }
    base.statements.splice(pos..pos, inserted);
}

/// Splice additional entries into an object/type body, matching the body's
/// existing layout (single-line vs multi-line, detected indentation).
fn insert_entries(
    text: &str,
    body: &ObjectBody,
    additions: &[ObjectEntry],
    is_type: bool,
) -> String {
    let inner = &text[body.open + 1..body.close];
    let term = if is_type { ";" } else { "," };

    let new_inner = if !inner.contains('\n') {
        let list_sep = if is_type { "; " } else { ", " };
        let list = additions
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(list_sep);
        let pad = if inner.starts_with(' ') || inner.starts_with('\t') {
            " "
        } else {
            ""
        };
        let head = inner.trim_end();
        if head.trim().is_empty() {
            format!(" {list} ")
        } else {
            let glue = if head.ends_with(',') || head.ends_with(';') {
                " ".to_string()
            } else {
                list_sep.to_string()
            };
            format!("{head}{glue}{list}{pad}")
        }
    } else {
        let indent = multiline_indent(inner);
        let content_end = inner
            .rfind(|c: char| !c.is_whitespace())
            .map(|i| {
                i + inner[i..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1)
            })
            .unwrap_or(0);
        let (head, tail) = inner.split_at(content_end);
        let close_indent = tail.rsplit('\n').next().unwrap_or("");

        let mut out = String::from(head);
        if !head.is_empty() && !head.ends_with(',') && !head.ends_with(';') && !head.ends_with('{')
        {
            out.push_str(term);
        }
        for entry in additions {
            out.push('\n');
            out.push_str(&indent);
            out.push_str(&entry.text);
            out.push_str(term);
        }
        out.push('\n');
        out.push_str(close_indent);
        out
    };

    format!("{}{{{}{}", &text[..body.open], new_inner, &text[body.close..])
}

/// Indentation of the first indented content line of a multi-line body.
fn multiline_indent(inner: &str) -> String {
    for line in inner.lines().skip(1) {
        if !line.trim().is_empty() {
            let ws = line.len() - line.trim_start().len();
            return line[..ws].to_string();
        }
    }
    "  ".to_string()
}
