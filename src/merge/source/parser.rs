//! Statement-level scanner for ECMAScript/TypeScript modules
//!
//! This is deliberately NOT a full parser. The structural merge only needs
//! to know, per top-level statement: is it an import or re-export (and from
//! which module, with which bindings), does it introduce a named
//! declaration (and is that declaration an object literal or an
//! object-shaped type), or is it something else. Statement spans keep the
//! original bytes exactly, so untouched statements re-serialize
//! byte-identically and user formatting survives a merge.
//!
//! Anything the scanner cannot split safely (unbalanced brackets,
//! unterminated strings or comments) is a [`ParseError`], which the merge
//! driver turns into a full-overwrite fallback.

use thiserror::Error;

/// The scanner could not split the source into top-level statements.
#[derive(Debug, Error)]
#[error("source scan failed: {0}")]
pub struct ParseError(pub String);

/// A scanned module: top-level statements plus trailing trivia.
#[derive(Debug, Clone)]
pub struct Module {
    pub statements: Vec<Statement>,
    /// Whitespace/comments after the last statement, preserved verbatim.
    pub trailing: String,
}

impl Module {
    /// Rebuild source text. With unmodified statements this returns the
    /// original input byte-for-byte.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for stmt in &self.statements {
            out.push_str(&stmt.leading);
            out.push_str(&stmt.text);
        }
        out.push_str(&self.trailing);
        out
    }
}

/// One top-level statement with its leading trivia.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Whitespace and comments preceding the statement, verbatim.
    pub leading: String,
    /// The statement text, verbatim.
    pub text: String,
    pub kind: StatementKind,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Import(ImportDecl),
    ReExport(ReExport),
    Decl(Decl),
    DefaultExport,
    /// Anything the scanner does not model; appended/kept verbatim only.
    Other,
}

/// A parsed `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub source: String,
    /// `import type { ... }` - type-only imports never union with value imports.
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<NamedBinding>,
    /// Quote character of the module specifier, kept on rewrite.
    pub quote: char,
}

impl ImportDecl {
    /// True for bare `import 'mod';` side-effect imports.
    pub fn is_side_effect_only(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }

    /// Canonical single-line rendering, used only when a merge actually
    /// added bindings to an existing statement.
    pub fn serialize(&self) -> String {
        let q = self.quote;
        if self.is_side_effect_only() {
            return format!("import {q}{}{q};", self.source);
        }
        let mut clause: Vec<String> = Vec::new();
        if let Some(default) = &self.default {
            clause.push(default.clone());
        }
        if let Some(ns) = &self.namespace {
            clause.push(format!("* as {ns}"));
        }
        if !self.named.is_empty() {
            let named = self
                .named
                .iter()
                .map(NamedBinding::serialize)
                .collect::<Vec<_>>()
                .join(", ");
            clause.push(format!("{{ {named} }}"));
        }
        let type_kw = if self.type_only { "type " } else { "" };
        format!("import {type_kw}{} from {q}{}{q};", clause.join(", "), self.source)
    }
}

/// One binding inside an import/re-export list: `name` or `name as alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBinding {
    pub name: String,
    pub alias: Option<String>,
}

impl NamedBinding {
    fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        match split_once_word(token, "as") {
            Some((name, alias)) => Some(Self {
                name: name.trim().to_string(),
                alias: Some(alias.trim().to_string()),
            }),
            None => Some(Self {
                name: token.to_string(),
                alias: None,
            }),
        }
    }

    fn serialize(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} as {alias}", self.name),
            None => self.name.clone(),
        }
    }
}

/// A parsed re-export statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReExport {
    /// `export { a, b as c } from 'mod';`
    Named {
        source: String,
        type_only: bool,
        bindings: Vec<NamedBinding>,
        quote: char,
    },
    /// `export * from 'mod';` / `export * as ns from 'mod';`
    Star {
        source: String,
        alias: Option<String>,
    },
}

impl ReExport {
    /// De-duplication key: (module, namespace-name, type-only).
    pub fn key(&self) -> (String, Option<String>, bool) {
        match self {
            Self::Named {
                source, type_only, ..
            } => (source.clone(), None, *type_only),
            Self::Star { source, alias } => (
                source.clone(),
                Some(alias.clone().unwrap_or_else(|| "*".to_string())),
                false,
            ),
        }
    }

    pub fn serialize(&self) -> String {
        match self {
            Self::Named {
                source,
                type_only,
                bindings,
                quote,
            } => {
                let type_kw = if *type_only { "type " } else { "" };
                let list = bindings
                    .iter()
                    .map(NamedBinding::serialize)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("export {type_kw}{{ {list} }} from {quote}{source}{quote};")
            }
            Self::Star { source, alias } => match alias {
                Some(ns) => format!("export * as {ns} from '{source}';"),
                None => format!("export * from '{source}';"),
            },
        }
    }
}

/// A top-level named declaration.
#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    pub exported: bool,
    pub shape: DeclShape,
}

/// How much structure the scanner recognized in a declaration.
#[derive(Debug, Clone)]
pub enum DeclShape {
    /// `const name = { ... }` - field-wise unionable.
    ObjectVar(ObjectBody),
    /// `interface Name { ... }` or `type Name = { ... }` - member-wise unionable.
    TypeObject(ObjectBody),
    /// Functions, classes, enums, non-object variables: compared textually,
    /// never unioned.
    Opaque,
}

/// The braced body of an object literal or object type, with byte offsets
/// into the owning statement text.
#[derive(Debug, Clone)]
pub struct ObjectBody {
    /// Offset of the opening `{` in the statement text.
    pub open: usize,
    /// Offset of the matching `}`.
    pub close: usize,
    pub entries: Vec<ObjectEntry>,
}

/// One member of an object body: the key it is filed under and its full
/// text (copied opaquely when merged into the other side).
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub key: String,
    pub text: String,
}

/// Parse source text into a statement-level module model.
pub fn parse(src: &str) -> Result<Module, ParseError> {
    let mut statements = Vec::new();
    let mut pos = 0;

    loop {
        let trivia_end = scan_trivia(src, pos)?;
        if trivia_end >= src.len() {
            return Ok(Module {
                statements,
                trailing: src[pos..].to_string(),
            });
        }
        let stmt_end = scan_statement(src, trivia_end)?;
        let text = &src[trivia_end..stmt_end];
        statements.push(Statement {
            leading: src[pos..trivia_end].to_string(),
            text: text.to_string(),
            kind: classify_statement(text),
        });
        pos = stmt_end;
    }
}

/// Collapse all whitespace runs; used for "textually identical" checks.
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// statement splitting
// ---------------------------------------------------------------------------

/// Advance over whitespace and comments; errors on an unterminated block
/// comment.
fn scan_trivia(src: &str, mut pos: usize) -> Result<usize, ParseError> {
    let b = src.as_bytes();
    while pos < b.len() {
        let c = b[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
        } else if c == b'/' && b.get(pos + 1) == Some(&b'/') {
            while pos < b.len() && b[pos] != b'\n' {
                pos += 1;
            }
        } else if c == b'/' && b.get(pos + 1) == Some(&b'*') {
            pos = scan_block_comment(src, pos)?;
        } else {
            break;
        }
    }
    Ok(pos)
}

/// Scan one statement starting at a non-trivia byte; returns its end offset.
fn scan_statement(src: &str, start: usize) -> Result<usize, ParseError> {
    let b = src.as_bytes();
    let n = b.len();
    let mut i = start;
    let mut depth: i32 = 0;

    while i < n {
        let c = b[i];
        match c {
            b'"' | b'\'' => {
                i = scan_string(src, i)?;
                continue;
            }
            b'`' => {
                i = scan_template(src, i)?;
                continue;
            }
            b'/' if b.get(i + 1) == Some(&b'/') => {
                while i < n && b[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i = scan_block_comment(src, i)?;
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError(format!("unbalanced bracket at byte {i}")));
                }
            }
            b'}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError(format!("unbalanced brace at byte {i}")));
                }
                if depth == 0 {
                    // a top-level brace block closed; the statement ends here
                    // if nothing but whitespace (or a ';' we will consume on
                    // the normal path) remains on the line
                    let mut j = i + 1;
                    while j < n && (b[j] == b' ' || b[j] == b'\t') {
                        j += 1;
                    }
                    if j >= n || b[j] == b'\n' || b[j] == b'\r' {
                        return Ok(i + 1);
                    }
                }
            }
            b';' if depth == 0 => return Ok(i + 1),
            b'\n' if depth == 0 => {
                if ends_at_newline(&src[start..i], &src[i + 1..]) {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    if depth != 0 {
        return Err(ParseError("unbalanced brackets at end of input".to_string()));
    }
    Ok(n)
}

/// Heuristic: does a newline at top level terminate this statement?
/// Conservative in both directions - a wrongly joined pair of unmodeled
/// statements stays byte-exact and harmless, while recognized declaration
/// forms (imports, exports, `const`/`function`/`class`/... ) always end
/// cleanly at `;`, a closing brace, or a simple line.
fn ends_at_newline(stmt: &str, rest: &str) -> bool {
    let t = stmt.trim_end();
    if t.is_empty() {
        return false;
    }
    // decorators belong to the declaration that follows
    if t.starts_with('@') {
        return false;
    }
    let last = t.chars().next_back().expect("non-empty");
    if "=+-*/%<>&|^,.?:([{!~".contains(last) {
        return false;
    }
    const CONTINUATION_WORDS: &[&str] = &[
        "from", "import", "export", "return", "typeof", "new", "in", "of", "as", "extends",
        "implements", "else", "do", "instanceof", "await", "yield", "case", "delete", "void",
        "default", "satisfies",
    ];
    for word in CONTINUATION_WORDS {
        if ends_with_word(t, word) {
            return false;
        }
    }
    // a next line that starts like a continuation glues onto this statement
    if let Some(c) = rest.chars().find(|c| !c.is_whitespace()) {
        if ".?)]},+-*/&|=<>`:".contains(c) {
            return false;
        }
    }
    true
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.ends_with(word) && {
        let prefix = &text[..text.len() - word.len()];
        prefix
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_' && c != '$')
    }
}

/// Scan a `'...'` or `"..."` string starting at its quote.
fn scan_string(src: &str, start: usize) -> Result<usize, ParseError> {
    let b = src.as_bytes();
    let quote = b[start];
    let mut i = start + 1;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            b'\n' => return Err(ParseError(format!("unterminated string at byte {start}"))),
            c if c == quote => return Ok(i + 1),
            _ => i += 1,
        }
    }
    Err(ParseError(format!("unterminated string at byte {start}")))
}

/// Scan a template literal starting at its backtick, including nested
/// `${...}` expressions (which may themselves contain strings, templates
/// and braces).
fn scan_template(src: &str, start: usize) -> Result<usize, ParseError> {
    let b = src.as_bytes();
    let n = b.len();
    let mut i = start + 1;
    // each entry is the open-brace depth of one `${` expression
    let mut exprs: Vec<i32> = Vec::new();

    while i < n {
        if exprs.is_empty() {
            match b[i] {
                b'\\' => i += 2,
                b'`' => return Ok(i + 1),
                b'$' if b.get(i + 1) == Some(&b'{') => {
                    exprs.push(0);
                    i += 2;
                }
                _ => i += 1,
            }
        } else {
            match b[i] {
                b'"' | b'\'' => i = scan_string(src, i)?,
                b'`' => i = scan_template(src, i)?,
                b'/' if b.get(i + 1) == Some(&b'*') => i = scan_block_comment(src, i)?,
                b'{' => {
                    *exprs.last_mut().expect("non-empty") += 1;
                    i += 1;
                }
                b'}' => {
                    let top = exprs.last_mut().expect("non-empty");
                    if *top == 0 {
                        exprs.pop();
                    } else {
                        *top -= 1;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
    }
    Err(ParseError(format!("unterminated template literal at byte {start}")))
}

fn scan_block_comment(src: &str, start: usize) -> Result<usize, ParseError> {
    match src[start + 2..].find("*/") {
        Some(offset) => Ok(start + 2 + offset + 2),
        None => Err(ParseError(format!("unterminated block comment at byte {start}"))),
    }
}

// ---------------------------------------------------------------------------
// statement classification
// ---------------------------------------------------------------------------

pub(crate) fn classify_statement(text: &str) -> StatementKind {
    let t = skip_decorators(text).trim_start();

    if starts_with_word(t, "import") {
        return match parse_import(t) {
            Some(import) => StatementKind::Import(import),
            None => StatementKind::Other,
        };
    }
    if starts_with_word(t, "export") {
        let rest = t["export".len()..].trim_start();
        if starts_with_word(rest, "default") {
            return StatementKind::DefaultExport;
        }
        if rest.starts_with('{') || rest.starts_with('*') || starts_with_word(rest, "type") {
            if let Some(re_export) = parse_re_export(t) {
                return StatementKind::ReExport(re_export);
            }
            // `export type Foo = ...` falls through to declaration parsing;
            // `export { local };` without a source is unmodeled
            if rest.starts_with('{') || rest.starts_with('*') {
                return StatementKind::Other;
            }
        }
    }

    match parse_decl(t) {
        Some(decl) => StatementKind::Decl(decl),
        None => StatementKind::Other,
    }
}

/// Skip leading `@decorator(...)` lines so classification sees the
/// declaration keyword.
fn skip_decorators(text: &str) -> &str {
    let mut rest = text.trim_start();
    while rest.starts_with('@') {
        // a decorator ends at the first newline outside brackets
        let b = rest.as_bytes();
        let mut depth = 0i32;
        let mut end = rest.len();
        for (i, &c) in b.iter().enumerate() {
            match c {
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b'\n' if depth == 0 => {
                    end = i + 1;
                    break;
                }
                _ => {}
            }
        }
        if end == rest.len() {
            break;
        }
        rest = rest[end..].trim_start();
    }
    rest
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.starts_with(word)
        && text[word.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric() && c != '_' && c != '$')
}

fn take_ident(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let mut end = 0;
    for (i, c) in text.char_indices() {
        let is_ident = if i == 0 {
            c.is_alphabetic() || c == '_' || c == '$'
        } else {
            c.is_alphanumeric() || c == '_' || c == '$'
        };
        if !is_ident {
            break;
        }
        end = i + c.len_utf8();
    }
    if end == 0 {
        None
    } else {
        Some((&text[..end], &text[end..]))
    }
}

/// Split `... as ...` on the keyword `as` at word boundaries.
fn split_once_word<'a>(text: &'a str, word: &str) -> Option<(&'a str, &'a str)> {
    let mut search = 0;
    while let Some(idx) = text[search..].find(word) {
        let at = search + idx;
        let before_ok = text[..at]
            .chars()
            .next_back()
            .is_none_or(|c| c.is_whitespace());
        let after = &text[at + word.len()..];
        let after_ok = after.chars().next().is_none_or(|c| c.is_whitespace());
        if before_ok && after_ok {
            return Some((&text[..at], after));
        }
        search = at + word.len();
    }
    None
}

/// Extract the quoted module specifier and its quote char from the tail of
/// an import/re-export statement.
fn parse_specifier(tail: &str) -> Option<(String, char)> {
    let tail = tail.trim_start();
    let quote = tail.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let inner = &tail[1..];
    let end = inner.find(quote)?;
    let after = inner[end + 1..].trim();
    if !after.is_empty() && after != ";" {
        return None;
    }
    Some((inner[..end].to_string(), quote))
}

/// Split a binding list on top-level commas (commas inside brackets stay
/// put). `>` only closes an angle bracket that is actually open and never
/// as part of `=>`, so arrow types cannot unbalance the split.
fn split_top_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = '\0';
    for (i, c) in text.char_indices() {
        match c {
            '{' | '(' | '[' | '<' => depth += 1,
            '}' | ')' | ']' => depth -= 1,
            '>' => {
                if prev != '=' && depth > 0 {
                    depth -= 1;
                }
            }
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = c;
    }
    parts.push(&text[start..]);
    parts
}

fn parse_named_list(inner: &str) -> Vec<NamedBinding> {
    inner
        .split(',')
        .filter_map(NamedBinding::parse)
        .collect()
}

fn parse_import(t: &str) -> Option<ImportDecl> {
    let rest = t["import".len()..].trim_start();

    // side-effect import: `import 'mod';`
    if rest.starts_with('\'') || rest.starts_with('"') {
        let (source, quote) = parse_specifier(rest)?;
        return Some(ImportDecl {
            source,
            type_only: false,
            default: None,
            namespace: None,
            named: Vec::new(),
            quote,
        });
    }

    let (type_only, rest) = if starts_with_word(rest, "type") {
        let after = rest["type".len()..].trim_start();
        // `import type from 'x'` would make `type` a default binding; the
        // clause must continue with a binding for this to be type-only
        if starts_with_word(after, "from") {
            (false, rest)
        } else {
            (true, after)
        }
    } else {
        (false, rest)
    };

    let (clause, tail) = split_once_word(rest, "from")?;
    let (source, quote) = parse_specifier(tail)?;

    let mut default = None;
    let mut namespace = None;
    let mut named = Vec::new();
    for part in split_top_commas(clause.trim()) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(inner) = part.strip_prefix('{') {
            let inner = inner.strip_suffix('}')?;
            named = parse_named_list(inner);
        } else if let Some(ns) = part.strip_prefix('*') {
            let ns = ns.trim_start();
            let ns = ns.strip_prefix("as")?.trim();
            namespace = Some(ns.to_string());
        } else {
            let (ident, leftover) = take_ident(part)?;
            if !leftover.trim().is_empty() {
                return None;
            }
            default = Some(ident.to_string());
        }
    }
    if default.is_none() && namespace.is_none() && named.is_empty() {
        return None;
    }

    Some(ImportDecl {
        source,
        type_only,
        default,
        namespace,
        named,
        quote,
    })
}

fn parse_re_export(t: &str) -> Option<ReExport> {
    let rest = t["export".len()..].trim_start();

    if let Some(star_rest) = rest.strip_prefix('*') {
        let star_rest = star_rest.trim_start();
        let (alias, tail) = if starts_with_word(star_rest, "as") {
            let after = star_rest["as".len()..].trim_start();
            let (ident, leftover) = take_ident(after)?;
            (Some(ident.to_string()), leftover.trim_start())
        } else {
            (None, star_rest)
        };
        let tail = tail.strip_prefix("from")?.trim_start();
        let (source, _quote) = parse_specifier(tail)?;
        return Some(ReExport::Star { source, alias });
    }

    let (type_only, rest) = if starts_with_word(rest, "type") {
        (true, rest["type".len()..].trim_start())
    } else {
        (false, rest)
    };

    let inner_start = rest.strip_prefix('{')?;
    let close = inner_start.find('}')?;
    let bindings = parse_named_list(&inner_start[..close]);
    let tail = inner_start[close + 1..].trim_start();
    let tail = tail.strip_prefix("from")?.trim_start();
    let (source, quote) = parse_specifier(tail)?;

    Some(ReExport::Named {
        source,
        type_only,
        bindings,
        quote,
    })
}

fn parse_decl(t: &str) -> Option<Decl> {
    let mut rest = t;
    let mut exported = false;

    loop {
        if starts_with_word(rest, "export") {
            exported = true;
            rest = rest["export".len()..].trim_start();
        } else if starts_with_word(rest, "declare")
            || starts_with_word(rest, "abstract")
            || starts_with_word(rest, "async")
        {
            let word_len = rest.split_whitespace().next().expect("non-empty").len();
            rest = rest[word_len..].trim_start();
        } else {
            break;
        }
    }

    for kw in ["const", "let", "var"] {
        if starts_with_word(rest, kw) {
            let after = rest[kw.len()..].trim_start();
            // `const enum E {}` is not a variable; leave it unmodeled
            if kw == "const" && starts_with_word(after, "enum") {
                return None;
            }
            let (name, _) = take_ident(after)?;
            let shape = match object_var_body(t) {
                Some(body) => DeclShape::ObjectVar(body),
                None => DeclShape::Opaque,
            };
            return Some(Decl {
                name: name.to_string(),
                exported,
                shape,
            });
        }
    }

    if starts_with_word(rest, "function") {
        let after = rest["function".len()..].trim_start();
        let after = after.strip_prefix('*').unwrap_or(after);
        let (name, _) = take_ident(after)?;
        return Some(Decl {
            name: name.to_string(),
            exported,
            shape: DeclShape::Opaque,
        });
    }
    if starts_with_word(rest, "class") || starts_with_word(rest, "enum") {
        let kw_len = if starts_with_word(rest, "class") { 5 } else { 4 };
        let (name, _) = take_ident(rest[kw_len..].trim_start())?;
        return Some(Decl {
            name: name.to_string(),
            exported,
            shape: DeclShape::Opaque,
        });
    }
    if starts_with_word(rest, "interface") {
        let (name, _) = take_ident(rest["interface".len()..].trim_start())?;
        let shape = match braced_body(t) {
            Some(body) => DeclShape::TypeObject(body),
            None => DeclShape::Opaque,
        };
        return Some(Decl {
            name: name.to_string(),
            exported,
            shape,
        });
    }
    if starts_with_word(rest, "type") {
        let (name, _) = take_ident(rest["type".len()..].trim_start())?;
        let shape = match type_alias_body(t) {
            Some(body) => DeclShape::TypeObject(body),
            None => DeclShape::Opaque,
        };
        return Some(Decl {
            name: name.to_string(),
            exported,
            shape,
        });
    }

    None
}

// ---------------------------------------------------------------------------
// object/type body extraction
// ---------------------------------------------------------------------------

/// For a variable declaration: find the first top-level `=` and, when its
/// value is a `{ ... }` literal spanning the rest of the statement (modulo
/// `as const` / `satisfies` / `;`), return the body.
fn object_var_body(text: &str) -> Option<ObjectBody> {
    let eq = find_assignment_eq(text)?;
    let after = &text[eq + 1..];
    let offset = after.len() - after.trim_start().len();
    let open = eq + 1 + offset;
    if text.as_bytes().get(open) != Some(&b'{') {
        return None;
    }
    let close = matching_brace(text, open)?;
    let tail = text[close + 1..].trim();
    let tail = tail.strip_suffix(';').unwrap_or(tail).trim();
    let tail_ok = tail.is_empty()
        || tail == "as const"
        || (tail.starts_with("satisfies") && !tail.contains('{'));
    if !tail_ok {
        return None;
    }
    let entries = parse_body_entries(&text[open + 1..close], false)?;
    Some(ObjectBody { open, close, entries })
}

/// For an interface: the first top-level brace block, which must run to the
/// end of the statement.
fn braced_body(text: &str) -> Option<ObjectBody> {
    let open = find_top_level_open_brace(text)?;
    let close = matching_brace(text, open)?;
    let tail = text[close + 1..].trim();
    if !tail.is_empty() && tail != ";" {
        return None;
    }
    let entries = parse_body_entries(&text[open + 1..close], true)?;
    Some(ObjectBody { open, close, entries })
}

/// For `type Name = { ... };` - the value must start with `{` directly.
fn type_alias_body(text: &str) -> Option<ObjectBody> {
    let eq = find_assignment_eq(text)?;
    let after = &text[eq + 1..];
    let offset = after.len() - after.trim_start().len();
    let open = eq + 1 + offset;
    if text.as_bytes().get(open) != Some(&b'{') {
        return None;
    }
    let close = matching_brace(text, open)?;
    let tail = text[close + 1..].trim();
    if !tail.is_empty() && tail != ";" {
        return None;
    }
    let entries = parse_body_entries(&text[open + 1..close], true)?;
    Some(ObjectBody { open, close, entries })
}

/// First `=` outside brackets/strings that is not `==`, `=>`, `<=`, `>=`, `!=`.
fn find_assignment_eq(text: &str) -> Option<usize> {
    let b = text.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'"' | b'\'' => i = scan_string(text, i).ok()?,
            b'`' => i = scan_template(text, i).ok()?,
            b'(' | b'[' | b'{' | b'<' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' | b'}' => {
                depth -= 1;
                i += 1;
            }
            b'>' => {
                if !(i > 0 && b[i - 1] == b'=') && depth > 0 {
                    depth -= 1;
                }
                i += 1;
            }
            b'=' if depth == 0 => {
                let prev = i.checked_sub(1).map(|p| b[p]);
                let next = b.get(i + 1);
                let is_compound = matches!(prev, Some(b'!') | Some(b'=') | Some(b'<') | Some(b'>'))
                    || matches!(next, Some(b'=') | Some(b'>'));
                if !is_compound {
                    return Some(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

fn find_top_level_open_brace(text: &str) -> Option<usize> {
    let b = text.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'"' | b'\'' => i = scan_string(text, i).ok()?,
            b'`' => i = scan_template(text, i).ok()?,
            b'{' if depth == 0 => return Some(i),
            b'(' | b'[' | b'<' | b'{' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' | b'}' => {
                depth -= 1;
                i += 1;
            }
            b'>' => {
                if !(i > 0 && b[i - 1] == b'=') && depth > 0 {
                    depth -= 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Matching `}` for the `{` at `open`, string/comment aware.
fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let b = text.as_bytes();
    let mut depth = 0i32;
    let mut i = open;
    while i < b.len() {
        match b[i] {
            b'"' | b'\'' => {
                i = scan_string(text, i).ok()?;
                continue;
            }
            b'`' => {
                i = scan_template(text, i).ok()?;
                continue;
            }
            b'/' if b.get(i + 1) == Some(&b'/') => {
                while i < b.len() && b[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i = scan_block_comment(text, i).ok()?;
                continue;
            }
            b'{' | b'(' | b'[' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b')' | b']' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Split a body into entries. Object literals split on top-level commas;
/// type bodies additionally split on `;` and newlines. Returns `None` when
/// an entry has no extractable key.
fn parse_body_entries(inner: &str, is_type: bool) -> Option<Vec<ObjectEntry>> {
    let b = inner.as_bytes();
    let mut entries = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut i = 0;

    let mut flush = |start: usize, end: usize, entries: &mut Vec<ObjectEntry>| -> Option<()> {
        let raw = inner[start..end].trim();
        if raw.is_empty() {
            return Some(());
        }
        let key = entry_key(raw)?;
        entries.push(ObjectEntry {
            key,
            text: raw.to_string(),
        });
        Some(())
    };

    while i < b.len() {
        match b[i] {
            b'"' | b'\'' => {
                i = scan_string(inner, i).ok()?;
                continue;
            }
            b'`' => {
                i = scan_template(inner, i).ok()?;
                continue;
            }
            b'/' if b.get(i + 1) == Some(&b'/') => {
                while i < b.len() && b[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if b.get(i + 1) == Some(&b'*') => {
                i = scan_block_comment(inner, i).ok()?;
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' => {
                if !(i > 0 && b[i - 1] == b'=') && depth > 0 {
                    depth -= 1;
                }
            }
            b',' if depth == 0 => {
                flush(start, i, &mut entries)?;
                start = i + 1;
            }
            b';' | b'\n' if depth == 0 && is_type => {
                flush(start, i, &mut entries)?;
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    flush(start, b.len(), &mut entries)?;
    Some(entries)
}

/// Key an entry is filed under during a union.
fn entry_key(raw: &str) -> Option<String> {
    if raw.starts_with("...") {
        // spreads are unioned by their full text
        return Some(raw.to_string());
    }
    if raw.starts_with('[') {
        let close = raw.find(']')?;
        return Some(raw[..=close].to_string());
    }
    if raw.starts_with('\'') || raw.starts_with('"') {
        let quote = raw.chars().next().expect("non-empty");
        let end = raw[1..].find(quote)?;
        return Some(raw[..end + 2].to_string());
    }
    let mut rest = raw;
    // skip member modifiers that can precede the name
    for modifier in ["readonly", "get", "set", "async"] {
        if starts_with_word(rest, modifier) {
            let after = rest[modifier.len()..].trim_start();
            // only skip when a name follows; `readonly: true` is a key
            if take_ident(after).is_some() {
                rest = after;
            }
        }
    }
    let (ident, _) = take_ident(rest)?;
    Some(ident.trim_end_matches('?').to_string())
}
