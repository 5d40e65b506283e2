//! Script and stylesheet bundling.
//!
//! Entry points are expanded from glob patterns relative to the source root.
//! Each entry produces one output file named after its stem: scripts become
//! `<stem>.js` wrapped in an IIFE exposing `App`, stylesheets become
//! `<stem>.css` after local `@import`s are inlined and the result is printed
//! by lightningcss.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::builder::BuildError;

/// Kind of bundled asset, decided by the entry's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Style,
}

impl AssetKind {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("js" | "mjs") => Some(Self::Script),
            Some("css" | "scss") => Some(Self::Style),
            _ => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Style => "css",
        }
    }
}

/// A bundled output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledAsset {
    pub kind: AssetKind,
    pub entry: PathBuf,
    pub output: PathBuf,
}

/// Default entry globs, relative to the source root.
pub const DEFAULT_ENTRIES: [&str; 4] = [
    "src/js/*.js",
    "src/**/base.js",
    "src/**/base.scss",
    "src/**/sections/*.scss",
];

/// Global name the script bundle is assigned to.
const GLOBAL_NAME: &str = "App";

/// Bundles entry points into an asset directory.
#[derive(Debug, Clone)]
pub struct AssetBundler {
    source_dir: PathBuf,
    entries: Vec<String>,
}

impl AssetBundler {
    pub fn new(source_dir: impl Into<PathBuf>, entries: Vec<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            entries,
        }
    }

    /// Expand entry globs into a sorted, de-duplicated file list.
    ///
    /// Every pattern must match at least one file.
    pub fn resolve_entries(&self) -> Result<Vec<PathBuf>, BuildError> {
        let root = glob::Pattern::escape(&self.source_dir.to_string_lossy());
        let mut files = Vec::new();

        for pattern in &self.entries {
            let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
            let matches = glob::glob(&full).map_err(|e| BuildError::bundle("resolve entries", e))?;

            let mut found = 0;
            for path in matches {
                let path = path.map_err(|e| BuildError::bundle("resolve entries", e))?;
                if path.is_file() {
                    files.push(path);
                    found += 1;
                }
            }

            if found == 0 {
                return Err(BuildError::bundle(
                    "resolve entries",
                    format!("no files match entry point {pattern}"),
                ));
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Bundle every entry into `out_dir`.
    pub fn bundle(&self, out_dir: &Path, minify: bool) -> Result<Vec<BundledAsset>, BuildError> {
        let entries = self.resolve_entries()?;
        let mut planned: BTreeMap<PathBuf, (AssetKind, PathBuf)> = BTreeMap::new();

        for entry in entries {
            let kind = AssetKind::from_path(&entry).ok_or_else(|| {
                BuildError::bundle(
                    "resolve entries",
                    format!("unsupported entry type: {}", entry.display()),
                )
            })?;
            let stem = entry
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("bundle");
            let output = out_dir.join(format!("{stem}.{}", kind.extension()));

            if let Some((_, other)) = planned.get(&output) {
                return Err(BuildError::bundle(
                    "resolve entries",
                    format!(
                        "{} and {} both write {}",
                        other.display(),
                        entry.display(),
                        output.display()
                    ),
                ));
            }
            planned.insert(output, (kind, entry));
        }

        fs::create_dir_all(out_dir)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", out_dir.display(), e)))?;

        let mut assets = Vec::with_capacity(planned.len());
        for (output, (kind, entry)) in planned {
            let code = match kind {
                AssetKind::Script => bundle_script(&entry, &self.source_dir, minify)?,
                AssetKind::Style => bundle_style(&entry, minify)?,
            };

            fs::write(&output, code)
                .map_err(|e| BuildError::WriteError(format!("{}: {}", output.display(), e)))?;
            tracing::info!("  {}", output.display());

            assets.push(BundledAsset {
                kind,
                entry,
                output,
            });
        }

        Ok(assets)
    }
}

static JS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*import\s+(?:(.+?)\s+from\s+)?['"]([^'"]+)['"]\s*;?\s*$"#)
        .expect("Invalid import regex")
});

static JS_EXPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*export\b").expect("Invalid export regex"));

/// Inline relative side-effect imports and wrap the result as an IIFE.
///
/// Each module body gets its own arrow-function scope, so top-level bindings
/// of different modules never collide. Modules cannot export anything.
pub fn bundle_script(entry: &Path, source_dir: &Path, minify: bool) -> Result<String, BuildError> {
    let root = source_dir
        .canonicalize()
        .map_err(|e| BuildError::bundle("bundle js", format!("{}: {}", source_dir.display(), e)))?;

    let mut graph = ScriptGraph {
        root,
        seen: HashSet::new(),
        body: String::new(),
    };
    graph.visit(entry)?;

    let code = format!("var {GLOBAL_NAME} = (() => {{\n{}}})();\n", graph.body);

    Ok(if minify { minify_script(&code) } else { code })
}

struct ScriptGraph {
    root: PathBuf,
    seen: HashSet<PathBuf>,
    body: String,
}

impl ScriptGraph {
    /// Emit `path` after its dependencies, once per module.
    fn visit(&mut self, path: &Path) -> Result<(), BuildError> {
        let path = path
            .canonicalize()
            .map_err(|e| BuildError::bundle("bundle js", format!("{}: {}", path.display(), e)))?;
        if !self.seen.insert(path.clone()) {
            return Ok(());
        }

        let source = fs::read_to_string(&path)
            .map_err(|e| BuildError::bundle("bundle js", format!("{}: {}", path.display(), e)))?;
        let dir = path.parent().unwrap_or(Path::new(""));

        // (inside a template literal, line)
        let mut own = Vec::new();
        let mut state = Lexical::Code;
        for line in source.lines() {
            let starts_in = state;
            state = state.scan(line);
            if starts_in != Lexical::Code {
                own.push((starts_in == Lexical::Template, line));
                continue;
            }

            if JS_EXPORT_RE.is_match(line) {
                return Err(BuildError::bundle(
                    "bundle js",
                    format!(
                        "{}: exports are not supported, found `{}`",
                        path.display(),
                        line.trim()
                    ),
                ));
            }

            let Some(caps) = JS_IMPORT_RE.captures(line) else {
                own.push((false, line));
                continue;
            };

            let specifier = &caps[2];
            if caps.get(1).is_some() {
                return Err(BuildError::bundle(
                    "bundle js",
                    format!(
                        "{}: only side-effect imports are supported, found `{}`",
                        path.display(),
                        line.trim()
                    ),
                ));
            }
            if !specifier.starts_with('.') {
                return Err(BuildError::bundle(
                    "bundle js",
                    format!("{}: cannot resolve package import {specifier}", path.display()),
                ));
            }

            let dependency = resolve_script(dir, specifier).ok_or_else(|| {
                BuildError::bundle(
                    "bundle js",
                    format!("{}: cannot resolve {specifier}", path.display()),
                )
            })?;
            self.visit(&dependency)?;
        }

        let label = path
            .strip_prefix(&self.root)
            .unwrap_or(&path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        self.body.push_str(&format!("  // {label}\n  (() => {{\n"));
        for (literal, line) in own {
            if literal || line.trim().is_empty() {
                self.body.push_str(line);
                self.body.push('\n');
            } else {
                self.body.push_str("    ");
                self.body.push_str(line);
                self.body.push('\n');
            }
        }
        self.body.push_str("  })();\n");

        Ok(())
    }
}

fn resolve_script(dir: &Path, specifier: &str) -> Option<PathBuf> {
    let base = dir.join(specifier);
    [
        base.clone(),
        base.with_extension("js"),
        base.join("index.js"),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}

/// Lexical context carried from one line of a script to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    Template,
    BlockComment,
}

impl Lexical {
    /// Context at the end of `line`, given the context at its start.
    ///
    /// Quoted strings end with their line. Regex literals are not
    /// recognised.
    fn scan(self, line: &str) -> Self {
        let mut state = self;
        let mut quote: Option<char> = None;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match (state, quote) {
                (Self::Code, Some(q)) => match c {
                    '\\' => {
                        chars.next();
                    }
                    c if c == q => quote = None,
                    _ => {}
                },
                (Self::Code, None) => match c {
                    '\'' | '"' => quote = Some(c),
                    '`' => state = Self::Template,
                    '/' if chars.peek() == Some(&'/') => break,
                    '/' if chars.peek() == Some(&'*') => {
                        chars.next();
                        state = Self::BlockComment;
                    }
                    _ => {}
                },
                (Self::Template, _) => match c {
                    '\\' => {
                        chars.next();
                    }
                    '`' => state = Self::Code,
                    _ => {}
                },
                (Self::BlockComment, _) => {
                    if c == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        state = Self::Code;
                    }
                }
            }
        }

        state
    }
}

/// Line-level minification: drops blank lines, whole-line comments and
/// indentation. Lines inside template literals are kept as written.
pub fn minify_script(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut state = Lexical::Code;

    for line in code.lines() {
        let starts_in = state;
        state = state.scan(line);

        if starts_in == Lexical::Template {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        // Trailing whitespace of a line that opens a literal is content
        let line = if state == Lexical::Template {
            line.trim_start()
        } else {
            line.trim()
        };
        if line.is_empty() || (starts_in == Lexical::Code && line.starts_with("//")) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }

    out
}

static CSS_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*@import\s+(?:url\(\s*)?(?:'([^']*)'|"([^"]*)"|([^'"()\s;]+))\s*\)?\s*;\s*$"#,
    )
    .expect("Invalid @import regex")
});

/// Inline local `@import`s and print through lightningcss.
pub fn bundle_style(entry: &Path, minify: bool) -> Result<String, BuildError> {
    let mut remote = Vec::new();
    let mut seen = HashSet::new();
    let mut body = String::new();

    inline_style(entry, &mut seen, &mut remote, &mut body)?;

    let mut css = remote.join("\n");
    if !css.is_empty() {
        css.push('\n');
    }
    css.push_str(&body);

    let filename = entry.display().to_string();
    print_css(&css, &filename, minify).map_err(|e| BuildError::bundle("bundle css", e))
}

fn inline_style(
    path: &Path,
    seen: &mut HashSet<PathBuf>,
    remote: &mut Vec<String>,
    out: &mut String,
) -> Result<(), BuildError> {
    let path = path
        .canonicalize()
        .map_err(|e| BuildError::bundle("bundle css", format!("{}: {}", path.display(), e)))?;
    if !seen.insert(path.clone()) {
        return Ok(());
    }

    let source = fs::read_to_string(&path)
        .map_err(|e| BuildError::bundle("bundle css", format!("{}: {}", path.display(), e)))?;
    let dir = path.parent().unwrap_or(Path::new(""));

    for line in source.lines() {
        // Sass line comments are not valid CSS.
        if line.trim_start().starts_with("//") {
            continue;
        }

        let Some(caps) = CSS_IMPORT_RE.captures(line) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let Some(target) = caps.get(1).or(caps.get(2)).or(caps.get(3)) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };
        let target = target.as_str();
        if target.starts_with("http:") || target.starts_with("https:") || target.starts_with("//")
        {
            remote.push(line.trim().to_string());
            continue;
        }

        let dependency = resolve_style(dir, target).ok_or_else(|| {
            BuildError::bundle(
                "bundle css",
                format!("{}: cannot resolve @import {target}", path.display()),
            )
        })?;
        inline_style(&dependency, seen, remote, out)?;
    }

    Ok(())
}

fn resolve_style(dir: &Path, target: &str) -> Option<PathBuf> {
    let base = dir.join(target);
    let partial = base
        .file_name()
        .map(|name| base.with_file_name(format!("_{}", name.to_string_lossy())));

    let mut candidates = vec![
        base.clone(),
        base.with_extension("scss"),
        base.with_extension("css"),
    ];
    if let Some(partial) = partial {
        candidates.push(partial.with_extension("scss"));
    }

    candidates.into_iter().find(|candidate| candidate.is_file())
}

/// Parse and re-print CSS using lightningcss.
pub fn print_css(css: &str, filename: &str, minify: bool) -> Result<String, String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| format!("CSS parse error: {}", e))?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify,
            ..PrinterOptions::default()
        })
        .map_err(|e| format!("CSS print error: {}", e))?;

    Ok(printed.code)
}
