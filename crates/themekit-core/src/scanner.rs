//! Codebase scanner.
//!
//! Line-oriented: every candidate file is split into lines and each line runs
//! three passes. Utility classes and context-gated hex literals are the
//! non-compliant references; semantic classes and `var(--slot)` usages are the
//! compliant ones.

use crate::config::{Config, ScanConfig};
use crate::error::Result;
use crate::mapping::{self, ColorToken, Origin, ScanMode, TokenKind, COLOR_PREFIXES};
use crate::paths;
use crate::taxonomy::COLOR_FAMILIES;
use crate::theme::Slot;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Scan scope
// ---------------------------------------------------------------------------

pub const STANDARD_DIRS: &[&str] = &["src", "app", "components", "pages"];

pub const FULL_EXTRA_DIRS: &[&str] = &[
    "lib", "styles", "hooks", "utils", "layouts", "views", "test", "tests", "__tests__",
];

pub const SOURCE_EXTENSIONS: &[&str] = &[
    "tsx", "ts", "jsx", "js", "vue", "svelte", "html", "css", "scss", "astro", "mdx",
];

pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    ".next",
    "out",
    "coverage",
    ".themekit",
    ".svelte-kit",
    ".turbo",
    ".cache",
];

/// Words that must appear on a line before a hex literal counts as a color.
const HEX_CONTEXT_KEYWORDS: &[&str] = &[
    "color", "background", "border", "fill", "stroke", "style", "class", "shadow", "outline",
    "bg", "theme",
];

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// A file is a test file when its path mentions `test`, `spec` or `__tests__`.
pub fn is_test_file(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    ["test", "spec", "__tests__"].iter().any(|k| lower.contains(k))
}

/// Decides which lines in test files are assertions and must not change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionPolicy {
    calls: Vec<String>,
}

impl AssertionPolicy {
    pub fn new(calls: Vec<String>) -> Self {
        Self { calls }
    }

    pub fn from_config(cfg: &ScanConfig) -> Self {
        Self::new(cfg.assertion_calls.clone())
    }

    pub fn is_assertion(&self, line: &str) -> bool {
        self.calls.iter().any(|c| !c.is_empty() && line.contains(c.as_str()))
    }

    /// True when `line` of the file at `path` must be left untouched.
    pub fn protects(&self, path: &str, line: &str) -> bool {
        is_test_file(path) && self.is_assertion(line)
    }
}

impl Default for AssertionPolicy {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static UTILITY_RE: OnceLock<Regex> = OnceLock::new();
static HEX_RE: OnceLock<Regex> = OnceLock::new();
static SEMANTIC_RE: OnceLock<Regex> = OnceLock::new();

fn utility_re() -> &'static Regex {
    UTILITY_RE.get_or_init(|| {
        let pattern = format!(
            r"(?:{})-(?:white|black|(?:{})-\d{{2,3}})(?:/\d{{1,3}})?",
            COLOR_PREFIXES.join("|"),
            COLOR_FAMILIES.join("|")
        );
        Regex::new(&pattern).unwrap()
    })
}

fn hex_re() -> &'static Regex {
    HEX_RE.get_or_init(|| {
        Regex::new(r"#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}|[0-9a-fA-F]{3,4})").unwrap()
    })
}

fn semantic_re() -> &'static Regex {
    SEMANTIC_RE.get_or_init(|| {
        let mut slots: Vec<&str> = Slot::all().iter().map(|s| s.as_str()).collect();
        // Longest first so `primary-foreground` wins over `primary`.
        slots.sort_by_key(|s| std::cmp::Reverse(s.len()));
        let slots = slots.join("|");
        let pattern = format!(
            r"(?:(?:{})-(?:{slots})(?:/\d{{1,3}})?|var\(--(?:{slots})\))",
            COLOR_PREFIXES.join("|"),
        );
        Regex::new(&pattern).unwrap()
    })
}

/// Characters that continue a class token.
pub(crate) fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

pub(crate) fn bounded(line: &str, start: usize, end: usize, extra_before: &[char]) -> bool {
    let before_ok = line[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !is_token_char(c) && !extra_before.contains(&c));
    let after_ok = line[end..]
        .chars()
        .next()
        .map_or(true, |c| !is_token_char(c) && c != '/');
    before_ok && after_ok
}

fn column_of(line: &str, byte_idx: usize) -> usize {
    line[..byte_idx].chars().count() + 1
}

pub(crate) fn is_comment_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("//") || t.starts_with("/*") || t.starts_with('*') || t.starts_with("<!--")
}

pub(crate) fn has_hex_context(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    HEX_CONTEXT_KEYWORDS.iter().any(|k| lower.contains(k))
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One non-compliant reference as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMatch {
    pub line: usize,
    pub column: usize,
    #[serde(rename = "match")]
    pub text: String,
    pub kind: TokenKind,
    pub suggestion: Option<String>,
    pub fixable: bool,
    pub origin: Origin,
    /// On an assertion line in a test file: counted, never rewritten.
    #[serde(default)]
    pub protected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatches {
    pub path: String,
    pub matches: Vec<ScanMatch>,
}

impl FileMatches {
    pub fn fixable(&self) -> impl Iterator<Item = &ScanMatch> {
        self.matches.iter().filter(|m| m.fixable)
    }

    pub fn has_fixable(&self) -> bool {
        self.matches.iter().any(|m| m.fixable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub mode: ScanMode,
    pub files_scanned: usize,
    pub files: Vec<FileMatches>,
    pub total_references: usize,
    pub non_compliant_count: usize,
    pub compliant_count: usize,
    /// Files that could not be read as text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl ScanResult {
    pub fn fixable_count(&self) -> usize {
        self.files.iter().map(|f| f.fixable().count()).sum()
    }

    /// Matches with no replacement, paired with their file path.
    pub fn unfixable(&self) -> impl Iterator<Item = (&str, &ScanMatch)> {
        self.files
            .iter()
            .flat_map(|f| f.matches.iter().map(move |m| (f.path.as_str(), m)))
            .filter(|(_, m)| !m.fixable)
    }
}

/// Result of scanning a single file's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileScan {
    pub matches: Vec<ScanMatch>,
    pub compliant: usize,
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Scanner {
    scan: ScanConfig,
    policy: AssertionPolicy,
    stylesheet: String,
}

impl Scanner {
    pub fn new(config: &Config) -> Self {
        Self {
            scan: config.scan.clone(),
            policy: AssertionPolicy::from_config(&config.scan),
            stylesheet: paths::normalize_relative(Path::new(&config.stylesheet)),
        }
    }

    pub fn policy(&self) -> &AssertionPolicy {
        &self.policy
    }

    fn roots(&self, mode: ScanMode) -> Vec<String> {
        let mut roots: Vec<String> = STANDARD_DIRS.iter().map(|s| s.to_string()).collect();
        if mode == ScanMode::Full {
            roots.extend(FULL_EXTRA_DIRS.iter().map(|s| s.to_string()));
        }
        for include in &self.scan.include {
            if paths::stays_inside(include) {
                roots.push(include.clone());
            } else {
                tracing::warn!(include = %include, "ignoring scan.include outside the project");
            }
        }
        roots
    }

    fn is_excluded_dir(&self, name: &str) -> bool {
        EXCLUDED_DIRS.contains(&name) || self.scan.exclude.iter().any(|e| e == name)
    }

    /// Candidate files as sorted, de-duplicated project-relative paths.
    pub fn collect_files(&self, root: &Path, mode: ScanMode) -> Result<Vec<String>> {
        let mut files = BTreeSet::new();
        for dir in self.roots(mode) {
            let start = root.join(&dir);
            if start.is_dir() {
                self.walk(root, &start, &mut files)?;
            }
        }
        files.remove(&self.stylesheet);
        Ok(files.into_iter().collect())
    }

    fn walk(&self, root: &Path, dir: &Path, out: &mut BTreeSet<String>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if file_type.is_dir() {
                if !self.is_excluded_dir(&name) {
                    self.walk(root, &entry.path(), out)?;
                }
            } else if file_type.is_file() && has_source_extension(&entry.path()) {
                out.insert(paths::display_relative(root, &entry.path()));
            }
        }
        Ok(())
    }

    /// Scan every candidate file under `root`.
    pub fn scan(&self, root: &Path, mode: ScanMode) -> Result<ScanResult> {
        let files = self.collect_files(root, mode)?;
        tracing::debug!(root = %root.display(), %mode, files = files.len(), "scanning");

        let mut per_file: Vec<(String, FileScan)> = Vec::with_capacity(files.len());
        let mut skipped = Vec::new();
        for rel in files {
            match std::fs::read_to_string(root.join(&rel)) {
                Ok(content) => {
                    let scan = self.scan_content(&rel, &content, mode);
                    per_file.push((rel, scan));
                }
                Err(e) => {
                    tracing::warn!(file = %rel, error = %e, "skipping unreadable file");
                    skipped.push(rel);
                }
            }
        }

        // Single accumulation pass over the per-file results.
        let files_scanned = per_file.len();
        let mut non_compliant_count = 0;
        let mut compliant_count = 0;
        let mut files = Vec::new();
        for (path, scan) in per_file {
            non_compliant_count += scan.matches.len();
            compliant_count += scan.compliant;
            if !scan.matches.is_empty() {
                files.push(FileMatches {
                    path,
                    matches: scan.matches,
                });
            }
        }

        Ok(ScanResult {
            mode,
            files_scanned,
            files,
            total_references: non_compliant_count + compliant_count,
            non_compliant_count,
            compliant_count,
            skipped,
        })
    }

    /// Scan one file's content. `path` is project-relative.
    pub fn scan_content(&self, path: &str, content: &str, mode: ScanMode) -> FileScan {
        let test_file = is_test_file(path);
        let mut result = FileScan::default();

        for (idx, line) in content.lines().enumerate() {
            let protected = test_file && self.policy.is_assertion(line);
            let mut tokens = Vec::new();

            for m in utility_re().find_iter(line) {
                if bounded(line, m.start(), m.end(), &[]) {
                    tokens.push((m.start(), m.as_str(), TokenKind::UtilityClass));
                }
            }
            if !is_comment_line(line) && has_hex_context(line) {
                for m in hex_re().find_iter(line) {
                    if bounded(line, m.start(), m.end(), &['&']) {
                        tokens.push((m.start(), m.as_str(), TokenKind::HexLiteral));
                    }
                }
            }
            tokens.sort_by_key(|(start, _, _)| *start);

            for (start, text, kind) in tokens {
                let token = ColorToken {
                    file_path: path.to_string(),
                    line_number: idx + 1,
                    column: column_of(line, start),
                    raw_text: text.to_string(),
                    kind,
                };
                result.matches.push(to_match(token, mode, protected));
            }

            result.compliant += semantic_re()
                .find_iter(line)
                .filter(|m| bounded(line, m.start(), m.end(), &[]))
                .count();
        }
        result
    }
}

fn to_match(token: ColorToken, mode: ScanMode, protected: bool) -> ScanMatch {
    let line = token.line_number;
    let column = token.column;
    let kind = token.kind;
    if protected {
        return ScanMatch {
            line,
            column,
            text: token.raw_text,
            kind,
            suggestion: None,
            fixable: false,
            origin: Origin::None,
            protected: true,
        };
    }
    let mapping = mapping::resolve(token, mode);
    ScanMatch {
        line,
        column,
        text: mapping.token.raw_text,
        kind,
        suggestion: mapping.suggestion,
        fixable: mapping.fixable,
        origin: mapping.origin,
        protected: false,
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}

/// Convenience for callers that only hold a project root.
pub fn scan_project_colors(root: &Path, mode: ScanMode) -> Result<ScanResult> {
    let config = Config::load(root)?;
    Scanner::new(&config).scan(root, mode)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
