//! In-memory source rewriting. Nothing here writes to disk.

use crate::error::Result;
use crate::mapping::{Origin, ScanMode, TokenKind};
use crate::scanner::{bounded, has_hex_context, is_comment_line, AssertionPolicy, FileMatches};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// ColorMap
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    pub to: String,
    pub origin: Origin,
    pub kind: TokenKind,
}

/// Approved `token → replacement` pairs for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMap {
    entries: BTreeMap<String, MapEntry>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, origin: Origin) {
        let from = from.into();
        let kind = if from.starts_with('#') {
            TokenKind::HexLiteral
        } else {
            TokenKind::UtilityClass
        };
        self.entries.insert(
            from,
            MapEntry {
                to: to.into(),
                origin,
                kind,
            },
        );
    }

    /// Every fixable, unprotected match of a scanned file.
    pub fn from_file_matches(file: &FileMatches) -> Self {
        let mut map = Self::new();
        for m in file.matches.iter().filter(|m| m.fixable && !m.protected) {
            if let Some(to) = &m.suggestion {
                map.insert(m.text.clone(), to.clone(), m.origin);
            }
        }
        map
    }

    pub fn get(&self, from: &str) -> Option<&MapEntry> {
        self.entries.get(from)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries usable in `mode`, longest token first.
    fn applicable(&self, mode: ScanMode) -> Vec<(&str, &MapEntry)> {
        let mut entries: Vec<(&str, &MapEntry)> = self
            .entries
            .iter()
            .filter(|(_, e)| match e.origin {
                Origin::Literal => true,
                Origin::Inferred => mode == ScanMode::Full,
                Origin::None => false,
            })
            .map(|(k, e)| (k.as_str(), e))
            .collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
        entries
    }
}

// ---------------------------------------------------------------------------
// Rewrite output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
    pub count: usize,
    /// Produced by inference rather than the literal table.
    #[serde(default)]
    pub dynamic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    pub changed: bool,
    pub replacements: Vec<Replacement>,
    pub new_content: String,
}

// ---------------------------------------------------------------------------
// Rewriter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    policy: AssertionPolicy,
}

impl Rewriter {
    pub fn new(policy: AssertionPolicy) -> Self {
        Self { policy }
    }

    /// Read `root/path` and compute its rewritten content.
    pub fn rewrite(&self, root: &Path, path: &str, map: &ColorMap, mode: ScanMode) -> Result<Rewrite> {
        let content = std::fs::read_to_string(root.join(path))?;
        Ok(self.rewrite_content(path, &content, map, mode))
    }

    pub fn rewrite_content(&self, path: &str, content: &str, map: &ColorMap, mode: ScanMode) -> Rewrite {
        let entries = map.applicable(mode);
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        let mut out = String::with_capacity(content.len());

        for line in content.split_inclusive('\n') {
            if self.policy.protects(path, line) {
                out.push_str(line);
                continue;
            }
            // Hex literals only count where the scanner would report them.
            let hex_ok = !is_comment_line(line) && has_hex_context(line);
            let mut current = line.to_string();
            for (from, entry) in &entries {
                let extra_before: &[char] = match entry.kind {
                    TokenKind::HexLiteral if !hex_ok => continue,
                    TokenKind::HexLiteral => &['&'],
                    TokenKind::UtilityClass => &[],
                };
                let (next, n) = replace_token(&current, from, &entry.to, extra_before);
                if n > 0 {
                    *counts.entry(from).or_default() += n;
                    current = next;
                }
            }
            out.push_str(&current);
        }

        let replacements: Vec<Replacement> = counts
            .into_iter()
            .filter_map(|(from, count)| {
                map.get(from).map(|e| Replacement {
                    from: from.to_string(),
                    to: e.to.clone(),
                    count,
                    dynamic: e.origin == Origin::Inferred,
                })
            })
            .collect();

        Rewrite {
            changed: !replacements.is_empty(),
            replacements,
            new_content: out,
        }
    }
}

/// Replace whole-token occurrences of `from` in `line`.
fn replace_token(line: &str, from: &str, to: &str, extra_before: &[char]) -> (String, usize) {
    let mut out = String::with_capacity(line.len());
    let mut count = 0;
    let mut last = 0;
    for (start, _) in line.match_indices(from) {
        if start < last {
            continue;
        }
        let end = start + from.len();
        if bounded(line, start, end, extra_before) {
            out.push_str(&line[last..start]);
            out.push_str(to);
            last = end;
            count += 1;
        }
    }
    out.push_str(&line[last..]);
    (out, count)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
