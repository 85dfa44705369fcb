//! Color mapping engine: turns a hardcoded color token into a semantic
//! replacement. Literal table first, inference second, literal always wins.

use crate::taxonomy::{self, SemanticCategory};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ScanMode
// ---------------------------------------------------------------------------

/// Breadth of a scan. `Full` also enables inferred mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Standard,
    Full,
}

impl ScanMode {
    pub fn from_full_flag(full: bool) -> Self {
        if full {
            ScanMode::Full
        } else {
            ScanMode::Standard
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScanMode::Standard => "standard",
            ScanMode::Full => "full",
        })
    }
}

// ---------------------------------------------------------------------------
// Tokens and mappings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    UtilityClass,
    HexLiteral,
}

/// One textual color usage found while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorToken {
    pub file_path: String,
    /// 1-based.
    pub line_number: usize,
    /// 1-based, in characters.
    pub column: usize,
    pub raw_text: String,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Literal,
    Inferred,
    None,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Literal => "literal",
            Origin::Inferred => "inferred",
            Origin::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMapping {
    pub token: ColorToken,
    pub suggestion: Option<String>,
    pub fixable: bool,
    pub origin: Origin,
}

// ---------------------------------------------------------------------------
// Utility grammar
// ---------------------------------------------------------------------------

/// Utility prefixes that take a palette color.
pub const COLOR_PREFIXES: &[&str] = &[
    "bg", "text", "border", "ring", "fill", "stroke", "outline", "divide", "from", "via", "to",
    "shadow", "decoration",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityParts<'a> {
    pub prefix: &'a str,
    pub family: &'a str,
    pub shade: u32,
    pub opacity: Option<&'a str>,
}

static UTILITY_RE: OnceLock<Regex> = OnceLock::new();

fn utility_re() -> &'static Regex {
    UTILITY_RE.get_or_init(|| {
        let pattern = format!(
            r"^({})-([a-z]+)-(\d{{2,3}})(?:/(\d{{1,3}}))?$",
            COLOR_PREFIXES.join("|")
        );
        Regex::new(&pattern).unwrap()
    })
}

/// Split `bg-emerald-400/50` into its prefix, family, shade and opacity.
pub fn parse_utility(token: &str) -> Option<UtilityParts<'_>> {
    let caps = utility_re().captures(token)?;
    let prefix = caps.get(1)?.as_str();
    let family = caps.get(2)?.as_str();
    let shade = caps.get(3)?.as_str().parse().ok()?;
    let opacity = caps.get(4).map(|m| m.as_str());
    Some(UtilityParts {
        prefix,
        family,
        shade,
        opacity,
    })
}

// ---------------------------------------------------------------------------
// Resolution tiers
// ---------------------------------------------------------------------------

/// Literal tier. Hex literals are matched case-insensitively.
pub fn literal_suggestion(raw: &str, kind: TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::UtilityClass => taxonomy::resolve_literal(raw),
        TokenKind::HexLiteral => taxonomy::resolve_literal(&raw.to_ascii_lowercase()),
    }
}

/// Inference tier: synthesize a class from hue family and shade.
pub fn inferred_suggestion(raw: &str) -> Option<String> {
    let parts = parse_utility(raw)?;
    let category = taxonomy::classify_hue_family(parts.family)?;

    let (slot, tier_suffix) = if category == SemanticCategory::Neutral {
        (taxonomy::neutral_slot(parts.shade)?, "")
    } else {
        let tier = taxonomy::bucket_shade(parts.shade)?;
        (category.as_str(), tier.suffix())
    };

    let suffix = match parts.opacity {
        Some(explicit) => format!("/{explicit}"),
        None => tier_suffix.to_string(),
    };
    Some(format!("{}-{slot}{suffix}", parts.prefix))
}

/// Resolve raw token text without positional information.
pub fn resolve_text(raw: &str, kind: TokenKind, mode: ScanMode) -> (Option<String>, Origin) {
    if let Some(literal) = literal_suggestion(raw, kind) {
        return (Some(literal.to_string()), Origin::Literal);
    }
    if mode == ScanMode::Full && kind == TokenKind::UtilityClass {
        if let Some(inferred) = inferred_suggestion(raw) {
            return (Some(inferred), Origin::Inferred);
        }
    }
    (None, Origin::None)
}

pub fn resolve(token: ColorToken, mode: ScanMode) -> ColorMapping {
    let (suggestion, origin) = resolve_text(&token.raw_text, token.kind, mode);
    ColorMapping {
        fixable: suggestion.is_some(),
        token,
        suggestion,
        origin,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
