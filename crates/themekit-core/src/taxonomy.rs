//! Color taxonomy: the curated literal table and the hue/shade rules used to
//! infer a semantic replacement for palette colors the table does not cover.
//!
//! Everything here is pure and infallible. Unknown inputs yield `None`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// SemanticCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticCategory {
    Success,
    Warning,
    Destructive,
    Info,
    Primary,
    Accent,
    Neutral,
}

impl SemanticCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            SemanticCategory::Success => "success",
            SemanticCategory::Warning => "warning",
            SemanticCategory::Destructive => "destructive",
            SemanticCategory::Info => "info",
            SemanticCategory::Primary => "primary",
            SemanticCategory::Accent => "accent",
            SemanticCategory::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OpacityTier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpacityTier {
    Ten,
    Twenty,
    Thirty,
    Seventy,
    Full,
}

impl OpacityTier {
    /// Utility-class opacity suffix, e.g. `/10`. Empty for `Full`.
    pub fn suffix(self) -> &'static str {
        match self {
            OpacityTier::Ten => "/10",
            OpacityTier::Twenty => "/20",
            OpacityTier::Thirty => "/30",
            OpacityTier::Seventy => "/70",
            OpacityTier::Full => "",
        }
    }
}

impl fmt::Display for OpacityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OpacityTier::Ten => "10%",
            OpacityTier::Twenty => "20%",
            OpacityTier::Thirty => "30%",
            OpacityTier::Seventy => "70%",
            OpacityTier::Full => "full",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Literal table
// ---------------------------------------------------------------------------

/// Reviewed token → semantic replacements. Hex keys are lowercase.
const LITERAL_MAPPINGS: &[(&str, &str)] = &[
    // surfaces
    ("bg-white", "bg-background"),
    ("bg-black", "bg-foreground"),
    ("bg-gray-50", "bg-muted"),
    ("bg-gray-100", "bg-muted"),
    ("bg-gray-200", "bg-secondary"),
    ("bg-gray-800", "bg-card"),
    ("bg-gray-900", "bg-background"),
    ("bg-slate-50", "bg-muted"),
    ("bg-slate-100", "bg-muted"),
    ("bg-slate-900", "bg-background"),
    // text
    ("text-white", "text-primary-foreground"),
    ("text-black", "text-foreground"),
    ("text-gray-900", "text-foreground"),
    ("text-gray-800", "text-foreground"),
    ("text-gray-700", "text-foreground"),
    ("text-gray-600", "text-muted-foreground"),
    ("text-gray-500", "text-muted-foreground"),
    ("text-gray-400", "text-muted-foreground"),
    ("text-slate-900", "text-foreground"),
    ("text-slate-500", "text-muted-foreground"),
    // borders
    ("border-gray-100", "border-border"),
    ("border-gray-200", "border-border"),
    ("border-gray-300", "border-input"),
    ("border-slate-200", "border-border"),
    ("divide-gray-200", "divide-border"),
    ("ring-gray-300", "ring-ring"),
    // brand
    ("bg-blue-500", "bg-primary"),
    ("bg-blue-600", "bg-primary/90"),
    ("bg-blue-700", "bg-primary/80"),
    ("bg-blue-50", "bg-primary/10"),
    ("bg-blue-100", "bg-primary/20"),
    ("text-blue-500", "text-primary"),
    ("text-blue-600", "text-primary"),
    ("text-blue-700", "text-primary"),
    ("border-blue-500", "border-primary"),
    ("ring-blue-500", "ring-ring"),
    ("bg-indigo-500", "bg-primary"),
    ("bg-indigo-600", "bg-primary/90"),
    ("text-indigo-600", "text-primary"),
    // status
    ("bg-red-500", "bg-destructive"),
    ("bg-red-600", "bg-destructive/90"),
    ("bg-red-50", "bg-destructive/10"),
    ("bg-red-100", "bg-destructive/20"),
    ("text-red-500", "text-destructive"),
    ("text-red-600", "text-destructive"),
    ("border-red-500", "border-destructive"),
    ("bg-green-500", "bg-success"),
    ("bg-green-600", "bg-success/90"),
    ("bg-green-50", "bg-success/10"),
    ("bg-green-100", "bg-success/20"),
    ("text-green-500", "text-success"),
    ("text-green-600", "text-success"),
    ("bg-yellow-500", "bg-warning"),
    ("bg-yellow-50", "bg-warning/10"),
    ("bg-yellow-100", "bg-warning/20"),
    ("text-yellow-600", "text-warning"),
    ("bg-amber-500", "bg-warning"),
    ("text-amber-600", "text-warning"),
    ("bg-purple-500", "bg-accent"),
    ("text-purple-600", "text-accent-foreground"),
    // hex
    ("#ffffff", "hsl(var(--background))"),
    ("#fff", "hsl(var(--background))"),
    ("#000000", "hsl(var(--foreground))"),
    ("#000", "hsl(var(--foreground))"),
    ("#f9fafb", "hsl(var(--muted))"),
    ("#f3f4f6", "hsl(var(--muted))"),
    ("#e5e7eb", "hsl(var(--border))"),
    ("#6b7280", "hsl(var(--muted-foreground))"),
    ("#111827", "hsl(var(--foreground))"),
    ("#3b82f6", "hsl(var(--primary))"),
    ("#2563eb", "hsl(var(--primary))"),
    ("#ef4444", "hsl(var(--destructive))"),
    ("#dc2626", "hsl(var(--destructive))"),
    ("#22c55e", "hsl(var(--success))"),
    ("#16a34a", "hsl(var(--success))"),
    ("#f59e0b", "hsl(var(--warning))"),
    ("#eab308", "hsl(var(--warning))"),
];

static LITERAL_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn literal_table() -> &'static HashMap<&'static str, &'static str> {
    LITERAL_TABLE.get_or_init(|| LITERAL_MAPPINGS.iter().copied().collect())
}

/// Exact-string lookup in the curated literal table.
pub fn resolve_literal(token: &str) -> Option<&'static str> {
    literal_table().get(token).copied()
}

/// Number of reviewed literal entries.
pub fn literal_count() -> usize {
    LITERAL_MAPPINGS.len()
}

// ---------------------------------------------------------------------------
// Hue families
// ---------------------------------------------------------------------------

/// Every palette family name the inference grammar recognizes.
pub const COLOR_FAMILIES: &[&str] = &[
    "slate", "gray", "zinc", "neutral", "stone", "red", "rose", "orange", "amber", "yellow",
    "lime", "green", "emerald", "teal", "cyan", "sky", "blue", "indigo", "violet", "purple",
    "fuchsia", "pink",
];

pub fn classify_hue_family(family: &str) -> Option<SemanticCategory> {
    let category = match family {
        "slate" | "gray" | "zinc" | "neutral" | "stone" => SemanticCategory::Neutral,
        "red" | "rose" => SemanticCategory::Destructive,
        "orange" | "amber" | "yellow" => SemanticCategory::Warning,
        "green" | "emerald" | "lime" | "teal" => SemanticCategory::Success,
        "sky" | "cyan" => SemanticCategory::Info,
        "blue" | "indigo" => SemanticCategory::Primary,
        "violet" | "purple" | "fuchsia" | "pink" => SemanticCategory::Accent,
        _ => return None,
    };
    Some(category)
}

// ---------------------------------------------------------------------------
// Shades
// ---------------------------------------------------------------------------

/// Map a 1-900 intensity into an opacity tier. Boundaries are inclusive-low:
/// 100 is still `Ten`, 101 is `Twenty`.
pub fn bucket_shade(shade: u32) -> Option<OpacityTier> {
    let tier = match shade {
        0 => return None,
        1..=100 => OpacityTier::Ten,
        101..=200 => OpacityTier::Twenty,
        201..=300 => OpacityTier::Thirty,
        301..=400 => OpacityTier::Seventy,
        401..=950 => OpacityTier::Full,
        _ => return None,
    };
    Some(tier)
}

/// Neutral families collapse into three slots instead of opacity tiers.
pub fn neutral_slot(shade: u32) -> Option<&'static str> {
    match shade {
        0 => None,
        1..=200 => Some("muted"),
        201..=699 => Some("muted-foreground"),
        700..=950 => Some("foreground"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
