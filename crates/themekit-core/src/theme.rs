use crate::error::ThemeError;
use crate::paths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

pub const DEFAULT_RADIUS: &str = "0.5rem";

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// A named role in a palette, independent of any color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    Background,
    Foreground,
    Card,
    CardForeground,
    Popover,
    PopoverForeground,
    Primary,
    PrimaryForeground,
    Secondary,
    SecondaryForeground,
    Muted,
    MutedForeground,
    Accent,
    AccentForeground,
    Destructive,
    DestructiveForeground,
    Success,
    Warning,
    Info,
    Border,
    Input,
    Ring,
}

impl Slot {
    pub fn all() -> &'static [Slot] {
        &[
            Slot::Background,
            Slot::Foreground,
            Slot::Card,
            Slot::CardForeground,
            Slot::Popover,
            Slot::PopoverForeground,
            Slot::Primary,
            Slot::PrimaryForeground,
            Slot::Secondary,
            Slot::SecondaryForeground,
            Slot::Muted,
            Slot::MutedForeground,
            Slot::Accent,
            Slot::AccentForeground,
            Slot::Destructive,
            Slot::DestructiveForeground,
            Slot::Success,
            Slot::Warning,
            Slot::Info,
            Slot::Border,
            Slot::Input,
            Slot::Ring,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Background => "background",
            Slot::Foreground => "foreground",
            Slot::Card => "card",
            Slot::CardForeground => "card-foreground",
            Slot::Popover => "popover",
            Slot::PopoverForeground => "popover-foreground",
            Slot::Primary => "primary",
            Slot::PrimaryForeground => "primary-foreground",
            Slot::Secondary => "secondary",
            Slot::SecondaryForeground => "secondary-foreground",
            Slot::Muted => "muted",
            Slot::MutedForeground => "muted-foreground",
            Slot::Accent => "accent",
            Slot::AccentForeground => "accent-foreground",
            Slot::Destructive => "destructive",
            Slot::DestructiveForeground => "destructive-foreground",
            Slot::Success => "success",
            Slot::Warning => "warning",
            Slot::Info => "info",
            Slot::Border => "border",
            Slot::Input => "input",
            Slot::Ring => "ring",
        }
    }

    pub fn from_name(name: &str) -> Option<Slot> {
        Slot::all().iter().copied().find(|s| s.as_str() == name)
    }

    /// CSS custom property name, e.g. `--primary-foreground`.
    pub fn css_var(self) -> String {
        format!("--{}", self.as_str())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Minimal,
    Corporate,
    Creative,
    Nature,
    Retro,
    Futuristic,
    Accessible,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Minimal,
            Category::Corporate,
            Category::Creative,
            Category::Nature,
            Category::Retro,
            Category::Futuristic,
            Category::Accessible,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Minimal => "minimal",
            Category::Corporate => "corporate",
            Category::Creative => "creative",
            Category::Nature => "nature",
            Category::Retro => "retro",
            Category::Futuristic => "futuristic",
            Category::Accessible => "accessible",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
                format!("unknown category '{s}' (expected one of: {})", allowed.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// Hsl
// ---------------------------------------------------------------------------

/// An `H S% L%` color triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

static HSL_RE: OnceLock<Regex> = OnceLock::new();

fn hsl_re() -> &'static Regex {
    HSL_RE.get_or_init(|| {
        Regex::new(r"^(\d{1,3}(?:\.\d+)?)\s+(\d{1,3}(?:\.\d+)?)%\s+(\d{1,3}(?:\.\d+)?)%$").unwrap()
    })
}

impl Hsl {
    pub fn parse(value: &str) -> Result<Hsl, String> {
        let caps = hsl_re()
            .captures(value.trim())
            .ok_or_else(|| format!("'{value}' is not an 'H S% L%' triple"))?;
        let num = |i: usize| -> f64 { caps[i].parse().unwrap_or(f64::NAN) };
        let hsl = Hsl {
            hue: num(1),
            saturation: num(2),
            lightness: num(3),
        };
        if !(0.0..=360.0).contains(&hsl.hue) {
            return Err(format!("'{value}' has hue outside 0-360"));
        }
        if !(0.0..=100.0).contains(&hsl.saturation) || !(0.0..=100.0).contains(&hsl.lightness) {
            return Err(format!("'{value}' has a percentage outside 0-100"));
        }
        Ok(hsl)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}% {}%", self.hue, self.saturation, self.lightness)
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// A total mapping from every `Slot` to a color.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    values: Vec<Hsl>,
}

impl Palette {
    /// Build a palette from raw slot names, collecting every problem found.
    pub fn from_raw(label: &str, raw: &BTreeMap<String, String>) -> Result<Palette, Vec<String>> {
        let mut errors = Vec::new();
        for key in raw.keys() {
            if Slot::from_name(key).is_none() {
                errors.push(format!("{label} palette has unknown slot '{key}'"));
            }
        }
        let mut values = Vec::with_capacity(Slot::all().len());
        for slot in Slot::all() {
            match raw.get(slot.as_str()) {
                None => errors.push(format!("{label} palette is missing slot '{slot}'")),
                Some(value) => match Hsl::parse(value) {
                    Ok(hsl) => values.push(hsl),
                    Err(e) => errors.push(format!("{label}.{slot}: {e}")),
                },
            }
        }
        if errors.is_empty() {
            Ok(Palette { values })
        } else {
            Err(errors)
        }
    }

    pub fn get(&self, slot: Slot) -> Hsl {
        self.values[slot as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, Hsl)> + '_ {
        Slot::all().iter().copied().zip(self.values.iter().copied())
    }

    pub fn to_raw(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(slot, hsl)| (slot.as_str().to_string(), hsl.to_string()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// On-disk document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFamily {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sans: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mono: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark: Option<BTreeMap<String, String>>,
}

/// A theme exactly as written in a template file or the project palette file.
/// Every field is optional so validation can report all problems at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorsDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
}

impl ThemeDocument {
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<unnamed>")
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

fn required<'a>(field: &str, value: &'a Option<String>, errors: &mut Vec<String>) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(format!("missing required field '{field}'"));
            None
        }
    }
}

/// Check a theme document without modifying it.
pub fn validate(doc: &ThemeDocument) -> Validation {
    let mut errors = Vec::new();

    if let Some(id) = required("id", &doc.id, &mut errors) {
        if !paths::is_valid_theme_id(id) {
            errors.push(format!("id '{id}' must match ^[a-z0-9-]+$"));
        }
    }
    required("name", &doc.name, &mut errors);
    required("description", &doc.description, &mut errors);
    if let Some(category) = required("category", &doc.category, &mut errors) {
        if let Err(e) = category.parse::<Category>() {
            errors.push(e);
        }
    }

    match &doc.colors {
        None => errors.push("missing required field 'colors'".to_string()),
        Some(colors) => {
            for (label, palette) in [("light", &colors.light), ("dark", &colors.dark)] {
                match palette {
                    None => errors.push(format!("missing '{label}' palette")),
                    Some(raw) => {
                        if let Err(mut palette_errors) = Palette::from_raw(label, raw) {
                            errors.append(&mut palette_errors);
                        }
                    }
                }
            }
        }
    }

    if let Some(radius) = &doc.radius {
        if radius.trim().is_empty() {
            errors.push("radius must not be empty when present".to_string());
        }
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// A validated theme. Only constructible from a document that passes `validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThemeDocument", into = "ThemeDocument")]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub light: Palette,
    pub dark: Palette,
    pub radius: String,
    pub font_family: Option<FontFamily>,
}

impl TryFrom<ThemeDocument> for Theme {
    type Error = ThemeError;

    fn try_from(doc: ThemeDocument) -> Result<Self, Self::Error> {
        let validation = validate(&doc);
        let invalid = || ThemeError::ValidationFailed {
            theme: doc.label().to_string(),
            errors: validation.errors.clone(),
        };
        if !validation.valid {
            return Err(invalid());
        }
        let colors = doc.colors.as_ref().ok_or_else(invalid)?;
        let light = colors.light.as_ref().ok_or_else(invalid)?;
        let dark = colors.dark.as_ref().ok_or_else(invalid)?;
        let category = doc
            .category
            .as_deref()
            .and_then(|c| c.trim().parse().ok())
            .ok_or_else(invalid)?;
        let light = Palette::from_raw("light", light).map_err(|_| invalid())?;
        let dark = Palette::from_raw("dark", dark).map_err(|_| invalid())?;

        Ok(Theme {
            id: doc.id.clone().unwrap_or_default().trim().to_string(),
            name: doc.name.clone().unwrap_or_default(),
            category,
            description: doc.description.clone().unwrap_or_default(),
            light,
            dark,
            radius: doc.radius.clone().unwrap_or_else(|| DEFAULT_RADIUS.to_string()),
            font_family: doc.font_family.clone(),
        })
    }
}

impl From<Theme> for ThemeDocument {
    fn from(theme: Theme) -> Self {
        theme.to_document()
    }
}

impl Theme {
    pub fn to_document(&self) -> ThemeDocument {
        ThemeDocument {
            id: Some(self.id.clone()),
            name: Some(self.name.clone()),
            category: Some(self.category.as_str().to_string()),
            description: Some(self.description.clone()),
            colors: Some(ColorsDocument {
                light: Some(self.light.to_raw()),
                dark: Some(self.dark.to_raw()),
            }),
            radius: Some(self.radius.clone()),
            font_family: self.font_family.clone(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
