//! Text rendering of the applied theme artifacts.
//!
//! Everything here is pure or read-only: callers decide whether the planned
//! contents reach the disk.

use crate::error::Result;
use crate::paths;
use crate::theme::{Palette, Slot, Theme};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

pub const COLORS_START: &str = "// themekit:colors:start";
pub const COLORS_END: &str = "// themekit:colors:end";

/// Build config written when the project has none.
pub const FRESH_BUILD_CONFIG: &str = "tailwind.config.js";

// ---------------------------------------------------------------------------
// Palette + stylesheet
// ---------------------------------------------------------------------------

pub fn render_palette(theme: &Theme) -> Result<String> {
    let mut json = theme.to_json()?;
    json.push('\n');
    Ok(json)
}

fn write_vars(out: &mut String, palette: &Palette) {
    for (slot, hsl) in palette.iter() {
        out.push_str(&format!("    {}: {hsl};\n", slot.css_var()));
    }
}

pub fn render_stylesheet(theme: &Theme) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "/* Generated by themekit from theme \"{}\". Changes are overwritten on the next apply. */\n",
        theme.id
    ));
    out.push_str("@layer base {\n  :root {\n");
    write_vars(&mut out, &theme.light);
    out.push_str(&format!("    --radius: {};\n", theme.radius));
    if let Some(font) = &theme.font_family {
        if let Some(sans) = &font.sans {
            out.push_str(&format!("    --font-sans: {sans};\n"));
        }
        if let Some(mono) = &font.mono {
            out.push_str(&format!("    --font-mono: {mono};\n"));
        }
    }
    out.push_str("  }\n\n  .dark {\n");
    write_vars(&mut out, &theme.dark);
    out.push_str("  }\n}\n");
    out
}

// ---------------------------------------------------------------------------
// Build config
// ---------------------------------------------------------------------------

/// The managed block, from start marker through end marker.
pub fn render_colors_block() -> String {
    let mut out = format!("{COLORS_START}\n      colors: {{\n");
    for slot in Slot::all() {
        let name = slot.as_str();
        let key = if name.contains('-') {
            format!("\"{name}\"")
        } else {
            name.to_string()
        };
        out.push_str(&format!("        {key}: \"hsl(var({}))\",\n", slot.css_var()));
    }
    out.push_str("      },\n");
    out.push_str("      borderRadius: {\n");
    out.push_str("        lg: \"var(--radius)\",\n");
    out.push_str("        md: \"calc(var(--radius) - 2px)\",\n");
    out.push_str("        sm: \"calc(var(--radius) - 4px)\",\n");
    out.push_str("      },\n      ");
    out.push_str(COLORS_END);
    out
}

pub fn render_build_config() -> String {
    format!(
        "/** @type {{import('tailwindcss').Config}} */\n\
         module.exports = {{\n  \
           darkMode: [\"class\"],\n  \
           content: [\n    \
             \"./src/**/*.{{ts,tsx,js,jsx,vue,svelte,html,astro,mdx}}\",\n    \
             \"./app/**/*.{{ts,tsx,js,jsx,vue,svelte,html,astro,mdx}}\",\n    \
             \"./components/**/*.{{ts,tsx,js,jsx,vue,svelte,html,astro,mdx}}\",\n    \
             \"./pages/**/*.{{ts,tsx,js,jsx,vue,svelte,html,astro,mdx}}\",\n  \
           ],\n  \
           theme: {{\n    \
             extend: {{\n      \
               {block}\n    \
             }},\n  \
           }},\n  \
           plugins: [],\n\
         }};\n",
        block = render_colors_block()
    )
}

static EXTEND_RE: OnceLock<Regex> = OnceLock::new();

fn extend_re() -> &'static Regex {
    EXTEND_RE.get_or_init(|| Regex::new(r"extend\s*:\s*\{").unwrap())
}

/// Refresh the managed block in an existing build config.
///
/// Errors carry a human-readable reason the file was left alone.
pub fn update_build_config(existing: &str) -> std::result::Result<String, String> {
    let block = render_colors_block();
    if existing.contains(COLORS_START) {
        return crate::io::replace_between_markers(existing, COLORS_START, COLORS_END, &block)
            .ok_or_else(|| format!("found '{COLORS_START}' without '{COLORS_END}'"));
    }
    let anchor = extend_re()
        .find(existing)
        .ok_or_else(|| "no 'extend: {' section to hold the theme colors".to_string())?;

    let mut out = String::with_capacity(existing.len() + block.len() + 8);
    out.push_str(&existing[..anchor.end()]);
    out.push_str("\n      ");
    out.push_str(&block);
    out.push_str(&existing[anchor.end()..]);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Import wiring
// ---------------------------------------------------------------------------

/// `@import` line that pulls `stylesheet` into `global`.
pub fn import_line(global: &str, stylesheet: &str) -> String {
    format!("@import \"{}\";", paths::relative_import(global, stylesheet))
}

/// `content` with the import prepended, or `None` when already present.
pub fn wire_import(global: &str, content: &str, stylesheet: &str) -> Option<String> {
    crate::io::prepend_line_if_missing(content, &import_line(global, stylesheet))
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    Create,
    Update,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedWrite {
    pub path: String,
    pub action: WriteAction,
    #[serde(skip)]
    pub content: String,
}

impl PlannedWrite {
    /// Compare `content` against what is on disk at `root/path`.
    pub fn against_disk(root: &Path, path: &str, content: String) -> Result<Self> {
        let live = root.join(path);
        let action = if !live.is_file() {
            WriteAction::Create
        } else if std::fs::read(&live)? == content.as_bytes() {
            WriteAction::Unchanged
        } else {
            WriteAction::Update
        };
        Ok(Self {
            path: path.to_string(),
            action,
            content,
        })
    }

    pub fn is_change(&self) -> bool {
        self.action != WriteAction::Unchanged
    }
}

/// Palette, stylesheet and build config contents for applying `theme`.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPlan {
    pub writes: Vec<PlannedWrite>,
    /// The build config holds the managed block after applying.
    pub config_updated: bool,
    pub warnings: Vec<String>,
}

pub fn plan_artifacts(root: &Path, theme: &Theme, stylesheet: &str) -> Result<ArtifactPlan> {
    let mut plan = ArtifactPlan::default();
    plan.writes.push(PlannedWrite::against_disk(
        root,
        paths::PALETTE_FILE,
        render_palette(theme)?,
    )?);
    plan.writes.push(PlannedWrite::against_disk(
        root,
        stylesheet,
        render_stylesheet(theme),
    )?);

    match paths::existing_build_config(root) {
        None => {
            plan.writes.push(PlannedWrite::against_disk(
                root,
                FRESH_BUILD_CONFIG,
                render_build_config(),
            )?);
            plan.config_updated = true;
        }
        Some(name) => {
            let existing = std::fs::read_to_string(root.join(name))?;
            match update_build_config(&existing) {
                Ok(updated) => {
                    plan.writes.push(PlannedWrite::against_disk(root, name, updated)?);
                    plan.config_updated = true;
                }
                Err(reason) => {
                    tracing::warn!(file = name, %reason, "build config left untouched");
                    plan.warnings.push(format!("{name}: {reason}; add the theme colors by hand"));
                }
            }
        }
    }

    Ok(plan)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::tests::document;
    use tempfile::TempDir;

    fn theme() -> Theme {
        Theme::try_from(document("neo-tokyo", "346.8 77.2% 49.8%")).unwrap()
    }

    #[test]
    fn stylesheet_has_both_modes_and_radius() {
        let css = render_stylesheet(&theme());
        assert!(css.contains("@layer base {\n  :root {\n"));
        assert!(css.contains("    --primary: 346.8 77.2% 49.8%;\n"));
        assert!(css.contains("    --radius: 0.5rem;\n"));
        assert!(css.contains("  .dark {\n"));
        assert_eq!(css.matches("--primary-foreground:").count(), 2);
    }

    #[test]
    fn palette_round_trips_to_theme() {
        let t = theme();
        let json = render_palette(&t).unwrap();
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn colors_block_maps_every_slot() {
        let block = render_colors_block();
        assert!(block.starts_with(COLORS_START));
        assert!(block.ends_with(COLORS_END));
        for slot in Slot::all() {
            assert!(block.contains(&format!("hsl(var({}))", slot.css_var())), "{slot}");
        }
        assert!(block.contains("\"primary-foreground\": \"hsl(var(--primary-foreground))\""));
        assert!(block.contains("lg: \"var(--radius)\""));
    }

    #[test]
    fn fresh_config_contains_block_inside_extend() {
        let config = render_build_config();
        let extend = config.find("extend: {").unwrap();
        let start = config.find(COLORS_START).unwrap();
        assert!(start > extend);
        assert!(config.contains("darkMode: [\"class\"]"));
    }

    #[test]
    fn update_inserts_after_extend_then_replaces_between_markers() {
        let existing = "module.exports = {\n  theme: {\n    extend: {\n      spacing: { 18: '4.5rem' },\n    },\n  },\n};\n";
        let once = update_build_config(existing).unwrap();
        assert!(once.contains(COLORS_START));
        assert!(once.contains("spacing: { 18: '4.5rem' }"));

        let twice = update_build_config(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.matches(COLORS_START).count(), 1);
    }

    #[test]
    fn update_without_anchor_is_refused() {
        let err = update_build_config("export default { plugins: [] }").unwrap_err();
        assert!(err.contains("extend"));
        let err = update_build_config(&format!("{COLORS_START}\nno end")).unwrap_err();
        assert!(err.contains(COLORS_END));
    }

    #[test]
    fn wire_import_is_relative_and_idempotent() {
        let out = wire_import("src/index.css", "body {}\n", "src/styles/theme.css").unwrap();
        assert!(out.starts_with("@import \"./styles/theme.css\";\n"));
        assert!(wire_import("src/index.css", &out, "src/styles/theme.css").is_none());

        let line = import_line("src/app/globals.css", "src/styles/theme.css");
        assert_eq!(line, "@import \"../styles/theme.css\";");
    }

    #[test]
    fn plan_reports_actions_against_disk() {
        let dir = TempDir::new().unwrap();
        let t = theme();
        let first = plan_artifacts(dir.path(), &t, paths::DEFAULT_STYLESHEET).unwrap();
        assert!(first.config_updated);
        let paths_planned: Vec<&str> = first.writes.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(
            paths_planned,
            vec![".themekit/theme.json", "src/styles/theme.css", "tailwind.config.js"]
        );
        assert!(first.writes.iter().all(|w| w.action == WriteAction::Create));

        for w in &first.writes {
            crate::io::atomic_write(&dir.path().join(&w.path), w.content.as_bytes()).unwrap();
        }
        let second = plan_artifacts(dir.path(), &t, paths::DEFAULT_STYLESHEET).unwrap();
        assert!(second.writes.iter().all(|w| w.action == WriteAction::Unchanged));
    }

    #[test]
    fn plan_warns_on_unmanageable_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("tailwind.config.ts"), "export default {}").unwrap();
        let plan = plan_artifacts(dir.path(), &theme(), paths::DEFAULT_STYLESHEET).unwrap();
        assert!(!plan.config_updated);
        assert_eq!(plan.writes.len(), 2);
        assert!(plan.warnings[0].starts_with("tailwind.config.ts:"));
    }
}
