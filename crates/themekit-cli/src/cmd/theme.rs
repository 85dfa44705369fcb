use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use themekit_core::theme::{Theme, ThemeDocument};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ThemeSubcommand {
    /// Show a theme's metadata and palettes
    Show {
        /// Theme id
        id: String,
    },

    /// Validate a theme by id, or a theme JSON file with --file
    Validate {
        /// Theme id
        #[arg(required_unless_present = "file")]
        id: Option<String>,
        /// Path to a theme JSON file
        #[arg(long, conflicts_with = "id")]
        file: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ThemeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ThemeSubcommand::Show { id } => show(root, &id, json),
        ThemeSubcommand::Validate { id, file } => validate(root, id.as_deref(), file.as_deref(), json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let (_, store) = super::load_project(root)?;
    let theme = store
        .get_by_id(id)
        .with_context(|| format!("failed to load theme '{id}'"))?;

    if json {
        return print_json(&theme);
    }
    print_theme(&theme);
    Ok(())
}

pub(crate) fn print_theme(theme: &Theme) {
    println!("{} ({})", theme.name, theme.id);
    println!("Category: {}", theme.category);
    if !theme.description.is_empty() {
        println!("{}", theme.description);
    }
    println!("Radius:   {}", theme.radius);
    if let Some(font) = &theme.font_family {
        if let Some(sans) = &font.sans {
            println!("Sans:     {sans}");
        }
        if let Some(mono) = &font.mono {
            println!("Mono:     {mono}");
        }
    }

    let width = theme
        .light
        .iter()
        .map(|(slot, _)| slot.as_str().len())
        .max()
        .unwrap_or(0);
    println!();
    println!("{:width$}  {:20}  DARK", "SLOT", "LIGHT");
    for ((slot, light), (_, dark)) in theme.light.iter().zip(theme.dark.iter()) {
        println!("{:width$}  {:20}  {}", slot.as_str(), light.to_string(), dark);
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, id: Option<&str>, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let (_, store) = super::load_project(root)?;
    let doc: ThemeDocument = match (file, id) {
        (Some(path), _) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("{} is not a theme document", path.display()))?
        }
        (None, Some(id)) => store
            .find_document(id)
            .with_context(|| format!("failed to load theme '{id}'"))?,
        (None, None) => anyhow::bail!("give a theme id or --file"),
    };

    let validation = store.validate(&doc);

    if json {
        print_json(&validation)?;
    } else if validation.valid {
        println!("Theme '{}' is valid.", doc.label());
    } else {
        println!("Theme '{}' is invalid:", doc.label());
        for e in &validation.errors {
            println!("  - {e}");
        }
    }

    if !validation.valid {
        anyhow::bail!("theme '{}' failed validation", doc.label());
    }
    Ok(())
}
