use crate::error::{Result, ThemeError};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const THEMEKIT_DIR: &str = ".themekit";
pub const BACKUPS_DIR: &str = ".themekit/backups";

pub const CONFIG_FILE: &str = ".themekit/config.yaml";
pub const PALETTE_FILE: &str = ".themekit/theme.json";
pub const LOCK_FILE: &str = ".themekit/lock";
pub const MANIFEST_FILE: &str = "manifest.json";

pub const DEFAULT_STYLESHEET: &str = "src/styles/theme.css";

/// Recognized build-tool color config filenames, in preference order.
pub const BUILD_CONFIG_FILES: &[&str] = &["tailwind.config.js", "tailwind.config.ts"];

/// Global stylesheets that may host the theme import, in preference order.
pub const GLOBAL_STYLESHEETS: &[&str] = &[
    "src/app/globals.css",
    "app/globals.css",
    "src/index.css",
    "src/styles/globals.css",
    "styles/globals.css",
    "src/global.css",
];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn themekit_dir(root: &Path) -> PathBuf {
    root.join(THEMEKIT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn palette_path(root: &Path) -> PathBuf {
    root.join(PALETTE_FILE)
}

pub fn lock_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

pub fn backups_dir(root: &Path) -> PathBuf {
    root.join(BACKUPS_DIR)
}

pub fn backup_dir(root: &Path, id: &str) -> PathBuf {
    backups_dir(root).join(id)
}

pub fn backup_manifest(root: &Path, id: &str) -> PathBuf {
    backup_dir(root, id).join(MANIFEST_FILE)
}

/// The build-tool config that currently exists, if any.
pub fn existing_build_config(root: &Path) -> Option<&'static str> {
    BUILD_CONFIG_FILES
        .iter()
        .copied()
        .find(|name| root.join(name).is_file())
}

/// The first global stylesheet that exists under `root`.
pub fn existing_global_stylesheet(root: &Path) -> Option<&'static str> {
    GLOBAL_STYLESHEETS
        .iter()
        .copied()
        .find(|rel| root.join(rel).is_file())
}

/// Project-relative path rendered with forward slashes.
pub fn display_relative(root: &Path, path: &Path) -> String {
    normalize_relative(path.strip_prefix(root).unwrap_or(path))
}

/// `rel` joined from its normal components, so `./src//a.css` reads `src/a.css`.
pub fn normalize_relative(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// True when `rel` is relative and never climbs above the project root.
pub fn stays_inside(rel: &str) -> bool {
    Path::new(rel)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Relative import specifier from the file `from` to the file `to`, both
/// project-relative with forward slashes (e.g. `./styles/theme.css`).
pub fn relative_import(from: &str, to: &str) -> String {
    let from_dirs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let from_dirs = &from_dirs[..from_dirs.len().saturating_sub(1)];
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_dirs
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let ups = from_dirs.len() - common;
    let rest = to_parts[common..].join("/");
    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}

// ---------------------------------------------------------------------------
// Theme id validation
// ---------------------------------------------------------------------------

static THEME_ID_RE: OnceLock<Regex> = OnceLock::new();

fn theme_id_re() -> &'static Regex {
    THEME_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").unwrap())
}

pub fn is_valid_theme_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && theme_id_re().is_match(id)
}

pub fn validate_theme_id(id: &str) -> Result<()> {
    if !is_valid_theme_id(id) {
        return Err(ThemeError::InvalidThemeId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_theme_ids() {
        for id in ["neo-tokyo", "a", "slate-2", "-odd-but-allowed"] {
            validate_theme_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_theme_ids() {
        for id in ["", "Neo", "has space", "a_b", "../escape"] {
            assert!(validate_theme_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            palette_path(root),
            PathBuf::from("/tmp/proj/.themekit/theme.json")
        );
        assert_eq!(
            backup_manifest(root, "20250101-000000-neo"),
            PathBuf::from("/tmp/proj/.themekit/backups/20250101-000000-neo/manifest.json")
        );
    }

    #[test]
    fn relative_import_paths() {
        assert_eq!(
            relative_import("src/app/globals.css", "src/styles/theme.css"),
            "../styles/theme.css"
        );
        assert_eq!(
            relative_import("src/index.css", "src/styles/theme.css"),
            "./styles/theme.css"
        );
        assert_eq!(
            relative_import("app/globals.css", "src/styles/theme.css"),
            "../src/styles/theme.css"
        );
    }

    #[test]
    fn display_relative_uses_forward_slashes() {
        let root = Path::new("/tmp/proj");
        let p = root.join("src").join("App.tsx");
        assert_eq!(display_relative(root, &p), "src/App.tsx");
    }

    #[test]
    fn relative_paths_normalize_and_stay_inside() {
        assert_eq!(normalize_relative(Path::new("./src//styles/theme.css")), "src/styles/theme.css");
        assert!(stays_inside("packages/ui"));
        assert!(stays_inside("./packages"));
        assert!(!stays_inside("../outside"));
        assert!(!stays_inside("packages/../../x"));
        assert!(!stays_inside("/etc"));
    }
}
