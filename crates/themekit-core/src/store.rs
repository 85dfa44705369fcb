//! Theme template library.
//!
//! Themes come from two sources: the library embedded in the binary and an
//! optional on-disk directory of `*.json` documents. A directory theme with the
//! same id as a built-in one replaces it.

use crate::error::{Result, ThemeError};
use crate::paths;
use crate::theme::{validate, Category, Theme, ThemeDocument, Validation};
use rust_embed::Embed;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Embed)]
#[folder = "themes/"]
struct BuiltinThemes;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A template that could not be loaded. Recorded, never fatal.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTheme {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ThemeCatalog {
    pub by_category: BTreeMap<Category, Vec<Theme>>,
    pub skipped: Vec<SkippedTheme>,
}

impl ThemeCatalog {
    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        self.by_category.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// ThemeStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Source {
    Builtin,
    Directory(PathBuf),
}

struct RawEntry {
    source: String,
    parsed: std::result::Result<ThemeDocument, String>,
}

#[derive(Debug, Clone)]
pub struct ThemeStore {
    sources: Vec<Source>,
}

impl ThemeStore {
    /// Only the embedded library.
    pub fn builtin() -> Self {
        Self {
            sources: vec![Source::Builtin],
        }
    }

    /// Only the given directory.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            sources: vec![Source::Directory(dir.into())],
        }
    }

    /// The embedded library, overlaid by `dir` when given.
    pub fn with_library(dir: Option<&Path>) -> Self {
        let mut sources = vec![Source::Builtin];
        if let Some(dir) = dir {
            sources.push(Source::Directory(dir.to_path_buf()));
        }
        Self { sources }
    }

    fn read_entries(&self) -> Vec<RawEntry> {
        let mut entries = Vec::new();
        for source in &self.sources {
            match source {
                Source::Builtin => {
                    let mut names: Vec<String> =
                        BuiltinThemes::iter().map(|n| n.into_owned()).collect();
                    names.sort();
                    for name in names {
                        let Some(file) = BuiltinThemes::get(&name) else {
                            continue;
                        };
                        entries.push(RawEntry {
                            source: format!("builtin:{name}"),
                            parsed: serde_json::from_slice(&file.data).map_err(|e| e.to_string()),
                        });
                    }
                }
                Source::Directory(dir) => entries.extend(read_dir_entries(dir)),
            }
        }
        entries
    }

    /// Every loadable theme, grouped by category and sorted by id.
    ///
    /// Documents that fail to parse or validate are skipped with a warning.
    pub fn load_all(&self) -> ThemeCatalog {
        let mut by_id: BTreeMap<String, Theme> = BTreeMap::new();
        let mut skipped = Vec::new();

        for entry in self.read_entries() {
            let doc = match entry.parsed {
                Ok(doc) => doc,
                Err(reason) => {
                    tracing::warn!(source = %entry.source, %reason, "skipping unparseable theme");
                    skipped.push(SkippedTheme {
                        source: entry.source,
                        reason,
                    });
                    continue;
                }
            };
            match Theme::try_from(doc) {
                Ok(theme) => {
                    by_id.insert(theme.id.clone(), theme);
                }
                Err(e) => {
                    tracing::warn!(source = %entry.source, error = %e, "skipping invalid theme");
                    skipped.push(SkippedTheme {
                        source: entry.source,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut by_category: BTreeMap<Category, Vec<Theme>> = BTreeMap::new();
        for theme in by_id.into_values() {
            by_category.entry(theme.category).or_default().push(theme);
        }
        ThemeCatalog {
            by_category,
            skipped,
        }
    }

    /// The raw document for `id`, without validating it.
    pub fn find_document(&self, id: &str) -> Result<ThemeDocument> {
        paths::validate_theme_id(id)?;
        self.read_entries()
            .into_iter()
            .rev()
            .filter_map(|e| e.parsed.ok())
            .find(|doc| doc.id.as_deref().map(str::trim) == Some(id))
            .ok_or_else(|| ThemeError::ThemeNotFound(id.to_string()))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Theme> {
        Theme::try_from(self.find_document(id)?)
    }

    pub fn validate(&self, doc: &ThemeDocument) -> Validation {
        validate(doc)
    }
}

fn read_dir_entries(dir: &Path) -> Vec<RawEntry> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "theme library unreadable");
            return Vec::new();
        }
    };
    let mut files: Vec<PathBuf> = read
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    files
        .into_iter()
        .map(|path| {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|data| serde_json::from_str(&data).map_err(|e| e.to_string()));
            RawEntry {
                source: path.display().to_string(),
                parsed,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::tests::document;
    use tempfile::TempDir;

    fn write_doc(dir: &Path, file: &str, doc: &ThemeDocument) {
        std::fs::write(dir.join(file), serde_json::to_string_pretty(doc).unwrap()).unwrap();
    }

    #[test]
    fn builtin_library_loads_cleanly() {
        let catalog = ThemeStore::builtin().load_all();
        assert!(catalog.skipped.is_empty(), "{:?}", catalog.skipped);
        assert!(catalog.len() >= 4);
        let neo = ThemeStore::builtin().get_by_id("neo-tokyo").unwrap();
        assert_eq!(neo.category, Category::Futuristic);
    }

    #[test]
    fn unparseable_theme_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "good.json", &document("good", "1 2% 3%"));
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = ThemeStore::from_dir(dir.path()).load_all();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.skipped.len(), 1);
        assert!(catalog.skipped[0].source.ends_with("broken.json"));
    }

    #[test]
    fn invalid_theme_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "bad.json", &document("bad", "nope"));
        let catalog = ThemeStore::from_dir(dir.path()).load_all();
        assert!(catalog.is_empty());
        assert!(catalog.skipped[0].reason.contains("failed validation"));
    }

    #[test]
    fn groups_by_category() {
        let dir = TempDir::new().unwrap();
        let mut a = document("a-theme", "1 2% 3%");
        a.category = Some("nature".to_string());
        write_doc(dir.path(), "a.json", &a);
        write_doc(dir.path(), "b.json", &document("b-theme", "1 2% 3%"));

        let catalog = ThemeStore::from_dir(dir.path()).load_all();
        assert_eq!(catalog.by_category[&Category::Nature][0].id, "a-theme");
        assert_eq!(catalog.by_category[&Category::Futuristic][0].id, "b-theme");
    }

    #[test]
    fn directory_overrides_builtin() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "neo.json", &document("neo-tokyo", "10 20% 30%"));
        let store = ThemeStore::with_library(Some(dir.path()));
        let theme = store.get_by_id("neo-tokyo").unwrap();
        assert_eq!(theme.name, "Test Theme");
        let catalog = store.load_all();
        assert_eq!(catalog.themes().filter(|t| t.id == "neo-tokyo").count(), 1);
    }

    #[test]
    fn get_by_id_not_found() {
        let err = ThemeStore::builtin().get_by_id("does-not-exist").unwrap_err();
        assert!(matches!(err, ThemeError::ThemeNotFound(_)));
        let err = ThemeStore::builtin().get_by_id("../etc").unwrap_err();
        assert!(matches!(err, ThemeError::InvalidThemeId(_)));
    }

    #[test]
    fn missing_directory_yields_empty_catalog() {
        let catalog = ThemeStore::from_dir("/nonexistent/themekit/themes").load_all();
        assert!(catalog.is_empty());
    }
}
