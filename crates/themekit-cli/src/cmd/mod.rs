pub mod apply;
pub mod backups;
pub mod config;
pub mod current;
pub mod rollback;
pub mod scan;
pub mod theme;
pub mod themes;

use anyhow::Context;
use std::path::Path;
use themekit_core::config::Config;
use themekit_core::store::ThemeStore;

/// Project config plus the theme store it points at.
pub(crate) fn load_project(root: &Path) -> anyhow::Result<(Config, ThemeStore)> {
    let config = Config::load(root).context("failed to load .themekit/config.yaml")?;
    for w in config.validate() {
        tracing::warn!(level = ?w.level, "{}", w.message);
    }
    let store = ThemeStore::with_library(config.theme_library_dir(root).as_deref());
    Ok((config, store))
}
