use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use themekit_core::rebuild::project_theme;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let theme = project_theme(root).context("failed to read the applied theme")?;
    if json {
        return print_json(&theme);
    }
    super::theme::print_theme(&theme);
    Ok(())
}
