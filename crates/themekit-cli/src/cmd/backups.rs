use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use themekit_core::backup::{BackupManager, BackupOrigin};

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (config, _) = super::load_project(root)?;
    let manifests = BackupManager::new(root)
        .with_stylesheet(config.stylesheet)
        .list()
        .context("failed to list backups")?;

    if json {
        return print_json(&manifests);
    }

    if manifests.is_empty() {
        println!("No backups.");
        return Ok(());
    }

    let rows = manifests
        .iter()
        .map(|m| {
            let origin = match m.origin {
                BackupOrigin::Apply => "apply",
                BackupOrigin::Rollback => "rollback",
            };
            vec![
                m.id.clone(),
                m.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                origin.to_string(),
                format!("{} -> {}", m.previous_theme, m.new_theme),
                m.changed_files.len().to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "CREATED", "ORIGIN", "THEME", "FILES"], rows);
    Ok(())
}
