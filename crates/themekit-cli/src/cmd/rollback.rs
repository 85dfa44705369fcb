use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use themekit_core::backup::BackupManager;
use themekit_core::lock::ProjectLock;

pub fn run(root: &Path, id: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, _) = super::load_project(root)?;
    let _lock = ProjectLock::acquire(root).context("failed to lock project")?;

    let outcome = BackupManager::new(root)
        .with_stylesheet(config.stylesheet)
        .rollback(id)
        .context("rollback failed")?;

    if json {
        return print_json(&outcome);
    }

    println!(
        "Restored backup {} (theme: {})",
        outcome.backup_id, outcome.restored_theme
    );
    for path in &outcome.restored_files {
        println!("  restored: {path}");
    }
    for path in &outcome.removed_files {
        println!("  removed:  {path}");
    }
    println!("Safety backup: {}", outcome.safety_backup);
    Ok(())
}
