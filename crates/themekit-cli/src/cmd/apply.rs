use crate::output::{print_json, print_warnings};
use anyhow::Context;
use std::path::Path;
use themekit_core::mapping::ScanMode;
use themekit_core::rebuild::{Rebuild, RebuildOptions, RebuildReport};
use themekit_core::render::WriteAction;

pub fn run(root: &Path, theme: &str, full: bool, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let (config, store) = super::load_project(root)?;
    let opts = RebuildOptions {
        mode: ScanMode::from_full_flag(full),
        dry_run,
    };
    let report = Rebuild::new(root, config, store)
        .run(theme, opts)
        .with_context(|| format!("failed to apply theme '{theme}'"))?;

    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &RebuildReport) {
    let verb = if report.dry_run { "Would apply" } else { "Applied" };
    println!("{verb} theme '{}' ({} scan)", report.theme_id, report.mode);
    if let Some(backup) = &report.backup {
        println!("Backup: {backup}  (undo with: themekit rollback {backup})");
    }

    println!();
    println!("Artifacts:");
    for a in &report.artifacts {
        let action = match a.action {
            WriteAction::Create => "create",
            WriteAction::Update => "update",
            WriteAction::Unchanged => "unchanged",
        };
        println!("  {action:9}  {}", a.path);
    }
    if let Some(global) = &report.import_wired {
        println!("  stylesheet imported from {global}");
    }

    println!();
    if report.files_changed.is_empty() {
        println!("No source files needed rewriting.");
    } else {
        println!("Source files ({}):", report.files_changed.len());
        for f in &report.files_changed {
            println!("  {} ({} replacements)", f.path, f.total());
            for r in &f.replacements {
                let tag = if r.dynamic { " [inferred]" } else { "" };
                println!("    {} -> {} x{}{tag}", r.from, r.to, r.count);
            }
        }
    }

    println!();
    println!(
        "Scanned {} files: {} references, {} compliant, {} hardcoded.",
        report.scan.files_scanned,
        report.scan.total_references,
        report.scan.compliant_count,
        report.scan.non_compliant_count
    );
    print_warnings(&report.warnings);
}
