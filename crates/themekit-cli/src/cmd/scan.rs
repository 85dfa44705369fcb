use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use themekit_core::mapping::ScanMode;
use themekit_core::scanner::Scanner;

pub fn run(root: &Path, full: bool, json: bool) -> anyhow::Result<()> {
    let (config, _) = super::load_project(root)?;
    let mode = ScanMode::from_full_flag(full);
    let result = Scanner::new(&config)
        .scan(root, mode)
        .with_context(|| format!("failed to scan {}", root.display()))?;

    if json {
        return print_json(&result);
    }

    if result.files.is_empty() {
        println!("No hardcoded colors found ({} files scanned).", result.files_scanned);
    } else {
        let rows = result
            .files
            .iter()
            .flat_map(|f| {
                f.matches.iter().map(move |m| {
                    let suggestion = match (&m.suggestion, m.protected) {
                        (_, true) => "(test assertion)".to_string(),
                        (Some(s), false) => s.clone(),
                        (None, false) => "-".to_string(),
                    };
                    vec![
                        format!("{}:{}:{}", f.path, m.line, m.column),
                        m.text.clone(),
                        suggestion,
                        m.origin.as_str().to_string(),
                    ]
                })
            })
            .collect();
        print_table(&["LOCATION", "MATCH", "SUGGESTION", "ORIGIN"], rows);
    }

    println!();
    println!("Mode:          {}", result.mode);
    println!("Files scanned: {}", result.files_scanned);
    println!(
        "References:    {} ({} compliant, {} hardcoded, {} fixable)",
        result.total_references,
        result.compliant_count,
        result.non_compliant_count,
        result.fixable_count()
    );
    if mode == ScanMode::Standard && result.non_compliant_count > result.fixable_count() {
        println!("Run with --full to infer mappings for the rest.");
    }
    for skipped in &result.skipped {
        eprintln!("skipped unreadable file: {skipped}");
    }
    Ok(())
}
