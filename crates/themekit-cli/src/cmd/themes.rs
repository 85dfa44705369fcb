use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use themekit_core::theme::Category;

pub fn run(root: &Path, category: Option<&str>, json: bool) -> anyhow::Result<()> {
    let filter: Option<Category> = category
        .map(|c| c.parse().map_err(anyhow::Error::msg))
        .transpose()
        .context("invalid --category")?;

    let (_, store) = super::load_project(root)?;
    let mut catalog = store.load_all();
    if let Some(filter) = filter {
        catalog.by_category.retain(|c, _| *c == filter);
    }

    if json {
        return print_json(&catalog);
    }

    if catalog.is_empty() {
        println!("No themes found.");
    } else {
        let rows = catalog
            .themes()
            .map(|t| {
                vec![
                    t.category.to_string(),
                    t.id.clone(),
                    t.name.clone(),
                    t.description.clone(),
                ]
            })
            .collect();
        print_table(&["CATEGORY", "ID", "NAME", "DESCRIPTION"], rows);
    }

    for skipped in &catalog.skipped {
        eprintln!("skipped {}: {}", skipped.source, skipped.reason);
    }
    Ok(())
}
