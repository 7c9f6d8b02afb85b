use crate::output::{print_json, truncate};
use anyhow::Context;
use chrono::Utc;
use std::path::Path;
use tms_core::{archive, paths};

const PREVIEW_LINES: usize = 5;

pub fn run(root: &Path, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let outcome =
        archive::archive_completed(root, today, dry_run).context("failed to archive tasks")?;

    if json {
        print_json(&outcome)?;
        return Ok(());
    }

    if outcome.source_missing {
        println!("{} not found in {}.", paths::NEXT_TASKS_MD, root.display());
        println!("Run this command from your project root, or pass --root.");
        return Ok(());
    }

    println!("Found {} completed task marker(s).", outcome.completed.len());
    if outcome.completed.is_empty() {
        println!("Nothing to archive: {} is already clean.", paths::NEXT_TASKS_MD);
        return Ok(());
    }

    if dry_run {
        println!("\nWould archive:");
        for line in outcome.completed.iter().take(PREVIEW_LINES) {
            println!("  {}", truncate(line.trim(), 80));
        }
        if outcome.completed.len() > PREVIEW_LINES {
            println!("  ... and {} more", outcome.completed.len() - PREVIEW_LINES);
        }
        println!("\nRun without --dry-run to write the archive.");
        return Ok(());
    }

    if let Some(path) = &outcome.archive_path {
        println!("Archived {} task(s) to {path}", outcome.completed.len());
    }
    println!(
        "{} was not modified; remove the archived tasks from it by hand.",
        paths::NEXT_TASKS_MD
    );
    Ok(())
}
