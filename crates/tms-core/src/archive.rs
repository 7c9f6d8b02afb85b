//! Copies completed-task lines out of `NEXT-TASKS.md` into a dated COLD file.
//!
//! The source file is never modified; pruning it stays a manual step.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::tag;
use crate::tier::Tier;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    /// `NEXT-TASKS.md` does not exist.
    pub source_missing: bool,
    pub completed: Vec<String>,
    /// Root-relative path of the archive file, set only when one was written.
    pub archive_path: Option<String>,
    pub dry_run: bool,
}

/// Lines marking a finished task: a check mark emoji, a ticked `[x]`
/// checkbox (either case), or the word COMPLETED.
pub fn completed_task_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| {
            line.contains('✅')
                || line.contains("[x]")
                || line.contains("[X]")
                || line.contains("COMPLETED")
        })
        .map(str::to_string)
        .collect()
}

pub fn archive_file_name(date: NaiveDate) -> String {
    format!("completed-tasks-{}.md", date.format("%Y-%m-%d"))
}

fn render_archive(date: NaiveDate, lines: &[String]) -> String {
    let body = format!(
        "# Completed Tasks - Archived {date}\n\n\
         This file contains tasks that were completed and archived from {src}.\n\n\
         ---\n\n\
         {tasks}\n\n\
         ---\n",
        date = date.format("%Y-%m-%d"),
        src = paths::NEXT_TASKS_MD,
        tasks = lines.join("\n"),
    );
    tag::write_tag(&body, Tier::Cold)
}

/// Collect completed tasks and, unless `dry_run`, write them to
/// `docs/archive/completed-tasks-<date>.md`. An existing archive for the
/// same date is overwritten.
pub fn archive_completed(root: &Path, today: NaiveDate, dry_run: bool) -> Result<ArchiveOutcome> {
    let source = paths::next_tasks_path(root);
    if !source.exists() {
        return Ok(ArchiveOutcome {
            source_missing: true,
            dry_run,
            ..ArchiveOutcome::default()
        });
    }

    let content = std::fs::read_to_string(&source)?;
    let completed = completed_task_lines(&content);
    let mut outcome = ArchiveOutcome {
        source_missing: false,
        completed,
        archive_path: None,
        dry_run,
    };
    if outcome.completed.is_empty() || dry_run {
        return Ok(outcome);
    }

    let rel = format!("{}/{}", paths::ARCHIVE_DIR, archive_file_name(today));
    let data = render_archive(today, &outcome.completed);
    io::atomic_write(&root.join(&rel), data.as_bytes())?;
    tracing::debug!(file = %rel, tasks = outcome.completed.len(), "archive written");
    outcome.archive_path = Some(rel);
    Ok(outcome)
}
