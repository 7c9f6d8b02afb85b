//! Tier suggestions from git recency.
//!
//! Recently committed files are HOT, files touched within the warm window
//! are WARM, the rest COLD. Files git has never seen are treated as new and
//! land in HOT.

use crate::corpus;
use crate::error::Result;
use crate::git::HistoryProvider;
use crate::io;
use crate::tag;
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub hot_days: u32,
    pub warm_days: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            hot_days: 7,
            warm_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierChange {
    pub path: String,
    pub current: Option<Tier>,
    pub suggested: Tier,
    pub days_since_change: Option<i64>,
}

pub fn suggest_tier(days_since_change: Option<f64>, thresholds: TierThresholds) -> Tier {
    match days_since_change {
        None => Tier::Hot,
        Some(d) if d <= f64::from(thresholds.hot_days) => Tier::Hot,
        Some(d) if d <= f64::from(thresholds.warm_days) => Tier::Warm,
        Some(_) => Tier::Cold,
    }
}

/// Propose tag changes for every markdown file under `root`.
///
/// Files that already carry a tag are left alone unless `force` is set.
/// Files whose suggestion matches their current tag produce no change.
/// Files that cannot be read as UTF-8 text are skipped.
pub fn plan_auto_tier<H: HistoryProvider + ?Sized>(
    root: &Path,
    history: &H,
    thresholds: TierThresholds,
    now_epoch: i64,
    force: bool,
) -> Vec<TierChange> {
    let mut changes = Vec::new();
    for file in corpus::project_markdown_files(root) {
        let content = match std::fs::read_to_string(&file.abs) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(file = %file.rel, error = %e, "skipping unreadable file");
                continue;
            }
        };
        let current = tag::read_tag(&content);
        if current.is_some() && !force {
            continue;
        }

        let days = history
            .last_commit_epoch(&file.rel, root)
            .map(|ts| (now_epoch - ts) as f64 / SECONDS_PER_DAY);
        let suggested = suggest_tier(days, thresholds);
        if current == Some(suggested) {
            continue;
        }

        changes.push(TierChange {
            path: file.rel,
            current,
            suggested,
            days_since_change: days.map(|d| d.floor() as i64),
        });
    }
    changes
}

/// Write the suggested tag into each file. Returns the number of files written.
pub fn apply_tier_changes(root: &Path, changes: &[TierChange]) -> Result<usize> {
    for change in changes {
        let path = root.join(&change.path);
        let content = std::fs::read_to_string(&path)?;
        let updated = tag::write_tag(&content, change.suggested);
        io::atomic_write(&path, updated.as_bytes())?;
        tracing::debug!(file = %change.path, tier = %change.suggested, "tier tag written");
    }
    Ok(changes.len())
}
