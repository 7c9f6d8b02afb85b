//! Git-based staleness detection for governance docs.
//!
//! A doc is stale only when both thresholds are crossed: the watched code
//! is more than `threshold_days` newer than the doc, and at least
//! `min_commits` meaningful commits landed in the watched paths since the
//! doc was last committed.

use crate::config::Config;
use crate::git::HistoryProvider;
use crate::significance;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StalenessResult {
    pub is_stale: bool,
    pub doc_last_modified: Option<i64>,
    pub code_last_modified: Option<i64>,
    pub days_since_doc_update: Option<i64>,
    pub meaningful_commits: u32,
    pub reason: String,
}

impl StalenessResult {
    fn fresh(
        doc_last_modified: Option<i64>,
        code_last_modified: Option<i64>,
        days_since_doc_update: Option<i64>,
        reason: &str,
    ) -> Self {
        Self {
            is_stale: false,
            doc_last_modified,
            code_last_modified,
            days_since_doc_update,
            meaningful_commits: 0,
            reason: reason.to_string(),
        }
    }
}

/// Staleness of one configured doc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocStaleness {
    pub doc: String,
    pub watch: Vec<String>,
    pub result: StalenessResult,
}

pub fn check_doc_staleness<H: HistoryProvider + ?Sized>(
    history: &H,
    doc_path: &str,
    watch_paths: &[String],
    threshold_days: u32,
    min_commits: u32,
    cwd: &Path,
) -> StalenessResult {
    let Some(doc_ts) = history.last_commit_epoch(doc_path, cwd) else {
        return StalenessResult::fresh(
            None,
            None,
            None,
            "Doc has no git history (may be new or untracked)",
        );
    };

    let Some(code_ts) = watch_paths
        .iter()
        .filter_map(|w| history.last_commit_epoch(w, cwd))
        .max()
    else {
        return StalenessResult::fresh(
            Some(doc_ts),
            None,
            None,
            "No code changes found in watched paths",
        );
    };

    let days = (code_ts - doc_ts) as f64 / SECONDS_PER_DAY;
    if days <= 0.0 {
        return StalenessResult::fresh(
            Some(doc_ts),
            Some(code_ts),
            Some(0),
            "Doc is up to date (modified after code)",
        );
    }

    // Summed per watch path: overlapping paths count a commit more than once.
    let commits: u32 = watch_paths
        .iter()
        .map(|w| {
            history
                .list_commits_since(w, doc_ts, cwd)
                .iter()
                .filter(|c| significance::is_meaningful(&c.changed_paths))
                .count() as u32
        })
        .sum();

    let over_time = days > f64::from(threshold_days);
    let over_commits = commits >= min_commits;
    let is_stale = over_time && over_commits;
    let rounded = days.round() as i64;

    let reason = if is_stale {
        format!("Doc is {rounded} days older than code with {commits} meaningful commits")
    } else if over_time {
        format!("Time threshold exceeded but only {commits} commits (< {min_commits} minimum)")
    } else {
        format!("Within {threshold_days} day threshold ({rounded} days)")
    };

    tracing::debug!(doc = doc_path, days, commits, is_stale, "staleness evaluated");

    StalenessResult {
        is_stale,
        doc_last_modified: Some(doc_ts),
        code_last_modified: Some(code_ts),
        days_since_doc_update: Some(rounded),
        meaningful_commits: commits,
        reason,
    }
}

/// Evaluate every doc listed under `staleness.docs`. Empty when staleness is disabled.
pub fn check_configured_docs<H: HistoryProvider + ?Sized>(
    history: &H,
    config: &Config,
    root: &Path,
) -> Vec<DocStaleness> {
    if !config.staleness.enabled {
        return Vec::new();
    }
    config
        .staleness
        .docs
        .iter()
        .map(|entry| DocStaleness {
            doc: entry.doc.clone(),
            watch: entry.watch.clone(),
            result: check_doc_staleness(
                history,
                &entry.doc,
                &entry.watch,
                config.staleness.threshold_days,
                config.staleness.min_commits,
                root,
            ),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StalenessDoc;
    use crate::git::testing::{commit_at, git_available, init_repo};
    use crate::git::{CommitRecord, GitCli, ScriptedHistory};
    use tempfile::TempDir;

    const DAY: i64 = 86_400;
    const T0: i64 = 1_700_000_000;
    const DOC: &str = "docs/core/PATTERNS.md";

    fn watch(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn cwd() -> &'static Path {
        Path::new(".")
    }

    fn history_with_code_commits(days_later: i64, commits: &[&[&str]]) -> ScriptedHistory {
        let mut h = ScriptedHistory::new()
            .with_last_commit(DOC, T0)
            .with_last_commit("src/", T0 + days_later * DAY);
        for (i, paths) in commits.iter().enumerate() {
            h = h.with_commit(
                "src/",
                T0 + (i as i64 + 1) * DAY,
                CommitRecord::new(format!("c{i}"), paths),
            );
        }
        h
    }

    #[test]
    fn untracked_doc_is_never_stale() {
        let h = ScriptedHistory::new().with_last_commit("src/", T0);
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(!r.is_stale);
        assert_eq!(r.doc_last_modified, None);
        assert_eq!(r.reason, "Doc has no git history (may be new or untracked)");
    }

    #[test]
    fn no_code_history() {
        let h = ScriptedHistory::new().with_last_commit(DOC, T0);
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(!r.is_stale);
        assert_eq!(r.doc_last_modified, Some(T0));
        assert_eq!(r.code_last_modified, None);
        assert_eq!(r.reason, "No code changes found in watched paths");
    }

    #[test]
    fn empty_watch_list_means_no_code_changes() {
        let h = ScriptedHistory::new().with_last_commit(DOC, T0);
        let r = check_doc_staleness(&h, DOC, &[], 30, 3, cwd());
        assert_eq!(r.reason, "No code changes found in watched paths");
    }

    #[test]
    fn doc_newer_than_code_is_fresh() {
        let h = ScriptedHistory::new()
            .with_last_commit(DOC, T0 + DAY)
            .with_last_commit("src/", T0);
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(!r.is_stale);
        assert_eq!(r.days_since_doc_update, Some(0));
        assert_eq!(r.meaningful_commits, 0);
        assert_eq!(r.reason, "Doc is up to date (modified after code)");
    }

    #[test]
    fn same_timestamp_is_fresh() {
        let h = ScriptedHistory::new()
            .with_last_commit(DOC, T0)
            .with_last_commit("src/", T0);
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert_eq!(r.reason, "Doc is up to date (modified after code)");
    }

    #[test]
    fn stale_when_both_thresholds_exceeded() {
        let h = history_with_code_commits(45, &[&["src/a.ts"], &["src/b.ts"], &["src/c.ts"]]);
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(r.is_stale);
        assert_eq!(r.days_since_doc_update, Some(45));
        assert_eq!(r.meaningful_commits, 3);
        assert_eq!(r.reason, "Doc is 45 days older than code with 3 meaningful commits");
    }

    #[test]
    fn incidental_commits_do_not_count() {
        let h = history_with_code_commits(
            45,
            &[
                &["src/a.test.ts"],
                &["package-lock.json"],
                &["src/a.ts", "src/a.test.ts"],
                &["vite.config.ts"],
            ],
        );
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(!r.is_stale);
        assert_eq!(r.meaningful_commits, 1);
        assert_eq!(r.reason, "Time threshold exceeded but only 1 commits (< 3 minimum)");
    }

    #[test]
    fn many_commits_but_within_time() {
        let h = history_with_code_commits(
            10,
            &[&["src/a.ts"], &["src/b.ts"], &["src/c.ts"], &["src/d.ts"]],
        );
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(!r.is_stale);
        assert_eq!(r.meaningful_commits, 4);
        assert_eq!(r.reason, "Within 30 day threshold (10 days)");
    }

    #[test]
    fn threshold_compares_unrounded_days() {
        // 30 days and one hour: rounds to 30 but exceeds the threshold.
        let h = ScriptedHistory::new()
            .with_last_commit(DOC, T0)
            .with_last_commit("src/", T0 + 30 * DAY + 3_600)
            .with_commit("src/", T0 + DAY, CommitRecord::new("a", &["src/a.ts"]))
            .with_commit("src/", T0 + 2 * DAY, CommitRecord::new("b", &["src/b.ts"]))
            .with_commit("src/", T0 + 3 * DAY, CommitRecord::new("c", &["src/c.ts"]));
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(r.is_stale);
        assert_eq!(r.days_since_doc_update, Some(30));
    }

    #[test]
    fn zero_days_threshold_still_needs_commits() {
        let h = history_with_code_commits(45, &[&["src/a.ts"], &["src/b.ts"], &["src/c.ts"]]);
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 0, 999, cwd());
        assert!(!r.is_stale);
        assert_eq!(r.meaningful_commits, 3);
        assert_eq!(
            r.reason,
            "Time threshold exceeded but only 3 commits (< 999 minimum)"
        );
    }

    #[test]
    fn exactly_threshold_is_not_stale() {
        let h = history_with_code_commits(30, &[&["src/a.ts"], &["src/b.ts"], &["src/c.ts"]]);
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 3, cwd());
        assert!(!r.is_stale);
        assert_eq!(r.reason, "Within 30 day threshold (30 days)");
    }

    #[test]
    fn commits_summed_across_watch_paths() {
        let h = ScriptedHistory::new()
            .with_last_commit(DOC, T0)
            .with_last_commit("src/", T0 + 5 * DAY)
            .with_last_commit("lib/", T0 + 40 * DAY)
            .with_commit("src/", T0 + DAY, CommitRecord::new("a", &["src/a.ts"]))
            .with_commit("lib/", T0 + 2 * DAY, CommitRecord::new("b", &["lib/b.ts"]))
            .with_commit("lib/", T0 + 3 * DAY, CommitRecord::new("c", &["lib/c.ts"]));
        let r = check_doc_staleness(&h, DOC, &watch(&["src/", "lib/"]), 30, 3, cwd());
        assert!(r.is_stale);
        assert_eq!(r.code_last_modified, Some(T0 + 40 * DAY));
        assert_eq!(r.meaningful_commits, 3);
    }

    #[test]
    fn commits_at_doc_timestamp_are_excluded() {
        let h = ScriptedHistory::new()
            .with_last_commit(DOC, T0)
            .with_last_commit("src/", T0 + 40 * DAY)
            .with_commit("src/", T0, CommitRecord::new("same", &["src/a.ts"]))
            .with_commit("src/", T0 + DAY, CommitRecord::new("a", &["src/a.ts"]));
        let r = check_doc_staleness(&h, DOC, &watch(&["src/"]), 30, 1, cwd());
        assert_eq!(r.meaningful_commits, 1);
    }

    #[test]
    fn configured_docs_respect_enabled_flag() {
        let h = history_with_code_commits(45, &[&["src/a.ts"], &["src/b.ts"], &["src/c.ts"]]);
        let mut cfg = Config::default();
        cfg.staleness.docs.push(StalenessDoc {
            doc: DOC.to_string(),
            watch: watch(&["src/"]),
        });

        let reports = check_configured_docs(&h, &cfg, cwd());
        assert_eq!(reports.len(), 1);
        assert!(reports[0].result.is_stale);

        cfg.staleness.enabled = false;
        assert!(check_configured_docs(&h, &cfg, cwd()).is_empty());
    }

    #[test]
    fn configured_docs_use_config_thresholds() {
        let h = history_with_code_commits(45, &[&["src/a.ts"], &["src/b.ts"], &["src/c.ts"]]);
        let mut cfg = Config::default();
        cfg.staleness.threshold_days = 60;
        cfg.staleness.docs.push(StalenessDoc {
            doc: DOC.to_string(),
            watch: watch(&["src/"]),
        });
        let reports = check_configured_docs(&h, &cfg, cwd());
        assert_eq!(reports[0].result.reason, "Within 60 day threshold (45 days)");
    }

    #[test]
    fn real_repository_end_to_end() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        commit_at(dir.path(), &[(DOC, "# Patterns\n")], T0, "doc");
        commit_at(dir.path(), &[("src/a.rs", "a\n")], T0 + 10 * DAY, "a");
        commit_at(dir.path(), &[("src/a.test.rs", "t\n")], T0 + 20 * DAY, "test only");
        commit_at(dir.path(), &[("src/b.rs", "b\n")], T0 + 30 * DAY, "b");
        commit_at(dir.path(), &[("src/c.rs", "c\n")], T0 + 40 * DAY, "c");

        let git = GitCli::new();
        let r = check_doc_staleness(&git, DOC, &watch(&["src/"]), 30, 3, dir.path());
        assert!(r.is_stale, "{}", r.reason);
        assert_eq!(r.meaningful_commits, 3);
        assert_eq!(r.days_since_doc_update, Some(40));

        let strict = check_doc_staleness(&git, DOC, &watch(&["src/"]), 30, 4, dir.path());
        assert!(!strict.is_stale);
        assert_eq!(
            strict.reason,
            "Time threshold exceeded but only 3 commits (< 4 minimum)"
        );
    }
}
