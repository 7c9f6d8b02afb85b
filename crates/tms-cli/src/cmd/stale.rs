use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use tms_core::{
    config::{Config, StalenessDoc},
    git::{CachedHistory, GitCli, HistoryProvider},
    staleness::{self, DocStaleness},
};

pub struct StaleArgs {
    pub doc: Option<String>,
    pub watch: Vec<String>,
    pub threshold_days: Option<u32>,
    pub min_commits: Option<u32>,
}

pub fn run(root: &Path, args: StaleArgs, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load_or_default(root).context("failed to load .cortexrc")?;
    if let Some(days) = args.threshold_days {
        config.staleness.threshold_days = days;
    }
    if let Some(min) = args.min_commits {
        config.staleness.min_commits = min;
    }

    // An explicit --doc replaces the configured list and runs even when disabled.
    if let Some(doc) = args.doc {
        config.staleness.enabled = true;
        config.staleness.docs = vec![StalenessDoc {
            doc,
            watch: args.watch,
        }];
    } else if !config.staleness.enabled {
        return info(json, "Staleness checks are disabled in .cortexrc.");
    } else if config.staleness.docs.is_empty() {
        return info(
            json,
            "No staleness docs configured. Add staleness.docs to .cortexrc or pass --doc and --watch.",
        );
    }

    let history = CachedHistory::new(GitCli::new());
    if history.is_shallow_clone(root) {
        return info(
            json,
            "Shallow clone detected: commit history is incomplete, staleness checks skipped.",
        );
    }

    let reports = staleness::check_configured_docs(&history, &config, root);
    if json {
        print_json(&reports)?;
    } else {
        print_reports(&reports, &config);
    }
    Ok(())
}

fn info(json: bool, message: &str) -> anyhow::Result<()> {
    if json {
        print_json(&serde_json::json!({ "docs": [], "message": message }))?;
    } else {
        println!("{message}");
    }
    Ok(())
}

fn print_reports(reports: &[DocStaleness], config: &Config) {
    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.doc.clone(),
                if r.result.is_stale { "STALE" } else { "ok" }.to_string(),
                r.result
                    .days_since_doc_update
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                r.result.meaningful_commits.to_string(),
                r.result.reason.clone(),
            ]
        })
        .collect();
    print_table(&["DOC", "STATUS", "DAYS", "COMMITS", "REASON"], &rows);

    let stale = reports.iter().filter(|r| r.result.is_stale).count();
    println!();
    println!(
        "{stale} of {} doc(s) stale (threshold {} days, {} meaningful commits)",
        reports.len(),
        config.staleness.threshold_days,
        config.staleness.min_commits
    );
}
