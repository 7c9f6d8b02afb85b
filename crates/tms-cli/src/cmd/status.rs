use crate::output::{print_json, print_table, thousands};
use std::path::Path;
use tms_core::{
    config::Config,
    git::{CachedHistory, GitCli, HistoryProvider},
    staleness::{self, DocStaleness},
    stats::{self, HealthStatus, ProjectStats},
    tokens::{self, TokenStats},
    Tier,
};

pub fn run(root: &Path, with_tokens: bool, json: bool) -> anyhow::Result<()> {
    let stats = stats::collect_project_stats(root);

    if !stats.project.has_tms {
        if json {
            print_json(&serde_json::json!({ "stats": stats }))?;
        } else {
            println!("No Cortex TMS project found in {}.", root.display());
            println!("Run 'cortex-tms init' to get started.");
        }
        return Ok(());
    }

    let (stale_docs, shallow) = staleness_report(root);
    let token_stats = with_tokens.then(|| tokens::analyze_tokens(root));

    if json {
        print_json(&serde_json::json!({
            "stats": stats,
            "staleness": stale_docs,
            "shallow_clone": shallow,
            "tokens": token_stats,
        }))?;
        return Ok(());
    }

    print_overview(&stats);
    print_staleness(&stale_docs, shallow);
    if let Some(t) = &token_stats {
        print_tokens(t);
    }
    if !stats.advisories.is_empty() {
        println!("ADVISORIES");
        for advisory in &stats.advisories {
            println!("  ! {advisory}");
        }
        println!();
    }
    Ok(())
}

/// Configured-doc staleness, or nothing when git history is truncated.
/// A malformed config was already reported as an advisory by the stats pass.
fn staleness_report(root: &Path) -> (Vec<DocStaleness>, bool) {
    let history = CachedHistory::new(GitCli::new());
    if history.is_shallow_clone(root) {
        return (Vec::new(), true);
    }
    let config = Config::load_or_default(root).unwrap_or_default();
    (staleness::check_configured_docs(&history, &config, root), false)
}

fn print_overview(stats: &ProjectStats) {
    println!("Project: {}", stats.project.name);
    println!();

    println!("TIERS");
    for &tier in Tier::all() {
        println!(
            "  {:<5} {:>5}   {}",
            tier.as_str(),
            stats.files.get(tier),
            tier.description()
        );
    }
    println!("  {:<5} {:>5}", "TOTAL", stats.files.total);
    println!();

    if !stats.hot_files.is_empty() {
        println!("HOT FILES");
        for file in &stats.hot_files {
            println!("  {file}");
        }
        println!();
    }

    let v = &stats.validation;
    match (v.status, v.last_checked) {
        (HealthStatus::Unknown, _) | (_, None) => {
            println!("VALIDATION  unknown (run 'cortex-tms validate')");
        }
        (status, Some(when)) => println!(
            "VALIDATION  {} ({} violations, checked {})",
            status.as_str(),
            v.violations,
            when.format("%Y-%m-%d %H:%M UTC")
        ),
    }
    println!();

    if !stats.size_limits.is_empty() {
        println!("SIZE LIMITS");
        let rows: Vec<Vec<String>> = stats
            .size_limits
            .iter()
            .map(|s| {
                vec![
                    s.file.clone(),
                    format!("{}/{}", s.lines, s.limit),
                    if s.over_limit { "over" } else { "ok" }.to_string(),
                ]
            })
            .collect();
        print_table(&["FILE", "LINES", "STATUS"], &rows);
        println!();
    }
}

fn print_staleness(docs: &[DocStaleness], shallow: bool) {
    if shallow {
        println!("STALENESS  skipped (shallow clone)");
        println!();
        return;
    }
    if docs.is_empty() {
        return;
    }
    let stale = docs.iter().filter(|d| d.result.is_stale).count();
    println!("STALENESS  {stale} of {} configured doc(s) stale", docs.len());
    for d in docs {
        let marker = if d.result.is_stale { "stale" } else { "ok" };
        println!("  {marker:<6}{}  {}", d.doc, d.result.reason);
    }
    println!();
}

fn print_tokens(t: &TokenStats) {
    println!("TOKENS (estimated)");
    let rows: Vec<Vec<String>> = Tier::all()
        .iter()
        .map(|&tier| {
            let bucket = t.tier(tier);
            vec![
                tier.as_str().to_string(),
                bucket.files.len().to_string(),
                thousands(bucket.total_tokens),
            ]
        })
        .collect();
    print_table(&["TIER", "FILES", "TOKENS"], &rows);
    println!(
        "  Total {} tokens; {:.1}% kept out of the HOT context",
        thousands(t.total.tokens),
        t.context_reduction_percent()
    );
    println!();
}
