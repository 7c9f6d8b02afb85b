use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tms_core::{
    autotier::{self, TierThresholds},
    classifier::{default_classifier, TierSource},
    corpus,
    git::GitCli,
    io, paths, tag, Tier, TmsError,
};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum TierSubcommand {
    /// Show a file's tier and why it was chosen
    Show {
        /// Markdown file, relative to the project root
        file: PathBuf,
    },

    /// Write (or remove) a file's tier tag
    Set {
        /// Markdown file, relative to the project root
        file: PathBuf,
        /// HOT, WARM, or COLD
        #[arg(required_unless_present = "clear")]
        tier: Option<String>,
        /// Remove the tag instead of setting one
        #[arg(long, conflicts_with = "tier")]
        clear: bool,
    },

    /// List every markdown file with its tier
    List {
        /// Only show files in this tier
        #[arg(long)]
        tier: Option<String>,
    },

    /// Suggest and write tier tags from git recency
    Auto {
        /// Files changed within this many days are HOT
        #[arg(long, default_value_t = 7)]
        hot_days: u32,
        /// Files changed within this many days are WARM, older ones COLD
        #[arg(long, default_value_t = 30)]
        warm_days: u32,
        /// Re-tier files that already carry a tag
        #[arg(long)]
        force: bool,
        /// Show the plan without writing
        #[arg(long)]
        dry_run: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: TierSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TierSubcommand::Show { file } => show(root, &file, json),
        TierSubcommand::Set { file, tier, clear } => {
            set(root, &file, tier.as_deref(), clear, json)
        }
        TierSubcommand::List { tier } => list(root, tier.as_deref(), json),
        TierSubcommand::Auto {
            hot_days,
            warm_days,
            force,
            dry_run,
        } => auto(
            root,
            TierThresholds {
                hot_days,
                warm_days,
            },
            force,
            dry_run,
            json,
        ),
    }
}

/// Absolute path plus its root-relative display form. Fails when the file is absent.
fn locate(root: &Path, file: &Path) -> anyhow::Result<(PathBuf, String)> {
    let abs = if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    };
    if !abs.is_file() {
        return Err(TmsError::FileNotFound(file.display().to_string()).into());
    }
    let rel = paths::relative_display(root, &abs);
    Ok((abs, rel))
}

fn source_label(source: &TierSource) -> String {
    match source {
        TierSource::Tag => "tag".to_string(),
        TierSource::Pattern(p) => format!("pattern {p}"),
        TierSource::Default => "default".to_string(),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let (abs, rel) = locate(root, file)?;
    let head = io::read_head(&abs, io::HEAD_BYTES)
        .with_context(|| format!("failed to read {rel}"))?;
    let (tier, source) = default_classifier().classify_with_source(&rel, &head);

    if json {
        print_json(&serde_json::json!({
            "path": rel,
            "tier": tier,
            "source": source,
        }))?;
    } else {
        println!("{rel}: {tier} ({}, via {})", tier.description(), source_label(&source));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

fn set(
    root: &Path,
    file: &Path,
    tier: Option<&str>,
    clear: bool,
    json: bool,
) -> anyhow::Result<()> {
    let (abs, rel) = locate(root, file)?;
    let content =
        std::fs::read_to_string(&abs).with_context(|| format!("failed to read {rel}"))?;

    let (updated, tier) = if clear {
        (tag::strip_tag(&content), None)
    } else {
        let raw = tier.context("a tier is required unless --clear is given")?;
        let tier: Tier = raw.parse()?;
        (tag::write_tag(&content, tier), Some(tier))
    };

    if updated != content {
        io::atomic_write(&abs, updated.as_bytes())
            .with_context(|| format!("failed to write {rel}"))?;
    }

    if json {
        print_json(&serde_json::json!({ "path": rel, "tier": tier }))?;
    } else {
        match tier {
            Some(t) => println!("{rel}: tagged {t}"),
            None => println!("{rel}: tier tag removed"),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list(root: &Path, filter: Option<&str>, json: bool) -> anyhow::Result<()> {
    let filter: Option<Tier> = filter.map(str::parse::<Tier>).transpose()?;
    let classifier = default_classifier();

    let mut entries = Vec::new();
    for file in corpus::project_markdown_files(root) {
        let head = io::read_head(&file.abs, io::HEAD_BYTES).unwrap_or_default();
        let (tier, source) = classifier.classify_with_source(&file.rel, &head);
        if filter.is_some_and(|f| f != tier) {
            continue;
        }
        entries.push((file.rel, tier, source));
    }

    if json {
        let items: Vec<_> = entries
            .iter()
            .map(|(path, tier, source)| {
                serde_json::json!({ "path": path, "tier": tier, "source": source })
            })
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    if entries.is_empty() {
        println!("No markdown files found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|(path, tier, source)| vec![path.clone(), tier.to_string(), source_label(source)])
        .collect();
    print_table(&["PATH", "TIER", "SOURCE"], &rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// auto
// ---------------------------------------------------------------------------

fn auto(
    root: &Path,
    thresholds: TierThresholds,
    force: bool,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    if thresholds.hot_days > thresholds.warm_days {
        anyhow::bail!(
            "--hot-days ({}) must not exceed --warm-days ({})",
            thresholds.hot_days,
            thresholds.warm_days
        );
    }

    let git = GitCli::new();
    let unavailable = if !git.is_available() {
        Some("git not found on PATH: auto-tiering needs commit history.")
    } else if !git.is_repository(root) {
        Some("Not a git repository: auto-tiering needs commit history.")
    } else {
        None
    };
    if let Some(message) = unavailable {
        if json {
            print_json(&serde_json::json!({
                "changes": [],
                "applied": 0,
                "git": false,
                "message": message,
            }))?;
        } else {
            println!("{message}");
        }
        return Ok(());
    }

    let changes = autotier::plan_auto_tier(root, &git, thresholds, Utc::now().timestamp(), force);
    let applied = if dry_run {
        0
    } else {
        autotier::apply_tier_changes(root, &changes).context("failed to write tier tags")?
    };

    if json {
        print_json(&serde_json::json!({
            "changes": changes,
            "applied": applied,
            "dry_run": dry_run,
        }))?;
        return Ok(());
    }

    if changes.is_empty() {
        println!("All files already carry the suggested tier.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = changes
        .iter()
        .map(|c| {
            vec![
                c.path.clone(),
                c.current.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
                c.suggested.to_string(),
                c.days_since_change
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "new".to_string()),
            ]
        })
        .collect();
    print_table(&["PATH", "CURRENT", "SUGGESTED", "DAYS"], &rows);
    println!();
    if dry_run {
        println!("Dry run: {} file(s) would be re-tagged.", changes.len());
    } else {
        println!("Tagged {applied} file(s).");
    }
    Ok(())
}
