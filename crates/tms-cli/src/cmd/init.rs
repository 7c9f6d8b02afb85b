use crate::output::print_json;
use anyhow::Context;
use std::path::Path;
use tms_core::{
    classifier,
    config::{Config, Scope, StalenessDoc},
    io, paths, tag,
};

pub fn run(root: &Path, scope: Scope, force: bool, json: bool) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    let mut created = Vec::new();
    let mut existing = Vec::new();

    // 1. .cortexrc
    let config_path = paths::config_path(root);
    let had_config = config_path.exists();
    let config_state = if had_config && !force {
        "exists"
    } else {
        let cfg = default_config(&project_name, scope);
        cfg.save(root).context("failed to write .cortexrc")?;
        if had_config {
            "overwritten"
        } else {
            "created"
        }
    };

    // 2. Governance documents, each tagged with the tier its path implies
    for rel in scope.scaffold_files() {
        let path = root.join(rel);
        let tier = classifier::classify(rel, "");
        let body = tag::write_tag(&format!("# {}\n", title_for(rel)), tier);
        let written = io::write_if_missing(&path, body.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        if written {
            created.push(rel.to_string());
        } else {
            existing.push(rel.to_string());
        }
    }

    // 3. Keep the validation cache out of version control
    io::ensure_gitignore_entry(root, &format!("{}/", paths::CORTEX_DIR))
        .context("failed to update .gitignore")?;

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "scope": scope,
            "config": config_state,
            "created": created,
            "existing": existing,
        }))?;
        return Ok(());
    }

    println!("Initializing Cortex TMS ({scope}) in: {}", root.display());
    println!("  {config_state}: {}", paths::CONFIG_FILE);
    for rel in &created {
        println!("  created: {rel}");
    }
    for rel in &existing {
        println!("  exists:  {rel}");
    }
    println!("\nNext: cortex-tms validate");
    Ok(())
}

/// Fresh config. Scopes above nano watch `src/` for the two docs that
/// describe code structure.
fn default_config(project_name: &str, scope: Scope) -> Config {
    let mut cfg = Config::new(project_name, scope);
    if scope != Scope::Nano {
        for doc in ["docs/core/ARCHITECTURE.md", paths::PATTERNS_MD] {
            cfg.staleness.docs.push(StalenessDoc {
                doc: doc.to_string(),
                watch: vec!["src/".to_string()],
            });
        }
    }
    cfg
}

/// `docs/core/DOMAIN-LOGIC.md` -> `Domain Logic`.
fn title_for(rel: &str) -> String {
    let stem = Path::new(rel)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lower = w.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
