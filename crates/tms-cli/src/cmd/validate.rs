use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use std::path::Path;
use tms_core::{
    git::{CachedHistory, GitCli},
    validate::{self, CheckLevel, ValidateOptions},
};

pub fn run(root: &Path, strict: bool, skip_staleness: bool, json: bool) -> anyhow::Result<()> {
    let history = CachedHistory::new(GitCli::new());
    let result = validate::validate_project(
        root,
        &history,
        ValidateOptions {
            strict,
            skip_staleness,
        },
    );

    validate::write_validation_cache(root, &result, Utc::now())
        .context("failed to write validation cache")?;

    if json {
        print_json(&result)?;
    } else {
        for check in &result.checks {
            let tag = match (check.passed, check.level) {
                (true, _) => "ok",
                (false, CheckLevel::Error) => "error",
                (false, CheckLevel::Warning) => "warning",
                (false, CheckLevel::Info) => "info",
            };
            println!("[{tag:<7}] {:<14} {}", check.name, check.message);
        }
        let s = &result.summary;
        println!();
        println!(
            "{} checks: {} passed, {} warnings, {} errors",
            s.total, s.passed, s.warnings, s.errors
        );
    }

    if !result.passed {
        let why = if result.summary.errors > 0 {
            format!("{} error(s)", result.summary.errors)
        } else {
            format!("{} warning(s) in strict mode", result.summary.warnings)
        };
        anyhow::bail!("validation failed: {why}");
    }
    Ok(())
}
