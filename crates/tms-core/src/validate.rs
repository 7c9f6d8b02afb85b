use crate::config::{Config, WarnLevel};
use crate::error::{Result, TmsError};
use crate::git::HistoryProvider;
use crate::io;
use crate::paths;
use crate::staleness;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Treat warnings as failures.
    pub strict: bool,
    pub skip_staleness: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    pub level: CheckLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ValidationCheck {
    fn pass(name: &str, message: impl Into<String>, file: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            level: CheckLevel::Info,
            message: message.into(),
            file: file.map(str::to_string),
        }
    }

    fn fail(name: &str, level: CheckLevel, message: impl Into<String>, file: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            level,
            message: message.into(),
            file: file.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub checks: Vec<ValidationCheck>,
    pub summary: CheckSummary,
}

impl ValidationResult {
    fn from_checks(checks: Vec<ValidationCheck>, strict: bool) -> Self {
        let mut summary = CheckSummary {
            total: checks.len(),
            ..CheckSummary::default()
        };
        for check in &checks {
            match (check.passed, check.level) {
                (true, _) => summary.passed += 1,
                (false, CheckLevel::Error) => summary.errors += 1,
                (false, _) => summary.warnings += 1,
            }
        }
        let passed = summary.errors == 0 && !(strict && summary.warnings > 0);
        Self {
            passed,
            checks,
            summary,
        }
    }

    /// Failed checks, both warnings and errors.
    pub fn violations(&self) -> usize {
        self.summary.warnings + self.summary.errors
    }
}

// ---------------------------------------------------------------------------
// validate_project
// ---------------------------------------------------------------------------

/// Run every project check. Never fails: problems become failed checks.
pub fn validate_project<H: HistoryProvider + ?Sized>(
    root: &Path,
    history: &H,
    options: ValidateOptions,
) -> ValidationResult {
    let mut checks = Vec::new();

    let config = match Config::load(root) {
        Ok(cfg) => {
            checks.push(ValidationCheck::pass(
                "config",
                "Configuration found",
                Some(paths::CONFIG_FILE),
            ));
            cfg
        }
        Err(TmsError::NotInitialized) => {
            checks.push(ValidationCheck::fail(
                "config",
                CheckLevel::Warning,
                "No .cortexrc found, using defaults (run 'cortex-tms init')",
                Some(paths::CONFIG_FILE),
            ));
            Config::default()
        }
        Err(e) => {
            checks.push(ValidationCheck::fail(
                "config",
                CheckLevel::Error,
                format!("Configuration could not be read: {e}"),
                Some(paths::CONFIG_FILE),
            ));
            Config::default()
        }
    };

    for warning in config.validate() {
        let level = match warning.level {
            WarnLevel::Warning => CheckLevel::Warning,
            WarnLevel::Error => CheckLevel::Error,
        };
        checks.push(ValidationCheck::fail(
            "config",
            level,
            warning.message,
            Some(paths::CONFIG_FILE),
        ));
    }

    check_mandatory_files(root, &mut checks);
    check_line_limits(root, &config, &mut checks);

    if !options.skip_staleness && config.staleness.enabled {
        check_staleness(root, history, &config, &mut checks);
    }

    ValidationResult::from_checks(checks, options.strict)
}

fn check_mandatory_files(root: &Path, checks: &mut Vec<ValidationCheck>) {
    for file in paths::MANDATORY_FILES {
        if root.join(file).is_file() {
            checks.push(ValidationCheck::pass(
                "mandatory-file",
                format!("{file} exists"),
                Some(*file),
            ));
        } else {
            checks.push(ValidationCheck::fail(
                "mandatory-file",
                CheckLevel::Error,
                format!("{file} is missing"),
                Some(*file),
            ));
        }
    }
}

fn check_line_limits(root: &Path, config: &Config, checks: &mut Vec<ValidationCheck>) {
    for (name, &limit) in &config.line_limits {
        let candidates = [name.clone(), format!("{}/{name}", paths::DOCS_CORE_DIR)];
        for rel in &candidates {
            let path = root.join(rel);
            if !path.is_file() {
                continue;
            }
            let lines = match std::fs::read_to_string(&path) {
                Ok(content) => io::count_lines(&content),
                Err(e) => {
                    tracing::debug!(file = %rel, error = %e, "could not read file for line count");
                    continue;
                }
            };
            if lines > limit as usize {
                checks.push(ValidationCheck::fail(
                    "line-limit",
                    CheckLevel::Warning,
                    format!("{rel} has {lines} lines (limit {limit})"),
                    Some(rel.as_str()),
                ));
            } else {
                checks.push(ValidationCheck::pass(
                    "line-limit",
                    format!("{rel} within limit ({lines}/{limit} lines)"),
                    Some(rel.as_str()),
                ));
            }
        }
    }
}

fn check_staleness<H: HistoryProvider + ?Sized>(
    root: &Path,
    history: &H,
    config: &Config,
    checks: &mut Vec<ValidationCheck>,
) {
    if history.is_shallow_clone(root) {
        checks.push(ValidationCheck::pass(
            "staleness",
            "Shallow clone detected, staleness checks skipped",
            None,
        ));
        return;
    }
    for report in staleness::check_configured_docs(history, config, root) {
        if report.result.is_stale {
            checks.push(ValidationCheck::fail(
                "staleness",
                CheckLevel::Warning,
                report.result.reason,
                Some(report.doc.as_str()),
            ));
        } else {
            checks.push(ValidationCheck::pass(
                "staleness",
                report.result.reason,
                Some(report.doc.as_str()),
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Validation cache
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSeverity {
    Warning,
    Error,
}

/// Last validation outcome, persisted for the status dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCache {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub violations: usize,
    #[serde(default)]
    pub severity: Option<CacheSeverity>,
}

impl ValidationCache {
    pub fn from_result(result: &ValidationResult, timestamp: DateTime<Utc>) -> Self {
        let severity = if result.summary.errors > 0 {
            CacheSeverity::Error
        } else {
            CacheSeverity::Warning
        };
        Self {
            timestamp,
            violations: result.violations(),
            severity: Some(severity),
        }
    }
}

pub fn write_validation_cache(
    root: &Path,
    result: &ValidationResult,
    timestamp: DateTime<Utc>,
) -> Result<()> {
    let cache = ValidationCache::from_result(result, timestamp);
    let data = serde_json::to_string_pretty(&cache)?;
    io::atomic_write(&paths::validation_cache_path(root), data.as_bytes())
}

/// Read the cache. Absent or unreadable reads as `None`.
pub fn read_validation_cache(root: &Path) -> Option<ValidationCache> {
    let path = paths::validation_cache_path(root);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(cache) => Some(cache),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable validation cache");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
