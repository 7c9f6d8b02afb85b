//! Project-wide documentation statistics for the status dashboard.

use crate::classifier::default_classifier;
use crate::config::Config;
use crate::corpus::{self, CorpusFile};
use crate::io;
use crate::paths;
use crate::tier::Tier;
use crate::validate::{self, CacheSeverity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Corpus size above which collection logs a warning and adds an advisory.
pub const LARGE_CORPUS_THRESHOLD: usize = 1000;

/// More cached violations than this reads as an error state.
const ERROR_VIOLATIONS: usize = 10;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub has_tms: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub hot: usize,
    pub warm: usize,
    pub cold: usize,
    pub total: usize,
}

impl TierCounts {
    pub fn add(&mut self, tier: Tier) {
        match tier {
            Tier::Hot => self.hot += 1,
            Tier::Warm => self.warm += 1,
            Tier::Cold => self.cold += 1,
        }
        self.total += 1;
    }

    pub fn get(&self, tier: Tier) -> usize {
        match tier {
            Tier::Hot => self.hot,
            Tier::Warm => self.warm,
            Tier::Cold => self.cold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warnings,
    Errors,
    Unknown,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warnings => "warnings",
            HealthStatus::Errors => "errors",
            HealthStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub status: HealthStatus,
    pub violations: usize,
    pub last_checked: Option<DateTime<Utc>>,
}

impl Default for ValidationSummary {
    fn default() -> Self {
        Self {
            status: HealthStatus::Unknown,
            violations: 0,
            last_checked: None,
        }
    }
}

/// Line count of one governance file against its configured limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeCheck {
    pub file: String,
    pub lines: usize,
    pub limit: u32,
    pub over_limit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectStats {
    pub project: ProjectInfo,
    pub files: TierCounts,
    pub hot_files: Vec<String>,
    pub validation: ValidationSummary,
    pub size_limits: Vec<SizeCheck>,
    pub advisories: Vec<String>,
}

impl ProjectStats {
    fn empty(name: String) -> Self {
        Self {
            project: ProjectInfo {
                name,
                has_tms: false,
            },
            files: TierCounts::default(),
            hot_files: Vec::new(),
            validation: ValidationSummary::default(),
            size_limits: Vec::new(),
            advisories: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Gather dashboard statistics for `root`. Total: every failure degrades
/// to an empty or unknown field.
pub fn collect_project_stats(root: &Path) -> ProjectStats {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut stats = ProjectStats::empty(name);

    if !paths::has_indicator(root) {
        return stats;
    }
    stats.project.has_tms = true;

    let config = match Config::load_or_default(root) {
        Ok(cfg) => cfg,
        Err(e) => {
            stats
                .advisories
                .push(format!(".cortexrc could not be read, using defaults: {e}"));
            Config::default()
        }
    };
    if !config.project.name.is_empty() {
        stats.project.name = config.project.name.clone();
    }

    let exclude = match config.exclude_set() {
        Ok(set) => Some(set),
        Err(e) => {
            stats.advisories.push(format!("exclude patterns ignored: {e}"));
            None
        }
    };
    let files = corpus::markdown_files(root, exclude.as_ref());

    if files.len() > LARGE_CORPUS_THRESHOLD {
        tracing::warn!(files = files.len(), "large project detected");
        stats.advisories.push(format!(
            "Large project detected ({} markdown files). Consider adding exclude patterns to .cortexrc",
            files.len()
        ));
    }

    let classifier = default_classifier();
    for file in &files {
        let tier = file.classify(classifier);
        stats.files.add(tier);
        if tier == Tier::Hot {
            stats.hot_files.push(file.rel.clone());
        }
    }

    stats.validation = summarize_validation(root);
    stats.size_limits = size_checks(&files, &config);
    stats
}

/// Dashboard view of `.cortex/validation-cache.json`.
pub fn summarize_validation(root: &Path) -> ValidationSummary {
    let Some(cache) = validate::read_validation_cache(root) else {
        return ValidationSummary::default();
    };
    let status = if cache.violations == 0 {
        HealthStatus::Healthy
    } else if cache.severity == Some(CacheSeverity::Error) || cache.violations > ERROR_VIOLATIONS {
        HealthStatus::Errors
    } else {
        HealthStatus::Warnings
    };
    ValidationSummary {
        status,
        violations: cache.violations,
        last_checked: Some(cache.timestamp),
    }
}

/// Line counts for corpus files whose name has a configured limit.
fn size_checks(files: &[CorpusFile], config: &Config) -> Vec<SizeCheck> {
    files
        .iter()
        .filter_map(|file| {
            let name = file.abs.file_name()?.to_str()?;
            let limit = config.limit_for(name)?;
            let content = std::fs::read_to_string(&file.abs).ok()?;
            let lines = io::count_lines(&content);
            Some(SizeCheck {
                file: file.rel.clone(),
                lines,
                limit,
                over_limit: lines > limit as usize,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
