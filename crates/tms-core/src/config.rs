use crate::classifier::compile_glob;
use crate::error::{Result, TmsError};
use crate::paths;
use globset::{GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// How much documentation structure a project carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Nano,
    #[default]
    Standard,
    Enterprise,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Nano => "nano",
            Scope::Standard => "standard",
            Scope::Enterprise => "enterprise",
        }
    }

    /// Files `init` scaffolds for this scope, relative to the project root.
    pub fn scaffold_files(self) -> &'static [&'static str] {
        const NANO: &[&str] = &[
            paths::CLAUDE_MD,
            paths::NEXT_TASKS_MD,
            paths::COPILOT_INSTRUCTIONS_MD,
        ];
        const STANDARD: &[&str] = &[
            paths::CLAUDE_MD,
            paths::NEXT_TASKS_MD,
            paths::COPILOT_INSTRUCTIONS_MD,
            "docs/core/ARCHITECTURE.md",
            paths::PATTERNS_MD,
            "docs/core/GLOSSARY.md",
        ];
        const ENTERPRISE: &[&str] = &[
            paths::CLAUDE_MD,
            paths::NEXT_TASKS_MD,
            paths::COPILOT_INSTRUCTIONS_MD,
            "FUTURE-ENHANCEMENTS.md",
            "docs/core/ARCHITECTURE.md",
            paths::PATTERNS_MD,
            "docs/core/GLOSSARY.md",
            "docs/core/DOMAIN-LOGIC.md",
            "docs/core/DECISIONS.md",
            "docs/core/SCHEMA.md",
            "docs/core/TROUBLESHOOTING.md",
        ];
        match self {
            Scope::Nano => NANO,
            Scope::Standard => STANDARD,
            Scope::Enterprise => ENTERPRISE,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scope {
    type Err = TmsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nano" => Ok(Scope::Nano),
            "standard" => Ok(Scope::Standard),
            "enterprise" => Ok(Scope::Enterprise),
            other => Err(TmsError::InvalidScope(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StalenessConfig
// ---------------------------------------------------------------------------

/// A governance doc and the code paths whose history it is compared against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StalenessDoc {
    pub doc: String,
    #[serde(default)]
    pub watch: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_threshold_days")]
    pub threshold_days: u32,
    #[serde(default = "default_min_commits")]
    pub min_commits: u32,
    #[serde(default)]
    pub docs: Vec<StalenessDoc>,
}

fn default_true() -> bool {
    true
}

fn default_threshold_days() -> u32 {
    30
}

fn default_min_commits() -> u32 {
    3
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_days: default_threshold_days(),
            min_commits: default_min_commits(),
            docs: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub staleness: StalenessConfig,
    #[serde(default = "default_line_limits")]
    pub line_limits: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

fn default_version() -> u32 {
    1
}

/// Maximum line counts per governance file name.
pub fn default_line_limits() -> BTreeMap<String, u32> {
    [
        ("NEXT-TASKS.md", 200),
        ("FUTURE-ENHANCEMENTS.md", 500),
        ("ARCHITECTURE.md", 500),
        ("PATTERNS.md", 650),
        ("DOMAIN-LOGIC.md", 400),
        ("DECISIONS.md", 400),
        ("GLOSSARY.md", 200),
        ("SCHEMA.md", 600),
        ("TROUBLESHOOTING.md", 400),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self::new("", Scope::default())
    }
}

impl Config {
    pub fn new(project_name: impl Into<String>, scope: Scope) -> Self {
        Self {
            version: default_version(),
            scope,
            project: ProjectConfig {
                name: project_name.into(),
            },
            staleness: StalenessConfig::default(),
            line_limits: default_line_limits(),
            exclude: Vec::new(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TmsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        Self::parse(&data)
    }

    /// Load `.cortexrc`, falling back to defaults when it is absent.
    /// A present but malformed file is still an error.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(TmsError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse `.cortexrc` text. JSON is a subset of YAML, so both forms load.
    pub fn parse(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Line limit for a file, looked up by its file name.
    pub fn limit_for(&self, file_name: &str) -> Option<u32> {
        self.line_limits.get(file_name).copied()
    }

    /// Compile `exclude` into one glob set matched against root-relative,
    /// `/`-separated paths.
    pub fn exclude_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            builder.add(compile_glob(pattern)?);
        }
        builder.build().map_err(|e| TmsError::InvalidGlob {
            pattern: self.exclude.join(", "),
            reason: e.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut warn = |level: WarnLevel, message: String| {
            warnings.push(ConfigWarning { level, message });
        };

        if self.staleness.threshold_days == 0 {
            warn(
                WarnLevel::Warning,
                "staleness.threshold_days is 0: every code change marks docs stale".to_string(),
            );
        }
        if self.staleness.min_commits == 0 {
            warn(
                WarnLevel::Warning,
                "staleness.min_commits is 0: the commit threshold never applies".to_string(),
            );
        }
        for doc in &self.staleness.docs {
            if doc.watch.is_empty() {
                warn(
                    WarnLevel::Warning,
                    format!("staleness doc '{}' has no watch paths", doc.doc),
                );
            }
        }

        for (file, limit) in &self.line_limits {
            if *limit == 0 {
                warn(
                    WarnLevel::Warning,
                    format!("line limit for '{file}' is 0"),
                );
            }
        }

        for pattern in &self.exclude {
            if let Err(e) = compile_glob(pattern) {
                warn(WarnLevel::Error, format!("exclude pattern rejected: {e}"));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
