use crate::error::{Result, TmsError};
use crate::paths;
use crate::tag;
use crate::tier::Tier;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// ClassifiedFile / TierSource (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFile {
    pub path: String,
    pub tier: Tier,
}

/// Why a file landed in its tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "snake_case")]
pub enum TierSource {
    Tag,
    Pattern(String),
    Default,
}

// ---------------------------------------------------------------------------
// TierRule
// ---------------------------------------------------------------------------

/// A set of path globs that all map to one tier.
///
/// Patterns are lower-cased before compiling; `*` stops at `/`, `**` spans
/// any depth.
#[derive(Debug, Clone)]
pub struct TierRule {
    pub id: &'static str,
    pub tier: Tier,
    pub patterns: Vec<String>,
}

impl TierRule {
    pub fn new(id: &'static str, tier: Tier, patterns: &[&str]) -> Self {
        Self {
            id,
            tier,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }
}

pub const COLD_PATTERNS: &[&str] = &[
    "**/archive/**",
    "**/archived/**",
    "**/*-archive.md",
    "**/*-deprecated.md",
];

pub const HOT_PATTERNS: &[&str] = &[
    "**/next-tasks.md",
    "**/todo.md",
    "**/claude.md",
    "**/.github/copilot-instructions.md",
    "**/wip*.md",
];

pub const WARM_PATTERNS: &[&str] = &[
    "**/docs/**/*.md",
    "**/architecture.md",
    "**/patterns.md",
    "**/decisions.md",
    "**/glossary.md",
    "**/readme.md",
];

/// Priority-ordered path rules. COLD is checked first so archive
/// directories win over HOT or WARM file names.
pub fn default_rules() -> Vec<TierRule> {
    vec![
        TierRule::new("archive", Tier::Cold, COLD_PATTERNS),
        TierRule::new("active", Tier::Hot, HOT_PATTERNS),
        TierRule::new("reference", Tier::Warm, WARM_PATTERNS),
    ]
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

struct CompiledRule {
    tier: Tier,
    patterns: Vec<String>,
    set: GlobSet,
}

pub struct Classifier {
    rules: Vec<CompiledRule>,
    fallback: Tier,
}

impl Classifier {
    pub fn new(rules: Vec<TierRule>) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut builder = GlobSetBuilder::new();
            let mut patterns = Vec::with_capacity(rule.patterns.len());
            for pattern in &rule.patterns {
                let lowered = pattern.to_lowercase();
                builder.add(compile_glob(&lowered)?);
                patterns.push(lowered);
            }
            let set = builder.build().map_err(|e| TmsError::InvalidGlob {
                pattern: rule.id.to_string(),
                reason: e.to_string(),
            })?;
            compiled.push(CompiledRule {
                tier: rule.tier,
                patterns,
                set,
            });
        }
        Ok(Self {
            rules: compiled,
            fallback: Tier::Warm,
        })
    }

    /// Tier from path patterns alone, ignoring content.
    pub fn tier_for_path(&self, path: &str) -> (Tier, TierSource) {
        let normalized = paths::normalize_separators(path).to_lowercase();
        for rule in &self.rules {
            if let Some(&idx) = rule.set.matches(&normalized).first() {
                return (rule.tier, TierSource::Pattern(rule.patterns[idx].clone()));
            }
        }
        (self.fallback, TierSource::Default)
    }

    /// Resolve a tier: explicit tag, then path pattern, then the WARM default.
    pub fn classify_with_source(&self, path: &str, content: &str) -> (Tier, TierSource) {
        if let Some(tier) = tag::read_tag(content) {
            return (tier, TierSource::Tag);
        }
        self.tier_for_path(path)
    }

    pub fn classify(&self, path: &str, content: &str) -> Tier {
        self.classify_with_source(path, content).0
    }
}

pub(crate) fn compile_glob(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| TmsError::InvalidGlob {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

static DEFAULT_CLASSIFIER: OnceLock<Classifier> = OnceLock::new();

/// Shared classifier built from [`default_rules`].
pub fn default_classifier() -> &'static Classifier {
    DEFAULT_CLASSIFIER.get_or_init(|| {
        Classifier::new(default_rules()).expect("built-in tier patterns are valid globs")
    })
}

/// Classify a file with the built-in rules. Total: never fails.
pub fn classify(path: &str, content: &str) -> Tier {
    default_classifier().classify(path, content)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hot_names_by_path() {
        for path in [
            "CLAUDE.md",
            "NEXT-TASKS.md",
            "sub/project/todo.md",
            ".github/copilot-instructions.md",
            "WIP-auth.md",
        ] {
            assert_eq!(classify(path, ""), Tier::Hot, "expected HOT: {path}");
        }
    }

    #[test]
    fn warm_names_by_path() {
        for path in [
            "docs/core/PATTERNS.md",
            "docs/guide.md",
            "ARCHITECTURE.md",
            "README.md",
            "packages/api/GLOSSARY.md",
        ] {
            assert_eq!(classify(path, ""), Tier::Warm, "expected WARM: {path}");
        }
    }

    #[test]
    fn cold_names_by_path() {
        for path in [
            "docs/archive/old-notes.md",
            "archived/2023/plan.md",
            "notes/auth-deprecated.md",
            "sprint-archive.md",
        ] {
            assert_eq!(classify(path, ""), Tier::Cold, "expected COLD: {path}");
        }
    }

    #[test]
    fn cold_beats_hot_name() {
        assert_eq!(classify("docs/archive/claude.md", ""), Tier::Cold);
        assert_eq!(classify("archive/NEXT-TASKS.md", ""), Tier::Cold);
    }

    #[test]
    fn explicit_tag_overrides_path() {
        let content = "<!-- @cortex-tms-tier WARM -->\n# Claude";
        assert_eq!(classify("CLAUDE.md", content), Tier::Warm);
        let cold = "<!-- @cortex-tms-tier HOT -->\n";
        assert_eq!(classify("docs/archive/old.md", cold), Tier::Hot);
    }

    #[test]
    fn unknown_paths_default_to_warm() {
        let (tier, source) = default_classifier().classify_with_source("src/notes.md", "");
        assert_eq!(tier, Tier::Warm);
        assert_eq!(source, TierSource::Default);
        assert_eq!(classify("", ""), Tier::Warm);
    }

    #[test]
    fn star_does_not_cross_directories() {
        // `wip*.md` must not swallow a directory named wip-something/.
        assert_eq!(classify("wip-drafts/plan.md", ""), Tier::Warm);
    }

    #[test]
    fn reports_matching_pattern() {
        let (_, source) = default_classifier().classify_with_source("docs/archive/x.md", "");
        assert_eq!(source, TierSource::Pattern("**/archive/**".to_string()));
    }

    #[test]
    fn windows_paths_are_normalized() {
        assert_eq!(classify(r"docs\archive\old.md", ""), Tier::Cold);
    }

    #[test]
    fn custom_rules() {
        let classifier = Classifier::new(vec![TierRule::new("specs", Tier::Hot, &["specs/*.md"])])
            .unwrap();
        assert_eq!(classifier.classify("specs/auth.md", ""), Tier::Hot);
        assert_eq!(classifier.classify("specs/deep/auth.md", ""), Tier::Warm);
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let err = Classifier::new(vec![TierRule::new("bad", Tier::Hot, &["docs/[a.md"])]);
        assert!(matches!(err, Err(TmsError::InvalidGlob { .. })));
    }
}
