use crate::classifier::default_classifier;
use crate::corpus;
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rough characters-per-token ratio for English prose and markdown.
pub const CHARS_PER_TOKEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTokenCount {
    pub path: String,
    pub tier: Tier,
    pub characters: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTokens {
    pub files: Vec<FileTokenCount>,
    pub total_tokens: usize,
    pub total_chars: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTotals {
    pub files: usize,
    pub tokens: usize,
    pub chars: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenStats {
    pub hot: TierTokens,
    pub warm: TierTokens,
    pub cold: TierTokens,
    pub total: TokenTotals,
}

impl TokenStats {
    pub fn tier(&self, tier: Tier) -> &TierTokens {
        match tier {
            Tier::Hot => &self.hot,
            Tier::Warm => &self.warm,
            Tier::Cold => &self.cold,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut TierTokens {
        match tier {
            Tier::Hot => &mut self.hot,
            Tier::Warm => &mut self.warm,
            Tier::Cold => &mut self.cold,
        }
    }

    /// Share of all tokens kept out of the always-loaded HOT tier, in percent.
    pub fn context_reduction_percent(&self) -> f64 {
        if self.total.tokens == 0 {
            return 0.0;
        }
        (1.0 - self.hot.total_tokens as f64 / self.total.tokens as f64) * 100.0
    }
}

pub fn estimate_tokens(characters: usize) -> usize {
    characters.div_ceil(CHARS_PER_TOKEN)
}

/// Per-tier character and token estimates for the markdown corpus.
/// Unreadable files are skipped.
pub fn analyze_tokens(root: &Path) -> TokenStats {
    let classifier = default_classifier();
    let mut stats = TokenStats::default();

    for file in corpus::project_markdown_files(root) {
        let content = match std::fs::read_to_string(&file.abs) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(file = %file.rel, error = %e, "skipping unreadable file");
                continue;
            }
        };
        let characters = content.chars().count();
        let tier = classifier.classify(&file.rel, &content);
        stats.tier_mut(tier).files.push(FileTokenCount {
            path: file.rel,
            tier,
            characters,
            tokens: estimate_tokens(characters),
        });
    }

    for &tier in Tier::all() {
        let bucket = stats.tier_mut(tier);
        bucket.files.sort_by(|a, b| b.tokens.cmp(&a.tokens));
        bucket.total_tokens = bucket.files.iter().map(|f| f.tokens).sum();
        bucket.total_chars = bucket.files.iter().map(|f| f.characters).sum();
    }

    stats.total = TokenTotals {
        files: stats.hot.files.len() + stats.warm.files.len() + stats.cold.files.len(),
        tokens: stats.hot.total_tokens + stats.warm.total_tokens + stats.cold.total_tokens,
        chars: stats.hot.total_chars + stats.warm.total_chars + stats.cold.total_chars,
    };
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimate_tokens(0), 0);
        assert_eq!(estimate_tokens(1), 1);
        assert_eq!(estimate_tokens(4), 1);
        assert_eq!(estimate_tokens(5), 2);
    }

    #[test]
    fn groups_by_tier_and_sorts_descending() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "NEXT-TASKS.md", &"a".repeat(40));
        write(dir.path(), "CLAUDE.md", &"b".repeat(400));
        write(dir.path(), "docs/core/PATTERNS.md", &"c".repeat(800));
        write(dir.path(), "docs/archive/old.md", &"d".repeat(1000));

        let stats = analyze_tokens(dir.path());
        assert_eq!(stats.hot.files.len(), 2);
        assert_eq!(stats.hot.files[0].path, "CLAUDE.md");
        assert_eq!(stats.hot.total_tokens, 110);
        assert_eq!(stats.hot.total_chars, 440);
        assert_eq!(stats.warm.total_tokens, 200);
        assert_eq!(stats.cold.total_tokens, 250);
        assert_eq!(stats.total.files, 4);
        assert_eq!(stats.total.tokens, 560);

        let reduction = stats.context_reduction_percent();
        assert!((reduction - (450.0 / 560.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "CLAUDE.md", "✅✅✅✅");
        let stats = analyze_tokens(dir.path());
        assert_eq!(stats.hot.files[0].characters, 4);
        assert_eq!(stats.hot.files[0].tokens, 1);
    }

    #[test]
    fn empty_project_has_no_reduction() {
        let dir = TempDir::new().unwrap();
        let stats = analyze_tokens(dir.path());
        assert_eq!(stats.total, TokenTotals::default());
        assert_eq!(stats.context_reduction_percent(), 0.0);
    }
}
