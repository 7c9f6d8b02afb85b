//! Decides whether a commit's changes count toward documentation staleness.
//!
//! One non-incidental file is enough to make the whole commit meaningful.

use std::collections::BTreeSet;

const LOCKFILES: &[&str] = &["package-lock.json", "yarn.lock", "pnpm-lock.yaml"];
const CONFIG_SUFFIXES: &[&str] = &[".config.js", ".config.ts"];

/// True for paths that never make a doc stale on their own: tests,
/// lockfiles and build configuration.
pub fn is_incidental(path: &str) -> bool {
    path.contains("test")
        || path.contains(".test.")
        || LOCKFILES.iter().any(|l| path.contains(l))
        || CONFIG_SUFFIXES.iter().any(|s| path.ends_with(s))
}

/// True iff at least one changed path is not incidental. Empty sets are not meaningful.
pub fn is_meaningful(changed_paths: &BTreeSet<String>) -> bool {
    changed_paths.iter().any(|p| !is_incidental(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn empty_change_set_is_not_meaningful() {
        assert!(!is_meaningful(&BTreeSet::new()));
    }

    #[test]
    fn only_incidental_files() {
        assert!(!is_meaningful(&set(&["src/foo.test.ts", "package-lock.json"])));
        assert!(!is_meaningful(&set(&["tests/integration.rs"])));
        assert!(!is_meaningful(&set(&["vite.config.ts", "jest.config.js"])));
        assert!(!is_meaningful(&set(&["web/yarn.lock", "pnpm-lock.yaml"])));
    }

    #[test]
    fn one_real_file_is_enough() {
        assert!(is_meaningful(&set(&["src/foo.test.ts", "src/foo.ts"])));
        assert!(is_meaningful(&set(&["README.md"])));
    }

    #[test]
    fn test_substring_anywhere_is_incidental() {
        // Coarse by construction: "latest" contains "test".
        assert!(is_incidental("src/latest.rs"));
        assert!(is_incidental("contest/main.go"));
    }

    #[test]
    fn config_suffix_must_be_at_end() {
        assert!(is_incidental("tailwind.config.ts"));
        assert!(!is_incidental("src/app.config.json"));
    }
}
