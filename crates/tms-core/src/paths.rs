use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File and directory constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = ".cortexrc";
pub const CORTEX_DIR: &str = ".cortex";
pub const VALIDATION_CACHE_FILE: &str = ".cortex/validation-cache.json";

pub const CLAUDE_MD: &str = "CLAUDE.md";
pub const NEXT_TASKS_MD: &str = "NEXT-TASKS.md";
pub const COPILOT_INSTRUCTIONS_MD: &str = ".github/copilot-instructions.md";
pub const PATTERNS_MD: &str = "docs/core/PATTERNS.md";

pub const DOCS_CORE_DIR: &str = "docs/core";
pub const ARCHIVE_DIR: &str = "docs/archive";

/// Files whose presence marks a directory as a managed project.
pub const INDICATOR_FILES: &[&str] = &[
    CLAUDE_MD,
    NEXT_TASKS_MD,
    PATTERNS_MD,
    COPILOT_INSTRUCTIONS_MD,
];

/// Files every managed project must carry.
pub const MANDATORY_FILES: &[&str] = &[NEXT_TASKS_MD, COPILOT_INSTRUCTIONS_MD, CLAUDE_MD];

/// Directory names never descended into when walking the markdown corpus.
pub const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    "build",
    ".git",
    "templates",
    "examples",
    "website",
];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn validation_cache_path(root: &Path) -> PathBuf {
    root.join(VALIDATION_CACHE_FILE)
}

pub fn next_tasks_path(root: &Path) -> PathBuf {
    root.join(NEXT_TASKS_MD)
}

/// True if any indicator file exists under `root`.
pub fn has_indicator(root: &Path) -> bool {
    INDICATOR_FILES.iter().any(|f| root.join(f).exists())
}

/// Render `path` relative to `root` with `/` separators, for display and matching.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    normalize_separators(&rel.to_string_lossy())
}

pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(config_path(root), PathBuf::from("/tmp/proj/.cortexrc"));
        assert_eq!(
            validation_cache_path(root),
            PathBuf::from("/tmp/proj/.cortex/validation-cache.json")
        );
    }

    #[test]
    fn relative_display_strips_root() {
        let root = Path::new("/tmp/proj");
        let file = Path::new("/tmp/proj/docs/core/PATTERNS.md");
        assert_eq!(relative_display(root, file), "docs/core/PATTERNS.md");
    }

    #[test]
    fn windows_separators_normalized() {
        assert_eq!(normalize_separators(r"docs\archive\old.md"), "docs/archive/old.md");
    }

    #[test]
    fn indicator_detection() {
        let dir = TempDir::new().unwrap();
        assert!(!has_indicator(dir.path()));
        std::fs::create_dir_all(dir.path().join(".github")).unwrap();
        std::fs::write(dir.path().join(COPILOT_INSTRUCTIONS_MD), "# rules\n").unwrap();
        assert!(has_indicator(dir.path()));
    }
}
