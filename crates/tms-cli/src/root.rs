use std::path::{Path, PathBuf};
use tms_core::paths;

/// Resolve the project root directory.
///
/// Priority:
/// 1. `--root` flag / `CORTEX_TMS_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for a `.cortexrc` file
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(&cwd)
}

fn resolve_from(cwd: &Path) -> PathBuf {
    find_upward(cwd, |dir| paths::config_path(dir).is_file())
        .or_else(|| find_upward(cwd, |dir| dir.join(".git").exists()))
        .unwrap_or_else(|| cwd.to_path_buf())
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| found(dir)).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_cortexrc_above_cwd() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".cortexrc"), "version: 1\n").unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();
        assert_eq!(resolve_from(&subdir), dir.path());
    }

    #[test]
    fn cortexrc_beats_enclosing_git_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let pkg = dir.path().join("packages/web");
        std::fs::create_dir_all(&pkg).unwrap();
        std::fs::write(pkg.join(".cortexrc"), "version: 1\n").unwrap();
        assert_eq!(resolve_from(&pkg.join("src")), pkg);
    }

    #[test]
    fn falls_back_to_git_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        assert_eq!(resolve_from(&nested), dir.path());
    }
}
