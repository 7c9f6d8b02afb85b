//! Read-only queries against a repository's commit history.
//!
//! All history access goes through [`HistoryProvider`] so the staleness
//! logic can run against [`ScriptedHistory`] in tests. The real adapter,
//! [`GitCli`], shells out to `git` once per query.
//!
//! A failed query (not a repository, path never committed, git missing)
//! reads as "no history". Callers cannot tell these apart and do not need
//! to: the signal is advisory.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// CommitRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub hash: String,
    pub changed_paths: BTreeSet<String>,
}

impl CommitRecord {
    pub fn new(hash: impl Into<String>, paths: &[&str]) -> Self {
        Self {
            hash: hash.into(),
            changed_paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryProvider
// ---------------------------------------------------------------------------

pub trait HistoryProvider {
    /// Committer timestamp (epoch seconds) of the latest commit touching `path_spec`.
    fn last_commit_epoch(&self, path_spec: &str, cwd: &Path) -> Option<i64>;

    /// True when the repository history is truncated.
    fn is_shallow_clone(&self, cwd: &Path) -> bool;

    /// Non-merge commits touching `path_spec` with committer time strictly
    /// after `since_epoch`, newest first, each with its full changed-file list.
    fn list_commits_since(&self, path_spec: &str, since_epoch: i64, cwd: &Path)
        -> Vec<CommitRecord>;
}

impl<H: HistoryProvider + ?Sized> HistoryProvider for &H {
    fn last_commit_epoch(&self, path_spec: &str, cwd: &Path) -> Option<i64> {
        (**self).last_commit_epoch(path_spec, cwd)
    }

    fn is_shallow_clone(&self, cwd: &Path) -> bool {
        (**self).is_shallow_clone(cwd)
    }

    fn list_commits_since(
        &self,
        path_spec: &str,
        since_epoch: i64,
        cwd: &Path,
    ) -> Vec<CommitRecord> {
        (**self).list_commits_since(path_spec, since_epoch, cwd)
    }
}

// ---------------------------------------------------------------------------
// GitCli
// ---------------------------------------------------------------------------

/// History provider backed by the `git` binary on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable instead of resolving `git` from `PATH`.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// True when the git binary can be located.
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// True when `cwd` lies inside a git work tree.
    pub fn is_repository(&self, cwd: &Path) -> bool {
        self.run(&["rev-parse", "--is-inside-work-tree"], cwd).as_deref() == Some("true")
    }

    /// Run git with `args` in `cwd`. Returns trimmed stdout, or None on any failure.
    fn run(&self, args: &[&str], cwd: &Path) -> Option<String> {
        let output = match Command::new(&self.binary)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(o) => o,
            Err(e) => {
                tracing::debug!(error = %e, "git could not be spawned");
                return None;
            }
        };
        if !output.status.success() {
            tracing::debug!(?args, status = %output.status, "git query failed");
            return None;
        }
        match String::from_utf8(output.stdout) {
            Ok(s) => Some(s.trim().to_string()),
            Err(_) => {
                tracing::debug!(?args, "git output was not UTF-8");
                None
            }
        }
    }

    fn changed_files(&self, hash: &str, cwd: &Path) -> BTreeSet<String> {
        self.run(
            &["diff-tree", "--root", "--no-commit-id", "--name-only", "-r", hash],
            cwd,
        )
        .map(|out| {
            out.lines()
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }
}

impl HistoryProvider for GitCli {
    fn last_commit_epoch(&self, path_spec: &str, cwd: &Path) -> Option<i64> {
        let out = self.run(&["log", "-1", "--format=%ct", "--", path_spec], cwd)?;
        if out.is_empty() {
            return None;
        }
        out.parse().ok()
    }

    fn is_shallow_clone(&self, cwd: &Path) -> bool {
        cwd.join(".git").join("shallow").exists()
    }

    fn list_commits_since(
        &self,
        path_spec: &str,
        since_epoch: i64,
        cwd: &Path,
    ) -> Vec<CommitRecord> {
        let since = format!("--since={since_epoch}");
        let Some(out) = self.run(
            &["log", "--no-merges", "--format=%H %ct", &since, "--", path_spec],
            cwd,
        ) else {
            return Vec::new();
        };

        // `--since` is inclusive; keep only commits strictly after the cutoff.
        out.lines()
            .filter_map(|line| {
                let (hash, ts) = line.split_once(' ')?;
                let ts: i64 = ts.trim().parse().ok()?;
                (ts > since_epoch).then(|| hash.to_string())
            })
            .map(|hash| {
                let changed_paths = self.changed_files(&hash, cwd);
                CommitRecord {
                    hash,
                    changed_paths,
                }
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ScriptedHistory
// ---------------------------------------------------------------------------

/// In-memory history for tests and dry runs.
///
/// Timestamps and commits are keyed by the exact path spec the caller will
/// query; the `cwd` argument is ignored.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHistory {
    last_commits: HashMap<String, i64>,
    commits: HashMap<String, Vec<(i64, CommitRecord)>>,
    shallow: bool,
}

impl ScriptedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_commit(mut self, path_spec: &str, epoch: i64) -> Self {
        self.last_commits.insert(path_spec.to_string(), epoch);
        self
    }

    pub fn with_commit(mut self, path_spec: &str, epoch: i64, commit: CommitRecord) -> Self {
        self.commits
            .entry(path_spec.to_string())
            .or_default()
            .push((epoch, commit));
        self
    }

    pub fn shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }
}

impl HistoryProvider for ScriptedHistory {
    fn last_commit_epoch(&self, path_spec: &str, _cwd: &Path) -> Option<i64> {
        self.last_commits.get(path_spec).copied()
    }

    fn is_shallow_clone(&self, _cwd: &Path) -> bool {
        self.shallow
    }

    fn list_commits_since(
        &self,
        path_spec: &str,
        since_epoch: i64,
        _cwd: &Path,
    ) -> Vec<CommitRecord> {
        self.commits
            .get(path_spec)
            .map(|list| {
                list.iter()
                    .filter(|(ts, _)| *ts > since_epoch)
                    .map(|(_, c)| c.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// CachedHistory
// ---------------------------------------------------------------------------

/// Memoizes `last_commit_epoch` lookups for the lifetime of one command.
///
/// Several configured docs usually share watch paths, so the same
/// `git log -1` would otherwise run once per doc. Build a fresh cache per
/// invocation; repository state can change between runs.
pub struct CachedHistory<H> {
    inner: H,
    last_commits: RefCell<HashMap<(PathBuf, String), Option<i64>>>,
}

impl<H: HistoryProvider> CachedHistory<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            last_commits: RefCell::new(HashMap::new()),
        }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: HistoryProvider> HistoryProvider for CachedHistory<H> {
    fn last_commit_epoch(&self, path_spec: &str, cwd: &Path) -> Option<i64> {
        let key = (cwd.to_path_buf(), path_spec.to_string());
        if let Some(hit) = self.last_commits.borrow().get(&key) {
            return *hit;
        }
        let value = self.inner.last_commit_epoch(path_spec, cwd);
        self.last_commits.borrow_mut().insert(key, value);
        value
    }

    fn is_shallow_clone(&self, cwd: &Path) -> bool {
        self.inner.is_shallow_clone(cwd)
    }

    fn list_commits_since(
        &self,
        path_spec: &str,
        since_epoch: i64,
        cwd: &Path,
    ) -> Vec<CommitRecord> {
        self.inner.list_commits_since(path_spec, since_epoch, cwd)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    const DAY: i64 = 86_400;
    const BASE: i64 = 1_700_000_000;

    #[test]
    fn scripted_history_filters_by_time() {
        let history = ScriptedHistory::new()
            .with_commit("src/", BASE, CommitRecord::new("a", &["src/a.rs"]))
            .with_commit("src/", BASE + DAY, CommitRecord::new("b", &["src/b.rs"]));
        let commits = history.list_commits_since("src/", BASE, Path::new("."));
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].hash, "b");
    }

    #[test]
    fn cached_history_queries_once() {
        struct Counting {
            calls: Cell<u32>,
        }
        impl HistoryProvider for Counting {
            fn last_commit_epoch(&self, _: &str, _: &Path) -> Option<i64> {
                self.calls.set(self.calls.get() + 1);
                Some(BASE)
            }
            fn is_shallow_clone(&self, _: &Path) -> bool {
                false
            }
            fn list_commits_since(&self, _: &str, _: i64, _: &Path) -> Vec<CommitRecord> {
                Vec::new()
            }
        }

        let cached = CachedHistory::new(Counting {
            calls: Cell::new(0),
        });
        let cwd = Path::new("/repo");
        assert_eq!(cached.last_commit_epoch("src/", cwd), Some(BASE));
        assert_eq!(cached.last_commit_epoch("src/", cwd), Some(BASE));
        assert_eq!(cached.last_commit_epoch("lib/", cwd), Some(BASE));
        assert_eq!(cached.into_inner().calls.get(), 2);
    }

    #[test]
    fn git_cli_outside_repository_degrades() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::new();
        assert_eq!(git.last_commit_epoch("README.md", dir.path()), None);
        assert!(git.list_commits_since("src/", 0, dir.path()).is_empty());
        assert!(!git.is_shallow_clone(dir.path()));
        assert!(!git.is_repository(dir.path()));
    }

    #[test]
    fn git_cli_missing_binary_degrades() {
        let dir = TempDir::new().unwrap();
        let git = GitCli::with_binary("definitely-not-a-git-binary");
        assert!(!git.is_available());
        assert_eq!(git.last_commit_epoch("README.md", dir.path()), None);
    }

    #[test]
    fn git_cli_reads_real_history() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        commit_at(dir.path(), &[("README.md", "# Readme\n")], BASE, "readme");
        commit_at(
            dir.path(),
            &[("src/lib.rs", "pub fn a() {}\n"), ("src/lib.test.ts", "x\n")],
            BASE + DAY,
            "code",
        );
        commit_at(dir.path(), &[("src/more.rs", "\n")], BASE + 2 * DAY, "more");

        let git = GitCli::new();
        assert!(git.is_repository(dir.path()));
        assert_eq!(git.last_commit_epoch("README.md", dir.path()), Some(BASE));
        assert_eq!(git.last_commit_epoch("src/", dir.path()), Some(BASE + 2 * DAY));
        assert_eq!(git.last_commit_epoch("untracked.md", dir.path()), None);

        let commits = git.list_commits_since("src/", BASE + DAY, dir.path());
        assert_eq!(commits.len(), 1, "cutoff is exclusive");
        assert!(commits[0].changed_paths.contains("src/more.rs"));

        let all = git.list_commits_since("src/", BASE, dir.path());
        assert_eq!(all.len(), 2);
        let code = all.iter().find(|c| c.changed_paths.len() == 2).unwrap();
        assert!(code.changed_paths.contains("src/lib.test.ts"));
    }

    #[test]
    fn shallow_marker_detected() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git/shallow"), "abc\n").unwrap();
        assert!(GitCli::new().is_shallow_clone(dir.path()));
    }
}
