//! Enumeration of the markdown files that make up a project's documentation.

use crate::classifier::Classifier;
use crate::config::Config;
use crate::io;
use crate::paths;
use crate::tier::Tier;
use globset::GlobSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One markdown file found under the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub abs: PathBuf,
    /// Root-relative, `/`-separated.
    pub rel: String,
}

impl CorpusFile {
    /// Classify from the relative path and the first [`io::HEAD_BYTES`] of content.
    /// An unreadable file is classified from its path alone.
    pub fn classify(&self, classifier: &Classifier) -> Tier {
        let head = io::read_head(&self.abs, io::HEAD_BYTES).unwrap_or_else(|e| {
            tracing::debug!(path = %self.rel, error = %e, "could not read file head");
            String::new()
        });
        classifier.classify(&self.rel, &head)
    }
}

/// Every `*.md` file under `root`, sorted by relative path.
///
/// Directories named in [`paths::EXCLUDED_DIRS`] are never entered. Paths
/// matching `exclude` are skipped, and a matching directory prunes its subtree.
pub fn markdown_files(root: &Path, exclude: Option<&GlobSet>) -> Vec<CorpusFile> {
    let excluded = |rel: &str| exclude.map(|set| set.is_match(rel)).unwrap_or(false);

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 {
                return true;
            }
            if e.file_type().is_dir() {
                let name = e.file_name().to_string_lossy();
                if paths::EXCLUDED_DIRS.contains(&&*name) {
                    return false;
                }
            }
            !excluded(&paths::relative_display(root, e.path()))
        });

    let mut files: Vec<CorpusFile> = walker
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::debug!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("md"))
        .map(|e| CorpusFile {
            rel: paths::relative_display(root, e.path()),
            abs: e.into_path(),
        })
        .collect();

    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    files
}

/// Corpus using the exclusions from `.cortexrc`. A missing or unreadable
/// config, or a bad exclude glob, walks without exclusions.
pub fn project_markdown_files(root: &Path) -> Vec<CorpusFile> {
    let exclude = match Config::load_or_default(root) {
        Ok(config) => config.exclude_set().map_err(|e| {
            tracing::warn!(error = %e, "exclude patterns ignored");
        }),
        Err(e) => {
            tracing::warn!(error = %e, ".cortexrc could not be read, using defaults");
            Err(())
        }
    };
    markdown_files(root, exclude.ok().as_ref())
}
