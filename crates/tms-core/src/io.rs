use crate::error::Result;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Bytes read from the top of a file when only the tier tag is needed.
pub const HEAD_BYTES: usize = 4096;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting tagged documents.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Read at most `limit` bytes from the start of `path` as lossy UTF-8.
///
/// A multi-byte character split at the boundary becomes a replacement
/// character, which cannot affect an ASCII tag match.
pub fn read_head(path: &Path, limit: usize) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut buf = Vec::with_capacity(limit);
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Number of lines in `content`, counting a trailing partial line.
pub fn count_lines(content: &str) -> usize {
    content.lines().count()
}

/// Add `entry` to `root/.gitignore` if it isn't already present.
///
/// Checks for an exact line match. Appends with a leading newline separator
/// if the file doesn't already end with one.
pub fn ensure_gitignore_entry(root: &Path, entry: &str) -> Result<()> {
    let gitignore = root.join(".gitignore");
    let existing = if gitignore.exists() {
        std::fs::read_to_string(&gitignore)?
    } else {
        String::new()
    };
    if existing.lines().any(|l| l == entry) {
        return Ok(());
    }
    let sep = if existing.is_empty() || existing.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    let mut f = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&gitignore)?;
    writeln!(f, "{sep}{entry}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs/core/PATTERNS.md");
        atomic_write(&path, b"# Patterns").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Patterns");
    }

    #[test]
    fn write_if_missing_skips_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("CLAUDE.md");
        std::fs::write(&path, b"original").unwrap();
        let written = write_if_missing(&path, b"new").unwrap();
        assert!(!written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn read_head_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.md");
        std::fs::write(&path, "a".repeat(10_000)).unwrap();
        assert_eq!(read_head(&path, HEAD_BYTES).unwrap().len(), HEAD_BYTES);
    }

    #[test]
    fn read_head_short_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.md");
        std::fs::write(&path, "# Title\n").unwrap();
        assert_eq!(read_head(&path, HEAD_BYTES).unwrap(), "# Title\n");
    }

    #[test]
    fn count_lines_handles_trailing_newline() {
        assert_eq!(count_lines(""), 0);
        assert_eq!(count_lines("one\ntwo\n"), 2);
        assert_eq!(count_lines("one\ntwo"), 2);
    }

    #[test]
    fn ensure_gitignore_entry_idempotent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "node_modules").unwrap();
        ensure_gitignore_entry(dir.path(), ".cortex/").unwrap();
        ensure_gitignore_entry(dir.path(), ".cortex/").unwrap();
        let content = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(content, "node_modules\n.cortex/\n");
    }
}
