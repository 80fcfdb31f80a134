//! Per-project data directory layout.
//!
//! Everything Wingman writes for a workspace lives under `<root>/.wingman`:
//! context exports, snapshot backups, command templates, and the chat
//! keywords file. Directories are created lazily by the operations that
//! write into them.

use std::io;
use std::path::{Path, PathBuf};

pub const DATA_DIR_NAME: &str = ".wingman";

/// Resolves paths inside a workspace's Wingman data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(workspace_root: &Path) -> Self {
        Self {
            root: workspace_root.join(DATA_DIR_NAME),
        }
    }

    /// The data directory itself (`<root>/.wingman`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// HTML context exports.
    pub fn context_exports(&self) -> PathBuf {
        self.root.join("temp").join("context")
    }

    /// JSON context snapshots written by `/context-backup`.
    pub fn context_backups(&self) -> PathBuf {
        self.root.join("temp").join("context_backup")
    }

    /// JSON command templates consumed by `/template`.
    pub fn templates(&self) -> PathBuf {
        self.root.join("command_templates")
    }

    /// Keyword expansion table consumed by `/cchat`.
    pub fn keywords_file(&self) -> PathBuf {
        self.root.join("keywords.json")
    }

    /// Create `dir` (and parents) if missing, returning it for chaining.
    pub fn ensure(dir: PathBuf) -> io::Result<PathBuf> {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_rooted_under_data_dir() {
        let dir = DataDir::new(Path::new("/work"));
        assert_eq!(dir.root(), Path::new("/work/.wingman"));
        assert!(dir.context_backups().starts_with("/work/.wingman/temp"));
        assert!(dir.templates().starts_with("/work/.wingman"));
    }

    #[test]
    fn test_ensure_creates_missing_dirs() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = DataDir::new(tmp.path());
        let backups = DataDir::ensure(dir.context_backups()).expect("ensure");
        assert!(backups.is_dir());
        // Second call is a no-op
        assert!(DataDir::ensure(dir.context_backups()).is_ok());
    }
}
