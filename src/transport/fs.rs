use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

/// Read-only view over a directory of captured JSON payloads.
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    /// Create a view rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the snapshot.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `relative` under the root, refusing paths that escape it.
    pub fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let candidate = Path::new(relative);
        let escapes = candidate.components().any(|component| {
            !matches!(component, Component::Normal(_) | Component::CurDir)
        });
        if escapes || relative.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("snapshot path '{relative}' is not a plain relative path"),
            ));
        }
        Ok(self.root.join(candidate))
    }

    /// Read a UTF-8 file under the root.
    pub fn read_to_string(&self, relative: &str) -> io::Result<String> {
        let path = self.resolve(relative)?;
        fs::read_to_string(path)
    }

    /// Best-effort modified time of a file under the root.
    pub fn modified_at(&self, relative: &str) -> Option<DateTime<Utc>> {
        let path = self.resolve(relative).ok()?;
        let modified = fs::metadata(path).ok()?.modified().ok()?;
        Some(DateTime::<Utc>::from(modified))
    }
}
