// Cache store for reading and writing cached responses.
// Entries are raw bytes, written once and never expired or replaced.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

use super::paths;

/// Flat directory of cached responses keyed by URL hash.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at the given directory. Nothing is created on disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the entry for a URL, whether or not it exists.
    pub fn entry_path(&self, url: &str) -> PathBuf {
        paths::entry_path(&self.dir, url)
    }

    /// Check if a URL has a cached entry.
    pub fn contains(&self, url: &str) -> bool {
        self.entry_path(url).is_file()
    }

    /// Read the cached bytes for a URL.
    pub fn read(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(url);
        if !path.is_file() {
            return Ok(None);
        }

        debug!(url, path = %path.display(), "cache hit");
        Ok(Some(fs::read(path)?))
    }

    /// Write bytes for a URL unless an entry already exists.
    /// Returns true if a new entry was written.
    pub fn write_once(&self, url: &str, contents: &[u8]) -> Result<bool> {
        if self.contains(url) {
            return Ok(false);
        }

        let path = self.entry_path(url);
        fs::create_dir_all(&self.dir)?;
        write_atomic(&path, contents)?;
        debug!(url, path = %path.display(), "cache entry written");
        Ok(true)
    }

    /// Read the last project name used by the `test` command.
    pub fn last_project(&self) -> Result<Option<String>> {
        let path = paths::last_project_path(&self.dir);
        if !path.is_file() {
            return Ok(None);
        }

        let name = fs::read_to_string(path)?.trim().to_string();
        Ok(if name.is_empty() { None } else { Some(name) })
    }

    /// Remember the last project name used by the `test` command.
    pub fn set_last_project(&self, name: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        write_atomic(&paths::last_project_path(&self.dir), name.as_bytes())
    }
}

/// Write via a temp file so readers never see a partial entry.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
