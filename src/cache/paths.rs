// Cache path utilities.
// Maps URLs to content-addressed cache files and locates the marker files.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use md5::{Digest, Md5};

/// Directory used when no platform cache directory can be determined.
pub const FALLBACK_CACHE_DIR: &str = ".cache";

/// Name of the file remembering the last project passed to `test`.
const LAST_PROJECT_FILE: &str = "last_project";

/// Get the default cache directory (~/.cache/drupal-issue on Linux).
pub fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("", "", "drupal-issue")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
}

/// Cache key for a URL: the lowercase hex md5 of the URL string.
pub fn cache_key(url: &str) -> String {
    format!("{:x}", Md5::digest(url.as_bytes()))
}

/// Path of the cache entry for a URL.
pub fn entry_path(cache_dir: &Path, url: &str) -> PathBuf {
    cache_dir.join(cache_key(url))
}

/// Path of the last-used project marker.
pub fn last_project_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(LAST_PROJECT_FILE)
}
