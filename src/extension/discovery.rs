// Extension discovery.
// Walks a Drupal tree once and indexes every module, theme, and profile by machine name.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{IssueError, Result};

use super::kind::ExtensionKind;

/// Site configuration subtree that never holds extensions worth patching.
pub const EXCLUDED_SITE_DIR: &str = "sites/default";

/// Suffix of extension info files.
const INFO_SUFFIX: &str = ".info.yml";

/// Directory names that never contain extensions.
const SKIPPED_DIRS: &[&str] = &[
    "assets",
    "config",
    "css",
    "Drupal",
    "files",
    "fixtures",
    "images",
    "includes",
    "js",
    "lib",
    "misc",
    "node_modules",
    "src",
    "templates",
    "tests",
    "vendor",
];

/// A module, theme, or profile found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Machine name, taken from the info file name.
    pub name: String,
    pub kind: ExtensionKind,
    /// Directory of the extension, relative to the scan root.
    pub path: PathBuf,
}

/// The parts of an info file discovery cares about.
#[derive(Debug, Deserialize)]
struct InfoFile {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Extensions under a root, by kind and machine name.
#[derive(Debug, Default)]
pub struct ExtensionIndex {
    by_kind: HashMap<ExtensionKind, BTreeMap<String, Extension>>,
}

impl ExtensionIndex {
    /// Scan `root` and index every extension found.
    ///
    /// Entries are visited in file name order, so when a machine name appears
    /// twice for the same kind the first path wins and repeated scans of an
    /// unchanged tree give the same index.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut index = Self::default();

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_skipped(root, entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.loop_ancestor().is_some() => {
                    warn!(error = %err, "skipping symlink loop");
                    continue;
                }
                Err(err) if is_dangling_link(&err) => {
                    warn!(error = %err, "skipping dangling symlink");
                    continue;
                }
                Err(source) => {
                    return Err(IssueError::Discovery {
                        path: root.to_path_buf(),
                        source,
                    });
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(extension) = read_extension(root, entry.path())? {
                index.insert(extension);
            }
        }

        debug!(root = %root.display(), count = index.len(), "extension scan complete");
        Ok(index)
    }

    /// Find an extension by machine name, trying each kind in order.
    pub fn locate(&self, name: &str, kinds: &[ExtensionKind]) -> Option<&Extension> {
        kinds.iter().find_map(|kind| self.get(*kind, name))
    }

    /// Get an extension of a specific kind.
    pub fn get(&self, kind: ExtensionKind, name: &str) -> Option<&Extension> {
        self.by_kind.get(&kind).and_then(|extensions| extensions.get(name))
    }

    /// Total number of indexed extensions.
    pub fn len(&self) -> usize {
        self.by_kind.values().map(BTreeMap::len).sum()
    }

    fn insert(&mut self, extension: Extension) {
        self.by_kind
            .entry(extension.kind)
            .or_default()
            .entry(extension.name.clone())
            .or_insert(extension);
    }
}

/// Whether a directory should be left out of the walk.
fn is_skipped(root: &Path, entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref()) {
        return true;
    }

    entry
        .path()
        .strip_prefix(root)
        .is_ok_and(|relative| relative == Path::new(EXCLUDED_SITE_DIR))
}

/// Whether a walk error comes from a symlink whose target is missing.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    let target_missing = err
        .io_error()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound);
    let is_link = err.path().is_some_and(|path| {
        fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink())
    });
    target_missing && is_link
}

/// Build an extension from an info file, if `path` is one.
fn read_extension(root: &Path, path: &Path) -> Result<Option<Extension>> {
    let Some(name) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(INFO_SUFFIX))
    else {
        return Ok(None);
    };

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping unreadable info file");
            return Ok(None);
        }
    };
    let info: InfoFile = match serde_yaml::from_str(&contents) {
        Ok(info) => info,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping malformed info file");
            return Ok(None);
        }
    };

    let Some(kind) = info.kind.as_deref().and_then(ExtensionKind::from_info_type) else {
        return Ok(None);
    };

    let dir = path.parent().unwrap_or(root);
    Ok(Some(Extension {
        name: name.to_string(),
        kind,
        path: dir.strip_prefix(root).unwrap_or(dir).to_path_buf(),
    }))
}
