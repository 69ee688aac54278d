// Runtime configuration.
// Resolved once from command-line options and environment, then passed down explicitly.

use std::path::{self, PathBuf};

use crate::cache::default_cache_dir;
use crate::error::Result;

/// Default base URL of the drupal.org REST API.
pub const DEFAULT_API_BASE: &str = "https://www.drupal.org/api-d7";

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the local Drupal checkout.
    pub root: PathBuf,
    /// Directory holding cached responses.
    pub cache_dir: PathBuf,
    /// Base URL of the drupal.org REST API.
    pub api_base: String,
}

impl Config {
    /// Relative paths are resolved against the current directory.
    pub fn new(root: PathBuf, cache_dir: Option<PathBuf>, api_base: String) -> Result<Self> {
        Ok(Self {
            root: path::absolute(root)?,
            cache_dir: path::absolute(cache_dir.unwrap_or_else(default_cache_dir))?,
            api_base,
        })
    }
}

/// Environment handed to test runner processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEnv {
    pub simpletest_base_url: String,
    pub drupal_test_base_url: String,
    pub simpletest_db: String,
}

impl TestEnv {
    /// Default database for functional tests.
    pub const DEFAULT_DB: &'static str = "sqlite://localhost/sites/default/files/.simpletest.sqlite";

    /// Build from an explicit base URL plus optional overrides.
    pub fn new(base_url: String, drupal_test_base_url: Option<String>, db: Option<String>) -> Self {
        Self {
            drupal_test_base_url: drupal_test_base_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| base_url.clone()),
            simpletest_db: db
                .filter(|db| !db.is_empty())
                .unwrap_or_else(|| Self::DEFAULT_DB.to_string()),
            simpletest_base_url: base_url,
        }
    }

    /// Read the optional overrides from the process environment.
    pub fn from_env(base_url: String) -> Self {
        Self::new(
            base_url,
            std::env::var("DRUPAL_TEST_BASE_URL").ok(),
            std::env::var("SIMPLETEST_DB").ok(),
        )
    }

    /// Variables to set on each test runner process.
    pub fn vars(&self) -> [(&'static str, &str); 3] {
        [
            ("SIMPLETEST_BASE_URL", self.simpletest_base_url.as_str()),
            ("DRUPAL_TEST_BASE_URL", self.drupal_test_base_url.as_str()),
            ("SIMPLETEST_DB", self.simpletest_db.as_str()),
        ]
    }
}
