// Changed file analysis.
// Picks test files out of a staged change set and checks that code changes come with tests.

use std::sync::LazyLock;

use regex::Regex;

/// Directories holding tests, matched case-insensitively. A trailing
/// `/Commands` marks Drush command classes, which are not tests.
static TEST_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(tests/src|src/tests|nightwatch|core/tests)(/commands)?")
        .expect("invalid regex")
});

static TEST_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(php|js)$").expect("invalid regex"));

static CODE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(module|php|inc|install|js)$").expect("invalid regex"));

/// Whether a changed file is a test a runner could execute.
pub fn is_test_file(path: &str) -> bool {
    TEST_FILE.is_match(path)
        && TEST_DIR
            .captures_iter(path)
            .any(|captures| captures.get(2).is_none())
}

/// Test files among a list of changed files, in their original order.
pub fn changed_tests(files: &[String]) -> Vec<String> {
    files
        .iter()
        .filter(|file| is_test_file(file))
        .cloned()
        .collect()
}

/// Summary of a change set for review.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Changed PHP and JavaScript sources.
    pub code_changes: Vec<String>,
    /// Changed files that look test related.
    pub test_changes: Vec<String>,
}

impl ChangeSummary {
    pub fn from_files(files: &[String]) -> Self {
        Self {
            code_changes: files
                .iter()
                .filter(|file| CODE_FILE.is_match(file))
                .cloned()
                .collect(),
            test_changes: files
                .iter()
                .filter(|file| file.to_lowercase().contains("test"))
                .cloned()
                .collect(),
        }
    }

    /// Code changed without any test being added or changed.
    pub fn is_untested(&self) -> bool {
        !self.code_changes.is_empty() && self.test_changes.is_empty()
    }

    pub fn has_test_changes(&self) -> bool {
        !self.test_changes.is_empty()
    }
}
