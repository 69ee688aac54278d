// Test kind classification.
// Maps a test file path to the runner that can execute it.

use std::fmt;

/// The kinds of Drupal tests, each with its own runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// PHPUnit test driven through a headless browser.
    FunctionalJavascript,
    /// End-to-end UI test run by Nightwatch.js.
    Nightwatch,
    /// PHPUnit unit, kernel, or functional test.
    PhpUnit,
    /// Legacy Simpletest test run by `run-tests.sh`.
    Simpletest,
}

/// Ordered classification rules; the first rule with a matching substring wins.
const RULES: &[(&[&str], TestKind)] = &[
    (
        &["tests/src/FunctionalJavascript"],
        TestKind::FunctionalJavascript,
    ),
    (&["Nightwatch"], TestKind::Nightwatch),
    (
        &[
            "tests/src",
            "core/tests/Drupal/Tests",
            "core/tests/Drupal/KernelTests",
        ],
        TestKind::PhpUnit,
    ),
    (&["src/Tests"], TestKind::Simpletest),
];

impl TestKind {
    /// Classify a test file path. Returns `None` for paths no runner recognises.
    pub fn classify(path: &str) -> Option<TestKind> {
        RULES
            .iter()
            .find(|(patterns, _)| patterns.iter().any(|pattern| path.contains(pattern)))
            .map(|(_, kind)| *kind)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestKind::FunctionalJavascript => "functional JavaScript test",
            TestKind::Nightwatch => "Nightwatch test",
            TestKind::PhpUnit => "unit/kernel/functional test",
            TestKind::Simpletest => "Simpletest test",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
