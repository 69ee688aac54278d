// Error types for drupal-issue.
// Covers drupal.org API errors, local project lookups, and subprocess failures.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IssueError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Not a JSON resource: {0}")]
    NotJson(String),

    #[error("The provided issue number is invalid: {0:?}")]
    InvalidIssueNumber(String),

    #[error("The given ID is not for an issue: {0}")]
    NotAnIssue(String),

    #[error("Only Drupal 8 projects are supported at this time (issue version {0})")]
    UnsupportedVersion(String),

    #[error("Unsupported project type: {0}")]
    UnsupportedProjectType(String),

    #[error("Issue {0} has no displayed patches")]
    NoPatches(String),

    #[error("Unable to find a locally installed project named {0}")]
    ProjectNotInstalled(String),

    #[error("Unable to install project {0}. See output above for details.")]
    InstallFailed(String),

    #[error(
        "You must provide a SIMPLETEST_BASE_URL environment variable or use the \"--url\" option to run tests"
    )]
    MissingBaseUrl,

    #[error("Cannot determine what kind of test \"{0}\" is")]
    UnknownTestKind(String),

    #[error("Code changes have been made, but no tests were changed or added")]
    UntestedChanges,

    #[error("{0}")]
    CommandFailed(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to scan {path} for extensions: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IssueError>;
