// drupal.org API endpoint functions.
// Provides typed methods for fetching issues, projects, and patches.

use serde_json::Value;
use tracing::debug;

use crate::error::{IssueError, Result};

use super::client::{DrupalClient, url_extension};
use super::types::{FileEntity, ISSUE_NODE_TYPE, Issue, Patch, Project, ProjectRef};

/// Core major versions whose issues can be worked on.
pub const SUPPORTED_VERSION_PREFIXES: &[&str] = &["8"];

/// Parse an issue number typed by the user.
pub fn parse_issue_number(input: &str) -> Result<u64> {
    input
        .trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| IssueError::InvalidIssueNumber(input.to_string()))
}

/// Check that a node is an issue for a supported core version.
pub fn validate_issue(nid: u64, node: Value) -> Result<Issue> {
    if node.get("type").and_then(Value::as_str) != Some(ISSUE_NODE_TYPE) {
        return Err(IssueError::NotAnIssue(nid.to_string()));
    }

    let issue: Issue = serde_json::from_value(node)?;
    if !SUPPORTED_VERSION_PREFIXES
        .iter()
        .any(|prefix| issue.version.starts_with(prefix))
    {
        return Err(IssueError::UnsupportedVersion(issue.version));
    }

    Ok(issue)
}

impl DrupalClient {
    /// Get an issue. Always fetched fresh, since issues change.
    pub async fn get_issue(&self, nid: u64) -> Result<Issue> {
        let node = self.fetch_json(&self.node_url(nid), false).await?;
        validate_issue(nid, node)
    }

    /// Get the project an issue belongs to.
    pub async fn get_project(&self, project: &ProjectRef) -> Result<Project> {
        let node = self
            .fetch_json(&format!("{}.json", project.uri), true)
            .await?;
        Ok(serde_json::from_value(node)?)
    }

    /// Get a file entity.
    pub async fn get_file(&self, uri: &str) -> Result<FileEntity> {
        let file = self.fetch_json(&format!("{}.json", uri), true).await?;
        Ok(serde_json::from_value(file)?)
    }

    /// Get the displayed patches attached to an issue, oldest first.
    pub async fn get_patches(&self, issue: &Issue) -> Result<Vec<Patch>> {
        let mut patches = Vec::new();

        for attachment in issue.files.iter().filter(|file| file.display) {
            let file = self.get_file(&attachment.file.uri).await?;
            if url_extension(&file.url)?.as_deref() != Some("patch") {
                debug!(name = %file.name, "skipping non-patch attachment");
                continue;
            }

            patches.push(Patch {
                name: file.name,
                url: file.url,
                cid: attachment.file.cid.clone(),
            });
        }

        Ok(patches)
    }
}
