// drupal.org API response types.
// Typed views over the node and file JSON returned by the api-d7 endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::extension::ExtensionKind;

/// Node type of an issue.
pub const ISSUE_NODE_TYPE: &str = "project_issue";

/// Machine name of Drupal core on drupal.org.
pub const CORE_PROJECT: &str = "drupal";

/// A drupal.org issue node.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    #[serde(deserialize_with = "id_string")]
    pub nid: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "field_issue_version", default)]
    pub version: String,
    #[serde(
        rename = "field_issue_status",
        default,
        deserialize_with = "optional_id_string"
    )]
    pub status: Option<String>,
    #[serde(rename = "field_project")]
    pub project: ProjectRef,
    #[serde(rename = "field_issue_files", default)]
    pub files: Vec<IssueFile>,
    #[serde(default)]
    pub comments: Vec<CommentRef>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub changed: Option<String>,
}

impl Issue {
    /// Whether the issue belongs to Drupal core rather than a contributed project.
    pub fn is_core(&self) -> bool {
        self.project.machine_name == CORE_PROJECT
    }

    /// Human readable issue status.
    pub fn status_label(&self) -> &'static str {
        match self.status.as_deref() {
            Some("1") => "Active",
            Some("2") => "Fixed",
            Some("3") => "Closed (duplicate)",
            Some("4") => "Postponed",
            Some("5") => "Closed (won't fix)",
            Some("6") => "Closed (works as designed)",
            Some("7") => "Closed (fixed)",
            Some("8") => "Needs review",
            Some("13") => "Needs work",
            Some("14") => "Reviewed & tested by the community",
            Some("15") => "Patch (to be ported)",
            Some("16") => "Postponed (maintainer needs more info)",
            Some("17") => "Closed (outdated)",
            Some("18") => "Closed (cannot reproduce)",
            _ => "Unknown",
        }
    }

    /// When the issue was last changed.
    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.changed
            .as_deref()
            .and_then(|secs| secs.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// 1-based position of a comment in the issue, used in patch names.
    pub fn comment_number(&self, cid: &str) -> Option<usize> {
        self.comments
            .iter()
            .position(|comment| comment.id == cid)
            .map(|index| index + 1)
    }

    /// Number the next comment will get.
    pub fn next_comment_number(&self) -> usize {
        self.comments.len() + 1
    }
}

/// Reference from an issue to its project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    pub uri: String,
    pub machine_name: String,
}

/// A file attached to an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueFile {
    pub file: FileRef,
    #[serde(default, deserialize_with = "flag")]
    pub display: bool,
}

/// Reference to a file entity.
#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    pub uri: String,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub cid: Option<String>,
}

/// Reference to a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRef {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
}

/// A drupal.org project node.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    #[serde(rename = "type")]
    pub project_type: String,
    #[serde(default)]
    pub title: String,
}

impl Project {
    /// Extension kind a project installs as, if it is one.
    pub fn extension_kind(&self) -> Option<ExtensionKind> {
        match self.project_type.as_str() {
            "project_module" => Some(ExtensionKind::Module),
            "project_theme" => Some(ExtensionKind::Theme),
            "project_distribution" => Some(ExtensionKind::Profile),
            _ => None,
        }
    }
}

/// A drupal.org file entity.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntity {
    pub name: String,
    pub url: String,
}

/// A patch attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub name: String,
    pub url: String,
    /// Comment the patch was posted with.
    pub cid: Option<String>,
}

/// Accept ids encoded as strings or numbers.
fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

fn optional_id_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}

/// Accept flags encoded as booleans, numbers, or numeric strings.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        _ => false,
    })
}
