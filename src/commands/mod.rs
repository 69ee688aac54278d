// Command implementations.
// Shared plumbing for resolving issues, projects, and patches from user input.

pub mod create_patch;
pub mod issue;
pub mod patch;
pub mod review;
pub mod test;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::drupal::types::CORE_PROJECT;
use crate::drupal::{DrupalClient, Issue, Patch, Project, parse_issue_number};
use crate::error::{IssueError, Result};
use crate::extension::{ExtensionIndex, ExtensionKind};
use crate::process;
use crate::prompt::Console;

/// State shared by every command.
pub struct Context {
    pub config: Config,
    pub client: DrupalClient,
    pub prompt: Console,
}

/// Where a project lives in the local checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocation {
    pub name: String,
    /// Path relative to the root; `.` for core.
    pub path: PathBuf,
}

impl ProjectLocation {
    pub fn core() -> Self {
        Self {
            name: CORE_PROJECT.to_string(),
            path: PathBuf::from("."),
        }
    }

    pub fn is_core(&self) -> bool {
        self.name == CORE_PROJECT
    }

    /// Pathspec staged before diffing. Core checkouts usually carry local
    /// changes outside `core/` that must stay out of patches.
    pub fn stage_pathspec(&self) -> &'static str {
        if self.is_core() { "core" } else { "." }
    }
}

impl Context {
    pub fn new(config: Config, client: DrupalClient, prompt: Console) -> Self {
        Self {
            config,
            client,
            prompt,
        }
    }

    /// Root of the local checkout.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Absolute path of a project.
    pub fn project_dir(&self, location: &ProjectLocation) -> PathBuf {
        self.config.root.join(&location.path)
    }

    /// Fetch the issue named on the command line, or ask for one.
    pub async fn resolve_issue(&mut self, issue_number: Option<String>) -> Result<Issue> {
        let issue_number = match issue_number {
            Some(number) => number,
            None => self.prompt.ask("What issue are you working on?", None)?,
        };
        let nid = parse_issue_number(&issue_number)?;
        self.client.get_issue(nid).await
    }

    /// Fetch the project an issue belongs to, unless it is core.
    pub async fn issue_project(&self, issue: &Issue) -> Result<Option<Project>> {
        if issue.is_core() {
            return Ok(None);
        }
        self.client.get_project(&issue.project).await.map(Some)
    }

    /// Locate a contributed project by its declared kind.
    pub fn locate_project(&self, project: &Project, name: &str) -> Result<Option<ProjectLocation>> {
        let kind = project
            .extension_kind()
            .ok_or_else(|| IssueError::UnsupportedProjectType(project.project_type.clone()))?;
        self.locate(name, &[kind])
    }

    /// Locate a project given only its name, trying every extension kind.
    pub fn locate_by_name(&self, name: &str) -> Result<ProjectLocation> {
        if name == CORE_PROJECT {
            return Ok(ProjectLocation::core());
        }
        self.locate(name, &ExtensionKind::SEARCH_ORDER)?
            .ok_or_else(|| IssueError::ProjectNotInstalled(name.to_string()))
    }

    fn locate(&self, name: &str, kinds: &[ExtensionKind]) -> Result<Option<ProjectLocation>> {
        let index = ExtensionIndex::scan(self.root())?;
        Ok(index.locate(name, kinds).map(|extension| {
            debug!(name, kind = %extension.kind, path = %extension.path.display(), "located project");
            ProjectLocation {
                name: name.to_string(),
                path: extension.path.clone(),
            }
        }))
    }

    /// Let the user pick one of an issue's patches.
    ///
    /// A single patch is picked silently unless `skip_label` offers a way out,
    /// in which case choosing it returns `None`.
    pub async fn choose_patch(
        &mut self,
        issue: &Issue,
        question: &str,
        skip_label: Option<&str>,
    ) -> Result<Option<Patch>> {
        let mut patches = self.client.get_patches(issue).await?;

        if skip_label.is_none() {
            match patches.len() {
                0 => return Err(IssueError::NoPatches(issue.nid.clone())),
                1 => return Ok(patches.pop()),
                _ => {}
            }
        }

        let mut choices: Vec<&str> = patches.iter().map(|patch| patch.name.as_str()).collect();
        choices.extend(skip_label);

        let picked = self.prompt.choose(question, &choices)?;
        Ok(if picked < patches.len() {
            Some(patches.swap_remove(picked))
        } else {
            None
        })
    }

    /// Stage a project's changes and list the staged files, deletions included.
    pub async fn staged_files(&self, location: &ProjectLocation) -> Result<Vec<String>> {
        let dir = self.project_dir(location);
        stage(&dir, location).await?;
        staged_paths(&dir, &[]).await
    }
}

/// List staged paths in `dir`, narrowed by extra `git diff` options.
pub async fn staged_paths(dir: &Path, options: &[&str]) -> Result<Vec<String>> {
    let mut args = vec!["diff", "--cached", "--name-only"];
    args.extend_from_slice(options);
    process::output_lines(
        &mut process::command("git", args, dir),
        "Failed to list staged changes. See output above for details.",
    )
    .await
}

/// Stage a project's changes in git.
pub async fn stage(dir: &Path, location: &ProjectLocation) -> Result<()> {
    process::run(
        &mut process::command("git", ["add", location.stage_pathspec()], dir),
        "Failed to stage changes. See output above for details.",
    )
    .await
}
