// The `patch` command.
// Downloads a patch from an issue and applies it, installing the project first if needed.

use std::ffi::OsStr;
use std::fs;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::drupal::{Issue, Project};
use crate::error::{IssueError, Result};
use crate::process;

use super::{Context, ProjectLocation};

/// Contrib versions look like `8.x-1.x-dev` or `8.x-2.0-beta1`; the capture
/// is the project's own major version.
static CONTRIB_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^-]+-([^-.]+)\.[^-.]+").expect("invalid regex"));

/// Composer constraint for the development branch matching an issue version.
pub fn dev_constraint(version: &str) -> Option<String> {
    CONTRIB_VERSION
        .captures(version)
        .and_then(|captures| captures.get(1))
        .map(|major| format!("{}.x-dev", major.as_str()))
}

/// File name of a patch, from the last segment of its URL.
pub fn patch_basename(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

pub async fn run(ctx: &mut Context, issue_number: Option<String>) -> Result<()> {
    let issue = ctx.resolve_issue(issue_number).await?;

    let location = match ctx.issue_project(&issue).await? {
        None => ProjectLocation::core(),
        Some(project) => locate_or_install(ctx, &issue, &project).await?,
    };

    let Some(patch) = ctx
        .choose_patch(&issue, "What patch would you like to apply?", None)
        .await?
    else {
        return Err(IssueError::NoPatches(issue.nid.clone()));
    };

    let cached = ctx.client.fetch_to_cache_file(&patch.url).await?;
    let basename = patch_basename(&patch.url);
    let local = ctx.root().join(basename);
    if !local.exists() {
        fs::copy(&cached, &local)?;
        println!("Downloaded {}", basename);
    }

    process::run(
        &mut process::command(
            "git",
            [OsStr::new("apply"), local.as_os_str()],
            &ctx.project_dir(&location),
        ),
        "Patch failed to apply. See output above for details.",
    )
    .await?;

    println!(
        "Successfully patched {} with {}",
        issue.project.machine_name, basename
    );
    Ok(())
}

/// Find a contributed project locally, installing its dev release if it is missing.
async fn locate_or_install(
    ctx: &Context,
    issue: &Issue,
    project: &Project,
) -> Result<ProjectLocation> {
    let name = &issue.project.machine_name;
    if let Some(location) = ctx.locate_project(project, name)? {
        return Ok(location);
    }

    let constraint = dev_constraint(&issue.version)
        .ok_or_else(|| IssueError::InstallFailed(name.clone()))?;
    println!("Installing the development release of {}", project.title);
    info!(project = %name, constraint = %constraint, "installing with composer");

    let installed = process::status(&mut process::command(
        "composer",
        ["require".to_string(), format!("drupal/{}:{}", name, constraint)],
        ctx.root(),
    ))
    .await?
    .success();

    match ctx.locate_project(project, name)? {
        Some(location) if installed => Ok(location),
        _ => Err(IssueError::InstallFailed(name.clone())),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::{checkout, context, install_stubs, mock_issue, write_file};
    use httpmock::MockServer;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const README_PATCH: &str = "diff --git a/README.txt b/README.txt
--- a/README.txt
+++ b/README.txt
@@ -1 +1 @@
-old
+new
";

    fn contrib_issue() -> Issue {
        serde_json::from_value(serde_json::json!({
            "nid": "3000",
            "field_issue_version": "8.x-1.x-dev",
            "field_project": {"uri": "http://127.0.0.1:9/node/token", "machine_name": "token"}
        }))
        .unwrap()
    }

    fn token_project() -> Project {
        Project {
            project_type: "project_module".to_string(),
            title: "Token".to_string(),
        }
    }

    fn offline_context(root: &Path) -> Context {
        context(root, &root.join(".cache"), "http://127.0.0.1:9", "")
    }

    #[test]
    fn test_dev_constraint() {
        assert_eq!(dev_constraint("8.x-1.x-dev"), Some("1.x-dev".to_string()));
        assert_eq!(dev_constraint("8.x-2.0-beta1"), Some("2.x-dev".to_string()));
        assert_eq!(dev_constraint("8.x-3.12"), Some("3.x-dev".to_string()));
        assert_eq!(dev_constraint("8.x"), None);
    }

    #[test]
    fn test_patch_basename() {
        assert_eq!(
            patch_basename("https://www.drupal.org/files/issues/2018-01-01/token-fix-2924818-3.patch"),
            "token-fix-2924818-3.patch"
        );
        assert_eq!(patch_basename("plain.patch"), "plain.patch");
    }

    #[tokio::test]
    async fn test_patch_applies_under_relative_root() {
        let server = MockServer::start_async().await;
        mock_issue(
            &server,
            "3000",
            "drupal",
            "8.6.x-dev",
            &["10"],
            &[("fix.patch", README_PATCH, "10")],
        );

        let temp_dir = TempDir::new_in(".").unwrap();
        let root = PathBuf::from(temp_dir.path().file_name().unwrap());
        checkout(&root, &[("README.txt", "old\n")]);

        let mut ctx = context(&root, &root.join("cache"), &server.url(""), "");
        run(&mut ctx, Some("3000".to_string())).await.unwrap();

        assert_eq!(fs::read_to_string(root.join("README.txt")).unwrap(), "new\n");
        assert!(root.join("fix.patch").is_file());
    }

    #[tokio::test]
    async fn test_installed_project_skips_composer() {
        install_stubs();
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "modules/contrib/token/token.info.yml", "name: Token\ntype: module\n");

        let ctx = offline_context(root);
        let location = locate_or_install(&ctx, &contrib_issue(), &token_project())
            .await
            .unwrap();

        assert_eq!(location.path, PathBuf::from("modules/contrib/token"));
        assert!(!root.join("composer.log").exists());
    }

    #[tokio::test]
    async fn test_missing_project_is_installed_then_located() {
        install_stubs();
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write_file(root, "install-to", "modules/contrib/token");

        let ctx = offline_context(root);
        let location = locate_or_install(&ctx, &contrib_issue(), &token_project())
            .await
            .unwrap();

        assert_eq!(location.name, "token");
        assert_eq!(location.path, PathBuf::from("modules/contrib/token"));
        let log = fs::read_to_string(root.join("composer.log")).unwrap();
        assert_eq!(log.trim(), "require drupal/token:1.x-dev");
    }

    #[tokio::test]
    async fn test_install_without_result_fails() {
        install_stubs();
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let ctx = offline_context(root);
        let err = locate_or_install(&ctx, &contrib_issue(), &token_project())
            .await
            .unwrap_err();

        assert!(matches!(err, IssueError::InstallFailed(name) if name == "token"));
        assert!(root.join("composer.log").is_file());
    }
}
