// The `create-patch` command.
// Writes the local changes as the next patch on an issue, with an optional interdiff.

use std::ffi::OsStr;

use crate::error::{IssueError, Result};
use crate::process;

use super::{Context, ProjectLocation, stage};

const SKIP_INTERDIFF: &str = "Do not create interdiff";

/// Name of the patch posted with comment `comment` on issue `nid`.
pub fn patch_file_name(nid: &str, comment: usize) -> String {
    format!("{}-{}.patch", nid, comment)
}

/// Name of the interdiff between the patches of two comments.
pub fn interdiff_file_name(nid: &str, from: Option<usize>, to: usize) -> String {
    let from = from.map(|n| n.to_string()).unwrap_or_default();
    format!("interdiff-{}-{}-{}.txt", nid, from, to)
}

pub async fn run(ctx: &mut Context, issue_number: Option<String>) -> Result<()> {
    let issue = ctx.resolve_issue(issue_number).await?;

    let location = match ctx.issue_project(&issue).await? {
        None => ProjectLocation::core(),
        Some(project) => ctx
            .locate_project(&project, &issue.project.machine_name)?
            .ok_or_else(|| {
                IssueError::ProjectNotInstalled(issue.project.machine_name.clone())
            })?,
    };

    let next_comment = issue.next_comment_number();
    let patch_name = patch_file_name(&issue.nid, next_comment);
    let patch_path = ctx.root().join(&patch_name);
    let dir = ctx.project_dir(&location);

    stage(&dir, &location).await?;
    process::output_to_file(
        &mut process::command("git", ["diff", "HEAD", "--binary", "."], &dir),
        &patch_path,
        "Failed to create patch. See output above for details.",
    )
    .await?;
    println!("Created {}", patch_name);

    let Some(previous) = ctx
        .choose_patch(
            &issue,
            "What patch do you want to create an interdiff from?",
            Some(SKIP_INTERDIFF),
        )
        .await?
    else {
        return Ok(());
    };

    let previous_file = ctx.client.fetch_to_cache_file(&previous.url).await?;
    let previous_comment = previous
        .cid
        .as_deref()
        .and_then(|cid| issue.comment_number(cid));
    let interdiff_name = interdiff_file_name(&issue.nid, previous_comment, next_comment);

    process::output_to_file(
        &mut process::command(
            "interdiff",
            [previous_file.as_os_str(), OsStr::new(&patch_name)],
            ctx.root(),
        ),
        &ctx.root().join(&interdiff_name),
        "Failed to create interdiff. See output above for details.",
    )
    .await?;
    println!("Created {}", interdiff_name);

    Ok(())
}
