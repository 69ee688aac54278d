// The `review` command.
// Lints staged changes against Drupal coding standards and checks for test coverage.

use crate::error::{IssueError, Result};
use crate::process;
use crate::testing::ChangeSummary;

use super::{Context, staged_paths};

/// `git diff` option leaving out deleted files, which phpcs cannot open.
const EXISTING_FILES: &str = "--diff-filter=d";

/// Arguments for phpcs before the list of files.
fn phpcs_args(root: &std::path::Path) -> Vec<String> {
    vec![
        "--standard=Drupal".to_string(),
        "--runtime-set".to_string(),
        "installed_paths".to_string(),
        root.join("vendor/drupal/coder/coder_sniffer")
            .to_string_lossy()
            .into_owned(),
    ]
}

pub async fn run(ctx: &mut Context, project: Option<String>) -> Result<()> {
    let name = match project {
        Some(name) => name,
        None => ctx.prompt.ask("What project are you working on?", None)?,
    };
    let location = ctx.locate_by_name(&name)?;

    println!("Starting auto review for {}", name);
    let files = ctx.staged_files(&location).await?;

    println!("Running PHP Code Sniffer");
    let dir = ctx.project_dir(&location);
    let targets = staged_paths(&dir, &[EXISTING_FILES]).await?;
    if targets.is_empty() {
        println!("No staged changes to check.");
    } else {
        let phpcs = ctx.root().join("vendor/bin/phpcs");
        let mut args = phpcs_args(ctx.root());
        args.extend(targets);

        process::run(
            &mut process::command(&phpcs.to_string_lossy(), args, &dir),
            "Please address code standard violations above.",
        )
        .await?;
        println!("[OK] No code standard violations found.");
    }

    let summary = ChangeSummary::from_files(&files);
    if summary.is_untested() {
        return Err(IssueError::UntestedChanges);
    }
    if summary.has_test_changes() {
        println!("[OK] Test coverage was changed or added for this issue.");
    }

    Ok(())
}
