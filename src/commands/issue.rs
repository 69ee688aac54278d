// The `issue` command.
// Prints an issue's metadata and the patches attached to it.

use crate::error::Result;

use super::Context;

pub async fn run(ctx: &mut Context, issue_number: Option<String>) -> Result<()> {
    let issue = ctx.resolve_issue(issue_number).await?;
    let patches = ctx.client.get_patches(&issue).await?;

    println!("#{} {}", issue.nid, issue.title);
    println!("  Project:  {}", issue.project.machine_name);
    println!("  Version:  {}", issue.version);
    println!("  Status:   {}", issue.status_label());
    if let Some(changed) = issue.changed_at() {
        println!("  Updated:  {}", changed.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Comments: {}", issue.comments.len());

    if patches.is_empty() {
        println!("  No patches");
        return Ok(());
    }

    println!("  Patches:");
    for patch in &patches {
        let comment = patch
            .cid
            .as_deref()
            .and_then(|cid| issue.comment_number(cid))
            .map(|number| format!(" (#{})", number))
            .unwrap_or_default();
        println!("    {}{}", patch.name, comment);
    }

    Ok(())
}
