use crate::cli::BranchAction;
use crate::context::CliContext;
use crate::output;
use serde_json::json;

pub async fn handle(ctx: &CliContext, action: BranchAction) -> anyhow::Result<()> {
    let project = &ctx.project;
    match action {
        BranchAction::List => {
            let branches = match project.refresh().await? {
                Some(branches) => branches,
                None => project.branches(),
            };
            output::output_list(branches);
        }
        BranchAction::Create { name, base } => {
            queued(project.create_branch(&name, base.as_deref()).await?, &name)?;
            let branch = project.find_branch(&name);
            output::output_success(json!({ "created": name, "branch": branch }));
        }
        BranchAction::Delete { name, force } => {
            queued(project.delete_branch(&name, force).await?, &name)?;
            output::output_success(json!({ "deleted": name, "force": force }));
        }
        BranchAction::Rename { from, to } => {
            queued(project.rename_branch(&from, &to).await?, &from)?;
            let branch = project.find_branch(&to);
            output::output_success(json!({
                "renamed": { "from": from, "to": to },
                "branch": branch,
            }));
        }
        BranchAction::Checkout { name } => {
            queued(project.checkout_branch(&name).await?, &name)?;
            output::output_success(json!({ "checked_out": name }));
        }
    }
    Ok(())
}

fn queued(result: Option<()>, branch: &str) -> anyhow::Result<()> {
    result.ok_or_else(|| anyhow::anyhow!("An operation on '{}' is already queued", branch))
}
