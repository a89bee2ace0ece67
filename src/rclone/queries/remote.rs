use log::debug;

use crate::core::context::AppContext;
use crate::utils::process::{Invocation, run_checked};
use crate::utils::types::errors::Result;

/// Configured remote names, in `rclone listremotes` order.
pub async fn list_remotes(ctx: &AppContext) -> Result<Vec<String>> {
    let output = run_checked(
        ctx.runner(),
        Invocation::new(&ctx.tools.rclone).arg("listremotes"),
    )
    .await?;

    let remotes = parse_listremotes(&output.stdout);
    debug!("Found {} remote(s)", remotes.len());
    Ok(remotes)
}

fn parse_listremotes(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(|line| line.trim())
        .map(|line| line.strip_suffix(':').unwrap_or(line))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn remote_exists(ctx: &AppContext, name: &str) -> Result<bool> {
    Ok(list_remotes(ctx).await?.iter().any(|r| r == name))
}
