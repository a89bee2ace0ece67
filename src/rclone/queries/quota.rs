use log::{debug, warn};

use crate::core::context::AppContext;
use crate::rclone::flags::remote_fs;
use crate::utils::process::{Invocation, run_checked};
use crate::utils::types::errors::Result;
use crate::utils::types::quota::Quota;

/// `rclone about <remote>: --json`
pub async fn get_quota(ctx: &AppContext, remote: &str) -> Result<Quota> {
    let invocation = Invocation::new(&ctx.tools.rclone)
        .arg("about")
        .arg(remote_fs(remote))
        .arg("--json");
    let output = run_checked(ctx.runner(), invocation).await?;
    Ok(serde_json::from_str(&output.stdout)?)
}

/// Query the remote's quota and store the result in the cache. Failures
/// are cached as "unknown" rather than reported.
pub async fn refresh_quota(ctx: &AppContext, remote: &str) -> Option<Quota> {
    let quota = match get_quota(ctx, remote).await {
        Ok(q) => Some(q),
        Err(e) => {
            warn!("⚠️ Quota unavailable for {remote}: {e}");
            None
        }
    };
    ctx.quotas.insert(remote, quota).await;
    quota
}

/// Cached quota, querying only on a cache miss.
pub async fn cached_quota(ctx: &AppContext, remote: &str) -> Option<Quota> {
    if let Some(entry) = ctx.quotas.get(remote).await {
        debug!("Quota cache hit for {remote}");
        return entry;
    }
    refresh_quota(ctx, remote).await
}
