//! Per-remote state shown on the main screen.

use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::core::context::AppContext;
use crate::rclone::commands::{enable_automount, is_automount_enabled, is_remote_mounted};
use crate::rclone::queries::{cached_quota, list_remotes};
use crate::utils::types::errors::Result;
use crate::utils::types::quota::QuotaSummary;
use crate::utils::types::settings::RemoteOptions;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCard {
    pub name: String,
    pub mount_path: PathBuf,
    pub mounted: bool,
    pub automount: bool,
    pub options: RemoteOptions,
    pub quota: QuotaSummary,
}

impl RemoteCard {
    /// Card with whatever quota the cache holds, never querying.
    pub async fn cached(ctx: &AppContext, name: &str) -> Self {
        let quota = QuotaSummary::from_cached(ctx.quotas.get(name).await);
        Self::build(ctx, name, quota).await
    }

    /// Card with the quota fetched (and cached) on a cache miss.
    pub async fn load(ctx: &AppContext, name: &str) -> Self {
        let quota = QuotaSummary::from_cached(Some(cached_quota(ctx, name).await));
        Self::build(ctx, name, quota).await
    }

    async fn build(ctx: &AppContext, name: &str, quota: QuotaSummary) -> Self {
        Self {
            name: name.to_string(),
            mount_path: ctx.paths.mount_path(name),
            mounted: is_remote_mounted(ctx, name),
            automount: is_automount_enabled(ctx, name).await,
            options: ctx.settings.get(name),
            quota,
        }
    }
}

/// One fully loaded card per configured remote.
pub async fn dashboard(ctx: &AppContext) -> Result<Vec<RemoteCard>> {
    let mut cards = Vec::new();
    for name in list_remotes(ctx).await? {
        cards.push(RemoteCard::load(ctx, &name).await);
    }
    Ok(cards)
}

/// Cards from cached quota only; pending quotas are filled in later.
pub async fn dashboard_cached(ctx: &AppContext) -> Result<Vec<RemoteCard>> {
    let mut cards = Vec::new();
    for name in list_remotes(ctx).await? {
        cards.push(RemoteCard::cached(ctx, &name).await);
    }
    Ok(cards)
}

/// Store new mount options for `name`. An enabled automount unit is
/// regenerated so the options take effect.
pub async fn apply_options(ctx: &AppContext, name: &str, options: RemoteOptions) -> Result<()> {
    ctx.settings.set(name, options)?;

    if is_automount_enabled(ctx, name).await {
        info!("🔄 Regenerating automount unit for {name}");
        enable_automount(ctx, name).await?;
    }
    Ok(())
}
