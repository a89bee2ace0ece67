use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use super::automount::{is_automount_enabled, unit_name};
use crate::core::context::AppContext;
use crate::rclone::flags::manual_mount_args;
use crate::rclone::mount_table::is_mounted;
use crate::utils::process::{Invocation, run_checked, run_status, spawn};
use crate::utils::types::errors::Result;

pub fn is_remote_mounted(ctx: &AppContext, remote: &str) -> bool {
    is_mounted(&ctx.paths.mount_table, &ctx.paths.mount_path(remote))
}

/// Mount `remote` under the mount root and return the mount point.
///
/// Already mounted: nothing is invoked. Automount enabled: the unit is
/// started. Otherwise `rclone mount --daemon` runs with the stored options.
pub async fn mount_remote(ctx: &AppContext, remote: &str) -> Result<PathBuf> {
    let mount_point = ctx.paths.mount_path(remote);
    std::fs::create_dir_all(&mount_point)?;

    if is_mounted(&ctx.paths.mount_table, &mount_point) {
        debug!("{remote} already mounted at {}", mount_point.display());
        return Ok(mount_point);
    }

    if is_automount_enabled(ctx, remote).await {
        info!("▶️ Starting automount unit for {remote}");
        run_checked(
            ctx.runner(),
            Invocation::new(&ctx.tools.systemctl)
                .args(["--user", "start"])
                .arg(unit_name(remote)),
        )
        .await?;
        return Ok(mount_point);
    }

    let options = ctx.settings.get(remote);
    let args = manual_mount_args(remote, &mount_point, &ctx.paths.rclone_log_file, &options);
    run_checked(ctx.runner(), Invocation::new(&ctx.tools.rclone).args(args)).await?;

    info!("✅ Mounted {remote} at {}", mount_point.display());
    Ok(mount_point)
}

/// Unmount `remote`: stop its unit when automounted, otherwise
/// `fusermount -u`, falling back once to a lazy unmount.
pub async fn unmount_remote(ctx: &AppContext, remote: &str) -> Result<()> {
    if is_automount_enabled(ctx, remote).await {
        info!("⏹️ Stopping automount unit for {remote}");
        run_checked(
            ctx.runner(),
            Invocation::new(&ctx.tools.systemctl)
                .args(["--user", "stop"])
                .arg(unit_name(remote)),
        )
        .await?;
        return Ok(());
    }

    let mount_point = ctx.paths.mount_path(remote);
    if !is_mounted(&ctx.paths.mount_table, &mount_point) {
        debug!("{remote} is not mounted");
        return Ok(());
    }
    let target = mount_point.display().to_string();

    let unmounted = run_status(
        ctx.runner(),
        Invocation::new(&ctx.tools.fusermount).arg("-u").arg(&target),
    )
    .await;
    if !unmounted {
        warn!("⚠️ Unmount of {target} failed, retrying lazily");
        run_checked(
            ctx.runner(),
            Invocation::new(&ctx.tools.fusermount)
                .args(["-u", "-z"])
                .arg(&target),
        )
        .await?;
    }

    info!("⏏️ Unmounted {remote}");
    Ok(())
}

/// Show `path` in the desktop's file manager.
pub fn open_in_file_manager(ctx: &AppContext, path: &Path) -> Result<()> {
    spawn(
        ctx.runner(),
        Invocation::new(&ctx.tools.opener).arg(path.display().to_string()),
    )
}
