use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};

use super::automount::{disable_automount, is_automount_enabled};
use super::mount::{is_remote_mounted, unmount_remote};
use crate::core::context::AppContext;
use crate::rclone::config_file::{config_sections, rename_remote_in_config};
use crate::rclone::providers::{Provider, redact_parameters, validate_remote_name};
use crate::utils::process::{Invocation, run_checked};
use crate::utils::types::errors::{CloudMountError, Result};

/// `rclone config create <name> <type>`; browser providers finish their
/// OAuth flow inside rclone.
pub async fn create_remote(ctx: &AppContext, name: &str, provider_type: &str) -> Result<()> {
    create_remote_with_options(ctx, name, provider_type, &BTreeMap::new()).await
}

/// `rclone config create <name> <type> key=value...`
pub async fn create_remote_with_options(
    ctx: &AppContext,
    name: &str,
    provider_type: &str,
    params: &BTreeMap<String, String>,
) -> Result<()> {
    validate_remote_name(name)?;
    if provider_type.trim().is_empty() {
        return Err(CloudMountError::InvalidInput(
            "provider type cannot be empty".into(),
        ));
    }

    info!(
        "➕ Creating remote {name} ({provider_type}) with {}",
        redact_parameters(params)
    );

    let invocation = Invocation::new(&ctx.tools.rclone)
        .args(["config", "create", name, provider_type])
        .args(params.iter().map(|(k, v)| format!("{k}={v}")));
    run_checked(ctx.runner(), invocation).await?;

    info!("✅ Remote {name} created");
    Ok(())
}

/// Validate the provider form and create the remote. Nothing runs when a
/// required field is missing.
pub async fn create_from_form(
    ctx: &AppContext,
    name: &str,
    provider: Provider,
    fields: &HashMap<String, String>,
) -> Result<()> {
    validate_remote_name(name)?;
    let params = provider.build_parameters(fields)?;
    create_remote_with_options(ctx, name, provider.rclone_type(), &params).await
}

fn configured_sections(ctx: &AppContext) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(&ctx.paths.rclone_config_file)?;
    Ok(config_sections(&content))
}

/// Rename a remote everywhere CloudMount knows about it.
///
/// Automount is switched off and the remote unmounted first; an unmount
/// failure stops the rename before the config is touched. The mount
/// directory rename is best effort. Settings and cached quota follow only
/// once the config edit succeeded. Earlier steps are not rolled back.
pub async fn rename_remote(ctx: &AppContext, old: &str, new: &str) -> Result<()> {
    validate_remote_name(new)?;
    if old == new {
        return Ok(());
    }

    let sections = configured_sections(ctx)?;
    if !sections.iter().any(|s| s == old) {
        return Err(CloudMountError::InvalidInput(format!(
            "remote '{old}' is not configured"
        )));
    }
    if sections.iter().any(|s| s == new) {
        return Err(CloudMountError::InvalidInput(format!(
            "a remote named '{new}' already exists"
        )));
    }

    info!("✏️ Renaming remote {old} to {new}");

    if is_automount_enabled(ctx, old).await {
        disable_automount(ctx, old).await?;
    }
    if is_remote_mounted(ctx, old) {
        unmount_remote(ctx, old).await?;
    }

    rename_remote_in_config(&ctx.paths.rclone_config_file, old, new)?;

    let old_dir = ctx.paths.mount_path(old);
    if old_dir.exists() {
        let new_dir = ctx.paths.mount_path(new);
        if let Err(e) = std::fs::rename(&old_dir, &new_dir) {
            warn!(
                "⚠️ Could not rename {} to {}: {e}",
                old_dir.display(),
                new_dir.display()
            );
        }
    }

    ctx.settings.rename(old, new)?;
    ctx.quotas.rename(old, new).await;

    info!("✅ Remote {old} is now {new}");
    Ok(())
}

/// Delete a remote. Only the `rclone config delete` step can fail the
/// operation; the rest is cleanup that logs and carries on.
pub async fn delete_remote(ctx: &AppContext, name: &str) -> Result<()> {
    info!("🗑️ Deleting remote {name}");

    if is_automount_enabled(ctx, name).await {
        if let Err(e) = disable_automount(ctx, name).await {
            warn!("⚠️ Could not disable automount for {name}: {e}");
        }
    }
    if is_remote_mounted(ctx, name) {
        if let Err(e) = unmount_remote(ctx, name).await {
            warn!("⚠️ Could not unmount {name}: {e}");
        }
    }

    run_checked(
        ctx.runner(),
        Invocation::new(&ctx.tools.rclone).args(["config", "delete", name]),
    )
    .await?;

    let dir = ctx.paths.mount_path(name);
    if dir.exists() {
        match std::fs::remove_dir(&dir) {
            Ok(()) => debug!("Removed {}", dir.display()),
            Err(e) => warn!("⚠️ Could not remove {}: {e}", dir.display()),
        }
    }

    ctx.settings.remove(name)?;
    ctx.quotas.remove(name).await;

    info!("✅ Remote {name} deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::testing::TestContext;
    use crate::utils::process::CommandOutput;
    use crate::utils::types::quota::Quota;
    use crate::utils::types::settings::RemoteOptions;

    const CONF: &str = "[gdrive]\ntype = drive\n\n[box]\ntype = box\n";

    fn with_config(t: &TestContext) {
        std::fs::create_dir_all(&t.ctx.paths.rclone_config_dir).unwrap();
        std::fs::write(&t.ctx.paths.rclone_config_file, CONF).unwrap();
    }

    fn automount_off(t: &TestContext) {
        t.runner
            .on("systemctl --user is-enabled", CommandOutput::failed("disabled"));
    }

    fn read_only() -> RemoteOptions {
        RemoteOptions {
            read_only: true,
            ..RemoteOptions::default()
        }
    }

    #[tokio::test]
    async fn test_create_oauth_remote() {
        let t = TestContext::new();
        create_remote(&t.ctx, "gdrive", "drive").await.unwrap();
        assert_eq!(
            t.runner.calls(),
            vec!["/usr/bin/rclone config create gdrive drive"]
        );
    }

    #[tokio::test]
    async fn test_create_with_options_appends_pairs() {
        let t = TestContext::new();
        let mut params = BTreeMap::new();
        params.insert("url".to_string(), "https://dav.example.com".to_string());
        params.insert("vendor".to_string(), "other".to_string());

        create_remote_with_options(&t.ctx, "dav", "webdav", &params)
            .await
            .unwrap();
        assert_eq!(
            t.runner.calls(),
            vec!["/usr/bin/rclone config create dav webdav url=https://dav.example.com vendor=other"]
        );
    }

    #[tokio::test]
    async fn test_form_validation_runs_nothing() {
        let t = TestContext::new();
        let err = create_from_form(&t.ctx, "mega", Provider::Mega, &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CloudMountError::InvalidInput(_)));

        let err = create_from_form(&t.ctx, "bad name", Provider::Drive, &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CloudMountError::InvalidInput(_)));
        assert!(t.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_failure_surfaces_output() {
        let t = TestContext::new();
        t.runner.on(
            "/usr/bin/rclone config create",
            CommandOutput::failed("Failed to create remote: unknown backend"),
        );
        let err = create_remote(&t.ctx, "x", "nope").await.unwrap_err();
        assert!(err.to_string().contains("unknown backend"));
    }

    #[tokio::test]
    async fn test_rename_moves_everything() {
        let t = TestContext::new();
        with_config(&t);
        automount_off(&t);
        t.ctx.settings.set("gdrive", read_only()).unwrap();
        t.ctx.quotas.insert("gdrive", Some(Quota::default())).await;
        std::fs::create_dir_all(t.ctx.paths.mount_path("gdrive")).unwrap();

        rename_remote(&t.ctx, "gdrive", "work").await.unwrap();

        let conf = std::fs::read_to_string(&t.ctx.paths.rclone_config_file).unwrap();
        assert_eq!(config_sections(&conf), vec!["work", "box"]);
        assert!(t.ctx.paths.mount_path("work").is_dir());
        assert!(!t.ctx.paths.mount_path("gdrive").exists());
        assert!(t.ctx.settings.get("work").read_only);
        assert!(!t.ctx.settings.get("gdrive").read_only);
        assert_eq!(t.ctx.quotas.get("work").await, Some(Some(Quota::default())));
        assert_eq!(t.ctx.quotas.get("gdrive").await, None);
    }

    #[tokio::test]
    async fn test_rename_unmounts_and_disables_first() {
        let t = TestContext::new();
        with_config(&t);
        t.runner.once(
            "systemctl --user is-enabled rclone-gdrive.service",
            CommandOutput::ok("enabled"),
        );
        automount_off(&t);
        t.mark_mounted("gdrive");

        rename_remote(&t.ctx, "gdrive", "work").await.unwrap();

        let calls = t.runner.calls();
        let disable = calls
            .iter()
            .position(|c| c == "systemctl --user disable rclone-gdrive.service")
            .unwrap();
        let unmount = calls
            .iter()
            .position(|c| c.starts_with("/usr/bin/fusermount -u "))
            .unwrap();
        assert!(disable < unmount);
    }

    #[tokio::test]
    async fn test_rename_rejects_existing_name() {
        let t = TestContext::new();
        with_config(&t);
        let err = rename_remote(&t.ctx, "gdrive", "box").await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        let err = rename_remote(&t.ctx, "gdrive", "my box").await.unwrap_err();
        assert!(matches!(err, CloudMountError::InvalidInput(_)));
        // Nothing was stopped or unmounted
        assert!(t.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rename_aborts_when_unmount_fails() {
        let t = TestContext::new();
        with_config(&t);
        automount_off(&t);
        t.mark_mounted("gdrive");
        t.runner
            .on("/usr/bin/fusermount", CommandOutput::failed("Device or resource busy"));

        assert!(rename_remote(&t.ctx, "gdrive", "work").await.is_err());
        let conf = std::fs::read_to_string(&t.ctx.paths.rclone_config_file).unwrap();
        assert_eq!(conf, CONF);
    }

    #[tokio::test]
    async fn test_delete_cleans_up() {
        let t = TestContext::new();
        automount_off(&t);
        t.ctx.settings.set("box", read_only()).unwrap();
        t.ctx.quotas.insert("box", None).await;
        std::fs::create_dir_all(t.ctx.paths.mount_path("box")).unwrap();

        delete_remote(&t.ctx, "box").await.unwrap();

        assert!(t.runner.called_with_prefix("/usr/bin/rclone config delete box"));
        assert!(!t.ctx.paths.mount_path("box").exists());
        assert!(t.ctx.settings.snapshot().remotes.get("box").is_none());
        assert!(t.ctx.quotas.get("box").await.is_none());
    }

    #[tokio::test]
    async fn test_delete_keeps_going_past_unmount_failure() {
        let t = TestContext::new();
        automount_off(&t);
        t.mark_mounted("box");
        t.runner.on("/usr/bin/fusermount", CommandOutput::failed("busy"));

        delete_remote(&t.ctx, "box").await.unwrap();
        assert!(t.runner.called_with_prefix("/usr/bin/rclone config delete box"));
    }

    #[tokio::test]
    async fn test_delete_surfaces_config_failure() {
        let t = TestContext::new();
        automount_off(&t);
        t.ctx.settings.set("box", read_only()).unwrap();
        t.runner.on(
            "/usr/bin/rclone config delete",
            CommandOutput::failed("Couldn't find remote"),
        );

        assert!(delete_remote(&t.ctx, "box").await.is_err());
        // Settings survive a failed delete
        assert!(t.ctx.settings.get("box").read_only);
    }
}
