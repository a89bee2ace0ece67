//! systemd automount units
//!
//! Each automounted remote gets `rclone-<name>.service` in the user unit
//! directory. Whether automount is on is always asked of systemd; the app
//! keeps no flag of its own.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::core::context::AppContext;
use crate::rclone::flags::{remote_fs, service_mount_flags};
use crate::rclone::mount_table::is_mounted;
use crate::rclone::providers::validate_remote_name;
use crate::utils::process::{Invocation, run_checked, run_status};
use crate::utils::types::errors::{CloudMountError, Result};

const FUSERMOUNT_FALLBACK: &str = "/bin/fusermount";
const RESTART_SEC: u32 = 10;

/// `rclone-<name>.service`, with bytes systemd does not accept in unit
/// names written as `\xNN` the way `systemd-escape` does. `@` is escaped
/// too so the unit is never read as a template instance.
pub fn unit_name(remote: &str) -> String {
    let mut escaped = String::with_capacity(remote.len());
    for byte in remote.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b':' | b'_' | b'.' | b'-') {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("\\x{byte:02x}"));
        }
    }
    format!("rclone-{escaped}.service")
}

/// Double `%` and `$` so systemd does not expand them as specifiers or
/// environment variables.
fn escape_specifiers(value: &str) -> String {
    value.replace('%', "%%").replace('$', "$$")
}

/// Everything that goes into a rendered unit.
#[derive(Debug, Clone)]
pub struct ServiceUnit {
    pub remote: String,
    pub mount_point: PathBuf,
    pub rclone_bin: PathBuf,
    pub fusermount_bin: PathBuf,
    pub mkdir_bin: PathBuf,
    pub flags: Vec<String>,
}

/// Quote a word for an `Exec*=` line when systemd would otherwise split it.
fn exec_word(word: &str) -> String {
    let word = escape_specifiers(word);
    if !word.is_empty() && !word.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        return word;
    }
    let escaped = word.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn exec_line<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| exec_word(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_unit(service: &ServiceUnit) -> String {
    let mount_point = service.mount_point.display().to_string();

    let start_pre = exec_line([
        service.mkdir_bin.display().to_string(),
        "-p".into(),
        mount_point.clone(),
    ]);
    let mut start = vec![
        service.rclone_bin.display().to_string(),
        "mount".to_string(),
        remote_fs(&service.remote),
        mount_point.clone(),
    ];
    start.extend(service.flags.iter().cloned());
    let start = exec_line(start);
    let stop = exec_line([
        service.fusermount_bin.display().to_string(),
        "-u".into(),
        mount_point,
    ]);

    format!(
        "[Unit]
Description=Automount Rclone {remote}
After=network-online.target
Wants=network-online.target

[Service]
Type=notify
ExecStartPre={start_pre}
ExecStart={start}
ExecStop={stop}
Restart=on-failure
RestartSec={RESTART_SEC}

[Install]
WantedBy=default.target
",
        remote = escape_specifiers(&service.remote),
    )
}

fn resolve_binary(name: &str) -> Option<PathBuf> {
    if Path::new(name).is_absolute() {
        return Some(PathBuf::from(name));
    }
    which::which(name).ok()
}

fn systemctl_user<I, S>(ctx: &AppContext, args: I) -> Invocation
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Invocation::new(&ctx.tools.systemctl).arg("--user").args(args)
}

/// Live `systemctl --user is-enabled` check.
pub async fn is_automount_enabled(ctx: &AppContext, remote: &str) -> bool {
    run_status(
        ctx.runner(),
        systemctl_user(ctx, ["is-enabled".to_string(), unit_name(remote)]),
    )
    .await
}

/// Write (or rewrite) the unit for `remote`, then enable and start it.
/// Returns the unit file path.
pub async fn enable_automount(ctx: &AppContext, remote: &str) -> Result<PathBuf> {
    validate_remote_name(remote)?;
    let mount_point = ctx.paths.mount_path(remote);
    std::fs::create_dir_all(&mount_point)?;

    // A manual mount would block the unit from mounting the same path
    if is_mounted(&ctx.paths.mount_table, &mount_point) {
        info!("🔌 Releasing manual mount of {remote} before enabling automount");
        let released = run_status(
            ctx.runner(),
            Invocation::new(&ctx.tools.fusermount)
                .args(["-u", "-z"])
                .arg(mount_point.display().to_string()),
        )
        .await;
        if !released {
            warn!("⚠️ Lazy unmount of {} failed", mount_point.display());
        }
        tokio::time::sleep(ctx.timings.automount_settle).await;
    }

    let rclone_bin = resolve_binary(&ctx.tools.rclone)
        .ok_or_else(|| CloudMountError::BinaryNotFound(ctx.tools.rclone.clone()))?;
    let fusermount_bin = resolve_binary(&ctx.tools.fusermount)
        .unwrap_or_else(|| PathBuf::from(FUSERMOUNT_FALLBACK));

    let options = ctx.settings.get(remote);
    let service = ServiceUnit {
        remote: remote.to_string(),
        mount_point,
        rclone_bin,
        fusermount_bin,
        mkdir_bin: PathBuf::from(&ctx.tools.mkdir),
        flags: service_mount_flags(remote, &options),
    };

    let unit = unit_name(remote);
    let unit_path = ctx.paths.unit_path(&unit);
    std::fs::create_dir_all(&ctx.paths.systemd_user_dir)?;
    std::fs::write(&unit_path, render_unit(&service))?;
    debug!("Wrote {}", unit_path.display());

    if !run_status(ctx.runner(), systemctl_user(ctx, ["daemon-reload"])).await {
        warn!("⚠️ systemctl daemon-reload failed");
    }
    run_checked(
        ctx.runner(),
        systemctl_user(ctx, ["enable".to_string(), "--now".to_string(), unit]),
    )
    .await?;

    info!("✅ Automount enabled for {remote}");
    Ok(unit_path)
}

/// Stop, disable and remove the unit for `remote`.
pub async fn disable_automount(ctx: &AppContext, remote: &str) -> Result<()> {
    let unit = unit_name(remote);

    let stop = systemctl_user(ctx, ["stop".to_string(), unit.clone()]);
    if !run_status(ctx.runner(), stop).await {
        debug!("{unit} was not running");
    }
    let disable = systemctl_user(ctx, ["disable".to_string(), unit.clone()]);
    if !run_status(ctx.runner(), disable).await {
        debug!("{unit} was not enabled");
    }

    match std::fs::remove_file(ctx.paths.unit_path(&unit)) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    if !run_status(ctx.runner(), systemctl_user(ctx, ["daemon-reload"])).await {
        warn!("⚠️ systemctl daemon-reload failed");
    }

    info!("🛑 Automount disabled for {remote}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::testing::TestContext;
    use crate::utils::process::CommandOutput;
    use crate::utils::types::settings::RemoteOptions;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn sample_unit() -> ServiceUnit {
        ServiceUnit {
            remote: "gdrive".to_string(),
            mount_point: PathBuf::from("/home/ana/Clouds/gdrive"),
            rclone_bin: PathBuf::from("/usr/bin/rclone"),
            fusermount_bin: PathBuf::from("/usr/bin/fusermount"),
            mkdir_bin: PathBuf::from("/usr/bin/mkdir"),
            flags: service_mount_flags("gdrive", &RemoteOptions::default()),
        }
    }

    #[test]
    fn test_render_unit() {
        let unit = render_unit(&sample_unit());
        assert!(unit.starts_with("[Unit]\nDescription=Automount Rclone gdrive\n"));
        assert!(unit.contains("Type=notify\n"));
        assert!(unit.contains("ExecStartPre=/usr/bin/mkdir -p /home/ana/Clouds/gdrive\n"));
        assert!(unit.contains(
            "ExecStart=/usr/bin/rclone mount gdrive: /home/ana/Clouds/gdrive \
             --vfs-cache-mode full --no-checksum --no-modtime --volname gdrive\n"
        ));
        assert!(unit.contains("ExecStop=/usr/bin/fusermount -u /home/ana/Clouds/gdrive\n"));
        assert!(unit.contains("Restart=on-failure\nRestartSec=10\n"));
        assert!(unit.ends_with("[Install]\nWantedBy=default.target\n"));
    }

    #[test]
    fn test_render_quotes_paths_with_spaces() {
        let mut s = sample_unit();
        s.mount_point = PathBuf::from("/home/ana mar/Clouds/gdrive");
        let unit = render_unit(&s);
        assert!(unit.contains("ExecStop=/usr/bin/fusermount -u \"/home/ana mar/Clouds/gdrive\"\n"));
    }

    #[test]
    fn test_unit_name_escapes_reserved_characters() {
        assert_eq!(unit_name("my-drive_2"), "rclone-my-drive_2.service");
        assert_eq!(unit_name("a+b"), "rclone-a\\x2bb.service");
        assert_eq!(unit_name("work@home"), "rclone-work\\x40home.service");
        assert_eq!(unit_name("caf\u{e9}"), "rclone-caf\\xc3\\xa9.service");
    }

    #[test]
    fn test_render_escapes_specifiers() {
        let mut s = sample_unit();
        s.remote = "50%off".to_string();
        s.mount_point = PathBuf::from("/home/ana/Clouds/50%off");
        s.flags = service_mount_flags("50%off", &RemoteOptions::default());
        let unit = render_unit(&s);
        assert!(unit.contains("Description=Automount Rclone 50%%off\n"));
        assert!(unit.contains("ExecStop=/usr/bin/fusermount -u /home/ana/Clouds/50%%off\n"));
        assert!(unit.contains("--volname 50%%off\n"));
        assert!(!unit.contains("50%off"));

        s.mount_point = PathBuf::from("/home/ana/$HOME");
        assert!(render_unit(&s).contains("-u /home/ana/$$HOME\n"));
    }

    #[tokio::test]
    async fn test_enable_uses_escaped_unit_name() {
        let t = TestContext::new();
        let path = enable_automount(&t.ctx, "a+b").await.unwrap();
        assert!(path.ends_with("rclone-a\\x2bb.service"));
        assert!(
            t.runner
                .called_with_prefix("systemctl --user enable --now rclone-a\\x2bb.service")
        );
    }

    #[tokio::test]
    async fn test_enable_writes_unit_and_enables() {
        let t = TestContext::new();
        t.ctx
            .settings
            .set(
                "gdrive",
                RemoteOptions {
                    read_only: true,
                    cache_size: "5G".to_string(),
                    bw_limit: String::new(),
                },
            )
            .unwrap();

        let path = enable_automount(&t.ctx, "gdrive").await.unwrap();
        let unit = std::fs::read_to_string(&path).unwrap();
        assert!(unit.contains("--read-only --vfs-cache-max-size 5G"));
        assert!(t.ctx.paths.mount_path("gdrive").is_dir());

        assert_eq!(
            t.runner.calls(),
            vec![
                "systemctl --user daemon-reload",
                "systemctl --user enable --now rclone-gdrive.service",
            ]
        );
    }

    #[tokio::test]
    async fn test_enable_releases_manual_mount_first() {
        let t = TestContext::new();
        t.mark_mounted("box");

        enable_automount(&t.ctx, "box").await.unwrap();
        let calls = t.runner.calls();
        assert!(calls[0].starts_with("/usr/bin/fusermount -u -z "));
    }

    #[tokio::test]
    async fn test_enable_failure_surfaces_output() {
        let t = TestContext::new();
        t.runner.on(
            "systemctl --user enable",
            CommandOutput::failed("Failed to connect to bus"),
        );
        let err = enable_automount(&t.ctx, "gdrive").await.unwrap_err();
        assert!(err.to_string().contains("Failed to connect to bus"));
    }

    #[tokio::test]
    async fn test_disable_removes_unit() {
        let t = TestContext::new();
        let path = enable_automount(&t.ctx, "gdrive").await.unwrap();
        assert!(path.exists());

        disable_automount(&t.ctx, "gdrive").await.unwrap();
        assert!(!path.exists());
        let calls = t.runner.calls();
        assert!(calls.contains(&"systemctl --user stop rclone-gdrive.service".to_string()));
        assert!(calls.contains(&"systemctl --user disable rclone-gdrive.service".to_string()));
        assert_eq!(calls.last().unwrap(), "systemctl --user daemon-reload");

        // Disabling again is harmless
        disable_automount(&t.ctx, "gdrive").await.unwrap();
    }

    #[tokio::test]
    async fn test_enabled_state_is_always_live() {
        let t = TestContext::new();
        let enabled = Arc::new(AtomicBool::new(false));
        let flag = enabled.clone();
        t.runner.respond(move |inv| {
            (inv.args.first().map(String::as_str) == Some("--user")
                && inv.args.get(1).map(String::as_str) == Some("is-enabled"))
            .then(|| {
                Ok(if flag.load(Ordering::SeqCst) {
                    CommandOutput::ok("enabled")
                } else {
                    CommandOutput::failed("disabled")
                })
            })
        });

        assert!(!is_automount_enabled(&t.ctx, "gdrive").await);
        // Flipped outside the app, no invalidation needed
        enabled.store(true, Ordering::SeqCst);
        assert!(is_automount_enabled(&t.ctx, "gdrive").await);
        enabled.store(false, Ordering::SeqCst);
        assert!(!is_automount_enabled(&t.ctx, "gdrive").await);
    }
}
