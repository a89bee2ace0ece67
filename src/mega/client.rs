use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

use crate::core::context::AppContext;
use crate::utils::process::{Invocation, run_checked, run_status, spawn};
use crate::utils::types::errors::{CloudMountError, Result};
use crate::utils::types::quota::{Quota, QuotaSummary};

pub const MEGA_DIR_NAME: &str = "Mega";

// "USED STORAGE:   78281147   0.15% of 53687091200"
static USED_STORAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"USED STORAGE:\s*(\d+).*of\s*(\d+)").expect("valid mega-df pattern")
});

/// Make sure `mega-cmd-server` is running.
///
/// A responsive `mega-whoami` means it already is. Otherwise the server is
/// started in its own session so it outlives CloudMount, and we give it a
/// moment to come up.
pub async fn ensure_daemon(ctx: &AppContext) -> Result<()> {
    if run_status(ctx.runner(), Invocation::new(&ctx.tools.mega_whoami)).await {
        debug!("mega-cmd-server already running");
        return Ok(());
    }

    info!("🚀 Starting mega-cmd-server");
    spawn(ctx.runner(), Invocation::new(&ctx.tools.mega_cmd_server))?;
    tokio::time::sleep(ctx.timings.daemon_startup).await;
    Ok(())
}

/// Log in, replacing any existing session. `code_2fa` is sent as
/// `--auth-code=` when not empty.
pub async fn login(ctx: &AppContext, user: &str, pass: &str, code_2fa: &str) -> Result<()> {
    if let Err(e) = ensure_daemon(ctx).await {
        warn!("⚠️ Could not start mega-cmd-server: {e}");
    }
    if !run_status(ctx.runner(), Invocation::new(&ctx.tools.mega_logout)).await {
        debug!("mega-logout: no previous session");
    }

    let mut invocation = Invocation::new(&ctx.tools.mega_login).args([user, pass]);
    let code = code_2fa.trim();
    if !code.is_empty() {
        invocation = invocation.arg(format!("--auth-code={code}"));
    }
    run_checked(ctx.runner(), invocation).await?;

    info!("✅ Logged in to Mega as {user}");
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    run_checked(ctx.runner(), Invocation::new(&ctx.tools.mega_logout)).await?;
    info!("👋 Logged out of Mega");
    Ok(())
}

pub async fn is_logged_in(ctx: &AppContext) -> bool {
    run_status(ctx.runner(), Invocation::new(&ctx.tools.mega_whoami)).await
}

/// Serve the account root over WebDAV and return its URL.
pub async fn webdav_url(ctx: &AppContext) -> Result<String> {
    if let Err(e) = ensure_daemon(ctx).await {
        warn!("⚠️ Could not start mega-cmd-server: {e}");
    }
    let output = run_checked(ctx.runner(), Invocation::new(&ctx.tools.mega_webdav).arg("/")).await?;
    let text = output.combined();

    text.split_whitespace()
        .find(|word| word.starts_with("http"))
        .map(str::to_string)
        .ok_or_else(|| CloudMountError::Parse(format!("no WebDAV URL in mega-webdav output: {text}")))
}

/// `(used, total)` bytes from `mega-df` output.
pub fn parse_mega_df(output: &str) -> Result<(i64, i64)> {
    let caps = output
        .lines()
        .filter(|line| line.contains("USED STORAGE"))
        .find_map(|line| USED_STORAGE.captures(line.trim()))
        .ok_or_else(|| CloudMountError::Parse("no USED STORAGE line in mega-df output".into()))?;

    let number = |i: usize| -> Result<i64> {
        caps[i]
            .parse::<i64>()
            .map_err(|e| CloudMountError::Parse(format!("mega-df value '{}': {e}", &caps[i])))
    };
    Ok((number(1)?, number(2)?))
}

/// Account storage as `(used, total)` bytes. Runs `mega-df` under the C
/// locale so the labels stay in English.
pub async fn get_space(ctx: &AppContext) -> Result<(i64, i64)> {
    let output = run_checked(
        ctx.runner(),
        Invocation::new(&ctx.tools.mega_df).env("LC_ALL", "C"),
    )
    .await?;
    parse_mega_df(&output.stdout)
}

/// Account storage as a quota row. A failed query, unparsable output or a
/// zero total all read as unknown.
pub async fn space_summary(ctx: &AppContext) -> QuotaSummary {
    match get_space(ctx).await {
        Ok((used, total)) if total > 0 => {
            let quota = Quota {
                used,
                total,
                ..Quota::default()
            };
            QuotaSummary::from_cached(Some(Some(quota)))
        }
        Ok((_, total)) => {
            debug!("mega-df reported a total of {total}");
            QuotaSummary::Unknown
        }
        Err(e) => {
            warn!("⚠️ Could not read Mega storage usage: {e}");
            QuotaSummary::Unknown
        }
    }
}

pub fn mount_path(ctx: &AppContext) -> PathBuf {
    ctx.paths.mount_root.join(MEGA_DIR_NAME)
}
