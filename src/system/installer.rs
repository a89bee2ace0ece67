//! Installers for the external tools CloudMount depends on.

use log::{info, warn};
use once_cell::sync::Lazy;
use std::path::Path;

use super::distro::{MegaPackage, OsRelease, get_arch, megacmd_package};
use crate::core::context::AppContext;
use crate::utils::process::{Invocation, run_checked, spawn};
use crate::utils::types::errors::Result;

pub const RCLONE_INSTALL_SCRIPT: &str = "curl https://rclone.org/install.sh | sudo bash";
pub const MEGACMD_DOWNLOAD_PAGE: &str = "https://mega.io/cmd";

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let user_agent = format!("CloudMount/v{}", env!("CARGO_PKG_VERSION"));
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .unwrap_or_default()
});

/// What an install attempt ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// No automatic install available; the download page was opened.
    OpenedBrowser(String),
}

/// Run rclone's official install script (asks for sudo).
pub async fn install_rclone(ctx: &AppContext) -> Result<InstallOutcome> {
    info!("📦 Installing rclone with the official script");
    run_checked(
        ctx.runner(),
        Invocation::new(&ctx.tools.shell).args(["-c", RCLONE_INSTALL_SCRIPT]),
    )
    .await?;
    info!("✅ rclone installed");
    Ok(InstallOutcome::Installed)
}

/// Download the MEGAcmd package for this distro and install it through
/// pkexec. Unsupported systems get the download page instead.
pub async fn install_megacmd(ctx: &AppContext) -> Result<InstallOutcome> {
    if !cfg!(target_os = "linux") {
        open_browser(ctx, MEGACMD_DOWNLOAD_PAGE)?;
        return Ok(InstallOutcome::OpenedBrowser(MEGACMD_DOWNLOAD_PAGE.into()));
    }

    let release = OsRelease::read(&ctx.paths.os_release);
    let package = match megacmd_package(&release.id, &release.version_id, &get_arch()) {
        Ok(package) => package,
        Err(e) => {
            warn!("⚠️ No MEGAcmd package for this system ({e}), opening the download page");
            open_browser(ctx, MEGACMD_DOWNLOAD_PAGE)?;
            return Ok(InstallOutcome::OpenedBrowser(MEGACMD_DOWNLOAD_PAGE.into()));
        }
    };

    let dir = tempfile::TempDir::new()?;
    let file = dir.path().join(&package.filename);
    download_file(&package.url, &file).await?;
    install_package(ctx, &package, &file).await?;

    info!("✅ MEGAcmd installed");
    Ok(InstallOutcome::Installed)
}

async fn download_file(url: &str, dest: &Path) -> Result<()> {
    info!("⬇️ Downloading {url}");
    let bytes = HTTP_CLIENT
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    tokio::fs::write(dest, &bytes).await?;
    Ok(())
}

async fn install_package(ctx: &AppContext, package: &MegaPackage, file: &Path) -> Result<()> {
    let invocation = Invocation::new(&ctx.tools.pkexec).args(package.kind.install_args(file));
    info!("📦 {}", invocation.command_line());
    run_checked(ctx.runner(), invocation).await?;
    Ok(())
}

pub fn open_browser(ctx: &AppContext, url: &str) -> Result<()> {
    spawn(ctx.runner(), Invocation::new(&ctx.tools.opener).arg(url))
}
