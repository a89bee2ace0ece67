//! Centralized application paths - single source of truth
//!
//! Every file and directory CloudMount reads or writes is resolved here once,
//! so the rest of the code never calls `dirs` itself.

use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::utils::types::errors::{CloudMountError, Result};

pub const APP_DIR_NAME: &str = "cloudmount";
pub const SETTINGS_FILE: &str = "settings.json";
pub const RCLONE_LOG_FILE: &str = "cloudmount.log";
pub const MOUNT_ROOT_NAME: &str = "Clouds";
pub const AUTOSTART_FILE: &str = "com.anabasasoft.cloudmount.desktop";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPaths {
    /// CloudMount's own configuration directory
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Application log directory
    pub logs_dir: PathBuf,
    pub rclone_config_dir: PathBuf,
    pub rclone_config_file: PathBuf,
    /// Log file written by `rclone mount` and shown in the log viewer
    pub rclone_log_file: PathBuf,
    /// Parent of every `<remote>` mount directory
    pub mount_root: PathBuf,
    pub systemd_user_dir: PathBuf,
    pub autostart_dir: PathBuf,
    pub mount_table: PathBuf,
    pub os_release: PathBuf,
}

impl AppPaths {
    /// Resolve the standard per-user locations.
    ///
    /// `config_override` replaces CloudMount's own config directory;
    /// `mount_root_override` replaces `~/Clouds`.
    pub fn resolve(
        config_override: Option<PathBuf>,
        mount_root_override: Option<PathBuf>,
    ) -> Result<Self> {
        let user_config = dirs::config_dir().ok_or_else(|| {
            CloudMountError::Unsupported("cannot determine the user config directory".into())
        })?;
        let home = dirs::home_dir().ok_or_else(|| {
            CloudMountError::Unsupported("cannot determine the home directory".into())
        })?;

        let config_dir = config_override.unwrap_or_else(|| user_config.join(APP_DIR_NAME));
        let mount_root = mount_root_override.unwrap_or_else(|| home.join(MOUNT_ROOT_NAME));
        let rclone_config_dir = user_config.join("rclone");

        let paths = Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            logs_dir: config_dir.join("logs"),
            config_dir,
            rclone_config_file: rclone_config_dir.join("rclone.conf"),
            rclone_log_file: rclone_config_dir.join(RCLONE_LOG_FILE),
            rclone_config_dir,
            mount_root,
            systemd_user_dir: user_config.join("systemd").join("user"),
            autostart_dir: user_config.join("autostart"),
            mount_table: PathBuf::from("/proc/mounts"),
            os_release: PathBuf::from("/etc/os-release"),
        };

        info!("📁 Config directory: {}", paths.config_dir.display());
        info!("📁 Mount root: {}", paths.mount_root.display());
        Ok(paths)
    }

    /// Every path rooted under `root`; used for sandboxes and tests.
    pub fn under(root: &Path) -> Self {
        let config = root.join("config");
        let config_dir = config.join(APP_DIR_NAME);
        let rclone_config_dir = config.join("rclone");
        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            logs_dir: config_dir.join("logs"),
            config_dir,
            rclone_config_file: rclone_config_dir.join("rclone.conf"),
            rclone_log_file: rclone_config_dir.join(RCLONE_LOG_FILE),
            rclone_config_dir,
            mount_root: root.join(MOUNT_ROOT_NAME),
            systemd_user_dir: config.join("systemd").join("user"),
            autostart_dir: config.join("autostart"),
            mount_table: root.join("mounts"),
            os_release: root.join("os-release"),
        }
    }

    /// Create the directories CloudMount owns.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.logs_dir)?;
        std::fs::create_dir_all(&self.mount_root)?;
        Ok(())
    }

    pub fn mount_path(&self, remote: &str) -> PathBuf {
        self.mount_root.join(remote)
    }

    pub fn unit_path(&self, unit_name: &str) -> PathBuf {
        self.systemd_user_dir.join(unit_name)
    }

    pub fn autostart_file(&self) -> PathBuf {
        self.autostart_dir.join(AUTOSTART_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_layout() {
        let paths = AppPaths::under(Path::new("/tmp/cm"));
        assert_eq!(
            paths.settings_file,
            PathBuf::from("/tmp/cm/config/cloudmount/settings.json")
        );
        assert_eq!(
            paths.rclone_config_file,
            PathBuf::from("/tmp/cm/config/rclone/rclone.conf")
        );
        assert_eq!(
            paths.rclone_log_file,
            PathBuf::from("/tmp/cm/config/rclone/cloudmount.log")
        );
        assert_eq!(paths.mount_path("gdrive"), PathBuf::from("/tmp/cm/Clouds/gdrive"));
        assert_eq!(
            paths.unit_path("rclone-gdrive.service"),
            PathBuf::from("/tmp/cm/config/systemd/user/rclone-gdrive.service")
        );
    }

    #[test]
    fn test_ensure_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = AppPaths::under(dir.path());
        paths.ensure_dirs().unwrap();
        assert!(paths.config_dir.is_dir());
        assert!(paths.logs_dir.is_dir());
        assert!(paths.mount_root.is_dir());
    }
}
