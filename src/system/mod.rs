//! Host integration: dependency checks, installers and autostart.

pub mod autostart;
pub mod checker;
pub mod distro;
pub mod installer;

pub use autostart::{is_autostart_enabled, set_autostart};
pub use checker::{SystemReport, check_fusermount, check_megacmd, check_rclone, check_systemctl};
pub use distro::{OsRelease, get_arch, megacmd_package};
pub use installer::{InstallOutcome, install_megacmd, install_rclone, open_browser};
